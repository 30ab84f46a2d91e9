//! Mutable state of one deposit simulation run.

use chrono::NaiveDateTime;

/// Balance, loss streak and suspension deadline for a single run.
///
/// Owned by exactly one `DepositSimulator::simulate` call and never shared
/// between grid points.
#[derive(Debug, Clone, PartialEq)]
pub struct DepositState {
    pub balance: f64,
    pub consecutive_losses: u32,
    pub suspended_until: Option<NaiveDateTime>,
}

impl DepositState {
    pub fn new(start_balance: f64) -> Self {
        Self {
            balance: start_balance,
            consecutive_losses: 0,
            suspended_until: None,
        }
    }

    /// True while `at` lies strictly before the suspension deadline.
    pub fn is_suspended(&self, at: NaiveDateTime) -> bool {
        self.suspended_until.is_some_and(|until| at < until)
    }

    /// Arm a suspension and restart the loss streak from zero.
    pub fn suspend_until(&mut self, until: NaiveDateTime) {
        self.suspended_until = Some(until);
        self.consecutive_losses = 0;
    }

    pub fn clamp_to(&mut self, floor: f64) {
        if self.balance < floor {
            self.balance = floor;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn t0() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn fresh_state_is_active() {
        let state = DepositState::new(1.0);
        assert!(!state.is_suspended(t0()));
        assert_eq!(state.consecutive_losses, 0);
    }

    #[test]
    fn suspension_window_is_half_open() {
        let mut state = DepositState::new(1.0);
        state.consecutive_losses = 3;
        state.suspend_until(t0() + Duration::days(1));
        assert_eq!(state.consecutive_losses, 0);
        assert!(state.is_suspended(t0()));
        assert!(state.is_suspended(t0() + Duration::hours(23)));
        assert!(!state.is_suspended(t0() + Duration::days(1)));
    }

    #[test]
    fn clamp_raises_to_floor_only() {
        let mut state = DepositState::new(0.4);
        state.clamp_to(0.5);
        assert_eq!(state.balance, 0.5);
        state.balance = 0.7;
        state.clamp_to(0.5);
        assert_eq!(state.balance, 0.7);
    }
}

//! Deposit simulator: replay resolved trades through a balance model.
//!
//! Per trade, in order:
//! 1. directions outside the run's `TradingMode` are ignored
//! 2. unresolved (`NONE`) trades are ignored
//! 3. trades inside an armed suspension window are skipped
//! 4. TAKE applies the profit and resets the loss streak
//! 5. STOP applies the loss, extends the streak and may arm a suspension
//!
//! The balance is clamped to the configured floor after every applied trade.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::params::{DepositConfig, SweepParameters};
use super::state::DepositState;
use crate::domain::{Outcome, TradeOutcome};

/// Everything one simulation run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositRun {
    pub final_balance: f64,
    pub min_balance: f64,
    /// Balance after each applied trade.
    pub balance_curve: Vec<f64>,
    pub wins: usize,
    pub losses: usize,
    /// Trades vetoed by an active suspension window.
    pub skipped_suspended: usize,
    /// Trades outside the run's trading mode.
    pub filtered: usize,
    /// `NONE` outcomes that reached the simulator.
    pub unresolved: usize,
    /// Number of suspension windows armed.
    pub suspensions: usize,
    /// Deadline of the most recently armed suspension, even if it has since expired.
    pub suspended_until: Option<NaiveDateTime>,
}

impl DepositRun {
    fn new(start_balance: f64) -> Self {
        Self {
            final_balance: start_balance,
            min_balance: start_balance,
            balance_curve: Vec::new(),
            wins: 0,
            losses: 0,
            skipped_suspended: 0,
            filtered: 0,
            unresolved: 0,
            suspensions: 0,
            suspended_until: None,
        }
    }

    pub fn applied(&self) -> usize {
        self.wins + self.losses
    }
}

/// Compounding balance simulator with loss-streak suspension.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DepositSimulator {
    config: DepositConfig,
}

impl DepositSimulator {
    pub fn new(config: DepositConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DepositConfig {
        &self.config
    }

    /// Replay `outcomes` (strictly increasing in time) under `params`.
    pub fn simulate(&self, outcomes: &[TradeOutcome], params: &SweepParameters) -> DepositRun {
        let floor = self.config.floor();
        let mut state = DepositState::new(self.config.start_balance());
        let mut run = DepositRun::new(state.balance);
        let mut previous: Option<NaiveDateTime> = None;

        for trade in outcomes {
            debug_assert!(
                previous.map_or(true, |p| trade.time > p),
                "outcome stream must be strictly increasing in time ({} after {:?})",
                trade.time,
                previous
            );
            previous = Some(trade.time);

            if !params.mode().allows(trade.direction) {
                run.filtered += 1;
                continue;
            }
            if !trade.is_resolved() {
                run.unresolved += 1;
                continue;
            }
            if state.is_suspended(trade.time) {
                run.skipped_suspended += 1;
                continue;
            }

            state.balance = params.model().apply(state.balance, trade.outcome);
            match trade.outcome {
                Outcome::Take => {
                    run.wins += 1;
                    state.consecutive_losses = 0;
                }
                Outcome::Stop => {
                    run.losses += 1;
                    state.consecutive_losses += 1;
                    if params.suspension_enabled()
                        && state.consecutive_losses >= params.streak_limit()
                    {
                        let until = trade
                            .time
                            .checked_add_signed(params.suspension())
                            .unwrap_or(NaiveDateTime::MAX);
                        state.suspend_until(until);
                        run.suspensions += 1;
                    }
                }
                Outcome::None => {}
            }

            state.clamp_to(floor);
            run.balance_curve.push(state.balance);
            run.min_balance = run.min_balance.min(state.balance);
        }

        run.final_balance = state.balance;
        run.suspended_until = state.suspended_until;
        run
    }

    /// Final balance only.
    pub fn final_balance(&self, outcomes: &[TradeOutcome], params: &SweepParameters) -> f64 {
        self.simulate(outcomes, params).final_balance
    }
}

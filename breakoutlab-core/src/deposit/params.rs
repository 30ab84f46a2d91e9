//! Deposit configuration: start balance, balance models, sweep parameters.

use chrono::Duration;
use serde::{Deserialize, Serialize, Serializer};

use crate::config::{check, ConfigError};
use crate::domain::{Direction, Outcome};

/// Which trade directions a deposit run applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradingMode {
    #[default]
    #[serde(rename = "ALL")]
    LongShort,
    LongOnly,
    ShortOnly,
}

impl TradingMode {
    pub const ALL: [TradingMode; 3] =
        [TradingMode::LongShort, TradingMode::LongOnly, TradingMode::ShortOnly];

    pub fn allows(&self, direction: Direction) -> bool {
        match self {
            TradingMode::LongShort => true,
            TradingMode::LongOnly => direction == Direction::Long,
            TradingMode::ShortOnly => direction == Direction::Short,
        }
    }

    /// Report label: `ALL`, `LONG_ONLY`, `SHORT_ONLY`.
    pub fn label(&self) -> &'static str {
        match self {
            TradingMode::LongShort => "ALL",
            TradingMode::LongOnly => "LONG_ONLY",
            TradingMode::ShortOnly => "SHORT_ONLY",
        }
    }
}

/// How a resolved trade changes the balance.
///
/// Percentages are signed: a loss is configured as a negative
/// `stop_loss_pct` (e.g. `-1.0`). Both must lie in `(-100, inf)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BalanceModel {
    /// The whole balance compounds: `balance *= 1 + pct / 100`.
    Compounding { take_profit_pct: f64, stop_loss_pct: f64 },

    /// Only `active_fraction` of the balance is at stake; the rest is reserve.
    SplitReserve {
        active_fraction: f64,
        take_profit_pct: f64,
        stop_loss_pct: f64,
    },
}

impl BalanceModel {
    pub fn compounding(take_profit_pct: f64, stop_loss_pct: f64) -> Result<Self, ConfigError> {
        let model = BalanceModel::Compounding { take_profit_pct, stop_loss_pct };
        model.validate()?;
        Ok(model)
    }

    pub fn split_reserve(
        active_fraction: f64,
        take_profit_pct: f64,
        stop_loss_pct: f64,
    ) -> Result<Self, ConfigError> {
        let model = BalanceModel::SplitReserve {
            active_fraction,
            take_profit_pct,
            stop_loss_pct,
        };
        model.validate()?;
        Ok(model)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let (take_profit_pct, stop_loss_pct) = self.percentages();
        check("take_profit_pct", take_profit_pct, take_profit_pct > -100.0, "(-100, inf)")?;
        check("stop_loss_pct", stop_loss_pct, stop_loss_pct > -100.0, "(-100, inf)")?;
        if let BalanceModel::SplitReserve { active_fraction, .. } = *self {
            check(
                "active_fraction",
                active_fraction,
                active_fraction > 0.0 && active_fraction <= 1.0,
                "(0, 1]",
            )?;
        }
        Ok(())
    }

    /// `(take_profit_pct, stop_loss_pct)` of either variant.
    pub fn percentages(&self) -> (f64, f64) {
        match *self {
            BalanceModel::Compounding { take_profit_pct, stop_loss_pct }
            | BalanceModel::SplitReserve { take_profit_pct, stop_loss_pct, .. } => {
                (take_profit_pct, stop_loss_pct)
            }
        }
    }

    /// Balance after one trade. `Outcome::None` leaves it untouched.
    pub fn apply(&self, balance: f64, outcome: Outcome) -> f64 {
        let (take_profit_pct, stop_loss_pct) = self.percentages();
        let pct = match outcome {
            Outcome::Take => take_profit_pct,
            Outcome::Stop => stop_loss_pct,
            Outcome::None => return balance,
        };
        match *self {
            BalanceModel::Compounding { .. } => balance * (1.0 + pct / 100.0),
            BalanceModel::SplitReserve { active_fraction, .. } => {
                balance + balance * active_fraction * pct / 100.0
            }
        }
    }
}

impl Default for BalanceModel {
    /// +3% per take, -1% per stop, whole balance compounding.
    fn default() -> Self {
        BalanceModel::Compounding {
            take_profit_pct: 3.0,
            stop_loss_pct: -1.0,
        }
    }
}

/// Starting balance and the floor the balance is clamped to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DepositConfig {
    start_balance: f64,
    floor: f64,
}

impl DepositConfig {
    pub fn new(start_balance: f64, floor: f64) -> Result<Self, ConfigError> {
        check("start_balance", start_balance, start_balance > 0.0, "(0, inf)")?;
        check("floor", floor, floor >= 0.0, "[0, inf)")?;
        if floor > start_balance {
            return Err(ConfigError::FloorAboveStart {
                floor,
                start: start_balance,
            });
        }
        Ok(Self { start_balance, floor })
    }

    pub fn start_balance(&self) -> f64 {
        self.start_balance
    }

    pub fn floor(&self) -> f64 {
        self.floor
    }
}

impl Default for DepositConfig {
    fn default() -> Self {
        Self {
            start_balance: 1.0,
            floor: 0.0,
        }
    }
}

/// One deposit grid point.
///
/// `streak_limit = 0` disables suspension entirely, whatever the window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SweepParameters {
    streak_limit: u32,
    #[serde(rename = "suspension_secs", serialize_with = "serialize_secs")]
    suspension: Duration,
    mode: TradingMode,
    model: BalanceModel,
}

impl SweepParameters {
    pub fn new(
        streak_limit: u32,
        suspension: Duration,
        model: BalanceModel,
    ) -> Result<Self, ConfigError> {
        if suspension < Duration::zero() {
            return Err(ConfigError::NegativeSuspension(suspension));
        }
        model.validate()?;
        Ok(Self {
            streak_limit,
            suspension,
            mode: TradingMode::default(),
            model,
        })
    }

    pub fn with_mode(mut self, mode: TradingMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn streak_limit(&self) -> u32 {
        self.streak_limit
    }

    pub fn suspension(&self) -> Duration {
        self.suspension
    }

    pub fn mode(&self) -> TradingMode {
        self.mode
    }

    pub fn model(&self) -> &BalanceModel {
        &self.model
    }

    pub fn suspension_enabled(&self) -> bool {
        self.streak_limit > 0
    }
}

fn serialize_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(duration.num_seconds())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compounding_applies_signed_percentages() {
        let model = BalanceModel::compounding(3.0, -1.0).unwrap();
        assert!((model.apply(1.0, Outcome::Take) - 1.03).abs() < 1e-12);
        assert!((model.apply(1.0, Outcome::Stop) - 0.99).abs() < 1e-12);
        assert_eq!(model.apply(1.0, Outcome::None), 1.0);
    }

    #[test]
    fn split_reserve_only_risks_active_fraction() {
        let model = BalanceModel::split_reserve(0.8, 3.0, -5.0).unwrap();
        // 80% active: +2.4% on take, -4% on stop.
        assert!((model.apply(100.0, Outcome::Take) - 102.4).abs() < 1e-9);
        assert!((model.apply(100.0, Outcome::Stop) - 96.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_total_loss_percentages() {
        assert!(matches!(
            BalanceModel::compounding(3.0, -100.0),
            Err(ConfigError::OutOfRange { field: "stop_loss_pct", .. })
        ));
        assert!(BalanceModel::compounding(f64::INFINITY, -1.0).is_err());
        assert!(BalanceModel::compounding(-99.9, -99.9).is_ok());
    }

    #[test]
    fn rejects_bad_active_fraction() {
        assert!(BalanceModel::split_reserve(0.0, 3.0, -1.0).is_err());
        assert!(BalanceModel::split_reserve(1.2, 3.0, -1.0).is_err());
        assert!(BalanceModel::split_reserve(1.0, 3.0, -1.0).is_ok());
    }

    #[test]
    fn deposit_config_rejects_floor_above_start() {
        assert!(matches!(
            DepositConfig::new(1.0, 2.0),
            Err(ConfigError::FloorAboveStart { .. })
        ));
        assert!(DepositConfig::new(0.0, 0.0).is_err());
        assert!(DepositConfig::new(1.0, -0.1).is_err());
        assert!(DepositConfig::new(1.0, 1.0).is_ok());
    }

    #[test]
    fn sweep_parameters_reject_negative_window() {
        let err = SweepParameters::new(2, Duration::days(-1), BalanceModel::default()).unwrap_err();
        assert!(matches!(err, ConfigError::NegativeSuspension(_)));
    }

    #[test]
    fn zero_streak_limit_disables_suspension() {
        let params = SweepParameters::new(0, Duration::days(5), BalanceModel::default()).unwrap();
        assert!(!params.suspension_enabled());
    }

    #[test]
    fn trading_mode_filters_directions() {
        assert!(TradingMode::LongShort.allows(Direction::Short));
        assert!(TradingMode::LongOnly.allows(Direction::Long));
        assert!(!TradingMode::LongOnly.allows(Direction::Short));
        assert!(!TradingMode::ShortOnly.allows(Direction::Long));
        assert_eq!(TradingMode::LongShort.label(), "ALL");
    }

    #[test]
    fn balance_model_reads_tagged_json() {
        let json = r#"{"type":"SPLIT_RESERVE","active_fraction":0.8,"take_profit_pct":3.0,"stop_loss_pct":-1.0}"#;
        let model: BalanceModel = serde_json::from_str(json).unwrap();
        assert_eq!(model, BalanceModel::split_reserve(0.8, 3.0, -1.0).unwrap());
    }

    #[test]
    fn parameters_serialize_window_in_seconds() {
        let params = SweepParameters::new(2, Duration::days(1), BalanceModel::default())
            .unwrap()
            .with_mode(TradingMode::ShortOnly);
        let json = serde_json::to_string(&params).unwrap();
        assert!(json.contains("\"suspension_secs\":86400"));
        assert!(json.contains("\"SHORT_ONLY\""));
    }
}

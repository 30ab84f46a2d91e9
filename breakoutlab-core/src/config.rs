//! Detection configuration and validation errors.
//!
//! Every tunable of the scan is carried by a value object that is validated
//! once at construction. Nothing downstream re-checks ranges.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Direction;

/// Invalid configuration, rejected before any scan or simulation runs.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be finite, got {value}")]
    NotFinite { field: &'static str, value: f64 },

    #[error("{field} = {value} is outside {expected}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("suspension window must not be negative, got {0}")]
    NegativeSuspension(chrono::Duration),

    #[error("floor {floor} exceeds start balance {start}")]
    FloorAboveStart { floor: f64, start: f64 },
}

/// Reject non-finite values, then values failing `in_range`.
pub(crate) fn check(
    field: &'static str,
    value: f64,
    in_range: bool,
    expected: &'static str,
) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NotFinite { field, value });
    }
    if !in_range {
        return Err(ConfigError::OutOfRange { field, value, expected });
    }
    Ok(())
}

/// Which way a breakout is traded.
///
/// Both are legitimate hypotheses: `Momentum` trades with the triggering
/// move, `Reversal` fades it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DirectionPolicy {
    #[default]
    Momentum,
    Reversal,
}

impl DirectionPolicy {
    /// Direction for a triggering move of `change_pct` (sign only matters).
    pub fn direction_for(&self, change_pct: f64) -> Direction {
        let with_move = if change_pct > 0.0 { Direction::Long } else { Direction::Short };
        match self {
            DirectionPolicy::Momentum => with_move,
            DirectionPolicy::Reversal => with_move.opposite(),
        }
    }
}

/// Intrabar ambiguity resolution: which level wins when one candle crosses both.
///
/// OHLC data cannot tell which extreme came first inside a bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PathPolicy {
    /// Stop-loss checked before take-profit (adverse excursion first).
    #[default]
    WorstCase,
    /// Take-profit checked before stop-loss.
    BestCase,
}

/// Breakout detection and exit-level configuration.
///
/// `take_profit_pct` and `stop_loss_pct` are distances from the entry price,
/// applied directionally: a LONG targets `entry * (1 + tp%)` and stops at
/// `entry * (1 - sl%)`, a SHORT mirrors both.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DetectorConfig {
    threshold_pct: f64,
    take_profit_pct: f64,
    stop_loss_pct: f64,
    direction_policy: DirectionPolicy,
    path_policy: PathPolicy,
}

impl DetectorConfig {
    pub fn new(
        threshold_pct: f64,
        take_profit_pct: f64,
        stop_loss_pct: f64,
    ) -> Result<Self, ConfigError> {
        check("threshold_pct", threshold_pct, threshold_pct >= 0.0, "[0, inf)")?;
        check("take_profit_pct", take_profit_pct, take_profit_pct > 0.0, "(0, inf)")?;
        check(
            "stop_loss_pct",
            stop_loss_pct,
            stop_loss_pct > 0.0 && stop_loss_pct < 100.0,
            "(0, 100)",
        )?;
        Ok(Self {
            threshold_pct,
            take_profit_pct,
            stop_loss_pct,
            direction_policy: DirectionPolicy::default(),
            path_policy: PathPolicy::default(),
        })
    }

    pub fn with_direction_policy(mut self, policy: DirectionPolicy) -> Self {
        self.direction_policy = policy;
        self
    }

    pub fn with_path_policy(mut self, policy: PathPolicy) -> Self {
        self.path_policy = policy;
        self
    }

    pub fn threshold_pct(&self) -> f64 {
        self.threshold_pct
    }

    pub fn take_profit_pct(&self) -> f64 {
        self.take_profit_pct
    }

    pub fn stop_loss_pct(&self) -> f64 {
        self.stop_loss_pct
    }

    pub fn direction_policy(&self) -> DirectionPolicy {
        self.direction_policy
    }

    pub fn path_policy(&self) -> PathPolicy {
        self.path_policy
    }

    /// Absolute `(take_profit, stop_loss)` prices for an entry.
    pub fn exit_levels(&self, entry_price: f64, direction: Direction) -> (f64, f64) {
        let tp = self.take_profit_pct / 100.0;
        let sl = self.stop_loss_pct / 100.0;
        match direction {
            Direction::Long => (entry_price * (1.0 + tp), entry_price * (1.0 - sl)),
            Direction::Short => (entry_price * (1.0 - tp), entry_price * (1.0 + sl)),
        }
    }
}

impl Default for DetectorConfig {
    /// 7% breakout, 5% target, 0.7% stop, momentum, stop-loss first.
    fn default() -> Self {
        Self {
            threshold_pct: 7.0,
            take_profit_pct: 5.0,
            stop_loss_pct: 0.7,
            direction_policy: DirectionPolicy::Momentum,
            path_policy: PathPolicy::WorstCase,
        }
    }
}

//! SignalEvent: a breakout candidate with its exit levels.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::trade::Direction;

/// An immutable breakout candidate emitted by the detector.
///
/// Carries everything the resolver needs: the entry bar, the direction and
/// both absolute exit levels. Consumed once by the resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    pub instrument: String,
    pub time: NaiveDateTime,
    /// Index of the triggering candle in its series.
    pub bar_index: usize,
    pub direction: Direction,
    /// Open-to-close move of the triggering candle, in percent.
    pub change_pct: f64,
    pub entry_price: f64,
    pub take_profit_price: f64,
    pub stop_loss_price: f64,
}

impl SignalEvent {
    /// True if a bar spanning `[low, high]` touches the stop-loss level.
    pub fn stop_touched(&self, high: f64, low: f64) -> bool {
        match self.direction {
            Direction::Long => low <= self.stop_loss_price,
            Direction::Short => high >= self.stop_loss_price,
        }
    }

    /// True if a bar spanning `[low, high]` touches the take-profit level.
    pub fn take_touched(&self, high: f64, low: f64) -> bool {
        match self.direction {
            Direction::Long => high >= self.take_profit_price,
            Direction::Short => low <= self.take_profit_price,
        }
    }
}

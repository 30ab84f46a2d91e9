//! Outcome resolution: walk forward from an entry until a level is touched.
//!
//! When a candle's high-low range encompasses both the stop-loss and the
//! take-profit, the path policy decides which one is evaluated first. The
//! order inside a bar is unobservable from OHLC, so the default is
//! `PathPolicy::WorstCase` (stop-loss first).

use crate::config::PathPolicy;
use crate::domain::{Candle, CandleSeries, Outcome, SignalEvent, TradeOutcome};

/// Result of resolving one signal.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub outcome: TradeOutcome,
    /// Index of the candle that resolved the trade, or the last candle of the
    /// series when the outcome is `Outcome::None`.
    pub resolved_index: usize,
}

/// Forward scanner deciding TAKE / STOP / NONE for signal events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeResolver {
    path_policy: PathPolicy,
}

impl OutcomeResolver {
    pub fn new(path_policy: PathPolicy) -> Self {
        Self { path_policy }
    }

    pub fn path_policy(&self) -> PathPolicy {
        self.path_policy
    }

    /// Scan `series` from `start_index + 1` to its end.
    ///
    /// Stops at the first candle touching either level. Pure: the same
    /// inputs always produce the same `Resolution`.
    pub fn resolve(&self, series: &CandleSeries, event: &SignalEvent, start_index: usize) -> Resolution {
        let candles = series.candles();

        for (index, candle) in candles.iter().enumerate().skip(start_index + 1) {
            if let Some(outcome) = self.outcome_on(candle, event) {
                return Resolution {
                    outcome: trade_outcome(event, outcome),
                    resolved_index: index,
                };
            }
        }

        Resolution {
            outcome: trade_outcome(event, Outcome::None),
            resolved_index: candles.len().saturating_sub(1).max(start_index),
        }
    }

    /// Outcome decided by a single candle, if any.
    pub fn outcome_on(&self, candle: &Candle, event: &SignalEvent) -> Option<Outcome> {
        let stop = event.stop_touched(candle.high, candle.low);
        let take = event.take_touched(candle.high, candle.low);

        match self.path_policy {
            PathPolicy::WorstCase => worst_case(stop, take),
            PathPolicy::BestCase => best_case(stop, take),
        }
    }
}

/// WorstCase: the adverse level is evaluated first.
fn worst_case(stop: bool, take: bool) -> Option<Outcome> {
    if stop {
        Some(Outcome::Stop)
    } else if take {
        Some(Outcome::Take)
    } else {
        None
    }
}

/// BestCase: the favorable level is evaluated first.
fn best_case(stop: bool, take: bool) -> Option<Outcome> {
    if take {
        Some(Outcome::Take)
    } else if stop {
        Some(Outcome::Stop)
    } else {
        None
    }
}

fn trade_outcome(event: &SignalEvent, outcome: Outcome) -> TradeOutcome {
    TradeOutcome {
        instrument: event.instrument.clone(),
        time: event.time,
        direction: event.direction,
        change_pct: event.change_pct,
        outcome,
    }
}

//! Canonicalizer for outcome streams: filter, sort, dedupe.
//!
//! The deposit simulator requires strictly increasing trade times. Two
//! records in the same minute count as the same trade, whatever the
//! instrument; the first one (in source order) wins.

use chrono::{NaiveDateTime, Timelike};
use tracing::debug;

use crate::domain::TradeOutcome;

/// Canonical stream plus what was removed to get there.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Canonicalized {
    pub outcomes: Vec<TradeOutcome>,
    pub dropped_unresolved: usize,
    pub dropped_duplicates: usize,
}

/// Canonicalizer for trade outcome streams
pub struct Canonicalizer;

impl Canonicalizer {
    /// Drop unresolved trades, stable-sort by time, keep the first trade per minute.
    pub fn canonicalize(mut outcomes: Vec<TradeOutcome>) -> Canonicalized {
        let total = outcomes.len();
        outcomes.retain(TradeOutcome::is_resolved);
        let dropped_unresolved = total - outcomes.len();

        outcomes.sort_by_key(|trade| trade.time);
        let sorted = outcomes.len();
        outcomes.dedup_by_key(|trade| minute_key(trade.time));
        let dropped_duplicates = sorted - outcomes.len();

        debug!(
            kept = outcomes.len(),
            dropped_unresolved, dropped_duplicates, "canonicalized outcome stream"
        );

        Canonicalized {
            outcomes,
            dropped_unresolved,
            dropped_duplicates,
        }
    }

    /// True if `outcomes` already satisfies the simulator's ordering precondition.
    pub fn is_strictly_increasing(outcomes: &[TradeOutcome]) -> bool {
        outcomes.windows(2).all(|pair| pair[0].time < pair[1].time)
    }
}

fn minute_key(time: NaiveDateTime) -> (chrono::NaiveDate, u32, u32) {
    (time.date(), time.hour(), time.minute())
}

//! Breakout detection: single-pass cursor over a candle series.
//!
//! A candle whose open-to-close move reaches the threshold becomes a
//! candidate. After a candidate the cursor jumps past the candle that
//! resolved it, so one breakout never spawns overlapping trades. A candidate
//! that never resolves consumes the rest of the series.

use crate::config::DetectorConfig;
use crate::domain::{CandleSeries, SignalEvent, TradeOutcome};
use crate::resolver::{OutcomeResolver, Resolution};

/// A detected signal together with how it resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSignal {
    pub event: SignalEvent,
    pub outcome: TradeOutcome,
    pub resolved_index: usize,
}

/// Breakout detector parameterized by a validated `DetectorConfig`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalDetector {
    config: DetectorConfig,
    resolver: OutcomeResolver,
}

impl SignalDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            resolver: OutcomeResolver::new(config.path_policy()),
        }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn resolver(&self) -> &OutcomeResolver {
        &self.resolver
    }

    /// Candidate at `bar_index`, if that candle's move reaches the threshold.
    ///
    /// Does not look at any other candle.
    pub fn candidate_at(&self, series: &CandleSeries, bar_index: usize) -> Option<SignalEvent> {
        let candle = series.get(bar_index)?;
        let change_pct = candle.change_pct();
        if change_pct.abs() < self.config.threshold_pct() {
            return None;
        }

        let direction = self.config.direction_policy().direction_for(change_pct);
        let entry_price = candle.close;
        let (take_profit_price, stop_loss_price) = self.config.exit_levels(entry_price, direction);

        Some(SignalEvent {
            instrument: series.instrument().to_string(),
            time: candle.open_time,
            bar_index,
            direction,
            change_pct,
            entry_price,
            take_profit_price,
            stop_loss_price,
        })
    }

    /// Lazily detect and resolve every non-overlapping breakout in `series`.
    pub fn scan<'a>(&'a self, series: &'a CandleSeries) -> Detections<'a> {
        Detections {
            detector: self,
            series,
            cursor: 0,
        }
    }

    /// Lazily emit the signal events of `series`, in bar order.
    pub fn detect<'a>(&'a self, series: &'a CandleSeries) -> impl Iterator<Item = SignalEvent> + 'a {
        self.scan(series).map(|resolved| resolved.event)
    }

    /// Resolved outcomes for `series`, unresolved (`NONE`) trades included.
    pub fn outcomes(&self, series: &CandleSeries) -> Vec<TradeOutcome> {
        self.scan(series).map(|resolved| resolved.outcome).collect()
    }
}

/// Iterator returned by [`SignalDetector::scan`].
pub struct Detections<'a> {
    detector: &'a SignalDetector,
    series: &'a CandleSeries,
    cursor: usize,
}

impl Iterator for Detections<'_> {
    type Item = ResolvedSignal;

    fn next(&mut self) -> Option<Self::Item> {
        // An entry needs at least one following candle to resolve.
        while self.cursor + 1 < self.series.len() {
            let i = self.cursor;
            let Some(event) = self.detector.candidate_at(self.series, i) else {
                self.cursor += 1;
                continue;
            };

            let Resolution { outcome, resolved_index } =
                self.detector.resolver.resolve(self.series, &event, i);
            self.cursor = resolved_index + 1;

            return Some(ResolvedSignal { event, outcome, resolved_index });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DirectionPolicy;
    use crate::domain::{Candle, Direction, Outcome};
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(minute: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + chrono::Duration::minutes(minute)
    }

    fn series(bars: &[(f64, f64, f64, f64)]) -> CandleSeries {
        let candles = bars
            .iter()
            .enumerate()
            .map(|(i, &(o, h, l, c))| Candle::new(at(i as i64), o, h, l, c))
            .collect();
        CandleSeries::new("SOLUSDT", candles).unwrap()
    }

    fn detector(policy: DirectionPolicy) -> SignalDetector {
        SignalDetector::new(
            DetectorConfig::new(7.0, 5.0, 1.0)
                .unwrap()
                .with_direction_policy(policy),
        )
    }

    #[test]
    fn quiet_candles_emit_nothing() {
        let s = series(&[(100.0, 101.0, 99.0, 100.5); 6]);
        assert_eq!(detector(DirectionPolicy::Momentum).detect(&s).count(), 0);
    }

    #[test]
    fn momentum_follows_the_move() {
        let s = series(&[
            (100.0, 108.5, 100.0, 108.0),
            (108.0, 114.0, 108.0, 113.0),
        ]);
        let events: Vec<_> = detector(DirectionPolicy::Momentum).detect(&s).collect();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].direction, Direction::Long);
        assert_eq!(events[0].entry_price, 108.0);
        assert_eq!(events[0].bar_index, 0);
    }

    #[test]
    fn reversal_fades_the_move() {
        let s = series(&[
            (100.0, 108.5, 100.0, 108.0),
            (108.0, 108.0, 102.0, 103.0),
        ]);
        let resolved: Vec<_> = detector(DirectionPolicy::Reversal).scan(&s).collect();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].event.direction, Direction::Short);
        // SHORT from 108 with 5% target: 102.6, touched by the low of 102.
        assert_eq!(resolved[0].outcome.outcome, Outcome::Take);
    }

    #[test]
    fn last_candle_cannot_trigger() {
        let s = series(&[
            (100.0, 101.0, 99.0, 100.5),
            (100.0, 108.5, 100.0, 108.0),
        ]);
        assert_eq!(detector(DirectionPolicy::Momentum).detect(&s).count(), 0);
    }

    #[test]
    fn cursor_skips_past_resolving_candle() {
        // Bar 0 triggers, bar 1 would also trigger but resolves bar 0's trade.
        let s = series(&[
            (100.0, 108.5, 100.0, 108.0),
            (108.0, 120.0, 108.0, 118.0),
            (118.0, 119.0, 117.5, 118.5),
            (100.0, 110.0, 100.0, 109.0),
            (109.0, 109.5, 100.0, 101.0),
        ]);
        let resolved: Vec<_> = detector(DirectionPolicy::Momentum).scan(&s).collect();
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].event.bar_index, 0);
        assert_eq!(resolved[0].resolved_index, 1);
        assert_eq!(resolved[1].event.bar_index, 3);
        assert_eq!(resolved[1].outcome.outcome, Outcome::Stop);
    }

    #[test]
    fn unresolved_signal_consumes_rest_of_series() {
        let s = series(&[
            (100.0, 108.5, 100.0, 108.0),
            (108.0, 109.0, 107.5, 108.5),
            (108.5, 109.5, 107.5, 109.0),
            (109.0, 109.5, 108.5, 109.0),
        ]);
        let resolved: Vec<_> = detector(DirectionPolicy::Momentum).scan(&s).collect();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].outcome.outcome, Outcome::None);
        assert_eq!(resolved[0].resolved_index, 3);
    }

    #[test]
    fn outcomes_keep_unresolved_trades() {
        let s = series(&[
            (100.0, 108.5, 100.0, 108.0),
            (108.0, 109.0, 107.5, 108.5),
        ]);
        let outcomes = detector(DirectionPolicy::Momentum).outcomes(&s);
        assert_eq!(outcomes.len(), 1);
        assert!(!outcomes[0].is_resolved());
    }
}

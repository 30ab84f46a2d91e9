//! Multi-instrument breakout scan.

use std::fmt;

use breakoutlab_core::{CandleSeries, Outcome, SignalDetector, TradeOutcome};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Outcome counts of a scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub take: usize,
    pub stop: usize,
    pub none: usize,
}

impl ScanSummary {
    pub fn from_outcomes<'a>(outcomes: impl IntoIterator<Item = &'a TradeOutcome>) -> Self {
        let mut summary = Self::default();
        for trade in outcomes {
            summary.record(trade.outcome);
        }
        summary
    }

    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Take => self.take += 1,
            Outcome::Stop => self.stop += 1,
            Outcome::None => self.none += 1,
        }
    }

    pub fn merge(&mut self, other: &ScanSummary) {
        self.take += other.take;
        self.stop += other.stop;
        self.none += other.none;
    }

    pub fn total(&self) -> usize {
        self.take + self.stop + self.none
    }

    /// Share of resolved trades that took profit, or `None` if nothing resolved.
    pub fn win_rate(&self) -> Option<f64> {
        let resolved = self.take + self.stop;
        (resolved > 0).then(|| self.take as f64 / resolved as f64)
    }
}

impl fmt::Display for ScanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "TAKE: {}", self.take)?;
        writeln!(f, "STOP: {}", self.stop)?;
        writeln!(f, "NONE: {}", self.none)?;
        write!(f, "Total: {}", self.total())
    }
}

/// Scan result for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstrumentScan {
    pub instrument: String,
    pub outcomes: Vec<TradeOutcome>,
    pub summary: ScanSummary,
}

/// Scan results for a set of instruments, in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanReport {
    pub instruments: Vec<InstrumentScan>,
    pub summary: ScanSummary,
}

impl ScanReport {
    /// All outcomes, instrument by instrument (not time-ordered).
    pub fn outcomes(&self) -> Vec<TradeOutcome> {
        self.instruments
            .iter()
            .flat_map(|scan| scan.outcomes.iter().cloned())
            .collect()
    }
}

fn scan_one(detector: &SignalDetector, series: &CandleSeries) -> InstrumentScan {
    let outcomes = detector.outcomes(series);
    let summary = ScanSummary::from_outcomes(&outcomes);
    debug!(
        instrument = series.instrument(),
        candles = series.len(),
        signals = summary.total(),
        "scanned instrument"
    );
    InstrumentScan {
        instrument: series.instrument().to_string(),
        outcomes,
        summary,
    }
}

/// Scan every series with one detector. Each instrument is independent,
/// so `parallel` only changes scheduling, never the result.
pub fn scan_instruments(detector: &SignalDetector, series: &[CandleSeries], parallel: bool) -> ScanReport {
    let instruments: Vec<InstrumentScan> = if parallel {
        series.par_iter().map(|s| scan_one(detector, s)).collect()
    } else {
        series.iter().map(|s| scan_one(detector, s)).collect()
    };

    let mut summary = ScanSummary::default();
    for scan in &instruments {
        summary.merge(&scan.summary);
    }

    info!(
        instruments = instruments.len(),
        take = summary.take,
        stop = summary.stop,
        none = summary.none,
        "scan complete"
    );

    ScanReport { instruments, summary }
}

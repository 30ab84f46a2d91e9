//! Trade-record lines: the pipe-delimited outcome log.
//!
//! Line layout: `timestamp | instrument | direction | detail... | outcome: X`.
//! Timestamps are accepted with or without seconds. A line that cannot be
//! parsed is rejected on its own and never aborts the rest of the log.

use chrono::NaiveDateTime;
use thiserror::Error;
use tracing::warn;

use crate::domain::{Direction, Outcome, TradeOutcome};

/// Timestamp layout written by [`format_record`].
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const MINUTE_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, Error, PartialEq)]
pub enum RecordError {
    #[error("expected at least 4 '|'-separated fields, got {0}")]
    TooFewFields(usize),

    #[error("unparsable timestamp '{0}'")]
    Timestamp(String),

    #[error("empty instrument")]
    EmptyInstrument,

    #[error("{0}")]
    Direction(String),

    #[error("{0}")]
    Outcome(String),
}

/// A log line that was dropped, kept for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedLine {
    /// 1-based line number in the source text.
    pub line_number: usize,
    pub line: String,
    pub error: RecordError,
}

/// Parsed outcome log in source order (not yet canonicalized).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedLog {
    pub outcomes: Vec<TradeOutcome>,
    pub rejected: Vec<RejectedLine>,
}

/// Parse `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DD HH:MM`.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(text, MINUTE_FORMAT))
        .ok()
}

/// Parse one trade-record line.
///
/// The outcome is the last word of the last field, so both
/// `outcome: TAKE` and `8.00% -> TAKE` are understood. The first
/// `<number>%` token in the detail fields becomes `change_pct` (0 if absent).
pub fn parse_record(line: &str) -> Result<TradeOutcome, RecordError> {
    let fields: Vec<&str> = line.trim().split('|').map(str::trim).collect();
    if fields.len() < 4 {
        return Err(RecordError::TooFewFields(fields.len()));
    }

    let time = parse_timestamp(fields[0]).ok_or_else(|| RecordError::Timestamp(fields[0].to_string()))?;

    let instrument = fields[1];
    if instrument.is_empty() {
        return Err(RecordError::EmptyInstrument);
    }

    let direction: Direction = fields[2].parse().map_err(RecordError::Direction)?;

    let last = fields[fields.len() - 1];
    let outcome_token = last
        .split(|c: char| c == ':' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .last()
        .unwrap_or_default();
    let outcome: Outcome = outcome_token.parse().map_err(RecordError::Outcome)?;

    Ok(TradeOutcome {
        instrument: instrument.to_string(),
        time,
        direction,
        change_pct: parse_change(&fields[3..]),
        outcome,
    })
}

fn parse_change(detail: &[&str]) -> f64 {
    detail
        .iter()
        .flat_map(|field| field.split_whitespace())
        .filter_map(|token| token.strip_suffix('%'))
        .find_map(|number| number.parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Render a trade as one log line (seconds included).
pub fn format_record(trade: &TradeOutcome) -> String {
    format!(
        "{} | {} | {} | change: {:.2}% | outcome: {}",
        trade.time.format(TIMESTAMP_FORMAT),
        trade.instrument,
        trade.direction,
        trade.change_pct,
        trade.outcome
    )
}

/// Parse a whole log. Blank lines are skipped, bad lines are rejected with a warning.
pub fn parse_log(text: &str) -> ParsedLog {
    let mut parsed = ParsedLog::default();

    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_record(line) {
            Ok(trade) => parsed.outcomes.push(trade),
            Err(error) => {
                warn!(line_number = i + 1, %error, "dropping malformed trade record");
                parsed.rejected.push(RejectedLine {
                    line_number: i + 1,
                    line: line.to_string(),
                    error,
                });
            }
        }
    }

    parsed
}

//! Outcome-log text boundary and stream canonicalization.

pub mod canonicalize;
pub mod outcome_log;

pub use canonicalize::{Canonicalized, Canonicalizer};
pub use outcome_log::{
    format_record, parse_log, parse_record, parse_timestamp, ParsedLog, RecordError, RejectedLine,
};

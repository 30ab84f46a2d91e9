//! Direction, Outcome and TradeOutcome: the resolved trade stream.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn opposite(&self) -> Self {
        match self {
            Direction::Long => Direction::Short,
            Direction::Short => Direction::Long,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Long => "LONG",
            Direction::Short => "SHORT",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LONG" => Ok(Direction::Long),
            "SHORT" => Ok(Direction::Short),
            other => Err(format!("unknown direction '{other}'")),
        }
    }
}

/// How a trade resolved.
///
/// `None` means neither level was touched before the series ended: the trade
/// is still open and carries no economic result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Take,
    Stop,
    None,
}

impl Outcome {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Outcome::None)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Take => "TAKE",
            Outcome::Stop => "STOP",
            Outcome::None => "NONE",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TAKE" => Ok(Outcome::Take),
            "STOP" => Ok(Outcome::Stop),
            "NONE" => Ok(Outcome::None),
            other => Err(format!("unknown outcome '{other}'")),
        }
    }
}

/// One resolved (or unresolved) breakout trade.
///
/// `time` is the open time of the triggering candle. `change_pct` is the
/// triggering move and is carried as the record's detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeOutcome {
    pub instrument: String,
    pub time: NaiveDateTime,
    pub direction: Direction,
    pub change_pct: f64,
    pub outcome: Outcome,
}

impl TradeOutcome {
    pub fn is_resolved(&self) -> bool {
        self.outcome.is_resolved()
    }
}

//! Candle and CandleSeries: the fundamental market data units.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OHLC price bar for a single instrument over one fixed interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open_time: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    pub fn new(open_time: NaiveDateTime, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self { open_time, open, high, low, close }
    }

    /// Returns true if any OHLC field is NaN.
    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    /// Basic OHLC sanity check: finite, positive prices and high >= low.
    /// Open and close may sit outside `[low, high]`.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.high >= self.low
            && self.low > 0.0
            && self.open > 0.0
            && self.close > 0.0
    }

    /// Open-to-close move in percent: `(close - open) / open * 100`.
    pub fn change_pct(&self) -> f64 {
        (self.close - self.open) / self.open * 100.0
    }
}

/// One raw kline row as delivered by the market-data feed:
/// `(open_time_ms, open, high, low, close)`. Trailing feed columns are dropped by the caller.
pub type KlineRow = (i64, f64, f64, f64, f64);

#[derive(Debug, Error, PartialEq)]
pub enum SeriesError {
    #[error("candle {index} of {instrument} is not sane (o={open} h={high} l={low} c={close})")]
    InsaneCandle {
        instrument: String,
        index: usize,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
    },

    #[error("candle {index} of {instrument} at {time} does not follow {previous}")]
    NotIncreasing {
        instrument: String,
        index: usize,
        previous: NaiveDateTime,
        time: NaiveDateTime,
    },

    #[error("kline row {index} of {instrument} has out-of-range open time {open_time_ms}")]
    InvalidTimestamp { instrument: String, index: usize, open_time_ms: i64 },
}

/// Immutable, strictly time-ordered candles for one instrument.
///
/// Gaps between candles are tolerated; duplicates and reordering are not.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandleSeries {
    instrument: String,
    candles: Vec<Candle>,
}

impl CandleSeries {
    /// Build a series, rejecting insane candles and non-increasing open times.
    pub fn new(instrument: impl Into<String>, candles: Vec<Candle>) -> Result<Self, SeriesError> {
        let instrument = instrument.into();

        for (index, candle) in candles.iter().enumerate() {
            if !candle.is_sane() {
                return Err(SeriesError::InsaneCandle {
                    instrument,
                    index,
                    open: candle.open,
                    high: candle.high,
                    low: candle.low,
                    close: candle.close,
                });
            }
            if index > 0 {
                let previous = candles[index - 1].open_time;
                if candle.open_time <= previous {
                    return Err(SeriesError::NotIncreasing {
                        instrument,
                        index,
                        previous,
                        time: candle.open_time,
                    });
                }
            }
        }

        Ok(Self { instrument, candles })
    }

    /// Build a series from raw feed rows with millisecond open times (UTC).
    pub fn from_klines(instrument: impl Into<String>, rows: &[KlineRow]) -> Result<Self, SeriesError> {
        let instrument = instrument.into();
        let mut candles = Vec::with_capacity(rows.len());

        for (index, &(open_time_ms, open, high, low, close)) in rows.iter().enumerate() {
            let open_time = DateTime::from_timestamp_millis(open_time_ms)
                .ok_or_else(|| SeriesError::InvalidTimestamp {
                    instrument: instrument.clone(),
                    index,
                    open_time_ms,
                })?
                .naive_utc();
            candles.push(Candle::new(open_time, open, high, low, close));
        }

        Self::new(instrument, candles)
    }

    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn get(&self, index: usize) -> Option<&Candle> {
        self.candles.get(index)
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }
}

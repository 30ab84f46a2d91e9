//! Domain types for BreakoutLab

pub mod candle;
pub mod signal;
pub mod trade;

pub use candle::{Candle, CandleSeries, KlineRow, SeriesError};
pub use signal::SignalEvent;
pub use trade::{Direction, Outcome, TradeOutcome};

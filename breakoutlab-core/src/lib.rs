//! BreakoutLab Core — candle series, breakout detection, outcome resolution, deposit simulation.
//!
//! This crate contains the heart of the backtester:
//! - Domain types (candles, signal events, trade outcomes)
//! - Single-pass breakout detector with non-overlapping trades
//! - Forward outcome resolver with a declared intrabar path policy
//! - Deposit simulator with loss-streak suspension and pluggable balance models
//! - Outcome-log parsing and canonicalization
//!
//! Everything here is pure computation over already-loaded data.

pub mod config;
pub mod data;
pub mod deposit;
pub mod detector;
pub mod domain;
pub mod resolver;

pub use config::{ConfigError, DetectorConfig, DirectionPolicy, PathPolicy};
pub use deposit::{
    BalanceModel, DepositConfig, DepositRun, DepositSimulator, DepositState, SweepParameters,
    TradingMode,
};
pub use detector::{Detections, ResolvedSignal, SignalDetector};
pub use domain::{Candle, CandleSeries, Direction, Outcome, SignalEvent, TradeOutcome};
pub use resolver::{OutcomeResolver, Resolution};

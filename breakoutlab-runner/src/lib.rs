//! BreakoutLab Runner — configuration, multi-instrument scans, parameter sweeps, reports.
//!
//! This crate builds on `breakoutlab-core` to provide:
//! - TOML lab configuration converted into validated core value objects
//! - Candle CSV and outcome-log loading
//! - Parallel breakout scans across instruments
//! - Deposit and scan parameter sweeps (rayon) with content-addressed points
//! - Plain-text deposit reports, CSV and JSON export

pub mod config;
pub mod data_loader;
pub mod report;
pub mod scan;
pub mod sweep;

pub use config::{LabConfig, LabConfigError};
pub use data_loader::{
    dataset_hash, load_candle_dir, load_candles, load_outcome_log, read_candles,
    read_outcome_log, LoadError, LoadedCandles, LoadedOutcomes, RejectedRow, RowError,
};
pub use report::{
    deposit_line, deposit_report, export_deposit_csv, export_json, export_scan_grid_csv,
    render_outcome_log, write_artifact,
};
pub use scan::{scan_instruments, InstrumentScan, ScanReport, ScanSummary};
pub use sweep::{
    point_id, DepositGrid, ParamSweep, PointId, ScanGrid, ScanPointResult, Scored, SweepPoint,
    SweepResults,
};

//! Reporting and export: plain-text sweep reports, CSV tables, JSON.
//!
//! The deposit-sweep report groups grid points by trading mode:
//!
//! ```text
//! === ALL ===
//! Stops before block: 0, Block days: 0 => Final deposit: 1.27
//! Stops before block: 1, Block days: 0 => Final deposit: 1.31
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use breakoutlab_core::data::format_record;
use breakoutlab_core::{DepositRun, DetectorConfig, SweepParameters, TradeOutcome, TradingMode};
use serde::Serialize;

use crate::sweep::{ScanPointResult, SweepPoint, SweepResults};

// ─── Text reports ───────────────────────────────────────────────────

/// One report line for a deposit grid point.
pub fn deposit_line(point: &SweepPoint<SweepParameters, DepositRun>) -> String {
    format!(
        "Stops before block: {}, Block days: {} => Final deposit: {:.2}",
        point.params.streak_limit(),
        point.params.suspension().num_days(),
        point.result.final_balance
    )
}

/// Full deposit-sweep report: one `=== MODE ===` block per trading mode,
/// in the order modes first appear, each followed by a blank line.
pub fn deposit_report(results: &SweepResults<SweepParameters, DepositRun>) -> String {
    let mut modes: Vec<TradingMode> = Vec::new();
    for point in results.iter() {
        if !modes.contains(&point.params.mode()) {
            modes.push(point.params.mode());
        }
    }

    let mut out = String::new();
    for mode in modes {
        out.push_str(&format!("=== {} ===\n", mode.label()));
        for point in results.for_mode(mode) {
            out.push_str(&deposit_line(point));
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

/// Render outcomes as trade-record lines, one per trade.
pub fn render_outcome_log(outcomes: &[TradeOutcome]) -> String {
    let mut out = String::with_capacity(outcomes.len() * 64);
    for trade in outcomes {
        out.push_str(&format_record(trade));
        out.push('\n');
    }
    out
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Deposit sweep as CSV, one row per grid point in enumeration order.
pub fn export_deposit_csv(results: &SweepResults<SweepParameters, DepositRun>) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "point_id",
        "mode",
        "streak_limit",
        "suspension_days",
        "final_balance",
        "min_balance",
        "wins",
        "losses",
        "skipped_suspended",
        "suspensions",
    ])?;

    for point in results.iter() {
        let run = &point.result;
        wtr.write_record([
            point.id.as_str(),
            point.params.mode().label(),
            &point.params.streak_limit().to_string(),
            &point.params.suspension().num_days().to_string(),
            &format!("{:.6}", run.final_balance),
            &format!("{:.6}", run.min_balance),
            &run.wins.to_string(),
            &run.losses.to_string(),
            &run.skipped_suspended.to_string(),
            &run.suspensions.to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Scan sweep as CSV, one row per detector configuration.
pub fn export_scan_grid_csv(results: &SweepResults<DetectorConfig, ScanPointResult>) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "point_id",
        "threshold_pct",
        "take_profit_pct",
        "stop_loss_pct",
        "take",
        "stop",
        "none",
        "canonical_trades",
        "final_balance",
    ])?;

    for point in results.iter() {
        let config = &point.params;
        let summary = &point.result.summary;
        wtr.write_record([
            point.id.as_str(),
            &config.threshold_pct().to_string(),
            &config.take_profit_pct().to_string(),
            &config.stop_loss_pct().to_string(),
            &summary.take.to_string(),
            &summary.stop.to_string(),
            &summary.none.to_string(),
            &point.result.canonical_trades.to_string(),
            &format!("{:.6}", point.result.deposit.final_balance),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── JSON / files ───────────────────────────────────────────────────

/// Serialize any result to pretty JSON.
pub fn export_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("failed to serialize result to JSON")
}

/// Write `contents` to `path`, creating parent directories.
pub fn write_artifact(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

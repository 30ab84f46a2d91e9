//! Parameter sweep engine for deposit and scan grids.
//!
//! Grids enumerate their points in a fixed order. `ParamSweep` evaluates each
//! point independently (in parallel with rayon by default) and returns the
//! results in that same order, so a sweep is reproducible point for point.

use std::collections::HashMap;

use anyhow::{Context, Result};
use breakoutlab_core::data::Canonicalizer;
use breakoutlab_core::{
    BalanceModel, CandleSeries, ConfigError, DepositRun, DepositSimulator, DetectorConfig,
    DirectionPolicy, PathPolicy, SignalDetector, SweepParameters, TradeOutcome, TradingMode,
};
use chrono::Duration;
use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::scan::{scan_instruments, ScanSummary};

/// Content-addressable id of a grid point: BLAKE3 over its JSON form.
pub type PointId = String;

/// Computes the deterministic id of any serializable grid point.
pub fn point_id<P: Serialize>(point: &P) -> Result<PointId> {
    let json = serde_json::to_string(point).context("grid point serialization failed")?;
    Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
}

// ── Grids ────────────────────────────────────────────────────────────

/// Deposit grid: streak limits × suspension days × trading modes.
#[derive(Debug, Clone, PartialEq)]
pub struct DepositGrid {
    pub streak_limits: Vec<u32>,
    pub suspension_days: Vec<i64>,
    pub modes: Vec<TradingMode>,
    pub model: BalanceModel,
}

impl DepositGrid {
    /// Number of points `generate_points` will emit.
    ///
    /// A zero streak limit contributes one point per mode, not one per window.
    pub fn size(&self) -> usize {
        let disabled = self.streak_limits.iter().any(|&l| l == 0);
        let enabled = self.streak_limits.iter().filter(|&&l| l > 0).count();
        self.modes.len() * (usize::from(disabled) + enabled * self.suspension_days.len())
    }

    /// All grid points, mode-major, then streak limit, then suspension days.
    pub fn generate_points(&self) -> Result<Vec<SweepParameters>, ConfigError> {
        let mut points = Vec::with_capacity(self.size());

        for &mode in &self.modes {
            let mut baseline_done = false;
            for &limit in &self.streak_limits {
                if limit == 0 {
                    if !baseline_done {
                        points.push(
                            SweepParameters::new(0, Duration::zero(), self.model)?.with_mode(mode),
                        );
                        baseline_done = true;
                    }
                    continue;
                }
                for &days in &self.suspension_days {
                    points.push(
                        SweepParameters::new(limit, Duration::days(days), self.model)?
                            .with_mode(mode),
                    );
                }
            }
        }

        Ok(points)
    }
}

/// Scan grid: threshold × take-profit × stop-loss distances.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanGrid {
    pub threshold_pcts: Vec<f64>,
    pub take_profit_pcts: Vec<f64>,
    pub stop_loss_pcts: Vec<f64>,
    pub direction_policy: DirectionPolicy,
    pub path_policy: PathPolicy,
}

impl ScanGrid {
    pub fn size(&self) -> usize {
        self.threshold_pcts.len() * self.take_profit_pcts.len() * self.stop_loss_pcts.len()
    }

    pub fn generate_configs(&self) -> Result<Vec<DetectorConfig>, ConfigError> {
        let mut configs = Vec::with_capacity(self.size());
        for &threshold in &self.threshold_pcts {
            for &take_profit in &self.take_profit_pcts {
                for &stop_loss in &self.stop_loss_pcts {
                    configs.push(
                        DetectorConfig::new(threshold, take_profit, stop_loss)?
                            .with_direction_policy(self.direction_policy)
                            .with_path_policy(self.path_policy),
                    );
                }
            }
        }
        Ok(configs)
    }
}

// ── Results ──────────────────────────────────────────────────────────

/// A sweep result that can be ranked.
pub trait Scored {
    fn score(&self) -> f64;
}

impl Scored for DepositRun {
    fn score(&self) -> f64 {
        self.final_balance
    }
}

/// Outcome of one scan-grid point: what the scan found and how a deposit fared on it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanPointResult {
    pub summary: ScanSummary,
    /// Trades left after canonicalization.
    pub canonical_trades: usize,
    pub deposit: DepositRun,
}

impl Scored for ScanPointResult {
    fn score(&self) -> f64 {
        self.deposit.final_balance
    }
}

/// One evaluated grid point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepPoint<P, R> {
    pub id: PointId,
    pub params: P,
    pub result: R,
}

/// Results of a sweep, in grid enumeration order.
#[derive(Debug)]
pub struct SweepResults<P, R> {
    points: Vec<SweepPoint<P, R>>,
    by_id: HashMap<PointId, usize>,
}

impl<P, R> SweepResults<P, R> {
    fn new(points: Vec<SweepPoint<P, R>>) -> Self {
        let by_id = points
            .iter()
            .enumerate()
            .map(|(i, point)| (point.id.clone(), i))
            .collect();
        Self { points, by_id }
    }

    pub fn all(&self) -> &[SweepPoint<P, R>] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&SweepPoint<P, R>> {
        self.by_id.get(id).map(|&i| &self.points[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &SweepPoint<P, R>> {
        self.points.iter()
    }
}

impl<P, R: Scored> SweepResults<P, R> {
    /// Highest score; the earliest point wins a tie.
    pub fn best(&self) -> Option<&SweepPoint<P, R>> {
        let mut best: Option<&SweepPoint<P, R>> = None;
        for point in &self.points {
            match best {
                Some(current) if point.result.score() <= current.result.score() => {}
                _ => best = Some(point),
            }
        }
        best
    }

    /// Points sorted by score, descending. Ties keep enumeration order.
    pub fn ranked(&self) -> Vec<&SweepPoint<P, R>> {
        let mut sorted: Vec<_> = self.points.iter().collect();
        sorted.sort_by(|a, b| {
            b.result
                .score()
                .partial_cmp(&a.result.score())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        sorted
    }
}

impl<R> SweepResults<SweepParameters, R> {
    /// Points of one trading mode, in enumeration order.
    pub fn for_mode(&self, mode: TradingMode) -> impl Iterator<Item = &SweepPoint<SweepParameters, R>> {
        self.points.iter().filter(move |point| point.params.mode() == mode)
    }
}

// ── Executor ─────────────────────────────────────────────────────────

/// Sweep executor.
///
/// Each point gets its own evaluation; the only shared state is read-only input.
#[derive(Debug, Clone, Copy)]
pub struct ParamSweep {
    parallel: bool,
}

impl Default for ParamSweep {
    fn default() -> Self {
        Self::new()
    }
}

impl ParamSweep {
    pub fn new() -> Self {
        Self { parallel: true }
    }

    /// Enables or disables parallel execution.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Evaluate `eval` at every point. Results come back in `points` order.
    pub fn run<P, R, F>(&self, points: Vec<P>, eval: F) -> Result<SweepResults<P, R>>
    where
        P: Serialize + Send + Sync,
        R: Send,
        F: Fn(&P) -> R + Send + Sync,
    {
        let evaluate = |params: P| -> Result<SweepPoint<P, R>> {
            let id = point_id(&params)?;
            let result = eval(&params);
            Ok(SweepPoint { id, params, result })
        };

        let points: Vec<SweepPoint<P, R>> = if self.parallel {
            points
                .into_par_iter()
                .map(evaluate)
                .collect::<Result<Vec<_>>>()?
        } else {
            points.into_iter().map(evaluate).collect::<Result<Vec<_>>>()?
        };

        Ok(SweepResults::new(points))
    }

    /// Replay one canonical outcome stream under every deposit grid point.
    pub fn sweep_deposit(
        &self,
        grid: &DepositGrid,
        simulator: &DepositSimulator,
        outcomes: &[TradeOutcome],
    ) -> Result<SweepResults<SweepParameters, DepositRun>> {
        let points = grid.generate_points()?;
        info!(points = points.len(), trades = outcomes.len(), parallel = self.parallel, "deposit sweep");
        self.run(points, |params| simulator.simulate(outcomes, params))
    }

    /// Scan every instrument under every scan grid point, then replay the
    /// canonical stream through `simulator` with `deposit_params`.
    pub fn sweep_scan(
        &self,
        grid: &ScanGrid,
        series: &[CandleSeries],
        simulator: &DepositSimulator,
        deposit_params: &SweepParameters,
    ) -> Result<SweepResults<DetectorConfig, ScanPointResult>> {
        let configs = grid.generate_configs()?;
        info!(points = configs.len(), instruments = series.len(), parallel = self.parallel, "scan sweep");

        // Instruments run sequentially inside a point; points are the parallel unit.
        self.run(configs, |config| {
            let report = scan_instruments(&SignalDetector::new(*config), series, false);
            let canonical = Canonicalizer::canonicalize(report.outcomes());
            ScanPointResult {
                summary: report.summary,
                canonical_trades: canonical.outcomes.len(),
                deposit: simulator.simulate(&canonical.outcomes, deposit_params),
            }
        })
    }
}

//! Lab configuration loaded from TOML.
//!
//! A `LabConfig` is the serializable, unvalidated form of everything a run
//! needs. Conversion into the core's value objects (`DetectorConfig`,
//! `DepositConfig`, grids) is where ranges are checked.
//!
//! ```toml
//! [scan]
//! threshold_pct = 7.0
//! take_profit_pct = 5.0
//! stop_loss_pct = 0.7
//! direction_policy = "MOMENTUM"
//! path_policy = "WORST_CASE"
//!
//! [deposit]
//! start_balance = 1.0
//! floor = 0.0
//! model = { type = "COMPOUNDING", take_profit_pct = 3.0, stop_loss_pct = -1.0 }
//!
//! [grid]
//! streak_limits = [0, 1, 2, 3, 4, 5]
//! suspension_days = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10]
//! modes = ["ALL", "LONG_ONLY", "SHORT_ONLY"]
//! ```

use std::path::{Path, PathBuf};

use breakoutlab_core::{
    BalanceModel, ConfigError, DepositConfig, DetectorConfig, DirectionPolicy, PathPolicy,
    TradingMode,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sweep::{DepositGrid, ScanGrid};

/// Errors from loading or converting a lab configuration.
#[derive(Debug, Error)]
pub enum LabConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(#[from] ConfigError),

    #[error("grid axis '{0}' is empty")]
    EmptyAxis(&'static str),

    #[error("suspension_days must not be negative, got {0}")]
    NegativeDays(i64),
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    pub scan: ScanSection,
    pub deposit: DepositSection,
    pub grid: GridSection,
    /// Optional sweep over detection parameters.
    pub scan_grid: Option<ScanGridSection>,
}

/// `[scan]`: one detection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSection {
    pub threshold_pct: f64,
    pub take_profit_pct: f64,
    pub stop_loss_pct: f64,
    pub direction_policy: DirectionPolicy,
    pub path_policy: PathPolicy,
}

impl Default for ScanSection {
    fn default() -> Self {
        Self {
            threshold_pct: 7.0,
            take_profit_pct: 5.0,
            stop_loss_pct: 0.7,
            direction_policy: DirectionPolicy::Momentum,
            path_policy: PathPolicy::WorstCase,
        }
    }
}

/// `[deposit]`: starting balance, floor and balance model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepositSection {
    pub start_balance: f64,
    pub floor: f64,
    pub model: BalanceModel,
}

impl Default for DepositSection {
    fn default() -> Self {
        Self {
            start_balance: 1.0,
            floor: 0.0,
            model: BalanceModel::Compounding {
                take_profit_pct: 3.0,
                stop_loss_pct: -1.0,
            },
        }
    }
}

/// `[grid]`: the deposit sweep axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSection {
    pub streak_limits: Vec<u32>,
    pub suspension_days: Vec<i64>,
    pub modes: Vec<TradingMode>,
}

impl Default for GridSection {
    fn default() -> Self {
        Self {
            streak_limits: (0..=5).collect(),
            suspension_days: (0..=10).collect(),
            modes: TradingMode::ALL.to_vec(),
        }
    }
}

/// `[scan_grid]`: detection sweep axes. Policies are shared by every point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanGridSection {
    pub threshold_pcts: Vec<f64>,
    pub take_profit_pcts: Vec<f64>,
    pub stop_loss_pcts: Vec<f64>,
    #[serde(default)]
    pub direction_policy: DirectionPolicy,
    #[serde(default)]
    pub path_policy: PathPolicy,
}

impl LabConfig {
    /// Parse from TOML text. Missing sections fall back to defaults.
    pub fn from_toml(text: &str) -> Result<Self, LabConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LabConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| LabConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn detector_config(&self) -> Result<DetectorConfig, ConfigError> {
        let scan = &self.scan;
        Ok(
            DetectorConfig::new(scan.threshold_pct, scan.take_profit_pct, scan.stop_loss_pct)?
                .with_direction_policy(scan.direction_policy)
                .with_path_policy(scan.path_policy),
        )
    }

    pub fn deposit_config(&self) -> Result<DepositConfig, ConfigError> {
        DepositConfig::new(self.deposit.start_balance, self.deposit.floor)
    }

    /// Validated deposit grid. Every axis must be non-empty.
    pub fn deposit_grid(&self) -> Result<DepositGrid, LabConfigError> {
        let grid = &self.grid;
        if grid.streak_limits.is_empty() {
            return Err(LabConfigError::EmptyAxis("streak_limits"));
        }
        if grid.suspension_days.is_empty() {
            return Err(LabConfigError::EmptyAxis("suspension_days"));
        }
        if grid.modes.is_empty() {
            return Err(LabConfigError::EmptyAxis("modes"));
        }
        if let Some(&days) = grid.suspension_days.iter().find(|&&d| d < 0) {
            return Err(LabConfigError::NegativeDays(days));
        }
        self.deposit.model.validate()?;

        Ok(DepositGrid {
            streak_limits: grid.streak_limits.clone(),
            suspension_days: grid.suspension_days.clone(),
            modes: grid.modes.clone(),
            model: self.deposit.model,
        })
    }

    /// Validated scan grid, if a `[scan_grid]` section is present.
    pub fn scan_grid(&self) -> Result<Option<ScanGrid>, LabConfigError> {
        let Some(section) = &self.scan_grid else {
            return Ok(None);
        };
        for (axis, values) in [
            ("threshold_pcts", &section.threshold_pcts),
            ("take_profit_pcts", &section.take_profit_pcts),
            ("stop_loss_pcts", &section.stop_loss_pcts),
        ] {
            if values.is_empty() {
                return Err(LabConfigError::EmptyAxis(axis));
            }
        }

        let grid = ScanGrid {
            threshold_pcts: section.threshold_pcts.clone(),
            take_profit_pcts: section.take_profit_pcts.clone(),
            stop_loss_pcts: section.stop_loss_pcts.clone(),
            direction_policy: section.direction_policy,
            path_policy: section.path_policy,
        };
        // Surface range errors now rather than mid-sweep.
        grid.generate_configs()?;
        Ok(Some(grid))
    }
}

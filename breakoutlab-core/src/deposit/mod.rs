//! Deposit simulation: compounding balance with loss-streak suspension.

pub mod params;
pub mod simulator;
pub mod state;

pub use params::{BalanceModel, DepositConfig, SweepParameters, TradingMode};
pub use simulator::{DepositRun, DepositSimulator};
pub use state::DepositState;

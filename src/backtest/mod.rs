//! Historical replay of the fused signal.

pub mod engine;
pub mod performance;

pub use engine::{BacktestConfig, BacktestEngine, BacktestRun};
pub use performance::{max_drawdown, sharpe_ratio, total_return};

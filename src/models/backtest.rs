use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::signal::Signal;

/// One replayed backtest period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestRow {
    pub date: NaiveDate,
    pub close: f64,
    pub signal: Signal,
    /// Previous period's signal; absent on the first row.
    pub signal_shifted: Option<Signal>,
    /// Percent change of close; undefined on the first row.
    pub market_return: Option<f64>,
    pub strategy_return: f64,
    pub benchmark_equity: f64,
    pub strategy_equity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub benchmark_equity: f64,
    pub strategy_equity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    pub total_return_benchmark: f64,
    pub total_return_strategy: f64,
    pub max_drawdown_benchmark: f64,
    pub max_drawdown_strategy: f64,
    pub sharpe_benchmark: f64,
    pub sharpe_strategy: f64,
    pub equity_curve: Vec<EquityPoint>,
    pub rows: Vec<BacktestRow>,
}

impl BacktestReport {
    pub fn outperformed(&self) -> bool {
        self.total_return_strategy > self.total_return_benchmark
    }
}

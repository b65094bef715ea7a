//! Lagged replay of the fused signal with leverage-aware compounding
//!
//! Each period trades on the previous period's signal:
//! - BULL: 2x market return minus borrowing cost on the extra 1x
//! - NEUTRAL: 1x market return
//! - BEAR: cash earning the risk-free rate

use serde::{Deserialize, Serialize};

use crate::backtest::performance::{max_drawdown, sharpe_ratio, total_return};
use crate::error::{Diagnostic, EngineError};
use crate::models::backtest::{BacktestReport, BacktestRow, EquityPoint};
use crate::models::series::validate_series;
use crate::models::signal::{FusedRecord, Signal};

pub const INITIAL_EQUITY: f64 = 100.0;
pub const BULL_LEVERAGE: f64 = 2.0;
pub const ANNUAL_BORROW_RATE: f64 = 0.05;
pub const ANNUAL_RISK_FREE_RATE: f64 = 0.03;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    pub bull_leverage: f64,
    pub annual_borrow_rate: f64,
    pub annual_risk_free_rate: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            bull_leverage: BULL_LEVERAGE,
            annual_borrow_rate: ANNUAL_BORROW_RATE,
            annual_risk_free_rate: ANNUAL_RISK_FREE_RATE,
        }
    }
}

impl BacktestConfig {
    pub fn monthly_borrow_cost(&self) -> f64 {
        self.annual_borrow_rate / 12.0
    }

    pub fn monthly_risk_free_rate(&self) -> f64 {
        self.annual_risk_free_rate / 12.0
    }

    /// Strategy return for one period given the signal acted on.
    pub fn strategy_return(&self, signal: Signal, market_return: f64) -> f64 {
        match signal {
            Signal::Bull => {
                market_return * self.bull_leverage
                    - (self.bull_leverage - 1.0) * self.monthly_borrow_cost()
            }
            Signal::Neutral => market_return,
            Signal::Bear => self.monthly_risk_free_rate(),
        }
    }
}

/// Report plus the degenerate cases resolved while computing it.
#[derive(Debug, Clone)]
pub struct BacktestRun {
    pub report: BacktestReport,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct BacktestEngine {
    config: BacktestConfig,
}

impl BacktestEngine {
    pub fn new(config: BacktestConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    pub fn run(&self, records: &[FusedRecord]) -> Result<BacktestRun, EngineError> {
        validate_series("fused", records)?;
        let priced = priced_span(records)?;

        let mut rows: Vec<BacktestRow> = Vec::with_capacity(priced.len());
        let mut benchmark_equity = INITIAL_EQUITY;
        let mut strategy_equity = INITIAL_EQUITY;

        for (i, record) in priced.iter().enumerate() {
            let close = record.close.ok_or(EngineError::MissingColumn {
                series: "fused",
                column: "close",
            })?;
            let previous = i.checked_sub(1).map(|j| &rows[j]);
            let market_return = previous.map(|prev| close / prev.close - 1.0);
            let signal_shifted = previous.map(|prev| prev.signal);

            let strategy_return = match (signal_shifted, market_return) {
                (Some(signal), Some(ret)) => self.config.strategy_return(signal, ret),
                _ => 0.0,
            };

            if let Some(ret) = market_return {
                benchmark_equity *= 1.0 + ret;
            }
            strategy_equity *= 1.0 + strategy_return;

            rows.push(BacktestRow {
                date: record.date,
                close,
                signal: record.signal,
                signal_shifted,
                market_return,
                strategy_return,
                benchmark_equity,
                strategy_equity,
            });
        }

        let benchmark_curve: Vec<f64> = rows.iter().map(|r| r.benchmark_equity).collect();
        let strategy_curve: Vec<f64> = rows.iter().map(|r| r.strategy_equity).collect();
        let benchmark_returns: Vec<f64> = rows.iter().filter_map(|r| r.market_return).collect();
        let strategy_returns: Vec<f64> = rows.iter().map(|r| r.strategy_return).collect();

        let mut diagnostics = Vec::new();
        let sharpe_benchmark = sharpe_ratio(&benchmark_returns).unwrap_or_else(|| {
            diagnostics.push(Diagnostic::DegenerateSharpe { series: "benchmark" });
            0.0
        });
        let sharpe_strategy = sharpe_ratio(&strategy_returns).unwrap_or_else(|| {
            diagnostics.push(Diagnostic::DegenerateSharpe { series: "strategy" });
            0.0
        });

        let report = BacktestReport {
            total_return_benchmark: total_return(&benchmark_curve, INITIAL_EQUITY),
            total_return_strategy: total_return(&strategy_curve, INITIAL_EQUITY),
            max_drawdown_benchmark: max_drawdown(&benchmark_curve),
            max_drawdown_strategy: max_drawdown(&strategy_curve),
            sharpe_benchmark,
            sharpe_strategy,
            equity_curve: rows
                .iter()
                .map(|r| EquityPoint {
                    date: r.date,
                    benchmark_equity: r.benchmark_equity,
                    strategy_equity: r.strategy_equity,
                })
                .collect(),
            rows,
        };

        Ok(BacktestRun {
            report,
            diagnostics,
        })
    }
}

impl Default for BacktestEngine {
    fn default() -> Self {
        Self::new(BacktestConfig::default())
    }
}

/// Skip leading periods that predate the first close; a later gap is fatal.
///
/// Every remaining close must be positive and finite.
fn priced_span(records: &[FusedRecord]) -> Result<&[FusedRecord], EngineError> {
    let first = records
        .iter()
        .position(|r| r.close.is_some())
        .ok_or(EngineError::EmptySeries { series: "fused" })?;
    let span = &records[first..];
    for record in span {
        match record.close {
            None => {
                return Err(EngineError::MissingColumn {
                    series: "fused",
                    column: "close",
                })
            }
            Some(close) if !(close.is_finite() && close > 0.0) => {
                return Err(EngineError::InvalidValue {
                    series: "fused",
                    column: "close",
                    date: record.date,
                })
            }
            Some(_) => {}
        }
    }
    Ok(span)
}

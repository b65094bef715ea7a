//! Mean-reversion expected return and 10-period trend filter
//!
//! expected_return = 0.08 - bias * 0.2, with bias = (close - MA24) / MA24.
//! trend_signal = close > MA10.

use crate::error::{Diagnostic, EngineError};
use crate::indicators::math::{month_start, rolling_mean};
use crate::models::market::{MarketRecord, PricePoint};
use crate::models::series::{validate_series, Evaluated};

pub const LONG_MA_PERIOD: usize = 24;
pub const TREND_MA_PERIOD: usize = 10;
pub const BASE_RETURN: f64 = 0.08;
pub const BIAS_SENSITIVITY: f64 = 0.2;

/// Collapse a daily or irregular price series to one close per calendar month.
///
/// The last observation of each month is kept and dated the first of that month.
pub fn resample_monthly(prices: &[PricePoint]) -> Vec<PricePoint> {
    let mut monthly: Vec<PricePoint> = Vec::new();
    for point in prices {
        let period = month_start(point.date);
        match monthly.last_mut() {
            Some(last) if last.date == period => last.close = point.close,
            _ => monthly.push(PricePoint::new(period, point.close)),
        }
    }
    monthly
}

pub fn expected_return_from_bias(bias: f64) -> f64 {
    BASE_RETURN - bias * BIAS_SENSITIVITY
}

pub struct MarketTrendEngine;

impl MarketTrendEngine {
    pub fn evaluate(prices: &[PricePoint]) -> Result<Evaluated<MarketRecord>, EngineError> {
        if prices.is_empty() {
            return Err(EngineError::EmptySeries { series: "market" });
        }
        validate_series("market", prices)?;

        let monthly = resample_monthly(prices);
        let closes: Vec<f64> = monthly.iter().map(|p| p.close).collect();
        let ma_long = rolling_mean(&closes, LONG_MA_PERIOD);
        let ma_trend = rolling_mean(&closes, TREND_MA_PERIOD);

        let records: Vec<MarketRecord> = monthly
            .iter()
            .zip(ma_long.iter().zip(ma_trend.iter()))
            .map(|(point, (&ma24, &ma10))| {
                let bias = ma24.filter(|ma| *ma != 0.0).map(|ma| (point.close - ma) / ma);
                MarketRecord {
                    date: point.date,
                    close: point.close,
                    ma24,
                    bias,
                    expected_return: bias.map(expected_return_from_bias).unwrap_or(BASE_RETURN),
                    trend_signal: ma10.map(|ma| point.close > ma).unwrap_or(true),
                }
            })
            .collect();

        let mut evaluated = Evaluated::new(records);
        let short_rows = ma_long.iter().filter(|ma| ma.is_none()).count();
        if short_rows > 0 {
            evaluated = evaluated.with_diagnostic(Diagnostic::InsufficientHistory {
                stage: "market",
                rows: short_rows,
                default: "expected_return=0.08",
            });
        }
        let untrended = ma_trend.iter().filter(|ma| ma.is_none()).count();
        if untrended > 0 {
            evaluated = evaluated.with_diagnostic(Diagnostic::InsufficientHistory {
                stage: "market",
                rows: untrended,
                default: "trend_signal=true",
            });
        }
        Ok(evaluated)
    }
}

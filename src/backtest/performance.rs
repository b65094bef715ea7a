//! Performance statistics over equity curves and return series

use crate::indicators::math::{mean, sample_std};

pub const PERIODS_PER_YEAR: f64 = 12.0;

/// Deepest peak-to-trough decline as a non-positive fraction of the peak.
pub fn max_drawdown(equity: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst: f64 = 0.0;
    for &value in equity {
        peak = peak.max(value);
        if peak > 0.0 {
            worst = worst.min((value - peak) / peak);
        }
    }
    worst
}

/// Annualised Sharpe ratio of monthly returns.
///
/// Returns `None` when the deviation is zero or undefined; callers report 0.
/// A constant series counts as zero deviation even when summation leaves a
/// rounding residue in the standard deviation.
pub fn sharpe_ratio(returns: &[f64]) -> Option<f64> {
    let avg = mean(returns)?;
    let std = sample_std(returns)?;
    if is_flat(returns) || std <= f64::EPSILON * avg.abs().max(1.0) {
        return None;
    }
    Some(avg / std * PERIODS_PER_YEAR.sqrt())
}

fn is_flat(values: &[f64]) -> bool {
    values.windows(2).all(|pair| pair[0] == pair[1])
}

/// Cumulative return of an equity curve that starts at `base`.
pub fn total_return(equity: &[f64], base: f64) -> f64 {
    equity.last().map(|last| last / base - 1.0).unwrap_or(0.0)
}

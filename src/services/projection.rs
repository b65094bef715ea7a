//! Deterministic trend projection filling the gap between the last real
//! observation and a target month.
//!
//! Macro factor decays toward 1.0; market close grows at the long-run monthly
//! rate while expected return decays toward 0.05.

use chrono::NaiveDate;

use crate::indicators::math::next_month;
use crate::models::macro_data::MacroRecord;
use crate::models::market::MarketRecord;

pub const MACRO_TARGET_MEAN: f64 = 1.0;
pub const MACRO_DECAY_RATE: f64 = 0.1;
pub const LONG_TERM_MONTHLY_GROWTH: f64 = 0.0058;
pub const TARGET_EXPECTED_RETURN: f64 = 0.05;
pub const RETURN_DECAY_RATE: f64 = 0.1;

fn months_until(last: NaiveDate, target: NaiveDate) -> Vec<NaiveDate> {
    let mut months = Vec::new();
    let mut current = next_month(last);
    while current <= target {
        months.push(current);
        current = next_month(current);
    }
    months
}

/// Extend macro records month by month; returns the input unchanged when already current.
pub fn project_macro(records: &[MacroRecord], target: NaiveDate) -> Vec<MacroRecord> {
    let mut out = records.to_vec();
    let Some(last) = records.last() else {
        return out;
    };
    let mut factor = last.macro_factor;
    for date in months_until(last.date, target) {
        factor += (MACRO_TARGET_MEAN - factor) * MACRO_DECAY_RATE;
        out.push(MacroRecord {
            date,
            macro_factor: factor,
            ..last.clone()
        });
    }
    out
}

pub fn project_market(records: &[MarketRecord], target: NaiveDate) -> Vec<MarketRecord> {
    let mut out = records.to_vec();
    let Some(last) = records.last() else {
        return out;
    };
    let mut close = last.close;
    let mut expected_return = last.expected_return;
    for date in months_until(last.date, target) {
        close *= 1.0 + LONG_TERM_MONTHLY_GROWTH;
        expected_return += (TARGET_EXPECTED_RETURN - expected_return) * RETURN_DECAY_RATE;
        out.push(MarketRecord {
            date,
            close,
            ma24: None,
            bias: None,
            expected_return,
            trend_signal: true,
        });
    }
    out
}

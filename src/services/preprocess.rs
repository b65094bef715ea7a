//! Raw FRED series → monthly macro observations.
//!
//! excess_liquidity = M2 YoY - GDP YoY, yield_spread = 10Y - 2Y, falling back
//! to the published T10Y2Y spread when either yield is unavailable.
//! Year-over-year changes are taken on each series' own cadence (12 rows for
//! monthly M2, 4 rows for quarterly GDP) and then aligned onto the M2 months.

use crate::indicators::math::{month_start, pct_change};
use crate::models::macro_data::{MacroObservation, RawObservation};
use crate::models::series::{AsOfCursor, Dated};
use chrono::NaiveDate;

pub const M2_YOY_PERIODS: usize = 12;
pub const GDP_YOY_PERIODS: usize = 4;

/// Raw inputs keyed by role.
#[derive(Debug, Clone, Default)]
pub struct RawMacroSeries {
    pub m2: Vec<RawObservation>,
    pub gdp: Vec<RawObservation>,
    pub yield_10y: Vec<RawObservation>,
    pub yield_2y: Vec<RawObservation>,
    pub jobless_claims: Vec<RawObservation>,
    /// Published 10Y-2Y spread (T10Y2Y).
    pub yield_spread: Vec<RawObservation>,
    /// Not on FRED; read from a user-supplied `raw/pmi.csv` when present.
    pub pmi: Vec<RawObservation>,
}

#[derive(Debug, Clone, Copy)]
struct Point {
    date: NaiveDate,
    value: f64,
}

impl Dated for Point {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

fn present(raw: &[RawObservation]) -> Vec<Point> {
    raw.iter()
        .filter_map(|o| o.value.map(|value| Point { date: o.date, value }))
        .collect()
}

fn yoy(raw: &[RawObservation], periods: usize) -> Vec<Point> {
    let points = present(raw);
    let values: Vec<f64> = points.iter().map(|p| p.value).collect();
    points
        .iter()
        .zip(pct_change(&values, periods))
        .filter_map(|(p, change)| change.map(|value| Point { date: p.date, value }))
        .collect()
}

/// Build monthly macro observations anchored on the M2 release months.
///
/// Months lacking a defined GDP YoY, or any spread source, are skipped.
pub fn preprocess_macro(raw: &RawMacroSeries) -> Vec<MacroObservation> {
    let m2_yoy = yoy(&raw.m2, M2_YOY_PERIODS);
    let gdp_yoy = yoy(&raw.gdp, GDP_YOY_PERIODS);
    let y10 = present(&raw.yield_10y);
    let y2 = present(&raw.yield_2y);
    let claims = present(&raw.jobless_claims);
    let published_spread = present(&raw.yield_spread);
    let pmi = present(&raw.pmi);

    let mut gdp_cursor = AsOfCursor::new(&gdp_yoy);
    let mut y10_cursor = AsOfCursor::new(&y10);
    let mut y2_cursor = AsOfCursor::new(&y2);
    let mut claims_cursor = AsOfCursor::new(&claims);
    let mut spread_cursor = AsOfCursor::new(&published_spread);
    let mut pmi_cursor = AsOfCursor::new(&pmi);

    let mut observations: Vec<MacroObservation> = Vec::new();
    for m2 in &m2_yoy {
        let gdp = gdp_cursor.seek(m2.date);
        let long = y10_cursor.seek(m2.date);
        let short = y2_cursor.seek(m2.date);
        let claims = claims_cursor.seek(m2.date);
        let fallback_spread = spread_cursor.seek(m2.date);
        let pmi = pmi_cursor.seek(m2.date);

        let Some(gdp) = gdp else {
            continue;
        };
        let spread = match (long, short) {
            (Some(l), Some(s)) => l.value - s.value,
            _ => match fallback_spread {
                Some(p) => p.value,
                None => continue,
            },
        };
        let date = month_start(m2.date);
        if observations.last().map(|o| o.date) == Some(date) {
            continue;
        }

        let mut obs = MacroObservation::new(date, spread, m2.value - gdp.value);
        if let (Some(l), Some(s)) = (long, short) {
            obs = obs.with_yields(l.value, s.value);
        }
        if let Some(c) = claims {
            obs = obs.with_jobless_claims(c.value);
        }
        if let Some(p) = pmi {
            obs = obs.with_pmi(p.value);
        }
        observations.push(obs);
    }
    observations
}

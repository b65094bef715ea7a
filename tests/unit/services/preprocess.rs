//! Unit tests for macro preprocessing

use chrono::NaiveDate;
use levercast::models::RawObservation;
use levercast::services::preprocess::{preprocess_macro, RawMacroSeries};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn obs(date: NaiveDate, value: f64) -> RawObservation {
    RawObservation {
        date,
        value: Some(value),
    }
}

fn raw_inputs() -> RawMacroSeries {
    let mut m2: Vec<RawObservation> = (1..=12).map(|m| obs(date(2022, m, 1), 100.0)).collect();
    m2.push(obs(date(2023, 1, 1), 110.0));

    let gdp = vec![
        obs(date(2021, 10, 1), 100.0),
        obs(date(2022, 1, 1), 101.0),
        obs(date(2022, 4, 1), 102.0),
        obs(date(2022, 7, 1), 103.0),
        obs(date(2022, 10, 1), 104.0),
    ];

    RawMacroSeries {
        m2,
        gdp,
        yield_10y: vec![obs(date(2022, 12, 30), 4.0)],
        yield_2y: vec![obs(date(2022, 12, 30), 4.5)],
        jobless_claims: vec![obs(date(2022, 12, 24), 215_000.0)],
        yield_spread: Vec::new(),
        pmi: Vec::new(),
    }
}

#[test]
fn test_excess_liquidity_and_spread() {
    let observations = preprocess_macro(&raw_inputs());
    assert_eq!(observations.len(), 1);

    let row = &observations[0];
    assert_eq!(row.date, date(2023, 1, 1));
    assert!((row.excess_liquidity - (0.10 - 0.04)).abs() < 1e-9);
    assert!((row.yield_spread + 0.5).abs() < 1e-12);
    assert_eq!(row.yield_10y, Some(4.0));
    assert_eq!(row.yield_2y, Some(4.5));
    assert_eq!(row.jobless_claims, Some(215_000.0));
    assert_eq!(row.pmi, None);
}

#[test]
fn test_missing_values_are_ignored() {
    let mut raw = raw_inputs();
    raw.yield_10y.push(RawObservation {
        date: date(2022, 12, 31),
        value: None,
    });
    let observations = preprocess_macro(&raw);
    assert_eq!(observations[0].yield_10y, Some(4.0));
}

#[test]
fn test_rows_without_yields_are_skipped() {
    let mut raw = raw_inputs();
    raw.yield_2y.clear();
    assert!(preprocess_macro(&raw).is_empty());
}

#[test]
fn test_short_m2_history_yields_nothing() {
    let mut raw = raw_inputs();
    raw.m2.truncate(12);
    assert!(preprocess_macro(&raw).is_empty());
}

#[test]
fn test_published_spread_fills_missing_yields() {
    let mut raw = raw_inputs();
    raw.yield_2y.clear();
    raw.yield_spread = vec![obs(date(2022, 12, 30), -0.42)];

    let observations = preprocess_macro(&raw);
    assert_eq!(observations.len(), 1);
    assert!((observations[0].yield_spread + 0.42).abs() < 1e-12);
    assert_eq!(observations[0].yield_10y, None);
    assert_eq!(observations[0].yield_2y, None);
}

#[test]
fn test_computed_spread_wins_over_published() {
    let mut raw = raw_inputs();
    raw.yield_spread = vec![obs(date(2022, 12, 30), 1.0)];

    let observations = preprocess_macro(&raw);
    assert!((observations[0].yield_spread + 0.5).abs() < 1e-12);
}

#[test]
fn test_user_supplied_pmi_is_joined() {
    let mut raw = raw_inputs();
    raw.pmi = vec![obs(date(2022, 12, 1), 47.5)];
    assert_eq!(preprocess_macro(&raw)[0].pmi, Some(47.5));
}

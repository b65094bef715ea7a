//! Unit tests for the macro factor

use chrono::NaiveDate;
use levercast::error::EngineError;
use levercast::indicators::macro_factor::{
    calculate_macro_factor, liquidity_score, pmi_bonus, spread_score, MacroFactorEngine,
    MACRO_FACTOR_MAX, MACRO_FACTOR_MIN,
};
use levercast::models::MacroObservation;

fn month(m: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, 1).unwrap()
}

#[test]
fn test_spread_score_segments() {
    assert!((spread_score(-0.5) - 0.25).abs() < 1e-12);
    assert!((spread_score(0.1) - 0.8).abs() < 1e-12);
    assert_eq!(spread_score(0.2), 1.0);
    assert_eq!(spread_score(1.5), 1.0);
}

#[test]
fn test_liquidity_deficit_penalised_more_steeply() {
    assert!((liquidity_score(0.02) - 1.0).abs() < 1e-12);
    assert!((liquidity_score(-0.02) - 0.6).abs() < 1e-12);
}

#[test]
fn test_pmi_bonus_neutral_band() {
    assert_eq!(pmi_bonus(50.0), 0.0);
    assert_eq!(pmi_bonus(48.0), 0.0);
    assert_eq!(pmi_bonus(52.0), 0.0);
    assert!((pmi_bonus(56.0) - 0.08).abs() < 1e-12);
    assert!((pmi_bonus(45.0) + 0.15).abs() < 1e-12);
}

#[test]
fn test_weaker_leg_sets_base() {
    assert_eq!(calculate_macro_factor(1.0, Some(0.02), Some(50.0)), 1.0);
    assert_eq!(calculate_macro_factor(1.0, Some(0.05), Some(56.0)), 1.08);
    assert_eq!(calculate_macro_factor(0.1, Some(0.05), None), 0.8);
}

#[test]
fn test_missing_liquidity_uses_spread_only() {
    assert_eq!(calculate_macro_factor(0.1, None, None), 0.8);
}

#[test]
fn test_factor_is_clamped() {
    assert_eq!(calculate_macro_factor(-2.0, Some(-0.5), Some(30.0)), MACRO_FACTOR_MIN);
    assert_eq!(calculate_macro_factor(1.0, Some(1.0), Some(80.0)), MACRO_FACTOR_MAX);
}

#[test]
fn test_factor_always_within_bounds() {
    for s in -30..=30 {
        for l in -20..=20 {
            for p in 30..=70 {
                let factor = calculate_macro_factor(
                    s as f64 * 0.1,
                    Some(l as f64 * 0.01),
                    Some(p as f64),
                );
                assert!(
                    (MACRO_FACTOR_MIN..=MACRO_FACTOR_MAX).contains(&factor),
                    "factor {} out of bounds",
                    factor
                );
            }
        }
    }
}

#[test]
fn test_engine_defaults_missing_pmi() {
    let observations = vec![
        MacroObservation::new(month(1), 1.0, 0.02),
        MacroObservation::new(month(2), 1.0, 0.02).with_pmi(56.0),
    ];
    let records = MacroFactorEngine::evaluate(&observations).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].pmi, 50.0);
    assert_eq!(records[0].macro_factor, 1.0);
    assert_eq!(records[1].macro_factor, 1.08);
}

#[test]
fn test_engine_rejects_empty_input() {
    assert_eq!(
        MacroFactorEngine::evaluate(&[]),
        Err(EngineError::EmptySeries { series: "macro" })
    );
}

#[test]
fn test_engine_rejects_duplicate_dates() {
    let observations = vec![
        MacroObservation::new(month(1), 1.0, 0.02),
        MacroObservation::new(month(1), 0.5, 0.01),
    ];
    assert_eq!(
        MacroFactorEngine::evaluate(&observations),
        Err(EngineError::DuplicateDate {
            series: "macro",
            date: month(1)
        })
    );
}

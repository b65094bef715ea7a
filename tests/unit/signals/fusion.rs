//! Unit tests for signal fusion

use chrono::NaiveDate;
use levercast::error::EngineError;
use levercast::models::{
    BreadthRecord, BreadthSignal, DecisionRule, MacroRecord, MarketRecord, Signal,
};
use levercast::signals::fusion::{SignalFusionEngine, DEFAULT_EXPECTED_RETURN};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn macro_record(date: NaiveDate, macro_factor: f64) -> MacroRecord {
    MacroRecord {
        date,
        yield_spread: 1.0,
        excess_liquidity: 0.02,
        pmi: 50.0,
        macro_factor,
    }
}

fn market_record(date: NaiveDate, close: f64, expected_return: f64) -> MarketRecord {
    MarketRecord {
        date,
        close,
        ma24: None,
        bias: None,
        expected_return,
        trend_signal: true,
    }
}

fn breadth_record(date: NaiveDate, breadth_signal: BreadthSignal) -> BreadthRecord {
    BreadthRecord {
        date,
        cap_return: 0.0,
        equal_return: 0.0,
        breadth_signal,
    }
}

#[test]
fn test_market_joined_as_of_backward() {
    let macro_records = vec![
        macro_record(date(2024, 1, 1), 1.1),
        macro_record(date(2024, 2, 1), 1.1),
        macro_record(date(2024, 3, 1), 1.1),
    ];
    let market = vec![
        market_record(date(2023, 12, 15), 100.0, 0.06),
        market_record(date(2024, 2, 1), 104.0, 0.04),
    ];

    let fused = SignalFusionEngine::fuse(&macro_records, &market, &[]).unwrap();
    assert_eq!(fused.len(), 3);
    assert_eq!(fused[0].close, Some(100.0));
    assert_eq!(fused[0].expected_return, 0.06);
    assert_eq!(fused[1].close, Some(104.0));
    assert_eq!(fused[2].close, Some(104.0));
    assert_eq!(fused[2].expected_return, 0.04);
}

#[test]
fn test_scenario_bull_then_fragile() {
    let macro_records = vec![
        macro_record(date(2024, 1, 1), 1.1),
        macro_record(date(2024, 2, 1), 1.1),
    ];
    let market = vec![market_record(date(2024, 1, 1), 100.0, 0.06)];
    let breadth = vec![
        breadth_record(date(2024, 1, 1), BreadthSignal::Healthy),
        breadth_record(date(2024, 2, 1), BreadthSignal::Fragile),
    ];

    let fused = SignalFusionEngine::fuse(&macro_records, &market, &breadth).unwrap();
    assert!((fused[0].final_return - 0.066).abs() < 1e-12);
    assert_eq!(fused[0].signal, Signal::Bull);
    assert_eq!(fused[0].rule, DecisionRule::BullConfirmed);
    assert_eq!(fused[1].signal, Signal::Neutral);
    assert_eq!(fused[1].rule, DecisionRule::BreadthFragile);
}

#[test]
fn test_defaults_before_first_market_row() {
    let macro_records = vec![macro_record(date(2023, 1, 1), 1.0)];
    let market = vec![market_record(date(2024, 1, 1), 100.0, 0.02)];

    let fused = SignalFusionEngine::fuse(&macro_records, &market, &[]).unwrap();
    assert_eq!(fused[0].close, None);
    assert_eq!(fused[0].expected_return, DEFAULT_EXPECTED_RETURN);
    assert!(fused[0].trend_signal);
    assert_eq!(fused[0].breadth_signal, BreadthSignal::Healthy);
    assert_eq!(fused[0].signal, Signal::Bull);
}

#[test]
fn test_breadth_outside_coverage_defaults_healthy() {
    let macro_records = vec![macro_record(date(2024, 1, 1), 1.0)];
    let market = vec![market_record(date(2024, 1, 1), 100.0, 0.03)];
    let breadth = vec![breadth_record(date(2024, 6, 1), BreadthSignal::Weak)];

    let fused = SignalFusionEngine::fuse(&macro_records, &market, &breadth).unwrap();
    assert_eq!(fused[0].breadth_signal, BreadthSignal::Healthy);
    assert_eq!(fused[0].signal, Signal::Neutral);
}

#[test]
fn test_missing_macro_or_market_is_fatal() {
    let macro_records = vec![macro_record(date(2024, 1, 1), 1.0)];
    let market = vec![market_record(date(2024, 1, 1), 100.0, 0.03)];

    assert_eq!(
        SignalFusionEngine::fuse(&[], &market, &[]).unwrap_err(),
        EngineError::EmptySeries { series: "macro" }
    );
    assert_eq!(
        SignalFusionEngine::fuse(&macro_records, &[], &[]).unwrap_err(),
        EngineError::EmptySeries { series: "market" }
    );
}

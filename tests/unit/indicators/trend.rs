//! Unit tests for the mean-reversion market model

use chrono::NaiveDate;
use levercast::error::{Diagnostic, EngineError};
use levercast::indicators::trend::mean_reversion::{
    expected_return_from_bias, resample_monthly, MarketTrendEngine, BASE_RETURN,
};
use levercast::models::PricePoint;

fn monthly_prices(closes: &[f64]) -> Vec<PricePoint> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let date =
                NaiveDate::from_ymd_opt(2020 + (i / 12) as i32, (i % 12) as u32 + 1, 1).unwrap();
            PricePoint::new(date, close)
        })
        .collect()
}

#[test]
fn test_resample_keeps_last_close_of_month() {
    let prices = vec![
        PricePoint::new(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), 100.0),
        PricePoint::new(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(), 105.0),
        PricePoint::new(NaiveDate::from_ymd_opt(2024, 2, 15).unwrap(), 103.0),
    ];
    let monthly = resample_monthly(&prices);
    assert_eq!(monthly.len(), 2);
    assert_eq!(monthly[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    assert_eq!(monthly[0].close, 105.0);
    assert_eq!(monthly[1].close, 103.0);
}

#[test]
fn test_expected_return_falls_as_price_stretches() {
    assert!((expected_return_from_bias(0.1) - 0.06).abs() < 1e-12);
    assert!((expected_return_from_bias(-0.1) - 0.10).abs() < 1e-12);
    assert_eq!(expected_return_from_bias(0.0), BASE_RETURN);
}

#[test]
fn test_short_history_uses_defaults() {
    let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
    let evaluated = MarketTrendEngine::evaluate(&monthly_prices(&closes)).unwrap();
    let records = &evaluated.records;
    assert_eq!(records.len(), 30);

    for record in &records[..23] {
        assert!(record.ma24.is_none());
        assert_eq!(record.expected_return, BASE_RETURN);
    }
    for record in &records[..9] {
        assert!(record.trend_signal);
    }

    assert!(evaluated.diagnostics.contains(&Diagnostic::InsufficientHistory {
        stage: "market",
        rows: 23,
        default: "expected_return=0.08",
    }));
    assert!(evaluated.diagnostics.contains(&Diagnostic::InsufficientHistory {
        stage: "market",
        rows: 9,
        default: "trend_signal=true",
    }));
}

#[test]
fn test_bias_against_24_period_average() {
    let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
    let evaluated = MarketTrendEngine::evaluate(&monthly_prices(&closes)).unwrap();
    let record = &evaluated.records[23];

    let ma24 = (100.0 + 123.0) / 2.0;
    let bias = (123.0 - ma24) / ma24;
    assert!((record.ma24.unwrap() - ma24).abs() < 1e-9);
    assert!((record.bias.unwrap() - bias).abs() < 1e-9);
    assert!((record.expected_return - (0.08 - bias * 0.2)).abs() < 1e-9);
    assert!(record.trend_signal);
}

#[test]
fn test_trend_filter_turns_off_in_decline() {
    let mut closes: Vec<f64> = vec![100.0; 12];
    closes.push(80.0);
    let evaluated = MarketTrendEngine::evaluate(&monthly_prices(&closes)).unwrap();
    assert!(!evaluated.records.last().unwrap().trend_signal);
}

#[test]
fn test_empty_market_is_fatal() {
    assert_eq!(
        MarketTrendEngine::evaluate(&[]).unwrap_err(),
        EngineError::EmptySeries { series: "market" }
    );
}

#[test]
fn test_out_of_order_prices_rejected() {
    let mut prices = monthly_prices(&[100.0, 101.0]);
    prices.swap(0, 1);
    assert!(matches!(
        MarketTrendEngine::evaluate(&prices),
        Err(EngineError::OutOfOrder { series: "market", .. })
    ));
}

//! Merge macro, market and breadth series into one decision series
//!
//! Macro dates anchor the output. Market and breadth rows are attached with an
//! as-of backward lookup: the most recent row dated at or before each macro date.

use crate::error::EngineError;
use crate::models::breadth::{BreadthRecord, BreadthSignal};
use crate::models::macro_data::MacroRecord;
use crate::models::market::MarketRecord;
use crate::models::series::{validate_series, AsOfCursor};
use crate::models::signal::FusedRecord;
use crate::signals::decision::decide;

/// Expected return used when no market row precedes a macro date.
pub const DEFAULT_EXPECTED_RETURN: f64 = 0.07;
/// Breadth used when no breadth row precedes a macro date.
pub const DEFAULT_BREADTH: BreadthSignal = BreadthSignal::Healthy;

pub struct SignalFusionEngine;

impl SignalFusionEngine {
    pub fn fuse(
        macro_records: &[MacroRecord],
        market: &[MarketRecord],
        breadth: &[BreadthRecord],
    ) -> Result<Vec<FusedRecord>, EngineError> {
        if macro_records.is_empty() {
            return Err(EngineError::EmptySeries { series: "macro" });
        }
        if market.is_empty() {
            return Err(EngineError::EmptySeries { series: "market" });
        }
        validate_series("macro", macro_records)?;
        validate_series("market", market)?;
        validate_series("breadth", breadth)?;

        let mut market_cursor = AsOfCursor::new(market);
        let mut breadth_cursor = AsOfCursor::new(breadth);

        Ok(macro_records
            .iter()
            .map(|macro_row| {
                let market_row = market_cursor.seek(macro_row.date);
                let breadth_signal = breadth_cursor
                    .seek(macro_row.date)
                    .map(|b| b.breadth_signal)
                    .unwrap_or(DEFAULT_BREADTH);

                let expected_return = market_row
                    .map(|m| m.expected_return)
                    .unwrap_or(DEFAULT_EXPECTED_RETURN);
                let trend_signal = market_row.map(|m| m.trend_signal).unwrap_or(true);
                let final_return = expected_return * macro_row.macro_factor;
                let (signal, rule) = decide(
                    macro_row.macro_factor,
                    trend_signal,
                    breadth_signal,
                    final_return,
                );

                FusedRecord {
                    date: macro_row.date,
                    close: market_row.map(|m| m.close),
                    macro_factor: macro_row.macro_factor,
                    expected_return,
                    trend_signal,
                    breadth_signal,
                    final_return,
                    signal,
                    rule,
                }
            })
            .collect())
    }
}

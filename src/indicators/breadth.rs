//! Cap-weighted vs equal-weighted breadth classification

use crate::error::{Diagnostic, EngineError};
use crate::indicators::math::pct_change;
use crate::models::breadth::{BreadthPoint, BreadthRecord, BreadthSignal};
use crate::models::series::{validate_series, Evaluated};

pub const BREADTH_LOOKBACK: usize = 20;
/// Equal-weighted returns at or below this count as falling.
pub const EQUAL_WEIGHT_TOLERANCE: f64 = -0.01;

pub fn classify_breadth(cap_return: f64, equal_return: f64) -> BreadthSignal {
    if cap_return > 0.0 && equal_return > EQUAL_WEIGHT_TOLERANCE {
        BreadthSignal::Healthy
    } else if cap_return > 0.0 {
        BreadthSignal::Fragile
    } else {
        BreadthSignal::Weak
    }
}

pub struct BreadthEngine;

impl BreadthEngine {
    /// Classify every row with a defined 20-period return on both indices.
    pub fn evaluate(points: &[BreadthPoint]) -> Result<Evaluated<BreadthRecord>, EngineError> {
        if points.is_empty() {
            return Err(EngineError::EmptySeries { series: "breadth" });
        }
        validate_series("breadth", points)?;

        let cap: Vec<f64> = points.iter().map(|p| p.cap_price).collect();
        let equal: Vec<f64> = points.iter().map(|p| p.equal_price).collect();
        let cap_returns = pct_change(&cap, BREADTH_LOOKBACK);
        let equal_returns = pct_change(&equal, BREADTH_LOOKBACK);

        let records: Vec<BreadthRecord> = points
            .iter()
            .zip(cap_returns.into_iter().zip(equal_returns))
            .filter_map(|(point, returns)| match returns {
                (Some(cap_return), Some(equal_return)) => Some(BreadthRecord {
                    date: point.date,
                    cap_return,
                    equal_return,
                    breadth_signal: classify_breadth(cap_return, equal_return),
                }),
                _ => None,
            })
            .collect();

        let dropped = points.len() - records.len();
        let mut evaluated = Evaluated::new(records);
        if dropped > 0 {
            evaluated = evaluated.with_diagnostic(Diagnostic::InsufficientHistory {
                stage: "breadth",
                rows: dropped,
                default: "rows dropped",
            });
        }
        Ok(evaluated)
    }
}

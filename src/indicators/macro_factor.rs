//! Macro risk factor from yield-curve shape, excess liquidity and PMI
//!
//! Piecewise-linear scoring:
//! - spread: inversion is penalised linearly, a flat curve ramps 0.6 → 1.0
//! - liquidity: positive excess liquidity is rewarded, a deficit is penalised 2x as steeply
//! - PMI: a bonus above 52, a steeper penalty below 48
//!
//! The weaker of spread and liquidity sets the base, PMI adjusts it, and the
//! result is clamped to [0.3, 1.3].

use crate::error::EngineError;
use crate::indicators::math::round_to;
use crate::models::macro_data::{MacroObservation, MacroRecord};
use crate::models::series::validate_series;

pub const MACRO_FACTOR_MIN: f64 = 0.3;
pub const MACRO_FACTOR_MAX: f64 = 1.3;
pub const DEFAULT_PMI: f64 = 50.0;

const SPREAD_RAMP_END: f64 = 0.2;
const PMI_NEUTRAL_LOW: f64 = 48.0;
const PMI_NEUTRAL_HIGH: f64 = 52.0;

pub fn spread_score(yield_spread: f64) -> f64 {
    if yield_spread < 0.0 {
        0.5 + yield_spread * 0.5
    } else if yield_spread < SPREAD_RAMP_END {
        0.6 + (yield_spread / SPREAD_RAMP_END) * 0.4
    } else {
        1.0
    }
}

pub fn liquidity_score(excess_liquidity: f64) -> f64 {
    if excess_liquidity > 0.0 {
        0.9 + excess_liquidity * 5.0
    } else {
        0.8 + excess_liquidity * 10.0
    }
}

pub fn pmi_bonus(pmi: f64) -> f64 {
    if pmi > PMI_NEUTRAL_HIGH {
        (pmi - PMI_NEUTRAL_HIGH) * 0.02
    } else if pmi < PMI_NEUTRAL_LOW {
        (pmi - PMI_NEUTRAL_LOW) * 0.05
    } else {
        0.0
    }
}

/// Combine the three legs into the bounded factor.
///
/// Without a liquidity reading the spread score alone sets the base.
pub fn calculate_macro_factor(yield_spread: f64, excess_liquidity: Option<f64>, pmi: Option<f64>) -> f64 {
    let spread = spread_score(yield_spread);
    let base = match excess_liquidity {
        Some(liquidity) => spread.min(liquidity_score(liquidity)),
        None => spread,
    };
    let raw = base + pmi_bonus(pmi.unwrap_or(DEFAULT_PMI));
    round_to(raw.clamp(MACRO_FACTOR_MIN, MACRO_FACTOR_MAX), 2)
}

pub struct MacroFactorEngine;

impl MacroFactorEngine {
    /// Score every macro period.
    pub fn evaluate(observations: &[MacroObservation]) -> Result<Vec<MacroRecord>, EngineError> {
        if observations.is_empty() {
            return Err(EngineError::EmptySeries { series: "macro" });
        }
        validate_series("macro", observations)?;

        Ok(observations
            .iter()
            .map(|obs| {
                let pmi = obs.pmi.unwrap_or(DEFAULT_PMI);
                MacroRecord {
                    date: obs.date,
                    yield_spread: obs.yield_spread,
                    excess_liquidity: obs.excess_liquidity,
                    pmi,
                    macro_factor: calculate_macro_factor(
                        obs.yield_spread,
                        Some(obs.excess_liquidity),
                        Some(pmi),
                    ),
                }
            })
            .collect())
    }
}

//! Point-in-time leverage recommendation from the latest macro snapshot.

use crate::error::EngineError;
use crate::indicators::macro_factor::calculate_macro_factor;
use crate::models::breadth::BreadthSignal;
use crate::models::macro_data::MacroObservation;
use crate::models::nowcast::{ActionLabel, MacroSnapshot, Nowcast};
use crate::models::signal::FusedRecord;
use crate::signals::decision::MACRO_VETO_THRESHOLD;

/// The "three months ago" reading is the macro row at offset `len - CLAIMS_LOOKBACK_ROWS`
/// (clamped to the first row), three rows before the latest.
pub const CLAIMS_LOOKBACK_ROWS: usize = 4;
/// Expected return assumed when no fused record is available yet.
pub const DEFAULT_NOWCAST_RETURN: f64 = 0.05;
const CLAIMS_RISE_ALERT: f64 = 0.10;

impl MacroSnapshot {
    /// Build from macro history: the latest row plus the row at offset
    /// `len - CLAIMS_LOOKBACK_ROWS`.
    pub fn from_history(history: &[MacroObservation]) -> Result<Self, EngineError> {
        let latest = history
            .last()
            .ok_or(EngineError::EmptySeries { series: "macro" })?;
        let earlier = &history[history.len().saturating_sub(CLAIMS_LOOKBACK_ROWS)];
        let defaults = MacroSnapshot::default();

        Ok(Self {
            yield_10y: latest.yield_10y.unwrap_or(defaults.yield_10y),
            yield_2y: latest.yield_2y.unwrap_or(defaults.yield_2y),
            jobless_claims_4w_avg: latest
                .jobless_claims
                .unwrap_or(defaults.jobless_claims_4w_avg),
            jobless_claims_3m_ago: earlier
                .jobless_claims
                .unwrap_or(defaults.jobless_claims_3m_ago),
            pmi: latest.pmi.unwrap_or(defaults.pmi),
            excess_liquidity: Some(latest.excess_liquidity),
        })
    }
}

/// Latest valuation and breadth inputs taken from the fused series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NowcastInputs {
    pub expected_return: f64,
    pub breadth_signal: Option<BreadthSignal>,
}

impl NowcastInputs {
    pub fn from_latest(latest: Option<&FusedRecord>) -> Self {
        match latest {
            Some(record) => Self {
                expected_return: record.expected_return,
                breadth_signal: Some(record.breadth_signal),
            },
            None => Self {
                expected_return: DEFAULT_NOWCAST_RETURN,
                breadth_signal: None,
            },
        }
    }
}

/// Map the adjusted return to a leverage tier; first match wins.
pub fn leverage_tier(
    final_decision_return: f64,
    macro_factor: f64,
    breadth: Option<BreadthSignal>,
) -> (f64, ActionLabel) {
    if final_decision_return <= 0.0 {
        (0.0, ActionLabel::RiskOff)
    } else if breadth == Some(BreadthSignal::Fragile) {
        (0.5, ActionLabel::Defensive)
    } else if final_decision_return > 0.08
        && macro_factor >= 1.0
        && breadth == Some(BreadthSignal::Healthy)
    {
        (2.0, ActionLabel::AggressiveBuy)
    } else if final_decision_return > 0.04 && macro_factor >= 0.9 {
        (1.0, ActionLabel::NeutralBuy)
    } else {
        (0.8, ActionLabel::WeakBuy)
    }
}

/// Advisory tags describing what is dragging the macro factor down.
pub fn risk_labels(snapshot: &MacroSnapshot, macro_factor: f64) -> Vec<String> {
    let mut labels = Vec::new();
    if snapshot.yield_spread() < 0.0 {
        labels.push(format!(
            "yield curve inverted ({:.2})",
            snapshot.yield_spread()
        ));
    }
    if snapshot.pmi < 48.0 {
        labels.push(format!("manufacturing contraction (PMI {:.1})", snapshot.pmi));
    }
    if snapshot.jobless_claims_3m_ago > 0.0
        && snapshot.jobless_claims_4w_avg
            > snapshot.jobless_claims_3m_ago * (1.0 + CLAIMS_RISE_ALERT)
    {
        labels.push("jobless claims rising".to_string());
    }
    if macro_factor < MACRO_VETO_THRESHOLD {
        labels.push(format!("high composite risk (factor {:.2})", macro_factor));
    }
    labels
}

pub struct NowcastEngine;

impl NowcastEngine {
    pub fn evaluate(snapshot: &MacroSnapshot, inputs: NowcastInputs) -> Nowcast {
        let macro_factor = calculate_macro_factor(
            snapshot.yield_spread(),
            snapshot.excess_liquidity,
            Some(snapshot.pmi),
        );
        let final_decision_return = inputs.expected_return * macro_factor;
        let (leverage, action_label) =
            leverage_tier(final_decision_return, macro_factor, inputs.breadth_signal);

        Nowcast {
            leverage,
            action_label,
            final_decision_return,
            macro_factor,
            expected_return: inputs.expected_return,
            breadth_signal: inputs.breadth_signal,
            risk_labels: risk_labels(snapshot, macro_factor),
            rationale: action_label.rationale().to_string(),
        }
    }
}

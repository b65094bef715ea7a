use serde::{Deserialize, Serialize};

use super::breadth::BreadthSignal;

/// Latest point-in-time macro readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroSnapshot {
    pub yield_10y: f64,
    pub yield_2y: f64,
    pub jobless_claims_4w_avg: f64,
    pub jobless_claims_3m_ago: f64,
    pub pmi: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excess_liquidity: Option<f64>,
}

impl MacroSnapshot {
    pub fn yield_spread(&self) -> f64 {
        self.yield_10y - self.yield_2y
    }
}

impl Default for MacroSnapshot {
    fn default() -> Self {
        Self {
            yield_10y: 4.0,
            yield_2y: 3.8,
            jobless_claims_4w_avg: 220_000.0,
            jobless_claims_3m_ago: 210_000.0,
            pmi: 50.0,
            excess_liquidity: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ActionLabel {
    RiskOff,
    Defensive,
    AggressiveBuy,
    NeutralBuy,
    WeakBuy,
}

impl ActionLabel {
    pub fn rationale(&self) -> &'static str {
        match self {
            ActionLabel::RiskOff => {
                "Adjusted expected return is non-positive; downside risk dominates, stay in cash."
            }
            ActionLabel::Defensive => {
                "Breadth divergence: large caps lead while the broad market weakens; halve exposure."
            }
            ActionLabel::AggressiveBuy => {
                "Cheap valuation with macro tailwind and healthy breadth; 2x leverage is justified."
            }
            ActionLabel::NeutralBuy => {
                "Stable backdrop with moderate upside; hold unlevered index exposure."
            }
            ActionLabel::WeakBuy => {
                "Positive expectation but mild macro headwinds; trim exposure slightly."
            }
        }
    }
}

/// Advisory leverage recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nowcast {
    pub leverage: f64,
    pub action_label: ActionLabel,
    pub final_decision_return: f64,
    pub macro_factor: f64,
    pub expected_return: f64,
    pub breadth_signal: Option<BreadthSignal>,
    pub risk_labels: Vec<String>,
    pub rationale: String,
}

impl Nowcast {
    /// Percent of capital invested in the index.
    pub fn invested_pct(&self) -> f64 {
        self.leverage * 100.0
    }

    /// Percent of capital held as cash.
    pub fn cash_pct(&self) -> f64 {
        (1.0 - self.leverage.min(1.0)) * 100.0
    }
}

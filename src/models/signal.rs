use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::breadth::BreadthSignal;
use super::series::Dated;

/// Categorical monthly decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Bull,
    Neutral,
    Bear,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Bull => "BULL",
            Signal::Neutral => "NEUTRAL",
            Signal::Bear => "BEAR",
        }
    }

    /// Market exposure the backtest applies when acting on this signal.
    pub fn exposure(&self) -> f64 {
        match self {
            Signal::Bull => 2.0,
            Signal::Neutral => 1.0,
            Signal::Bear => 0.0,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Signal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BULL" => Ok(Signal::Bull),
            "NEUTRAL" => Ok(Signal::Neutral),
            "BEAR" => Ok(Signal::Bear),
            other => Err(format!("unknown signal: {}", other)),
        }
    }
}

/// The ladder rule that produced a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionRule {
    MacroVeto,
    TrendVeto,
    BreadthFragile,
    BreadthWeak,
    BullConfirmed,
    PositiveReturn,
    NonPositiveReturn,
}

impl DecisionRule {
    pub fn description(&self) -> &'static str {
        match self {
            DecisionRule::MacroVeto => "macro factor below veto threshold",
            DecisionRule::TrendVeto => "price below 10-period trend filter",
            DecisionRule::BreadthFragile => "cap/equal divergence caps upside",
            DecisionRule::BreadthWeak => "weak market breadth",
            DecisionRule::BullConfirmed => "strong return with macro confirmation",
            DecisionRule::PositiveReturn => "positive adjusted return",
            DecisionRule::NonPositiveReturn => "non-positive adjusted return",
        }
    }
}

/// One fused decision period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedRecord {
    pub date: NaiveDate,
    pub close: Option<f64>,
    pub macro_factor: f64,
    pub expected_return: f64,
    pub trend_signal: bool,
    pub breadth_signal: BreadthSignal,
    pub final_return: f64,
    pub signal: Signal,
    pub rule: DecisionRule,
}

impl Dated for FusedRecord {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

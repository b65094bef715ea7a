//! Override ladder turning fused inputs into a categorical signal.

use crate::models::breadth::BreadthSignal;
use crate::models::signal::{DecisionRule, Signal};

/// Below this the macro backdrop forces BEAR outright.
pub const MACRO_VETO_THRESHOLD: f64 = 0.8;
/// BULL additionally needs the macro factor at or above this level.
pub const BULL_MACRO_CONFIRMATION: f64 = 1.0;
pub const BULL_RETURN_THRESHOLD: f64 = 0.05;

/// Evaluate the ladder top to bottom; the first matching rule wins.
///
/// Macro factors in [0.8, 1.0) can neither force BEAR nor confirm BULL.
pub fn decide(
    macro_factor: f64,
    trend_signal: bool,
    breadth: BreadthSignal,
    final_return: f64,
) -> (Signal, DecisionRule) {
    if macro_factor < MACRO_VETO_THRESHOLD {
        return (Signal::Bear, DecisionRule::MacroVeto);
    }
    if !trend_signal {
        return (Signal::Bear, DecisionRule::TrendVeto);
    }
    match breadth {
        BreadthSignal::Fragile => return (Signal::Neutral, DecisionRule::BreadthFragile),
        BreadthSignal::Weak => return (Signal::Bear, DecisionRule::BreadthWeak),
        BreadthSignal::Healthy => {}
    }
    if final_return > BULL_RETURN_THRESHOLD && macro_factor >= BULL_MACRO_CONFIRMATION {
        (Signal::Bull, DecisionRule::BullConfirmed)
    } else if final_return > 0.0 {
        (Signal::Neutral, DecisionRule::PositiveReturn)
    } else {
        (Signal::Bear, DecisionRule::NonPositiveReturn)
    }
}

//! Unit tests for the decision ladder

use levercast::models::{BreadthSignal, DecisionRule, Signal};
use levercast::signals::decision::decide;

const BREADTHS: [BreadthSignal; 3] = [
    BreadthSignal::Healthy,
    BreadthSignal::Fragile,
    BreadthSignal::Weak,
];

#[test]
fn test_healthy_strong_backdrop_is_bull() {
    let final_return = 0.06 * 1.1;
    assert_eq!(
        decide(1.1, true, BreadthSignal::Healthy, final_return),
        (Signal::Bull, DecisionRule::BullConfirmed)
    );
}

#[test]
fn test_fragile_breadth_caps_at_neutral() {
    let final_return = 0.06 * 1.1;
    assert_eq!(
        decide(1.1, true, BreadthSignal::Fragile, final_return),
        (Signal::Neutral, DecisionRule::BreadthFragile)
    );
}

#[test]
fn test_macro_veto_dominates() {
    for macro_factor in [0.3, 0.5, 0.79] {
        for trend in [true, false] {
            for breadth in BREADTHS {
                for final_return in [-0.1, 0.0, 0.2] {
                    assert_eq!(
                        decide(macro_factor, trend, breadth, final_return),
                        (Signal::Bear, DecisionRule::MacroVeto)
                    );
                }
            }
        }
    }
}

#[test]
fn test_trend_veto_precedes_breadth() {
    for breadth in BREADTHS {
        assert_eq!(
            decide(1.2, false, breadth, 0.1),
            (Signal::Bear, DecisionRule::TrendVeto)
        );
    }
}

#[test]
fn test_weak_breadth_is_bear() {
    assert_eq!(
        decide(1.2, true, BreadthSignal::Weak, 0.1),
        (Signal::Bear, DecisionRule::BreadthWeak)
    );
}

#[test]
fn test_neutral_band_neither_vetoes_nor_confirms() {
    assert_eq!(
        decide(0.8, true, BreadthSignal::Healthy, 0.09),
        (Signal::Neutral, DecisionRule::PositiveReturn)
    );
    assert_eq!(
        decide(0.99, true, BreadthSignal::Healthy, 0.09),
        (Signal::Neutral, DecisionRule::PositiveReturn)
    );
    assert_eq!(
        decide(1.0, true, BreadthSignal::Healthy, 0.09),
        (Signal::Bull, DecisionRule::BullConfirmed)
    );
}

#[test]
fn test_return_thresholds() {
    assert_eq!(
        decide(1.1, true, BreadthSignal::Healthy, 0.05),
        (Signal::Neutral, DecisionRule::PositiveReturn)
    );
    assert_eq!(
        decide(1.1, true, BreadthSignal::Healthy, 0.0),
        (Signal::Bear, DecisionRule::NonPositiveReturn)
    );
}

//! Shared data models spanning the engine layers.

pub mod backtest;
pub mod breadth;
pub mod macro_data;
pub mod market;
pub mod nowcast;
pub mod series;
pub mod signal;

pub use backtest::{BacktestReport, BacktestRow, EquityPoint};
pub use breadth::{BreadthPoint, BreadthRecord, BreadthSignal};
pub use macro_data::{MacroObservation, MacroRecord, RawObservation};
pub use market::{MarketRecord, PricePoint};
pub use nowcast::{ActionLabel, MacroSnapshot, Nowcast};
pub use series::{validate_series, AsOfCursor, Dated, Evaluated};
pub use signal::{DecisionRule, FusedRecord, Signal};

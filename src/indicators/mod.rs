pub mod breadth;
pub mod macro_factor;
pub mod math;
pub mod trend;

pub use breadth::{classify_breadth, BreadthEngine};
pub use macro_factor::{calculate_macro_factor, MacroFactorEngine};
pub use trend::MarketTrendEngine;

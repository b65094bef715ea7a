//! Signal fusion, decision ladder, nowcast and reporting.

pub mod decision;
pub mod fusion;
pub mod nowcast;
pub mod report;

pub use decision::*;
pub use fusion::*;
pub use nowcast::*;
pub use report::MarketReport;

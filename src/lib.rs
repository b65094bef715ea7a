//! Levercast: macro-aware leverage signals for a broad equity index.
//!
//! Monthly macro, market and breadth series are fused into a BULL / NEUTRAL /
//! BEAR exposure decision, replayed through a leveraged backtest, and
//! summarised as a point-in-time nowcast.

pub mod backtest;
pub mod config;
pub mod core;
pub mod error;
pub mod indicators;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod signals;

pub use error::{Diagnostic, EngineError};

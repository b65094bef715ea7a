//! Progress hooks for the pipeline

use std::fmt;

use tracing::{debug, info, warn};

use crate::error::Diagnostic;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    MacroFactor,
    MarketTrend,
    Breadth,
    Projection,
    Fusion,
    Backtest,
    Nowcast,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::MacroFactor => "macro_factor",
            Stage::MarketTrend => "market_trend",
            Stage::Breadth => "breadth",
            Stage::Projection => "projection",
            Stage::Fusion => "fusion",
            Stage::Backtest => "backtest",
            Stage::Nowcast => "nowcast",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receives stage boundaries and non-fatal diagnostics as the pipeline runs.
pub trait PipelineObserver: Send + Sync {
    fn stage_started(&self, _stage: Stage) {}

    fn stage_finished(&self, _stage: Stage, _rows: usize) {}

    fn diagnostic(&self, _diagnostic: &Diagnostic) {}
}

/// Logs every event through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn stage_started(&self, stage: Stage) {
        debug!(stage = %stage, "Stage started");
    }

    fn stage_finished(&self, stage: Stage, rows: usize) {
        info!(stage = %stage, rows = rows, "Stage finished");
    }

    fn diagnostic(&self, diagnostic: &Diagnostic) {
        warn!(diagnostic = %diagnostic, "Default applied");
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

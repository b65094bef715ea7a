//! End-to-end run: macro → market → breadth → projection → fusion → backtest → nowcast.

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::backtest::BacktestEngine;
use crate::config::PipelineConfig;
use crate::core::observer::{PipelineObserver, Stage};
use crate::error::{Diagnostic, EngineError};
use crate::indicators::{BreadthEngine, MacroFactorEngine, MarketTrendEngine};
use crate::models::backtest::BacktestReport;
use crate::models::breadth::{BreadthPoint, BreadthRecord};
use crate::models::macro_data::{MacroObservation, MacroRecord};
use crate::models::market::{MarketRecord, PricePoint};
use crate::models::nowcast::{MacroSnapshot, Nowcast};
use crate::models::signal::FusedRecord;
use crate::services::fred::FredError;
use crate::services::prices::PriceError;
use crate::services::projection::{project_macro, project_market};
use crate::services::store::{DataStore, StoreError};
use crate::signals::fusion::SignalFusionEngine;
use crate::signals::nowcast::{NowcastEngine, NowcastInputs};
use crate::signals::report::MarketReport;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Fred(#[from] FredError),

    #[error(transparent)]
    Price(#[from] PriceError),

    #[error("pipeline task did not complete: {0}")]
    Interrupted(String),
}

/// The three ordered input series.
#[derive(Debug, Clone, Default)]
pub struct PipelineInputs {
    pub macro_observations: Vec<MacroObservation>,
    pub market_prices: Vec<PricePoint>,
    pub breadth_prices: Vec<BreadthPoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub macro_records: Vec<MacroRecord>,
    pub market_records: Vec<MarketRecord>,
    pub breadth_records: Vec<BreadthRecord>,
    pub fused: Vec<FusedRecord>,
    pub backtest: BacktestReport,
    pub report: Option<MarketReport>,
    pub nowcast: Nowcast,
    pub diagnostics: Vec<Diagnostic>,
}

impl PipelineOutput {
    pub fn latest(&self) -> Option<&FusedRecord> {
        self.fused.last()
    }
}

fn record_diagnostics(
    diagnostics: Vec<Diagnostic>,
    sink: &mut Vec<Diagnostic>,
    observer: &dyn PipelineObserver,
) {
    for diagnostic in diagnostics {
        observer.diagnostic(&diagnostic);
        sink.push(diagnostic);
    }
}

/// Run every stage in memory.
///
/// Macro and market failures abort the run. A breadth failure falls back to
/// an empty breadth series so fusion applies its default.
pub fn run_pipeline(
    inputs: &PipelineInputs,
    config: &PipelineConfig,
    observer: &dyn PipelineObserver,
) -> Result<PipelineOutput, PipelineError> {
    let mut diagnostics = Vec::new();

    observer.stage_started(Stage::MacroFactor);
    let mut macro_records = MacroFactorEngine::evaluate(&inputs.macro_observations)?;
    observer.stage_finished(Stage::MacroFactor, macro_records.len());

    observer.stage_started(Stage::MarketTrend);
    let market = MarketTrendEngine::evaluate(&inputs.market_prices)?;
    record_diagnostics(market.diagnostics, &mut diagnostics, observer);
    let mut market_records = market.records;
    observer.stage_finished(Stage::MarketTrend, market_records.len());

    observer.stage_started(Stage::Breadth);
    let breadth_records = match BreadthEngine::evaluate(&inputs.breadth_prices) {
        Ok(breadth) => {
            record_diagnostics(breadth.diagnostics, &mut diagnostics, observer);
            breadth.records
        }
        Err(e) => {
            warn!(error = %e, "Breadth unavailable, using default signal");
            Vec::new()
        }
    };
    observer.stage_finished(Stage::Breadth, breadth_records.len());

    if let Some(target) = config.projection_target {
        observer.stage_started(Stage::Projection);
        macro_records = project_macro(&macro_records, target);
        market_records = project_market(&market_records, target);
        observer.stage_finished(Stage::Projection, macro_records.len());
    }

    observer.stage_started(Stage::Fusion);
    let fused = SignalFusionEngine::fuse(&macro_records, &market_records, &breadth_records)?;
    observer.stage_finished(Stage::Fusion, fused.len());
    let report = MarketReport::from_fused(&fused);

    observer.stage_started(Stage::Backtest);
    let run = BacktestEngine::new(config.backtest).run(&fused)?;
    record_diagnostics(run.diagnostics, &mut diagnostics, observer);
    let backtest = run.report;
    observer.stage_finished(Stage::Backtest, backtest.rows.len());

    observer.stage_started(Stage::Nowcast);
    let snapshot = MacroSnapshot::from_history(&inputs.macro_observations)?;
    let nowcast = NowcastEngine::evaluate(&snapshot, NowcastInputs::from_latest(fused.last()));
    observer.stage_finished(Stage::Nowcast, 1);

    Ok(PipelineOutput {
        macro_records,
        market_records,
        breadth_records,
        fused,
        backtest,
        report,
        nowcast,
        diagnostics,
    })
}

/// Load inputs from the store, run the pipeline and persist every output series.
pub fn run_from_store(
    store: &DataStore,
    config: &PipelineConfig,
    observer: &dyn PipelineObserver,
) -> Result<PipelineOutput, PipelineError> {
    let inputs = PipelineInputs {
        macro_observations: store.load_macro_observations()?,
        market_prices: store.load_market_prices()?,
        breadth_prices: store.load_breadth_prices()?,
    };
    info!(
        macro_rows = inputs.macro_observations.len(),
        market_rows = inputs.market_prices.len(),
        breadth_rows = inputs.breadth_prices.len(),
        "Loaded pipeline inputs"
    );

    let output = run_pipeline(&inputs, config, observer)?;

    store.write_macro_factors(&output.macro_records)?;
    store.write_market_records(&output.market_records)?;
    store.write_breadth_records(&output.breadth_records)?;
    store.write_fused(&output.fused)?;
    store.write_backtest(&output.backtest.rows)?;
    info!(root = %store.root().display(), "Pipeline outputs written");

    Ok(output)
}

//! HTTP endpoint server using Axum

use axum::{
    extract::{Query, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, warn, Level};

use crate::config::{get_data_dir, PipelineConfig};
use crate::core::observer::TracingObserver;
use crate::core::pipeline::{run_from_store, PipelineError, PipelineOutput};
use crate::core::refresh::refresh_from_env;
use crate::metrics::Metrics;
use crate::models::signal::FusedRecord;
use crate::services::store::DataStore;

#[derive(Clone)]
pub struct AppState {
    pub health: Arc<RwLock<HealthStatus>>,
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
    pub store: DataStore,
    pub config: PipelineConfig,
    pub output: Arc<RwLock<Option<Arc<PipelineOutput>>>>,
}

impl AppState {
    pub fn new(metrics: Arc<Metrics>, store: DataStore, config: PipelineConfig) -> Self {
        Self {
            health: Arc::new(RwLock::new(HealthStatus::default())),
            metrics,
            start_time: Arc::new(Instant::now()),
            store,
            config,
            output: Arc::new(RwLock::new(None)),
        }
    }

    /// Run the pipeline against the store and publish the result.
    pub async fn refresh(&self) -> Result<Arc<PipelineOutput>, PipelineError> {
        let store = self.store.clone();
        let config = self.config.clone();
        let result = tokio::task::spawn_blocking(move || {
            run_from_store(&store, &config, &TracingObserver)
        })
        .await;

        let output = match result {
            Ok(Ok(output)) => Arc::new(output),
            Ok(Err(e)) => {
                self.metrics.pipeline_failures_total.inc();
                return Err(e);
            }
            Err(join_error) => {
                self.metrics.pipeline_failures_total.inc();
                error!(error = %join_error, "Pipeline task panicked");
                return Err(PipelineError::Interrupted(join_error.to_string()));
            }
        };

        self.metrics.pipeline_runs_total.inc();
        if let Some(latest) = output.latest() {
            self.metrics.latest_macro_factor.set(latest.macro_factor);
        }
        self.metrics.latest_leverage.set(output.nowcast.leverage);
        *self.output.write().await = Some(output.clone());
        Ok(output)
    }

    async fn current(&self) -> Result<Arc<PipelineOutput>, StatusCode> {
        self.output
            .read()
            .await
            .clone()
            .ok_or(StatusCode::SERVICE_UNAVAILABLE)
    }
}

#[derive(Clone, Debug)]
pub struct HealthStatus {
    pub status: String,
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let health = state.health.read().await;
    let uptime_seconds = state.start_time.elapsed().as_secs();
    let pipeline_ready = state.output.read().await.is_some();
    Ok(Json(json!({
        "status": health.status,
        "uptime_seconds": uptime_seconds,
        "pipeline_ready": pipeline_ready,
        "service": "levercast-signal-engine"
    })))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .export()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Middleware to track HTTP request metrics
async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    // Count the request as in flight while the handler runs
    state.metrics.http_requests_in_flight.inc();

    // Process request
    let response = next.run(request).await;
    let status = response.status();
    let duration = start.elapsed();

    state.metrics.http_requests_in_flight.dec();

    // Record totals and latency
    state.metrics.http_requests_total.inc();
    state
        .metrics
        .http_request_duration_seconds
        .observe(duration.as_secs_f64());

    // Log server errors
    if status.is_server_error() {
        tracing::error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = duration.as_millis(),
            "HTTP request error"
        );
    }

    response
}

#[derive(Debug, Deserialize)]
struct SignalsQuery {
    /// Only return the most recent `limit` periods.
    limit: Option<usize>,
}

async fn list_signals(
    State(state): State<AppState>,
    Query(params): Query<SignalsQuery>,
) -> Result<Json<Vec<FusedRecord>>, StatusCode> {
    let output = state.current().await?;
    let fused = &output.fused;
    let start = params
        .limit
        .map(|limit| fused.len().saturating_sub(limit))
        .unwrap_or(0);
    Ok(Json(fused[start..].to_vec()))
}

async fn latest_signal(State(state): State<AppState>) -> Result<Json<FusedRecord>, StatusCode> {
    let output = state.current().await?;
    output
        .latest()
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn get_backtest(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let output = state.current().await?;
    let report = &output.backtest;
    Ok(Json(json!({
        "total_return_benchmark": report.total_return_benchmark,
        "total_return_strategy": report.total_return_strategy,
        "max_drawdown_benchmark": report.max_drawdown_benchmark,
        "max_drawdown_strategy": report.max_drawdown_strategy,
        "sharpe_benchmark": report.sharpe_benchmark,
        "sharpe_strategy": report.sharpe_strategy,
        "outperformed": report.outperformed(),
        "equity_curve": report.equity_curve,
        "diagnostics": output.diagnostics,
    })))
}

async fn get_nowcast(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let output = state.current().await?;
    let nowcast = &output.nowcast;
    Ok(Json(json!({
        "leverage": nowcast.leverage,
        "action_label": nowcast.action_label,
        "final_decision_return": nowcast.final_decision_return,
        "macro_factor": nowcast.macro_factor,
        "expected_return": nowcast.expected_return,
        "breadth_signal": nowcast.breadth_signal,
        "invested_pct": nowcast.invested_pct(),
        "cash_pct": nowcast.cash_pct(),
        "risk_labels": nowcast.risk_labels,
        "rationale": nowcast.rationale,
    })))
}

async fn get_report(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let output = state.current().await?;
    let report = output.report.as_ref().ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(json!({
        "report": report,
        "text": report.to_string(),
    })))
}

/// Re-run the pipeline from the data directory
async fn run_pipeline_handler(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let output = state.refresh().await.map_err(|e| {
        error!(error = %e, "Pipeline run failed");
        match e {
            PipelineError::Engine(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    })?;

    Ok(Json(json!({
        "periods": output.fused.len(),
        "latest": output.latest(),
        "diagnostics": output.diagnostics.len(),
    })))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/signals", get(list_signals))
        .route("/api/signals/latest", get(latest_signal))
        .route("/api/backtest", get(get_backtest))
        .route("/api/nowcast", get(get_nowcast))
        .route("/api/report", get(get_report))
        .route("/api/pipeline/run", post(run_pipeline_handler))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let metrics = Arc::new(Metrics::new()?);
    let store = DataStore::new(get_data_dir());

    if let Err(e) = refresh_from_env(&store).await {
        warn!(error = %e, "Input refresh failed, using existing data directory");
    }

    let state = AppState::new(metrics, store, PipelineConfig::from_env());

    // The API stays up without data; signal endpoints answer 503 until a run succeeds.
    match state.refresh().await {
        Ok(output) => info!(periods = output.fused.len(), "Initial pipeline run complete"),
        Err(e) => warn!(error = %e, "Initial pipeline run failed"),
    }

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!(port = port, "HTTP server listening on port {}", port);
    info!(
        "Metrics endpoint available at http://0.0.0.0:{}/metrics",
        port
    );
    axum::serve(listener, app).await?;

    Ok(())
}

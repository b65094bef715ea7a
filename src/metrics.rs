//! Prometheus metrics for the API server and pipeline runs

use prometheus::{Encoder, Gauge, Histogram, HistogramOpts, IntCounter, IntGauge, Registry, TextEncoder};

pub struct Metrics {
    registry: Registry,
    pub http_requests_total: IntCounter,
    pub http_request_duration_seconds: Histogram,
    pub http_requests_in_flight: IntGauge,
    pub pipeline_runs_total: IntCounter,
    pub pipeline_failures_total: IntCounter,
    pub latest_macro_factor: Gauge,
    pub latest_leverage: Gauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total =
            IntCounter::new("http_requests_total", "Total number of HTTP requests")?;
        let http_request_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request latency in seconds",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
        )?;
        let http_requests_in_flight = IntGauge::new(
            "http_requests_in_flight",
            "Number of HTTP requests currently being served",
        )?;
        let pipeline_runs_total =
            IntCounter::new("pipeline_runs_total", "Completed pipeline runs")?;
        let pipeline_failures_total =
            IntCounter::new("pipeline_failures_total", "Pipeline runs that returned an error")?;
        let latest_macro_factor = Gauge::new(
            "latest_macro_factor",
            "Macro factor of the most recent fused period",
        )?;
        let latest_leverage =
            Gauge::new("latest_leverage", "Leverage recommended by the latest nowcast")?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;
        registry.register(Box::new(pipeline_runs_total.clone()))?;
        registry.register(Box::new(pipeline_failures_total.clone()))?;
        registry.register(Box::new(latest_macro_factor.clone()))?;
        registry.register(Box::new(latest_leverage.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            http_requests_in_flight,
            pipeline_runs_total,
            pipeline_failures_total,
            latest_macro_factor,
            latest_leverage,
        })
    }

    /// Render all registered metrics in the Prometheus text format.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

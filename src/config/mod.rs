//! Environment-driven configuration
//!
//! Values are read from the process environment (a `.env` file is loaded by
//! the binaries through `dotenvy`).

use chrono::{NaiveDate, Utc};
use std::env;
use std::path::PathBuf;
use tracing::warn;

use crate::backtest::BacktestConfig;
use crate::services::fred::DEFAULT_FRED_BASE_URL;
use crate::services::prices::DEFAULT_PRICE_BASE_URL;

pub fn get_environment() -> String {
    env::var("ENVIRONMENT")
        .or_else(|_| env::var("RUST_ENV"))
        .unwrap_or_else(|_| "sandbox".to_string())
        .to_lowercase()
}

pub fn get_data_dir() -> PathBuf {
    env::var("DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

pub fn get_fred_base_url() -> String {
    env::var("FRED_BASE_URL").unwrap_or_else(|_| DEFAULT_FRED_BASE_URL.to_string())
}

pub fn get_port() -> u16 {
    env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080)
}

pub fn get_price_base_url() -> String {
    env::var("PRICE_BASE_URL").unwrap_or_else(|_| DEFAULT_PRICE_BASE_URL.to_string())
}

/// `1`, `true` and `yes` (any case) enable a flag; anything else leaves it off.
pub fn parse_flag(raw: Option<&str>) -> bool {
    raw.map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Whether the pipeline should refresh raw data from FRED before running.
pub fn fred_fetch_enabled() -> bool {
    parse_flag(env::var("FRED_FETCH").ok().as_deref())
}

/// Whether market and breadth closes should be downloaded before running.
pub fn market_fetch_enabled() -> bool {
    parse_flag(env::var("MARKET_FETCH").ok().as_deref())
}

/// Interpret a `PROJECTION_TARGET` value.
///
/// Unset means project to `today`; `off`/`none`/empty disables projection.
pub fn parse_projection_target(raw: Option<&str>, today: NaiveDate) -> Option<NaiveDate> {
    match raw.map(str::trim) {
        None => Some(today),
        Some(value) => match value.to_lowercase().as_str() {
            "" | "off" | "none" => None,
            "today" => Some(today),
            _ => match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(e) => {
                    warn!(value = value, error = %e, "Invalid PROJECTION_TARGET, projection disabled");
                    None
                }
            },
        },
    }
}

#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub backtest: BacktestConfig,
    /// Extend macro and market series to this month before fusing.
    pub projection_target: Option<NaiveDate>,
}

impl PipelineConfig {
    pub fn from_env() -> Self {
        let raw = env::var("PROJECTION_TARGET").ok();
        Self {
            backtest: BacktestConfig::default(),
            projection_target: parse_projection_target(raw.as_deref(), Utc::now().date_naive()),
        }
    }

    pub fn with_projection_target(mut self, target: Option<NaiveDate>) -> Self {
        self.projection_target = target;
        self
    }
}

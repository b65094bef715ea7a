//! FRED CSV downloader for the raw macro series.

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use chrono::NaiveDate;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::models::macro_data::RawObservation;

pub const DEFAULT_FRED_BASE_URL: &str = "https://fred.stlouisfed.org";
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Series the pipeline pulls from FRED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FredSeries {
    Yield10Y,
    Yield2Y,
    JoblessClaims,
    YieldSpread,
    MoneySupply,
    Gdp,
}

impl FredSeries {
    pub const ALL: [FredSeries; 6] = [
        FredSeries::Yield10Y,
        FredSeries::Yield2Y,
        FredSeries::JoblessClaims,
        FredSeries::YieldSpread,
        FredSeries::MoneySupply,
        FredSeries::Gdp,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            FredSeries::Yield10Y => "DGS10",
            FredSeries::Yield2Y => "DGS2",
            FredSeries::JoblessClaims => "ICSA",
            FredSeries::YieldSpread => "T10Y2Y",
            FredSeries::MoneySupply => "M2SL",
            FredSeries::Gdp => "GDP",
        }
    }

    /// File stem used for the raw CSV.
    pub fn name(&self) -> &'static str {
        match self {
            FredSeries::Yield10Y => "yield_10y",
            FredSeries::Yield2Y => "yield_2y",
            FredSeries::JoblessClaims => "jobless_claims",
            FredSeries::YieldSpread => "yield_spread",
            FredSeries::MoneySupply => "m2",
            FredSeries::Gdp => "gdp",
        }
    }
}

#[derive(Debug, Error)]
pub enum FredError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid FRED url: {0}")]
    Url(#[from] url::ParseError),

    #[error("{series} returned HTTP {status}")]
    Status { series: &'static str, status: u16 },

    #[error("{series} payload is not a FRED CSV")]
    UnexpectedPayload { series: &'static str },

    #[error("{series} CSV could not be read: {message}")]
    Parse {
        series: &'static str,
        message: String,
    },

    #[error("every FRED series failed to download")]
    AllSeriesFailed,
}

impl FredError {
    fn is_transient(&self) -> bool {
        match self {
            FredError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            FredError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Source of raw macro observations.
#[async_trait]
pub trait MacroDataSource: Send + Sync {
    async fn fetch_series(&self, series: FredSeries) -> Result<Vec<RawObservation>, FredError>;
}

pub struct FredClient {
    base_url: Url,
    client: reqwest::Client,
    max_retries: usize,
    retry_delay: Duration,
}

impl FredClient {
    pub fn new(base_url: &str) -> Result<Self, FredError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(BROWSER_USER_AGENT)
            .build()?;
        Self::with_client(base_url, client)
    }

    pub fn with_client(base_url: &str, client: reqwest::Client) -> Result<Self, FredError> {
        Ok(Self {
            base_url: Url::parse(base_url)?,
            client,
            max_retries: 3,
            retry_delay: Duration::from_millis(500),
        })
    }

    pub fn with_retry_policy(mut self, max_retries: usize, retry_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_delay = retry_delay;
        self
    }

    pub fn series_url(&self, series: FredSeries) -> Result<Url, FredError> {
        let mut url = self.base_url.join("graph/fredgraph.csv")?;
        url.query_pairs_mut().append_pair("id", series.code());
        Ok(url)
    }

    async fn download(&self, series: FredSeries) -> Result<String, FredError> {
        let url = self.series_url(series)?;
        debug!(series = series.code(), url = %url, "Fetching FRED series");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FredError::Status {
                series: series.code(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl MacroDataSource for FredClient {
    async fn fetch_series(&self, series: FredSeries) -> Result<Vec<RawObservation>, FredError> {
        let body = (|| async { self.download(series).await })
            .retry(
                ExponentialBuilder::default()
                    .with_min_delay(self.retry_delay)
                    .with_max_times(self.max_retries),
            )
            .when(|e: &FredError| e.is_transient())
            .notify(|e: &FredError, delay: Duration| {
                warn!(series = series.code(), error = %e, ?delay, "Retrying FRED download");
            })
            .await?;
        parse_fred_csv(series, &body)
    }
}

/// Parse a `fredgraph.csv` payload.
///
/// The date column may be `DATE` or `observation_date`; `.` and blank cells are missing values.
pub fn parse_fred_csv(series: FredSeries, body: &str) -> Result<Vec<RawObservation>, FredError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());
    let headers = reader
        .headers()
        .map_err(|_| FredError::UnexpectedPayload {
            series: series.code(),
        })?
        .clone();

    let date_idx = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("date") || h == "observation_date")
        .ok_or(FredError::UnexpectedPayload {
            series: series.code(),
        })?;
    let value_idx = headers
        .iter()
        .position(|h| h == series.code())
        .or_else(|| (0..headers.len()).find(|&i| i != date_idx))
        .ok_or(FredError::UnexpectedPayload {
            series: series.code(),
        })?;

    let mut observations = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| FredError::Parse {
            series: series.code(),
            message: e.to_string(),
        })?;
        let raw_date = record.get(date_idx).unwrap_or_default();
        let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d").map_err(|e| {
            FredError::Parse {
                series: series.code(),
                message: format!("bad date '{}': {}", raw_date, e),
            }
        })?;
        let value = record
            .get(value_idx)
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite());
        observations.push(RawObservation { date, value });
    }
    observations.sort_by_key(|o| o.date);
    observations.dedup_by_key(|o| o.date);
    Ok(observations)
}

/// Download every requested series, skipping the ones that fail.
pub async fn fetch_all(
    source: &dyn MacroDataSource,
    series: &[FredSeries],
) -> Result<Vec<(FredSeries, Vec<RawObservation>)>, FredError> {
    let mut fetched = Vec::new();
    for &s in series {
        match source.fetch_series(s).await {
            Ok(observations) => {
                info!(
                    series = s.code(),
                    rows = observations.len(),
                    latest = ?observations.last().map(|o| o.date),
                    "FRED series downloaded"
                );
                fetched.push((s, observations));
            }
            Err(e) => warn!(series = s.code(), error = %e, "Skipping FRED series"),
        }
    }
    if fetched.is_empty() {
        return Err(FredError::AllSeriesFailed);
    }
    Ok(fetched)
}

//! Yahoo Finance chart downloader for index and equal-weight ETF closes.

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::models::breadth::BreadthPoint;
use crate::models::market::PricePoint;

pub const DEFAULT_PRICE_BASE_URL: &str = "https://query1.finance.yahoo.com";
/// Cap-weighted S&P 500 index.
pub const MARKET_SYMBOL: &str = "^GSPC";
/// Equal-weighted S&P 500 ETF.
pub const EQUAL_WEIGHT_SYMBOL: &str = "RSP";
pub const MARKET_RANGE: &str = "max";
pub const BREADTH_RANGE: &str = "5y";

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceInterval {
    Daily,
    Monthly,
}

impl PriceInterval {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceInterval::Daily => "1d",
            PriceInterval::Monthly => "1mo",
        }
    }
}

#[derive(Debug, Error)]
pub enum PriceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid price url: {0}")]
    Url(#[from] url::ParseError),

    #[error("{symbol} returned HTTP {status}")]
    Status { symbol: String, status: u16 },

    #[error("{symbol} payload is not a chart response: {message}")]
    UnexpectedPayload { symbol: String, message: String },

    #[error("{symbol} chart error {code}: {description}")]
    Api {
        symbol: String,
        code: String,
        description: String,
    },

    #[error("{symbol} returned no priced rows")]
    NoData { symbol: String },
}

impl PriceError {
    fn is_transient(&self) -> bool {
        match self {
            PriceError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            PriceError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Source of historical closes for a ticker.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_closes(
        &self,
        symbol: &str,
        range: &str,
        interval: PriceInterval,
    ) -> Result<Vec<PricePoint>, PriceError>;
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartFault>,
}

#[derive(Debug, Deserialize)]
struct ChartFault {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<QuoteSeries>,
    #[serde(default)]
    adjclose: Vec<AdjCloseSeries>,
}

#[derive(Debug, Deserialize)]
struct QuoteSeries {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseSeries {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

pub struct YahooChartClient {
    base_url: Url,
    client: reqwest::Client,
    max_retries: usize,
    retry_delay: Duration,
}

impl YahooChartClient {
    pub fn new(base_url: &str) -> Result<Self, PriceError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(BROWSER_USER_AGENT)
            .build()?;
        Self::with_client(base_url, client)
    }

    pub fn with_client(base_url: &str, client: reqwest::Client) -> Result<Self, PriceError> {
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

    pub fn chart_url(
        &self,
        symbol: &str,
        range: &str,
        interval: PriceInterval,
    ) -> Result<Url, PriceError> {
        let mut url = self.base_url.join(&format!("v8/finance/chart/{}", symbol))?;
        url.query_pairs_mut()
            .append_pair("range", range)
            .append_pair("interval", interval.as_str());
        Ok(url)
    }

    async fn download(
        &self,
        symbol: &str,
        range: &str,
        interval: PriceInterval,
    ) -> Result<String, PriceError> {
        let url = self.chart_url(symbol, range, interval)?;
        debug!(symbol = symbol, url = %url, "Fetching price chart");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PriceError::Status {
                symbol: symbol.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl PriceSource for YahooChartClient {
    async fn fetch_closes(
        &self,
        symbol: &str,
        range: &str,
        interval: PriceInterval,
    ) -> Result<Vec<PricePoint>, PriceError> {
        let body = (|| async { self.download(symbol, range, interval).await })
            .retry(
                ExponentialBuilder::default()
                    .with_min_delay(self.retry_delay)
                    .with_max_times(self.max_retries),
            )
            .when(|e: &PriceError| e.is_transient())
            .notify(|e: &PriceError, delay: Duration| {
                warn!(symbol = symbol, error = %e, ?delay, "Retrying price download");
            })
            .await?;
        parse_chart(symbol, &body)
    }
}

/// Parse a v8 chart JSON payload into dated closes.
///
/// `close` is preferred over `adjclose`. Null, non-finite and non-positive
/// closes are dropped; the first row wins on a repeated date.
pub fn parse_chart(symbol: &str, body: &str) -> Result<Vec<PricePoint>, PriceError> {
    let envelope: ChartEnvelope =
        serde_json::from_str(body).map_err(|e| PriceError::UnexpectedPayload {
            symbol: symbol.to_string(),
            message: e.to_string(),
        })?;

    if let Some(fault) = envelope.chart.error {
        return Err(PriceError::Api {
            symbol: symbol.to_string(),
            code: fault.code,
            description: fault.description.unwrap_or_default(),
        });
    }

    let result = envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| PriceError::NoData {
            symbol: symbol.to_string(),
        })?;

    let ChartIndicators { quote, adjclose } = result.indicators;
    let closes = quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .filter(|c| !c.is_empty())
        .or_else(|| adjclose.into_iter().next().map(|a| a.adjclose))
        .unwrap_or_default();

    let mut prices: Vec<PricePoint> = result
        .timestamp
        .iter()
        .zip(closes)
        .filter_map(|(&ts, close)| {
            let close = close.filter(|c| c.is_finite() && *c > 0.0)?;
            let date = DateTime::<Utc>::from_timestamp(ts, 0)?.date_naive();
            Some(PricePoint::new(date, close))
        })
        .collect();
    prices.sort_by_key(|p| p.date);
    prices.dedup_by_key(|p| p.date);

    if prices.is_empty() {
        return Err(PriceError::NoData {
            symbol: symbol.to_string(),
        });
    }
    Ok(prices)
}

/// Inner join of cap-weighted and equal-weighted closes on date.
pub fn align_breadth(cap: &[PricePoint], equal: &[PricePoint]) -> Vec<BreadthPoint> {
    let mut points = Vec::with_capacity(cap.len().min(equal.len()));
    let (mut i, mut j) = (0, 0);
    while i < cap.len() && j < equal.len() {
        match cap[i].date.cmp(&equal[j].date) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                points.push(BreadthPoint::new(cap[i].date, cap[i].close, equal[j].close));
                i += 1;
                j += 1;
            }
        }
    }
    points
}

/// Monthly closes of the cap-weighted index over its full history.
pub async fn fetch_market_prices(source: &dyn PriceSource) -> Result<Vec<PricePoint>, PriceError> {
    let prices = source
        .fetch_closes(MARKET_SYMBOL, MARKET_RANGE, PriceInterval::Monthly)
        .await?;
    info!(
        symbol = MARKET_SYMBOL,
        rows = prices.len(),
        latest = ?prices.last().map(|p| p.date),
        "Market closes downloaded"
    );
    Ok(prices)
}

/// Daily cap-weighted vs equal-weighted closes on the dates both traded.
pub async fn fetch_breadth_prices(
    source: &dyn PriceSource,
) -> Result<Vec<BreadthPoint>, PriceError> {
    let cap = source
        .fetch_closes(MARKET_SYMBOL, BREADTH_RANGE, PriceInterval::Daily)
        .await?;
    let equal = source
        .fetch_closes(EQUAL_WEIGHT_SYMBOL, BREADTH_RANGE, PriceInterval::Daily)
        .await?;
    let points = align_breadth(&cap, &equal);
    info!(
        cap_rows = cap.len(),
        equal_rows = equal.len(),
        aligned = points.len(),
        "Breadth closes downloaded"
    );
    Ok(points)
}

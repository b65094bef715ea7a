//! Integration tests for the price downloader and input refresh

use std::time::Duration;

use chrono::NaiveDate;
use levercast::core::refresh::refresh_prices;
use levercast::models::PricePoint;
use levercast::services::prices::{
    align_breadth, PriceError, PriceInterval, PriceSource, YahooChartClient,
};
use levercast::services::store::DataStore;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GSPC_PATH: &str = r"^/v8/finance/chart/(\^|%5E)GSPC$";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn chart_body(timestamps: &[i64], closes: &[Option<f64>]) -> String {
    json!({
        "chart": {
            "result": [{
                "meta": { "currency": "USD" },
                "timestamp": timestamps,
                "indicators": {
                    "quote": [{ "close": closes }],
                    "adjclose": [{ "adjclose": closes }]
                }
            }],
            "error": null
        }
    })
    .to_string()
}

fn client_for(server: &MockServer) -> YahooChartClient {
    YahooChartClient::with_client(&server.uri(), reqwest::Client::new())
        .expect("valid base url")
        .with_retry_policy(2, Duration::from_millis(10))
}

async fn mount_gspc(server: &MockServer, interval: &str, body: String) {
    Mock::given(method("GET"))
        .and(path_regex(GSPC_PATH))
        .and(query_param("interval", interval))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn parses_monthly_closes_and_skips_nulls() {
    let server = MockServer::start().await;
    mount_gspc(
        &server,
        "1mo",
        chart_body(
            &[1706745600, 1704067200, 1709251200],
            &[Some(5096.27), Some(4845.65), None],
        ),
    )
    .await;

    let client = client_for(&server);
    let prices = client
        .fetch_closes("^GSPC", "max", PriceInterval::Monthly)
        .await
        .unwrap();
    assert_eq!(
        prices,
        vec![
            PricePoint::new(date(2024, 1, 1), 4845.65),
            PricePoint::new(date(2024, 2, 1), 5096.27),
        ]
    );
}

#[tokio::test]
async fn chart_error_body_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/RSP"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            json!({
                "chart": {
                    "result": null,
                    "error": { "code": "Not Found", "description": "No data found" }
                }
            })
            .to_string(),
        ))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .fetch_closes("RSP", "5y", PriceInterval::Daily)
        .await
        .unwrap_err();
    assert!(matches!(err, PriceError::Api { ref code, .. } if code == "Not Found"));
}

#[tokio::test]
async fn rejects_non_json_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/RSP"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>blocked</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .fetch_closes("RSP", "5y", PriceInterval::Daily)
        .await
        .unwrap_err();
    assert!(matches!(err, PriceError::UnexpectedPayload { .. }));
}

#[tokio::test]
async fn retries_rate_limited_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/RSP"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(chart_body(&[1709562600], &[Some(168.4)])),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let prices = client
        .fetch_closes("RSP", "5y", PriceInterval::Daily)
        .await
        .unwrap();
    assert_eq!(prices, vec![PricePoint::new(date(2024, 3, 4), 168.4)]);
}

#[tokio::test]
async fn not_found_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .fetch_closes("RSP", "5y", PriceInterval::Daily)
        .await
        .unwrap_err();
    assert!(matches!(err, PriceError::Status { status: 404, .. }));
}

#[tokio::test]
async fn refresh_writes_market_and_breadth_inputs() {
    let server = MockServer::start().await;
    mount_gspc(
        &server,
        "1mo",
        chart_body(&[1704067200, 1706745600], &[Some(4845.65), Some(5096.27)]),
    )
    .await;
    mount_gspc(
        &server,
        "1d",
        chart_body(
            &[1709562600, 1709649000, 1709735400],
            &[Some(5130.95), Some(5078.65), Some(5104.76)],
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/RSP"))
        .respond_with(ResponseTemplate::new(200).set_body_string(chart_body(
            &[1709562600, 1709735400],
            &[Some(168.4), Some(168.9)],
        )))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let store = DataStore::new(dir.path());
    let written = refresh_prices(&store, &client_for(&server)).await.unwrap();
    assert_eq!(written.market_rows, 2);
    assert_eq!(written.breadth_rows, Some(2));

    let market = store.load_market_prices().unwrap();
    assert_eq!(market[1], PricePoint::new(date(2024, 2, 1), 5096.27));

    let breadth = store.load_breadth_prices().unwrap();
    assert_eq!(breadth.len(), 2);
    assert_eq!(breadth[0].date, date(2024, 3, 4));
    assert_eq!(breadth[1].cap_price, 5104.76);
    assert_eq!(breadth[1].equal_price, 168.9);
}

#[tokio::test]
async fn breadth_failure_keeps_market_refresh() {
    let server = MockServer::start().await;
    mount_gspc(
        &server,
        "1mo",
        chart_body(&[1704067200], &[Some(4845.65)]),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let store = DataStore::new(dir.path());
    let written = refresh_prices(&store, &client_for(&server)).await.unwrap();
    assert_eq!(written.market_rows, 1);
    assert_eq!(written.breadth_rows, None);
    assert_eq!(store.load_market_prices().unwrap().len(), 1);
    assert!(store.load_breadth_prices().unwrap().is_empty());
}

#[test]
fn chart_url_carries_range_and_interval() {
    let client =
        YahooChartClient::with_client("https://charts.example.org", reqwest::Client::new()).unwrap();
    let url = client
        .chart_url("RSP", "5y", PriceInterval::Daily)
        .unwrap();
    assert_eq!(
        url.as_str(),
        "https://charts.example.org/v8/finance/chart/RSP?range=5y&interval=1d"
    );
}

#[test]
fn breadth_alignment_keeps_common_dates() {
    let cap = vec![
        PricePoint::new(date(2024, 3, 4), 10.0),
        PricePoint::new(date(2024, 3, 5), 11.0),
        PricePoint::new(date(2024, 3, 6), 12.0),
    ];
    let equal = vec![
        PricePoint::new(date(2024, 3, 1), 1.0),
        PricePoint::new(date(2024, 3, 5), 2.0),
        PricePoint::new(date(2024, 3, 6), 3.0),
    ];
    let aligned = align_breadth(&cap, &equal);
    assert_eq!(aligned.len(), 2);
    assert_eq!(aligned[0].date, date(2024, 3, 5));
    assert_eq!(aligned[0].cap_price, 11.0);
    assert_eq!(aligned[0].equal_price, 2.0);
}

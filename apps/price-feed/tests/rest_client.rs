//! REST Pull Source Integration Tests
//!
//! Exercises the 24h ticker client against a wiremock server.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use price_feed::{
    PullError, QuoteAsset, RestSettings, StatsSource, TickerStatsClient, TradingPair,
};

fn client_for(server: &MockServer) -> TickerStatsClient {
    TickerStatsClient::new(RestSettings {
        base_url: server.uri(),
        request_timeout: Duration::from_secs(5),
    })
    .unwrap()
}

fn sol_pair() -> TradingPair {
    TradingPair::parse("SOL", QuoteAsset::Usdc).unwrap()
}

#[tokio::test]
async fn fetches_day_stats() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/ticker/24hr"))
        .and(query_param("symbol", "SOLUSDC"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"symbol":"SOLUSDC","lastPrice":"150.23000000","priceChangePercent":"2.100","volume":"1234.5"}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let stats = client_for(&server)
        .fetch_day_stats(&sol_pair())
        .await
        .unwrap();
    assert_eq!(stats.last_price, "150.23".parse().unwrap());
    assert_eq!(stats.change_percent_24h, "2.1".parse().unwrap());
}

#[tokio::test]
async fn non_success_status_is_a_failed_pull() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/ticker/24hr"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_day_stats(&sol_pair())
        .await
        .unwrap_err();
    assert!(matches!(err, PullError::Status(502)));
}

#[tokio::test]
async fn undecodable_body_is_a_parse_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/ticker/24hr"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_day_stats(&sol_pair())
        .await
        .unwrap_err();
    assert!(matches!(err, PullError::Parse(_)));
}

#[tokio::test]
async fn non_numeric_price_is_a_parse_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/ticker/24hr"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"lastPrice":"unavailable","priceChangePercent":"2.1"}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_day_stats(&sol_pair())
        .await
        .unwrap_err();
    assert!(matches!(err, PullError::Parse(_)));
}

#[tokio::test]
async fn unreachable_endpoint_is_a_request_failure() {
    // Port 9 (discard) should refuse connections immediately.
    let client = TickerStatsClient::new(RestSettings {
        base_url: "http://127.0.0.1:9".to_string(),
        request_timeout: Duration::from_secs(1),
    })
    .unwrap();

    let err = client.fetch_day_stats(&sol_pair()).await.unwrap_err();
    assert!(matches!(err, PullError::Request(_)));
}

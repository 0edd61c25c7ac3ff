//! 24h Ticker REST Client
//!
//! Pull-source adapter over the venue's 24-hour ticker statistics endpoint:
//! `GET {base}/api/v3/ticker/24hr?symbol={PAIR}`. The fields of interest are
//! `lastPrice` and `priceChangePercent`, both decimal strings.
//!
//! Non-success statuses and undecodable bodies are mapped into [`PullError`];
//! the resolver treats every variant as "no update this cycle".

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::application::ports::{PullError, StatsSource};
use crate::domain::snapshot::DayStats;
use crate::domain::symbol::TradingPair;

/// Default REST endpoint base.
pub const DEFAULT_REST_BASE_URL: &str = "https://api.binance.com";

/// Settings for the pull source.
#[derive(Debug, Clone)]
pub struct RestSettings {
    /// Endpoint base URL, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl Default for RestSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_REST_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Subset of the venue's 24hr ticker payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DayStatsPayload {
    #[serde(with = "rust_decimal::serde::str")]
    last_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    price_change_percent: Decimal,
}

/// HTTP client for 24h ticker statistics.
#[derive(Debug, Clone)]
pub struct TickerStatsClient {
    http: reqwest::Client,
    settings: RestSettings,
}

impl TickerStatsClient {
    /// Create a client with the given settings.
    ///
    /// # Errors
    ///
    /// Returns the underlying builder error if the HTTP client cannot be
    /// constructed.
    pub fn new(settings: RestSettings) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()?;
        Ok(Self { http, settings })
    }
}

#[async_trait]
impl StatsSource for TickerStatsClient {
    async fn fetch_day_stats(&self, pair: &TradingPair) -> Result<DayStats, PullError> {
        let url = format!("{}/api/v3/ticker/24hr", self.settings.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("symbol", pair.ticker_symbol())])
            .send()
            .await
            .map_err(|e| PullError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PullError::Status(status.as_u16()));
        }

        let payload: DayStatsPayload = response
            .json()
            .await
            .map_err(|e| PullError::Parse(e.to_string()))?;

        Ok(DayStats {
            last_price: payload.last_price,
            change_percent_24h: payload.price_change_percent,
        })
    }
}

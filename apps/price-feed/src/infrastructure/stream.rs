//! Per-Tick WebSocket Channel
//!
//! Push-channel adapter over the venue's per-symbol ticker stream:
//! `{base}/ws/{pair}@ticker` with a lower-cased pair name. Each text frame
//! carries the current price in `c` and the 24h percent change in `P`, both
//! decimal strings.
//!
//! The adapter owns its reconnect policy: a lost connection emits
//! [`ChannelEvent::Lost`], backs off, and retries until cancelled or the
//! retry budget runs out. Malformed frames are discarded here and never
//! reach the resolver.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use rust_decimal::Decimal;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{ChannelError, ChannelEvent, TickChannel};
use crate::domain::snapshot::TickerTick;
use crate::domain::symbol::TradingPair;
use crate::infrastructure::reconnect::{BackoffConfig, BackoffPolicy};

/// Default stream endpoint base.
pub const DEFAULT_STREAM_BASE_URL: &str = "wss://stream.binance.com:9443";

/// Settings for the push channel.
#[derive(Debug, Clone)]
pub struct StreamSettings {
    /// Stream base URL, without a trailing slash.
    pub base_url: String,
    /// Reconnect backoff configuration.
    pub backoff: BackoffConfig,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_STREAM_BASE_URL.to_string(),
            backoff: BackoffConfig::default(),
        }
    }
}

/// Per-tick ticker frame, subset of the venue's `@ticker` stream payload.
#[derive(Debug, Deserialize)]
struct TickerFrame {
    /// Last price.
    #[serde(rename = "c", with = "rust_decimal::serde::str")]
    last_price: Decimal,
    /// 24h price change percent.
    #[serde(rename = "P", with = "rust_decimal::serde::str")]
    price_change_percent: Decimal,
}

fn decode_tick(text: &str) -> Result<TickerTick, ChannelError> {
    let frame: TickerFrame =
        serde_json::from_str(text).map_err(|e| ChannelError::Malformed(e.to_string()))?;
    Ok(TickerTick {
        price: frame.last_price,
        change_percent_24h: frame.price_change_percent,
    })
}

/// WebSocket client for the venue ticker stream.
#[derive(Debug, Clone)]
pub struct BinanceTickChannel {
    settings: StreamSettings,
}

impl BinanceTickChannel {
    /// Create a channel adapter with the given settings.
    #[must_use]
    pub const fn new(settings: StreamSettings) -> Self {
        Self { settings }
    }

    /// Connect and forward ticks until cancellation or connection loss.
    ///
    /// `Ok(())` means the session was cancelled; any `Err` is a lost
    /// connection the caller may retry.
    async fn connect_and_forward(
        &self,
        url: &str,
        events: &mpsc::Sender<ChannelEvent>,
        cancel: &CancellationToken,
        policy: &mut BackoffPolicy,
    ) -> Result<(), ChannelError> {
        tracing::debug!(%url, "connecting to ticker stream");
        let (ws_stream, _response) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| ChannelError::Open(e.to_string()))?;
        let (mut write, mut read) = ws_stream.split();

        // The stream name in the URL is the subscription; a successful
        // handshake means ticks will flow.
        policy.reset();
        tracing::info!(%url, "ticker stream connected");
        let _ = events.send(ChannelEvent::Opened).await;

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    let _ = write.send(Message::Close(None)).await;
                    return Ok(());
                }
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => match decode_tick(&text) {
                            Ok(tick) => {
                                let _ = events.send(ChannelEvent::Tick(tick)).await;
                            }
                            Err(e) => {
                                // Discard this frame only; the channel stays up.
                                tracing::debug!(error = %e, "discarding malformed ticker frame");
                            }
                        },
                        Some(Ok(Message::Ping(data))) => {
                            write
                                .send(Message::Pong(data))
                                .await
                                .map_err(|e| ChannelError::Transport(e.to_string()))?;
                        }
                        Some(Ok(Message::Close(_))) => {
                            tracing::info!("server sent close frame");
                            return Err(ChannelError::Closed);
                        }
                        Some(Ok(_)) => {
                            // Ignore binary/pong frames.
                        }
                        Some(Err(e)) => {
                            return Err(ChannelError::Transport(e.to_string()));
                        }
                        None => {
                            tracing::info!("ticker stream ended");
                            return Err(ChannelError::Closed);
                        }
                    }
                }
            }
        }
    }
}

#[async_trait]
impl TickChannel for BinanceTickChannel {
    async fn run(
        &self,
        pair: TradingPair,
        events: mpsc::Sender<ChannelEvent>,
        cancel: CancellationToken,
    ) {
        let url = format!("{}/ws/{}", self.settings.base_url, pair.stream_name());
        let mut policy = BackoffPolicy::new(self.settings.backoff.clone());

        loop {
            if cancel.is_cancelled() {
                return;
            }
            match self
                .connect_and_forward(&url, &events, &cancel, &mut policy)
                .await
            {
                Ok(()) => return,
                Err(e) => {
                    tracing::warn!(pair = %pair, error = %e, "ticker stream lost");
                    let _ = events.send(ChannelEvent::Lost(e)).await;

                    let Some(delay) = policy.next_delay() else {
                        tracing::warn!(pair = %pair, "channel retry budget exhausted");
                        return;
                    };
                    let _ = events
                        .send(ChannelEvent::Retrying {
                            attempt: policy.attempt(),
                        })
                        .await;
                    tokio::select! {
                        () = cancel.cancelled() => return,
                        () = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
    }
}

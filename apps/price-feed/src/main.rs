//! Price Feed Binary
//!
//! Watches one or more symbols and logs snapshot and channel-state updates.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p price-feed -- SOL BTC
//! ```
//!
//! # Environment Variables
//!
//! - `PRICE_FEED_SYMBOLS`: comma-separated symbols, used when no arguments
//!   are given (default: SOL)
//! - `PRICE_FEED_REST_URL` / `PRICE_FEED_STREAM_URL`: endpoint overrides
//! - `PRICE_FEED_QUOTE_ASSET`: USDC | USDT (default: USDC)
//! - `PRICE_FEED_POLL_INTERVAL_SECS`: pull interval (default: 5)
//! - `RUST_LOG`: log filter (default: price_feed=info)

use price_feed::{
    BinanceTickChannel, FeedConfig, PriceFeedResolver, PriceFeedSession, TickerStatsClient,
    telemetry,
};
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    #[allow(clippy::expect_used)]
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let _ = dotenvy::dotenv();

    telemetry::init();

    let config = FeedConfig::from_env();
    tracing::info!(
        rest_url = %config.rest.base_url,
        stream_url = %config.stream.base_url,
        poll_interval_secs = config.resolver.poll_interval.as_secs(),
        quote = config.resolver.quote.as_str(),
        "Configuration loaded"
    );

    let stats = TickerStatsClient::new(config.rest.clone())?;
    let channel = BinanceTickChannel::new(config.stream.clone());
    let resolver = PriceFeedResolver::new(stats, channel, config.resolver.clone());

    let mut sessions = Vec::new();
    for symbol in watched_symbols() {
        match resolver.watch(&symbol) {
            Ok(session) => {
                tracing::info!(symbol = %symbol, pair = %session.pair(), "watching");
                spawn_session_logger(&session);
                sessions.push(session);
            }
            Err(e) => {
                tracing::error!(symbol = %symbol, error = %e, "skipping invalid symbol");
            }
        }
    }

    if sessions.is_empty() {
        anyhow::bail!("no valid symbols to watch");
    }

    await_shutdown().await;

    for session in &sessions {
        session.unwatch();
    }
    tracing::info!("price feed stopped");
    Ok(())
}

/// Symbols from the command line, falling back to `PRICE_FEED_SYMBOLS`.
fn watched_symbols() -> Vec<String> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if !args.is_empty() {
        return args;
    }
    std::env::var("PRICE_FEED_SYMBOLS")
        .unwrap_or_else(|_| "SOL".to_string())
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Log every snapshot and channel-state update for a session.
fn spawn_session_logger(session: &PriceFeedSession) {
    let mut snapshot_rx = session.snapshot_updates();
    let mut state_rx = session.state_updates();
    let pair = session.pair().clone();

    tokio::spawn(async move {
        loop {
            tokio::select! {
                changed = snapshot_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = *snapshot_rx.borrow_and_update();
                    if let Some(s) = snapshot {
                        tracing::info!(
                            pair = %pair,
                            price = %s.price,
                            change_24h = %s.change_percent_24h,
                            observed_at = %s.observed_at,
                            "price update"
                        );
                    }
                }
                changed = state_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let state = *state_rx.borrow_and_update();
                    tracing::info!(pair = %pair, state = state.as_str(), "channel state");
                }
            }
        }
    });
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
#[allow(clippy::expect_used)]
async fn await_shutdown() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}

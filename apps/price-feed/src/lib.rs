#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::default_trait_access
    )
)]

//! Price Feed - Live Price Resolver
//!
//! Maintains a best-effort current price and 24-hour change percentage for
//! trading symbols, preferring a low-latency push channel (WebSocket ticker
//! stream) and transparently degrading to periodic pull requests (HTTP 24h
//! ticker endpoint) when the push channel is unavailable or fails.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Snapshot and symbol types with no external I/O
//!   - `snapshot`: Price observations and channel state
//!   - `symbol`: Trading pair normalization
//!
//! - **Application**: Port definitions and the resolver session loop
//!   - `ports`: Interfaces for the pull source and the push channel
//!   - `resolver`: Per-session state machine (`watch`/`unwatch`)
//!
//! - **Infrastructure**: Venue adapters and external integrations
//!   - `rest`: 24h ticker HTTP client
//!   - `stream`: Per-tick WebSocket client with reconnect backoff
//!   - `config`: Environment-driven configuration
//!   - `telemetry`: Tracing setup
//!
//! # Data Flow
//!
//! ```text
//! Ticker WS  ──┐
//!              ├────► Session ────► watch channels ──► consumer
//! 24h REST   ──┘       loop          (snapshot, state)
//!   (5s poll, suspended while streaming)
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - core price feed types with no external I/O.
pub mod domain;

/// Application layer - port definitions and the resolver session loop.
pub mod application;

/// Infrastructure layer - venue adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::snapshot::{ChannelState, DayStats, PriceSnapshot, TickerTick};
pub use domain::symbol::{QuoteAsset, SymbolError, TradingPair};

// Application ports and resolver
pub use application::ports::{ChannelError, ChannelEvent, PullError, StatsSource, TickChannel};
pub use application::resolver::{
    DEFAULT_POLL_INTERVAL, PriceFeedResolver, PriceFeedSession, ResolverConfig,
};

// Infrastructure adapters
pub use infrastructure::config::FeedConfig;
pub use infrastructure::reconnect::{BackoffConfig, BackoffPolicy};
pub use infrastructure::rest::{RestSettings, TickerStatsClient};
pub use infrastructure::stream::{BinanceTickChannel, StreamSettings};
pub use infrastructure::telemetry;

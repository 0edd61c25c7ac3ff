//! Price Snapshot Types
//!
//! The canonical internal representation of a live price observation and the
//! acquisition-channel state. Both acquisition paths (push ticks and periodic
//! pulls) funnel into [`PriceSnapshot::accept`], which is the single guard
//! against non-positive prices reaching consumers.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The latest known price observation for a trading pair.
///
/// Consumers only ever see the most recent snapshot; there is no history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    /// Last traded price. Always strictly positive.
    pub price: Decimal,
    /// Signed 24-hour change in percent.
    pub change_percent_24h: Decimal,
    /// When this observation was recorded locally.
    pub observed_at: DateTime<Utc>,
}

impl PriceSnapshot {
    /// Build a snapshot from a candidate observation, stamping `observed_at`
    /// with the current time.
    ///
    /// Returns `None` for non-positive prices: a zero or invalid price must
    /// never become the displayed price, so such observations are discarded
    /// instead of propagated.
    #[must_use]
    pub fn accept(price: Decimal, change_percent_24h: Decimal) -> Option<Self> {
        if price <= Decimal::ZERO {
            return None;
        }
        Some(Self {
            price,
            change_percent_24h,
            observed_at: Utc::now(),
        })
    }
}

/// Which acquisition path is currently authoritative for snapshot updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChannelState {
    /// Periodic pull requests drive updates. Initial state.
    #[default]
    Pulling,
    /// The push channel is open and drives updates; no new pulls are
    /// scheduled.
    Streaming,
}

impl ChannelState {
    /// Get the state name for logging.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pulling => "pulling",
            Self::Streaming => "streaming",
        }
    }
}

/// A decoded 24-hour statistics response from the pull source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayStats {
    /// Last traded price.
    pub last_price: Decimal,
    /// Signed 24-hour change in percent.
    pub change_percent_24h: Decimal,
}

/// A decoded per-tick update from the push channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickerTick {
    /// Current price.
    pub price: Decimal,
    /// Signed 24-hour change in percent.
    pub change_percent_24h: Decimal,
}

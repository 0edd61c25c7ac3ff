//! Port Interfaces
//!
//! Contracts between the resolver session loop and the venue adapters.
//!
//! - [`StatsSource`]: client-initiated pull of 24h ticker statistics.
//! - [`TickChannel`]: server-initiated push stream of per-tick updates.
//!
//! Both error taxonomies here are recovered locally by the resolver; nothing
//! in this layer propagates an error to the caller of `watch`.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::domain::snapshot::{DayStats, TickerTick};
use crate::domain::symbol::TradingPair;

/// Errors from the pull path. Every variant means "no update this cycle";
/// the prior snapshot is kept and the loop continues.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PullError {
    /// The request could not be sent or the transport failed mid-response.
    #[error("pull request failed: {0}")]
    Request(String),
    /// The endpoint answered with a non-success status.
    #[error("pull request returned status {0}")]
    Status(u16),
    /// The response body could not be decoded.
    #[error("pull response parse failed: {0}")]
    Parse(String),
}

/// Errors from the push path.
///
/// `Open`, `Transport` and `Closed` mean the channel is lost and the resolver
/// degrades to pulling. Malformed frames are discarded inside the adapter and
/// never reach the resolver.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ChannelError {
    /// The channel could not be established.
    #[error("channel open failed: {0}")]
    Open(String),
    /// The underlying transport failed while the channel was open.
    #[error("channel transport error: {0}")]
    Transport(String),
    /// A frame could not be decoded into a tick.
    #[error("malformed channel message: {0}")]
    Malformed(String),
    /// The remote end closed the channel.
    #[error("channel closed unexpectedly")]
    Closed,
}

/// Lifecycle events and ticks emitted by a [`TickChannel`] implementation.
#[derive(Debug, Clone)]
pub enum ChannelEvent {
    /// The channel is established; push updates are now authoritative.
    Opened,
    /// A per-tick update arrived on an open channel.
    Tick(TickerTick),
    /// The channel was lost (open failure, transport error, or remote
    /// close). Pull polling becomes authoritative again.
    Lost(ChannelError),
    /// The adapter is about to retry establishing the channel.
    Retrying {
        /// Reconnection attempt number.
        attempt: u32,
    },
}

/// Pull source for 24-hour ticker statistics.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatsSource: Send + Sync + 'static {
    /// Fetch the current 24h statistics for `pair`.
    async fn fetch_day_stats(&self, pair: &TradingPair) -> Result<DayStats, PullError>;
}

/// Push channel delivering per-tick updates for a trading pair.
#[async_trait]
pub trait TickChannel: Send + Sync + 'static {
    /// Run the channel for `pair`, emitting [`ChannelEvent`]s on `events`
    /// until `cancel` fires or the implementation gives up on the channel.
    ///
    /// Implementations own their reconnect policy: after a lost connection
    /// they emit [`ChannelEvent::Lost`], back off, and retry. Returning
    /// before cancellation means the channel is permanently unavailable for
    /// this session.
    async fn run(
        &self,
        pair: TradingPair,
        events: mpsc::Sender<ChannelEvent>,
        cancel: CancellationToken,
    );
}

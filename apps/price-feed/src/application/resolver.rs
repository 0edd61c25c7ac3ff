//! Price Feed Resolver
//!
//! Maintains a best-effort current price and 24h change for a trading pair,
//! sourcing data opportunistically from whichever channel is healthiest. The
//! push channel is preferred; periodic pulls are the backstop.
//!
//! # State Machine
//!
//! ```text
//!           channel opened
//! Pulling ─────────────────► Streaming
//!    ▲                           │
//!    └───────────────────────────┘
//!        channel lost / closed
//! ```
//!
//! - `Pulling` (initial): a pull fires immediately, then on a fixed interval.
//! - `Pulling -> Streaming`: on channel open. No new pulls are scheduled; an
//!   in-flight pull may still complete and update the snapshot once.
//! - `Streaming -> Pulling`: on channel loss. The next pull fires at once.
//!
//! No failure is fatal to a session: pull errors skip a cycle, channel loss
//! degrades to pulling, and the only caller-visible health signal is the
//! [`ChannelState`] value.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::application::ports::{ChannelEvent, StatsSource, TickChannel};
use crate::domain::snapshot::{ChannelState, PriceSnapshot};
use crate::domain::symbol::{QuoteAsset, SymbolError, TradingPair};

/// Default interval between pull requests while no channel is open.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Buffer for channel lifecycle events and ticks.
const CHANNEL_EVENT_BUFFER: usize = 256;

/// Buffer for in-flight pull results. At most one pull is outstanding, so
/// this never fills.
const PULL_RESULT_BUFFER: usize = 4;

/// Resolver tuning knobs.
///
/// `poll_interval` rate-limits network pulls; `publish_throttle` rate-limits
/// snapshot notifications from push ticks. These are deliberately separate
/// concerns: a venue tick stream can emit many updates per second, and
/// consumers rendering the snapshot may want fewer notifications without
/// pulling any less often.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Quote asset used to normalize caller symbols into trading pairs.
    pub quote: QuoteAsset,
    /// Interval between pull requests while in the `Pulling` state.
    pub poll_interval: Duration,
    /// Minimum spacing between snapshot publications driven by push ticks.
    /// Zero disables throttling. Pull updates are never throttled.
    pub publish_throttle: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            quote: QuoteAsset::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            publish_throttle: Duration::ZERO,
        }
    }
}

/// Live handle to one "watch a symbol" session.
///
/// The session owns its pull timer and push channel exclusively; dropping the
/// handle (or calling [`unwatch`](Self::unwatch)) tears both down. No timers
/// or sockets survive the handle, so rapid watch/unwatch cycles cannot leak.
#[derive(Debug)]
pub struct PriceFeedSession {
    pair: TradingPair,
    snapshot_rx: watch::Receiver<Option<PriceSnapshot>>,
    state_rx: watch::Receiver<ChannelState>,
    cancel: CancellationToken,
}

impl PriceFeedSession {
    /// Get the normalized trading pair this session watches.
    #[must_use]
    pub const fn pair(&self) -> &TradingPair {
        &self.pair
    }

    /// Get the latest snapshot, or `None` before the first accepted update.
    #[must_use]
    pub fn snapshot(&self) -> Option<PriceSnapshot> {
        *self.snapshot_rx.borrow()
    }

    /// Get the current channel state.
    #[must_use]
    pub fn channel_state(&self) -> ChannelState {
        *self.state_rx.borrow()
    }

    /// Subscribe to snapshot updates.
    #[must_use]
    pub fn snapshot_updates(&self) -> watch::Receiver<Option<PriceSnapshot>> {
        self.snapshot_rx.clone()
    }

    /// Subscribe to channel state transitions.
    #[must_use]
    pub fn state_updates(&self) -> watch::Receiver<ChannelState> {
        self.state_rx.clone()
    }

    /// Stop all acquisition activity for this session.
    ///
    /// Cancels the pull timer and closes the push channel. Idempotent and
    /// safe to call in any state; also performed on `Drop`.
    pub fn unwatch(&self) {
        self.cancel.cancel();
    }
}

impl Drop for PriceFeedSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Resolver factory: builds watch sessions over a pull source and a push
/// channel.
///
/// Safe to call [`watch`](Self::watch) repeatedly for different symbols; each
/// session owns per-session state only (no shared registry keyed by symbol).
pub struct PriceFeedResolver<S, C> {
    stats: Arc<S>,
    channel: Arc<C>,
    config: ResolverConfig,
}

impl<S, C> PriceFeedResolver<S, C>
where
    S: StatsSource,
    C: TickChannel,
{
    /// Create a resolver over the given acquisition ports.
    pub fn new(stats: S, channel: C, config: ResolverConfig) -> Self {
        Self {
            stats: Arc::new(stats),
            channel: Arc::new(channel),
            config,
        }
    }

    /// Start watching a symbol.
    ///
    /// An initial pull fires immediately and the push channel is opened
    /// concurrently. The returned session exposes the live snapshot and
    /// channel state.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolError`] if `symbol` cannot be normalized into a
    /// trading pair. This is the only error path visible to callers.
    pub fn watch(&self, symbol: &str) -> Result<PriceFeedSession, SymbolError> {
        let pair = TradingPair::parse(symbol, self.config.quote)?;
        let cancel = CancellationToken::new();
        let (snapshot_tx, snapshot_rx) = watch::channel(None);
        let (state_tx, state_rx) = watch::channel(ChannelState::Pulling);

        let task = SessionTask {
            stats: Arc::clone(&self.stats),
            channel: Arc::clone(&self.channel),
            config: self.config.clone(),
            pair: pair.clone(),
            snapshot_tx,
            state_tx,
            cancel: cancel.clone(),
        };
        tokio::spawn(task.run());

        Ok(PriceFeedSession {
            pair,
            snapshot_rx,
            state_rx,
            cancel,
        })
    }
}

/// Per-session acquisition loop. Owns the pull timer and supervises the push
/// channel task for exactly one trading pair.
struct SessionTask<S, C> {
    stats: Arc<S>,
    channel: Arc<C>,
    config: ResolverConfig,
    pair: TradingPair,
    snapshot_tx: watch::Sender<Option<PriceSnapshot>>,
    state_tx: watch::Sender<ChannelState>,
    cancel: CancellationToken,
}

impl<S, C> SessionTask<S, C>
where
    S: StatsSource,
    C: TickChannel,
{
    async fn run(self) {
        let (event_tx, mut event_rx) = mpsc::channel::<ChannelEvent>(CHANNEL_EVENT_BUFFER);
        let channel = Arc::clone(&self.channel);
        let channel_pair = self.pair.clone();
        let channel_cancel = self.cancel.child_token();
        tokio::spawn(async move {
            channel.run(channel_pair, event_tx, channel_cancel).await;
        });

        let (pull_tx, mut pull_rx) = mpsc::channel(PULL_RESULT_BUFFER);
        let mut pull_in_flight = false;

        // First tick completes immediately, covering the gap before the
        // channel is established.
        let mut ticker = tokio::time::interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut state = ChannelState::Pulling;
        let mut last_publish: Option<Instant> = None;
        let mut channel_alive = true;

        tracing::debug!(pair = %self.pair, "session started");

        loop {
            tokio::select! {
                () = self.cancel.cancelled() => {
                    tracing::debug!(pair = %self.pair, "session cancelled");
                    break;
                }
                _ = ticker.tick(), if state == ChannelState::Pulling => {
                    if pull_in_flight {
                        tracing::debug!(pair = %self.pair, "pull still in flight, skipping tick");
                    } else {
                        pull_in_flight = true;
                        let stats = Arc::clone(&self.stats);
                        let pair = self.pair.clone();
                        let results = pull_tx.clone();
                        tokio::spawn(async move {
                            let result = stats.fetch_day_stats(&pair).await;
                            let _ = results.send(result).await;
                        });
                    }
                }
                Some(result) = pull_rx.recv() => {
                    pull_in_flight = false;
                    match result {
                        Ok(day) => {
                            // A pull that was in flight when the channel
                            // opened still lands here once; with no further
                            // ticks scheduled it cannot land twice.
                            self.apply(day.last_price, day.change_percent_24h, "pull");
                        }
                        Err(e) => {
                            tracing::warn!(
                                pair = %self.pair,
                                error = %e,
                                "pull failed, keeping last snapshot"
                            );
                        }
                    }
                }
                event = event_rx.recv(), if channel_alive => {
                    match event {
                        Some(ChannelEvent::Opened) => {
                            if state != ChannelState::Streaming {
                                state = ChannelState::Streaming;
                                self.state_tx.send_replace(state);
                                tracing::info!(pair = %self.pair, "push channel open, pull loop suspended");
                            }
                        }
                        Some(ChannelEvent::Tick(tick)) => {
                            let throttle = self.config.publish_throttle;
                            let throttled = !throttle.is_zero()
                                && last_publish.is_some_and(|at| at.elapsed() < throttle);
                            if throttled {
                                // Render throttling: the snapshot keeps its
                                // previous value and this tick is dropped.
                            } else if self.apply(tick.price, tick.change_percent_24h, "push") {
                                last_publish = Some(Instant::now());
                            }
                        }
                        Some(ChannelEvent::Lost(e)) => {
                            tracing::warn!(pair = %self.pair, error = %e, "push channel lost");
                            if state == ChannelState::Streaming {
                                state = ChannelState::Pulling;
                                self.state_tx.send_replace(state);
                                ticker.reset_immediately();
                            }
                        }
                        Some(ChannelEvent::Retrying { attempt }) => {
                            tracing::debug!(pair = %self.pair, attempt, "push channel retrying");
                        }
                        None => {
                            channel_alive = false;
                            tracing::info!(pair = %self.pair, "push channel gave up, pull-only from here");
                            if state == ChannelState::Streaming {
                                state = ChannelState::Pulling;
                                self.state_tx.send_replace(state);
                                ticker.reset_immediately();
                            }
                        }
                    }
                }
            }
        }
        // Channel task holds a child token and unwinds with us; dropping the
        // ticker and pull receiver releases the rest.
    }

    /// Apply a candidate observation to the snapshot. Returns whether the
    /// snapshot was updated.
    fn apply(
        &self,
        price: rust_decimal::Decimal,
        change_percent_24h: rust_decimal::Decimal,
        source: &'static str,
    ) -> bool {
        match PriceSnapshot::accept(price, change_percent_24h) {
            Some(snapshot) => {
                self.snapshot_tx.send_replace(Some(snapshot));
                true
            }
            None => {
                tracing::debug!(
                    pair = %self.pair,
                    %price,
                    source,
                    "discarding non-positive price"
                );
                false
            }
        }
    }
}

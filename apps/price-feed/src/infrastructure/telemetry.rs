//! Tracing Setup
//!
//! Structured logging via `tracing` with an env-filter fmt subscriber.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: filter directives (default: `price_feed=info`)

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "price_feed=info";

/// Initialize the global tracing subscriber.
///
/// Call once at binary startup. Subsequent calls are ignored rather than
/// panicking, so tests may call this freely.
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}

//! Feed Configuration
//!
//! Configuration for the price feed, loaded from environment variables with
//! typed defaults. Nothing is required; with no environment set the feed
//! points at the public venue endpoints and polls every five seconds.

use std::time::Duration;

use crate::application::resolver::ResolverConfig;
use crate::domain::symbol::QuoteAsset;
use crate::infrastructure::reconnect::BackoffConfig;
use crate::infrastructure::rest::RestSettings;
use crate::infrastructure::stream::StreamSettings;

/// Complete feed configuration.
#[derive(Debug, Clone, Default)]
pub struct FeedConfig {
    /// Pull-source settings.
    pub rest: RestSettings,
    /// Push-channel settings.
    pub stream: StreamSettings,
    /// Resolver tuning.
    pub resolver: ResolverConfig,
}

impl FeedConfig {
    /// Load configuration from environment variables.
    ///
    /// Recognized variables (all optional):
    /// - `PRICE_FEED_REST_URL`
    /// - `PRICE_FEED_STREAM_URL`
    /// - `PRICE_FEED_QUOTE_ASSET` (USDC | USDT)
    /// - `PRICE_FEED_POLL_INTERVAL_SECS`
    /// - `PRICE_FEED_PUBLISH_THROTTLE_MS`
    /// - `PRICE_FEED_REQUEST_TIMEOUT_SECS`
    /// - `PRICE_FEED_RECONNECT_DELAY_INITIAL_MS`
    /// - `PRICE_FEED_RECONNECT_DELAY_MAX_SECS`
    /// - `PRICE_FEED_RECONNECT_DELAY_MULTIPLIER`
    /// - `PRICE_FEED_MAX_RECONNECT_ATTEMPTS`
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any variable source.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let rest = RestSettings {
            base_url: parse_string(
                lookup("PRICE_FEED_REST_URL"),
                RestSettings::default().base_url,
            ),
            request_timeout: parse_duration_secs(
                lookup("PRICE_FEED_REQUEST_TIMEOUT_SECS"),
                RestSettings::default().request_timeout,
            ),
        };

        let backoff = BackoffConfig {
            initial_delay: parse_duration_millis(
                lookup("PRICE_FEED_RECONNECT_DELAY_INITIAL_MS"),
                BackoffConfig::default().initial_delay,
            ),
            max_delay: parse_duration_secs(
                lookup("PRICE_FEED_RECONNECT_DELAY_MAX_SECS"),
                BackoffConfig::default().max_delay,
            ),
            multiplier: parse_f64(
                lookup("PRICE_FEED_RECONNECT_DELAY_MULTIPLIER"),
                BackoffConfig::default().multiplier,
            ),
            jitter_factor: BackoffConfig::default().jitter_factor,
            max_attempts: parse_u32(
                lookup("PRICE_FEED_MAX_RECONNECT_ATTEMPTS"),
                BackoffConfig::default().max_attempts,
            ),
        };

        let stream = StreamSettings {
            base_url: parse_string(
                lookup("PRICE_FEED_STREAM_URL"),
                StreamSettings::default().base_url,
            ),
            backoff,
        };

        let resolver = ResolverConfig {
            quote: lookup("PRICE_FEED_QUOTE_ASSET")
                .map(|s| QuoteAsset::from_str_case_insensitive(&s))
                .unwrap_or_default(),
            poll_interval: parse_duration_secs(
                lookup("PRICE_FEED_POLL_INTERVAL_SECS"),
                ResolverConfig::default().poll_interval,
            ),
            publish_throttle: parse_duration_millis(
                lookup("PRICE_FEED_PUBLISH_THROTTLE_MS"),
                ResolverConfig::default().publish_throttle,
            ),
        };

        Self {
            rest,
            stream,
            resolver,
        }
    }
}

fn parse_string(value: Option<String>, default: String) -> String {
    value.filter(|v| !v.is_empty()).unwrap_or(default)
}

fn parse_u32(value: Option<String>, default: u32) -> u32 {
    value.and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn parse_f64(value: Option<String>, default: f64) -> f64 {
    value.and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn parse_duration_secs(value: Option<String>, default: Duration) -> Duration {
    value
        .and_then(|v| v.parse::<u64>().ok())
        .map_or(default, Duration::from_secs)
}

fn parse_duration_millis(value: Option<String>, default: Duration) -> Duration {
    value
        .and_then(|v| v.parse::<u64>().ok())
        .map_or(default, Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> FeedConfig {
        let map: HashMap<&str, &str> = vars.iter().copied().collect();
        FeedConfig::from_lookup(|key| map.get(key).map(ToString::to_string))
    }

    #[test]
    fn defaults_point_at_public_endpoints() {
        let config = FeedConfig::default();
        assert_eq!(config.rest.base_url, "https://api.binance.com");
        assert_eq!(config.stream.base_url, "wss://stream.binance.com:9443");
        assert_eq!(config.resolver.poll_interval, Duration::from_secs(5));
        assert_eq!(config.resolver.quote, QuoteAsset::Usdc);
    }

    #[test]
    fn empty_lookup_matches_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.rest.base_url, FeedConfig::default().rest.base_url);
        assert_eq!(
            config.resolver.poll_interval,
            FeedConfig::default().resolver.poll_interval
        );
        assert_eq!(config.resolver.publish_throttle, Duration::ZERO);
    }

    #[test]
    fn variables_override_every_setting() {
        let config = config_from(&[
            ("PRICE_FEED_REST_URL", "https://rest.test"),
            ("PRICE_FEED_STREAM_URL", "wss://stream.test"),
            ("PRICE_FEED_QUOTE_ASSET", "usdt"),
            ("PRICE_FEED_POLL_INTERVAL_SECS", "2"),
            ("PRICE_FEED_PUBLISH_THROTTLE_MS", "250"),
            ("PRICE_FEED_REQUEST_TIMEOUT_SECS", "3"),
            ("PRICE_FEED_RECONNECT_DELAY_INITIAL_MS", "100"),
            ("PRICE_FEED_RECONNECT_DELAY_MAX_SECS", "7"),
            ("PRICE_FEED_RECONNECT_DELAY_MULTIPLIER", "3.0"),
            ("PRICE_FEED_MAX_RECONNECT_ATTEMPTS", "4"),
        ]);

        assert_eq!(config.rest.base_url, "https://rest.test");
        assert_eq!(config.rest.request_timeout, Duration::from_secs(3));
        assert_eq!(config.stream.base_url, "wss://stream.test");
        assert_eq!(
            config.stream.backoff.initial_delay,
            Duration::from_millis(100)
        );
        assert_eq!(config.stream.backoff.max_delay, Duration::from_secs(7));
        assert!((config.stream.backoff.multiplier - 3.0).abs() < f64::EPSILON);
        assert_eq!(config.stream.backoff.max_attempts, 4);
        assert_eq!(config.resolver.quote, QuoteAsset::Usdt);
        assert_eq!(config.resolver.poll_interval, Duration::from_secs(2));
        assert_eq!(config.resolver.publish_throttle, Duration::from_millis(250));
    }

    #[test]
    fn unparseable_values_fall_back_to_defaults() {
        let config = config_from(&[
            ("PRICE_FEED_REST_URL", ""),
            ("PRICE_FEED_POLL_INTERVAL_SECS", "soon"),
            ("PRICE_FEED_MAX_RECONNECT_ATTEMPTS", "-1"),
            ("PRICE_FEED_RECONNECT_DELAY_MULTIPLIER", "fast"),
        ]);

        assert_eq!(config.rest.base_url, FeedConfig::default().rest.base_url);
        assert_eq!(config.resolver.poll_interval, Duration::from_secs(5));
        assert_eq!(config.stream.backoff.max_attempts, 0);
        assert!(
            (config.stream.backoff.multiplier - BackoffConfig::default().multiplier).abs()
                < f64::EPSILON
        );
    }

    #[test]
    fn unknown_quote_asset_defaults_to_usdc() {
        let config = config_from(&[("PRICE_FEED_QUOTE_ASSET", "eur")]);
        assert_eq!(config.resolver.quote, QuoteAsset::Usdc);
    }

    #[test]
    fn backoff_defaults() {
        let backoff = BackoffConfig::default();
        assert_eq!(backoff.initial_delay, Duration::from_millis(500));
        assert_eq!(backoff.max_delay, Duration::from_secs(30));
        assert_eq!(backoff.max_attempts, 0);
    }
}

//! Reconnection Backoff
//!
//! Exponential backoff with jitter for re-establishing the push channel
//! after a lost connection.

use std::time::Duration;

use rand::Rng;

/// Configuration for channel reconnection behavior.
#[derive(Debug, Clone)]
pub struct BackoffConfig {
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound on the delay between retries.
    pub max_delay: Duration,
    /// Growth factor applied after each retry (2.0 doubles the delay).
    pub multiplier: f64,
    /// Jitter as a fraction of the delay (0.1 = ±10%).
    pub jitter_factor: f64,
    /// Retry budget; 0 means retry forever.
    pub max_attempts: u32,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
            jitter_factor: 0.1,
            max_attempts: 0,
        }
    }
}

/// Stateful backoff schedule for one channel.
///
/// Call [`next_delay`](Self::next_delay) before each retry and
/// [`reset`](Self::reset) after a successful open.
#[derive(Debug)]
pub struct BackoffPolicy {
    config: BackoffConfig,
    next_millis: u64,
    attempt: u32,
}

impl BackoffPolicy {
    /// Create a policy from configuration.
    #[must_use]
    pub fn new(config: BackoffConfig) -> Self {
        let next_millis = duration_millis(config.initial_delay);
        Self {
            config,
            next_millis,
            attempt: 0,
        }
    }

    /// Get the delay before the next retry, or `None` when the retry budget
    /// is exhausted.
    #[must_use]
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.config.max_attempts > 0 && self.attempt >= self.config.max_attempts {
            return None;
        }
        self.attempt += 1;

        let delay = Duration::from_millis(self.jittered(self.next_millis));

        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let grown = (self.next_millis as f64 * self.config.multiplier) as u64;
        self.next_millis = grown.min(duration_millis(self.config.max_delay)).max(1);

        Some(delay)
    }

    /// Reset the schedule after a successful connection.
    pub fn reset(&mut self) {
        self.next_millis = duration_millis(self.config.initial_delay);
        self.attempt = 0;
    }

    /// Get the number of retries taken since the last reset.
    #[must_use]
    pub const fn attempt(&self) -> u32 {
        self.attempt
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn jittered(&self, millis: u64) -> u64 {
        if self.config.jitter_factor <= 0.0 {
            return millis;
        }
        let spread = millis as f64 * self.config.jitter_factor;
        let offset: f64 = rand::rng().random_range(-spread..=spread);
        ((millis as f64 + offset).max(1.0)) as u64
    }
}

fn duration_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_jitter(initial_ms: u64, max_ms: u64, max_attempts: u32) -> BackoffPolicy {
        BackoffPolicy::new(BackoffConfig {
            initial_delay: Duration::from_millis(initial_ms),
            max_delay: Duration::from_millis(max_ms),
            multiplier: 2.0,
            jitter_factor: 0.0,
            max_attempts,
        })
    }

    #[test]
    fn delays_grow_exponentially() {
        let mut policy = no_jitter(100, 10_000, 0);
        assert_eq!(policy.next_delay(), Some(Duration::from_millis(100)));
        assert_eq!(policy.next_delay(), Some(Duration::from_millis(200)));
        assert_eq!(policy.next_delay(), Some(Duration::from_millis(400)));
        assert_eq!(policy.next_delay(), Some(Duration::from_millis(800)));
    }

    #[test]
    fn delay_is_capped() {
        let mut policy = no_jitter(1000, 2000, 0);
        let _ = policy.next_delay();
        assert_eq!(policy.next_delay(), Some(Duration::from_millis(2000)));
        assert_eq!(policy.next_delay(), Some(Duration::from_millis(2000)));
    }

    #[test]
    fn budget_exhausts() {
        let mut policy = no_jitter(100, 1000, 2);
        assert!(policy.next_delay().is_some());
        assert!(policy.next_delay().is_some());
        assert!(policy.next_delay().is_none());
        assert_eq!(policy.attempt(), 2);
    }

    #[test]
    fn zero_budget_retries_forever() {
        let mut policy = no_jitter(1, 10, 0);
        for _ in 0..500 {
            assert!(policy.next_delay().is_some());
        }
    }

    #[test]
    fn reset_restores_initial_delay() {
        let mut policy = no_jitter(100, 10_000, 3);
        let _ = policy.next_delay();
        let _ = policy.next_delay();
        policy.reset();
        assert_eq!(policy.attempt(), 0);
        assert_eq!(policy.next_delay(), Some(Duration::from_millis(100)));
    }

    #[test]
    fn jitter_stays_in_bounds() {
        for _ in 0..100 {
            let mut policy = BackoffPolicy::new(BackoffConfig {
                initial_delay: Duration::from_millis(1000),
                max_delay: Duration::from_secs(10),
                multiplier: 2.0,
                jitter_factor: 0.1,
                max_attempts: 0,
            });
            let delay = policy.next_delay().unwrap().as_millis();
            assert!((900..=1100).contains(&delay), "delay {delay}ms out of bounds");
        }
    }
}

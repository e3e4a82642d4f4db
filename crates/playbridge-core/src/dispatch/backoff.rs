//! Exponential retry delay for transport failures

use crate::config::BackoffConfig;
use std::time::Duration;

// 2^6 × initial is already past any sensible cap
const MAX_SHIFT: u32 = 6;

/// Doubling delay, capped, reset on success
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    failures: u32,
}

impl Backoff {
    /// Create backoff between `initial` and `max`
    #[inline]
    #[must_use]
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max,
            failures: 0,
        }
    }

    /// Record a failure and return how long to wait before retrying
    pub fn next_delay(&mut self) -> Duration {
        let factor = 1u32 << self.failures.min(MAX_SHIFT);
        self.failures = self.failures.saturating_add(1);
        self.initial.saturating_mul(factor).min(self.max)
    }

    /// Forget previous failures
    #[inline]
    pub fn reset(&mut self) {
        self.failures = 0;
    }

    /// Consecutive failures since the last reset
    #[inline]
    #[must_use]
    pub fn failures(&self) -> u32 {
        self.failures
    }
}

impl From<BackoffConfig> for Backoff {
    fn from(config: BackoffConfig) -> Self {
        Self::new(config.initial(), config.max())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_double_until_cap() {
        let mut backoff = Backoff::new(Duration::from_millis(100), Duration::from_millis(1000));

        let delays: Vec<u128> = (0..6).map(|_| backoff.next_delay().as_millis()).collect();

        assert_eq!(delays, vec![100, 200, 400, 800, 1000, 1000]);
        assert_eq!(backoff.failures(), 6);
    }

    #[test]
    fn reset_starts_over() {
        let mut backoff = Backoff::from(BackoffConfig::default());
        backoff.next_delay();
        backoff.next_delay();

        backoff.reset();

        assert_eq!(backoff.failures(), 0);
        assert_eq!(backoff.next_delay(), Duration::from_millis(100));
    }

    #[test]
    fn many_failures_do_not_overflow() {
        let mut backoff = Backoff::new(Duration::from_secs(1), Duration::from_secs(30));
        for _ in 0..1000 {
            assert!(backoff.next_delay() <= Duration::from_secs(30));
        }
    }
}

//! Bounded exponential backoff for provider calls.
//!
//! A call is retried only when [`ProviderError::is_retryable`] says so, and at
//! most [`RetryPolicy::max_retries`] times. A provider `Retry-After` wins over
//! the computed backoff when it is longer.

use std::time::Duration;

use crate::provider::ProviderError;

/// How many times to retry and how long to wait between attempts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; `0` disables retrying.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub base_delay_ms: u64,
    /// Upper bound for the computed backoff.
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay_ms: 500,
            max_delay_ms: 8_000,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Backoff before retry number `attempt` (1-based), capped at `max_delay_ms`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(20);
        let ms = self
            .base_delay_ms
            .saturating_mul(1u64 << exp)
            .min(self.max_delay_ms);
        Duration::from_millis(ms)
    }

    /// Delay before retrying `err` as retry number `attempt`, or `None` when
    /// the error is final or the budget is spent.
    pub fn next_delay(&self, err: &ProviderError, attempt: u32) -> Option<Duration> {
        if attempt > self.max_retries || !err.is_retryable() {
            return None;
        }
        let backoff = self.backoff(attempt);
        Some(
            err.retry_after_ms()
                .map_or(backoff, |ra| backoff.max(Duration::from_millis(ra))),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overloaded() -> ProviderError {
        ProviderError::Api {
            status: 529,
            message: "overloaded".into(),
            code: None,
            retryable: true,
        }
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            max_retries: 10,
            base_delay_ms: 100,
            max_delay_ms: 350,
        };
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(350));
        assert_eq!(policy.backoff(40), Duration::from_millis(350));
    }

    #[test]
    fn budget_is_bounded() {
        let policy = RetryPolicy::default();
        assert!(policy.next_delay(&overloaded(), 1).is_some());
        assert!(policy.next_delay(&overloaded(), 2).is_some());
        assert!(policy.next_delay(&overloaded(), 3).is_none());
        assert!(RetryPolicy::none().next_delay(&overloaded(), 1).is_none());
    }

    #[test]
    fn auth_errors_are_final() {
        let err = ProviderError::Auth {
            message: "invalid x-api-key".into(),
        };
        assert!(RetryPolicy::default().next_delay(&err, 1).is_none());
    }

    #[test]
    fn retry_after_wins_when_longer() {
        let err = ProviderError::RateLimited {
            retry_after_ms: 3_000,
            message: "slow down".into(),
        };
        assert_eq!(
            RetryPolicy::default().next_delay(&err, 1),
            Some(Duration::from_millis(3_000))
        );
    }
}

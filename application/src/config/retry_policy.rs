//! Retry policy for non-decisive call results.

use ctxprobe_domain::Classification;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Bounded exponential backoff for `Transient` and `RateLimited` calls.
///
/// `max_retries` is the total number of calls one probe may make: with
/// `max_retries = 3` a probe that keeps failing transiently is sent three
/// times and the third result is returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_retries: u32,
    /// Delay after the first failed call; doubles after each further one.
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    /// Minimum delay after a `RateLimited` call.
    pub rate_limit_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 30_000,
            rate_limit_backoff_ms: 5_000,
        }
    }
}

impl RetryPolicy {
    /// A policy that sends each probe exactly once.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 1,
            ..Default::default()
        }
    }

    /// Calls allowed per probe (at least one).
    pub fn max_calls(&self) -> u32 {
        self.max_retries.max(1)
    }

    /// Delay before the next call, given the number of calls made so far.
    ///
    /// `initial * 2^(calls - 1)`, capped at `max_backoff_ms`. A provider
    /// `retry-after` hint replaces the computed delay, also capped.
    /// `RateLimited` always waits at least `rate_limit_backoff_ms`.
    pub fn delay_for(
        &self,
        calls_made: u32,
        classification: Classification,
        retry_after: Option<Duration>,
    ) -> Duration {
        let max = Duration::from_millis(self.max_backoff_ms);
        let exponent = calls_made.saturating_sub(1).min(32);
        let computed = Duration::from_millis(
            self.initial_backoff_ms
                .saturating_mul(1u64 << exponent)
                .min(self.max_backoff_ms),
        );
        let delay = retry_after.map_or(computed, |hint| hint.min(max));
        if classification == Classification::RateLimited {
            delay.max(Duration::from_millis(self.rate_limit_backoff_ms))
        } else {
            delay
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_max_retries(mut self, max: u32) -> Self {
        self.max_retries = max;
        self
    }

    pub fn with_initial_backoff_ms(mut self, ms: u64) -> Self {
        self.initial_backoff_ms = ms;
        self
    }

    pub fn with_max_backoff_ms(mut self, ms: u64) -> Self {
        self.max_backoff_ms = ms;
        self
    }

    pub fn with_rate_limit_backoff_ms(mut self, ms: u64) -> Self {
        self.rate_limit_backoff_ms = ms;
        self
    }
}

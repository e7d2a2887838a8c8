//! Retry configuration from TOML (`[retry]` section)

use ctxprobe_application::RetryPolicy;
use serde::{Deserialize, Serialize};

/// Raw retry configuration from TOML
///
/// # Example
///
/// ```toml
/// [retry]
/// max_retries = 3                # total calls per probe
/// initial_backoff_ms = 500
/// max_backoff_ms = 30000
/// rate_limit_backoff_ms = 5000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub rate_limit_backoff_ms: u64,
}

impl Default for FileRetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_retries: policy.max_retries,
            initial_backoff_ms: policy.initial_backoff_ms,
            max_backoff_ms: policy.max_backoff_ms,
            rate_limit_backoff_ms: policy.rate_limit_backoff_ms,
        }
    }
}

impl FileRetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy::default()
            .with_max_retries(self.max_retries)
            .with_initial_backoff_ms(self.initial_backoff_ms)
            .with_max_backoff_ms(self.max_backoff_ms)
            .with_rate_limit_backoff_ms(self.rate_limit_backoff_ms)
    }
}

//! Classification of a single model call.
//!
//! | Classification       | Decisive? | Retried?              | Fatal?                |
//! |----------------------|-----------|-----------------------|-----------------------|
//! | `Success`            | Yes       | No                    | No                    |
//! | `TokenLimitExceeded` | Yes       | No                    | No                    |
//! | `Transient`          | No        | Yes (bounded)         | No                    |
//! | `RateLimited`        | No        | Yes (with backoff)    | No                    |
//! | `AuthError`          | No        | No                    | Yes                   |
//! | `Unknown`            | No        | Once                  | If it never resolves  |

use serde::{Deserialize, Serialize};
use std::fmt;

/// The interpreted result of one call against the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// The endpoint accepted the payload.
    Success,
    /// The endpoint rejected the payload for exceeding its context window.
    TokenLimitExceeded,
    /// Infrastructure failure (network, timeout, 5xx).
    Transient,
    /// Throttled by the provider; retry after a mandatory backoff.
    RateLimited,
    /// Credentials rejected. Aborts the run.
    AuthError,
    /// An error nothing in the pattern table recognized.
    Unknown,
}

impl Classification {
    /// Outcomes that carry information about the context boundary.
    pub fn is_decisive(&self) -> bool {
        matches!(
            self,
            Classification::Success | Classification::TokenLimitExceeded
        )
    }

    /// Outcomes the executor retries at the same token count.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Classification::Transient | Classification::RateLimited
        )
    }

    /// Outcomes that abort the run immediately.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Classification::AuthError)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Classification::Success)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Success => "success",
            Classification::TokenLimitExceeded => "token_limit_exceeded",
            Classification::Transient => "transient",
            Classification::RateLimited => "rate_limited",
            Classification::AuthError => "auth_error",
            Classification::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Classification {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "success" => Ok(Classification::Success),
            "token_limit_exceeded" | "token_limit" => Ok(Classification::TokenLimitExceeded),
            "transient" => Ok(Classification::Transient),
            "rate_limited" => Ok(Classification::RateLimited),
            "auth_error" | "auth" => Ok(Classification::AuthError),
            "unknown" => Ok(Classification::Unknown),
            _ => Err(format!("Invalid classification: {}", s)),
        }
    }
}

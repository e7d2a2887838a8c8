//! Raw call value objects exchanged with the model client port.
//!
//! The classifier only ever sees these shapes, so any transport (HTTP,
//! SDK, simulated) can be plugged in behind the port without touching
//! the search logic.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Successful completion returned by the endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Generated text (unused by the engine, kept for debugging adapters)
    #[serde(default)]
    pub text: String,
    /// Prompt tokens as reported by the provider, if it reports usage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u64>,
    /// Completion tokens as reported by the provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u64>,
}

impl CompletionResponse {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            input_tokens: None,
            output_tokens: None,
        }
    }

    pub fn with_usage(mut self, input_tokens: u64, output_tokens: u64) -> Self {
        self.input_tokens = Some(input_tokens);
        self.output_tokens = Some(output_tokens);
        self
    }
}

/// Error surfaced by the endpoint or the transport.
///
/// This is a value object, not a propagated error: the executor hands
/// it to the classifier and records the interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallError {
    /// Vendor or transport message
    pub message: String,
    /// HTTP status code, when the transport has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Provider backoff hint (`retry-after`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<Duration>,
}

impl CallError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            retry_after: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_retry_after(mut self, delay: Duration) -> Self {
        self.retry_after = Some(delay);
        self
    }

    /// The error synthesized when a call exceeds its per-probe timeout.
    pub fn timeout(after: Duration) -> Self {
        Self::new(format!("request timed out after {}ms", after.as_millis()))
    }
}

impl std::fmt::Display for CallError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "[{}] {}", status, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// What one call produced, before classification.
pub type RawCallResult = Result<CompletionResponse, CallError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_error_display() {
        let err = CallError::new("boom").with_status(502);
        assert_eq!(err.to_string(), "[502] boom");
        assert_eq!(CallError::new("boom").to_string(), "boom");
    }

    #[test]
    fn test_timeout_message_mentions_timed_out() {
        let err = CallError::timeout(Duration::from_millis(1500));
        assert!(err.message.contains("timed out"));
        assert!(err.message.contains("1500"));
    }
}

//! Model client port
//!
//! Defines the interface for sending one completion request to the
//! endpoint under test.

use async_trait::async_trait;
use ctxprobe_domain::{Model, RawCallResult};
use std::time::Duration;

/// Per-call options passed to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionOptions {
    /// Output tokens to request from the endpoint
    pub max_output_tokens: u64,
    /// Upper bound on the call. The executor enforces it as well; clients
    /// may pass it to their transport.
    pub timeout: Duration,
}

/// Client for the endpoint under test
///
/// Implementations (adapters) live in the infrastructure layer. A failed
/// call is reported as `Err(CallError)` carrying the vendor message and,
/// when available, the HTTP status; the executor classifies it.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send `payload` as a single user message
    async fn complete(
        &self,
        model: &Model,
        payload: &str,
        options: &CompletionOptions,
    ) -> RawCallResult;
}

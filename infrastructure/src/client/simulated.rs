//! Deterministic in-process endpoint with a fixed context window.
//!
//! Behaves like an OpenAI-compatible server: a request whose estimated
//! prompt tokens plus `max_tokens` exceed the window is rejected with a
//! 400 `context_length_exceeded` error. Used by `--simulate` and by tests.

use crate::generator::estimate_tokens;
use async_trait::async_trait;
use ctxprobe_application::{CompletionOptions, ModelClient};
use ctxprobe_domain::{CallError, CompletionResponse, Model, RawCallResult};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[derive(Debug)]
pub struct SimulatedModelClient {
    context_window: u64,
    base_latency: Duration,
    /// Extra latency per 1,000 prompt tokens
    latency_per_1k: Duration,
    /// Fail every n-th call with a transient error (0 = never)
    fail_every: u64,
    calls: AtomicU64,
}

impl SimulatedModelClient {
    pub fn new(context_window: u64) -> Self {
        Self {
            context_window,
            base_latency: Duration::ZERO,
            latency_per_1k: Duration::ZERO,
            fail_every: 0,
            calls: AtomicU64::new(0),
        }
    }

    pub fn with_latency(mut self, base: Duration, per_1k_tokens: Duration) -> Self {
        self.base_latency = base;
        self.latency_per_1k = per_1k_tokens;
        self
    }

    /// Make every `n`-th call fail with a 503.
    pub fn with_transient_failures(mut self, n: u64) -> Self {
        self.fail_every = n;
        self
    }

    pub fn context_window(&self) -> u64 {
        self.context_window
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    fn latency_for(&self, prompt_tokens: u64) -> Duration {
        let scaled = self
            .latency_per_1k
            .saturating_mul(u32::try_from(prompt_tokens / 1000).unwrap_or(u32::MAX));
        self.base_latency.saturating_add(scaled)
    }
}

#[async_trait]
impl ModelClient for SimulatedModelClient {
    async fn complete(
        &self,
        model: &Model,
        payload: &str,
        options: &CompletionOptions,
    ) -> RawCallResult {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let prompt_tokens = estimate_tokens(payload);

        let latency = self.latency_for(prompt_tokens);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        if self.fail_every > 0 && call % self.fail_every == 0 {
            return Err(CallError::new("The server is overloaded, please retry").with_status(503));
        }

        let requested = prompt_tokens + options.max_output_tokens;
        if requested > self.context_window {
            return Err(CallError::new(format!(
                "This model's maximum context length is {} tokens. However, you requested {} \
                 tokens ({} in the messages, {} in the completion). (context_length_exceeded)",
                self.context_window, requested, prompt_tokens, options.max_output_tokens
            ))
            .with_status(400));
        }

        let completion = options.max_output_tokens.min(1);
        Ok(CompletionResponse::new(format!("OK from {}", model.name()))
            .with_usage(prompt_tokens, completion))
    }
}

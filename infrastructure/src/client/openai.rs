//! OpenAI-compatible chat completions client.
//!
//! Uses raw `reqwest` against `{base_url}/chat/completions` with
//! `stream: false`. Works with OpenAI itself and with the many servers
//! that mirror its wire format (vLLM, LiteLLM, Ollama, OpenRouter, ...).
//!
//! Every failure is returned as a [`CallError`] carrying the HTTP status,
//! the provider's error message and any `retry-after` hint; classification
//! happens in the domain layer.

use async_trait::async_trait;
use ctxprobe_application::{CompletionOptions, ModelClient};
use ctxprobe_domain::{CallError, CompletionResponse, Model, RawCallResult};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u64,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: Option<u64>,
    completion_tokens: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    code: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct OpenAiCompatibleClient {
    api_key: Option<String>,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiCompatibleClient {
    /// Create a client for `base_url`.
    ///
    /// Without an API key no `Authorization` header is sent, which suits
    /// local servers.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.is_empty()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl ModelClient for OpenAiCompatibleClient {
    async fn complete(
        &self,
        model: &Model,
        payload: &str,
        options: &CompletionOptions,
    ) -> RawCallResult {
        let body = ChatRequest {
            model: model.as_str(),
            messages: [ChatMessage {
                role: "user",
                content: payload,
            }],
            max_tokens: options.max_output_tokens,
            temperature: 0.0,
            stream: false,
        };

        let mut request = self
            .client
            .post(self.completions_url())
            .timeout(options.timeout)
            .json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let resp = match request.send().await {
            Ok(resp) => resp,
            Err(e) if e.is_timeout() => return Err(CallError::timeout(options.timeout)),
            Err(e) => return Err(transport_error("request failed", &e)),
        };

        let status = resp.status();
        let retry_after = parse_retry_after(resp.headers());
        let text = match resp.text().await {
            Ok(text) => text,
            Err(e) if e.is_timeout() => return Err(CallError::timeout(options.timeout)),
            Err(e) => {
                return Err(transport_error("failed to read response body", &e)
                    .with_status(status.as_u16()));
            }
        };

        if !status.is_success() {
            debug!("{} returned {} for {}", self.base_url, status, model);
            let mut err =
                CallError::new(error_message(&text, status)).with_status(status.as_u16());
            if let Some(delay) = retry_after {
                err = err.with_retry_after(delay);
            }
            return Err(err);
        }

        parse_success(&text)
    }
}

/// A reqwest failure with its full cause chain.
///
/// Connection, request and body failures are tagged as network errors;
/// reqwest's own message ("error sending request for url ...") carries no
/// word the classifier could key on.
fn transport_error(context: &str, err: &reqwest::Error) -> CallError {
    let mut message = format!("{context}: {err}");
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = std::error::Error::source(cause);
    }
    if err.is_connect() || err.is_request() || err.is_body() {
        message = format!("network error, {message}");
    }
    CallError::new(message)
}

/// Parse a 2xx body. Some servers answer 200 with an `error` envelope.
fn parse_success(text: &str) -> RawCallResult {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(text) {
        return Err(CallError::new(format_error(envelope.error, text)));
    }
    let data: ChatResponse = serde_json::from_str(text)
        .map_err(|e| CallError::new(format!("invalid completion response: {e}")))?;

    let content = data
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .unwrap_or_default();
    let (input_tokens, output_tokens) = data
        .usage
        .map_or((None, None), |u| (u.prompt_tokens, u.completion_tokens));

    Ok(CompletionResponse {
        text: content,
        input_tokens,
        output_tokens,
    })
}

/// Provider message from an error body, or the raw body when it is not JSON.
fn error_message(text: &str, status: reqwest::StatusCode) -> String {
    match serde_json::from_str::<ErrorEnvelope>(text) {
        Ok(envelope) => format_error(envelope.error, text),
        Err(_) if text.trim().is_empty() => format!("HTTP {status}"),
        Err(_) => text.trim().to_string(),
    }
}

fn format_error(body: ErrorBody, raw: &str) -> String {
    let message = body.message.unwrap_or_else(|| raw.trim().to_string());
    match body.code {
        Some(serde_json::Value::String(code)) => format!("{message} ({code})"),
        _ => message,
    }
}

/// Parse the standard `retry-after` header (seconds, integer or fractional).
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();
    let seconds: f64 = value.parse().ok()?;
    (seconds.is_finite() && seconds >= 0.0).then(|| Duration::from_secs_f64(seconds))
}

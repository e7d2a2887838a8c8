//! Scripted port implementations shared by the use case tests.

use crate::ports::model_client::{CompletionOptions, ModelClient};
use crate::ports::pricing_table::PricingTable;
use crate::ports::sample_generator::{GeneratorError, Sample, SampleGenerator};
use crate::ports::usage_ledger::{UsageEntry, UsageLedger};
use async_trait::async_trait;
use ctxprobe_domain::{CallError, CompletionResponse, Model, ModelPricing, RawCallResult};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub fn ok(usage: Option<(u64, u64)>) -> RawCallResult {
    let response = CompletionResponse::new("ok");
    Ok(match usage {
        Some((input, output)) => response.with_usage(input, output),
        None => response,
    })
}

pub fn transient() -> RawCallResult {
    Err(CallError::new("connection reset by peer"))
}

pub fn token_limit() -> RawCallResult {
    Err(CallError::new("This model's maximum context length is 8192 tokens").with_status(400))
}

pub fn auth_error() -> RawCallResult {
    Err(CallError::new("Incorrect API key provided").with_status(401))
}

/// Client replaying a fixed script of results.
pub struct MockClient {
    responses: Mutex<VecDeque<RawCallResult>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_max_output_tokens: Mutex<Option<u64>>,
}

impl MockClient {
    pub fn new(responses: Vec<RawCallResult>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::from(responses)),
            delay: None,
            calls: AtomicUsize::new(0),
            last_max_output_tokens: Mutex::new(None),
        }
    }

    /// Sleep before answering every call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_max_output_tokens(&self) -> Option<u64> {
        *self.last_max_output_tokens.lock().unwrap()
    }
}

#[async_trait]
impl ModelClient for MockClient {
    async fn complete(
        &self,
        _model: &Model,
        _payload: &str,
        options: &CompletionOptions,
    ) -> RawCallResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_max_output_tokens.lock().unwrap() = Some(options.max_output_tokens);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(CallError::new("No more responses")))
    }
}

/// Client that accepts anything below a fixed limit, like a real endpoint.
pub struct LimitClient {
    limit: u64,
    calls: AtomicUsize,
}

impl LimitClient {
    pub fn new(limit: u64) -> Self {
        Self {
            limit,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelClient for LimitClient {
    async fn complete(
        &self,
        _model: &Model,
        payload: &str,
        options: &CompletionOptions,
    ) -> RawCallResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // ScriptedGenerator::exact produces one byte per token
        let tokens = payload.len() as u64;
        if tokens < self.limit {
            Ok(CompletionResponse::new("ok").with_usage(tokens, options.max_output_tokens))
        } else {
            Err(CallError::new(format!(
                "maximum context length is {} tokens, you requested {}",
                self.limit, tokens
            ))
            .with_status(400))
        }
    }
}

type GenerateFn = Box<dyn Fn(u64) -> Result<Sample, GeneratorError> + Send + Sync>;

pub struct ScriptedGenerator {
    generate: GenerateFn,
}

impl ScriptedGenerator {
    /// One byte of text per token; the measurement equals the target.
    pub fn exact() -> Self {
        Self::with(|target| Sample {
            text: "x".repeat(target as usize),
            actual_token_count: target,
        })
    }

    pub fn with(f: impl Fn(u64) -> Sample + Send + Sync + 'static) -> Self {
        Self {
            generate: Box::new(move |target| Ok(f(target))),
        }
    }

    pub fn failing() -> Self {
        Self {
            generate: Box::new(|target| Err(GeneratorError::UnsupportedSize(target))),
        }
    }
}

impl SampleGenerator for ScriptedGenerator {
    fn generate(&self, target_tokens: u64) -> Result<Sample, GeneratorError> {
        (self.generate)(target_tokens)
    }
}

pub struct StaticPricing {
    prices: HashMap<String, ModelPricing>,
}

impl StaticPricing {
    pub fn empty() -> Self {
        Self {
            prices: HashMap::new(),
        }
    }

    pub fn single(model: &str, input_per_1k: f64, output_per_1k: f64) -> Self {
        let mut prices = HashMap::new();
        prices.insert(model.to_string(), ModelPricing::new(input_per_1k, output_per_1k));
        Self { prices }
    }
}

impl PricingTable for StaticPricing {
    fn lookup(&self, model: &Model) -> Option<ModelPricing> {
        self.prices.get(model.as_str()).copied()
    }
}

#[derive(Default)]
pub struct RecordingLedger {
    entries: Mutex<Vec<UsageEntry>>,
}

impl UsageLedger for RecordingLedger {
    fn record(&self, entry: UsageEntry) {
        self.entries.lock().unwrap().push(entry);
    }

    fn entries(&self) -> Vec<UsageEntry> {
        self.entries.lock().unwrap().clone()
    }
}

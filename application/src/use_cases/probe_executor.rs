//! Probe executor
//!
//! Turns one target token count into exactly one [`ProbeOutcome`]:
//! generate a payload, call the endpoint under a timeout, classify the
//! result, and retry non-decisive results at the same size with bounded
//! exponential backoff.
//!
//! Latency and cost are recorded for every call whatever its outcome, and
//! every call is appended to the [`UsageLedger`]. Cancellation and the run
//! deadline cut a probe short at any point; the calls it already finished
//! are still reported through [`ProbeReport::Interrupted`].

use crate::config::ProbeParams;
use crate::ports::model_client::{CompletionOptions, ModelClient};
use crate::ports::pricing_table::PricingTable;
use crate::ports::progress::ProbeProgressNotifier;
use crate::ports::sample_generator::{GeneratorError, SampleGenerator};
use crate::ports::usage_ledger::{UsageEntry, UsageLedger};
use chrono::Utc;
use ctxprobe_domain::{
    CallError, Classification, Model, ModelPricing, OutcomeClassifier, ProbeOutcome,
    RawCallResult, StopCondition, TokenCounts,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Errors that stop a probe from producing an outcome
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    #[error(transparent)]
    SampleGeneration(#[from] GeneratorError),
}

/// What ended a probe before it reached its own conclusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interruption {
    Cancelled,
    Deadline,
}

impl Interruption {
    pub fn stop_condition(self) -> StopCondition {
        match self {
            Interruption::Cancelled => StopCondition::Cancelled,
            Interruption::Deadline => StopCondition::WallClockTimeout,
        }
    }
}

/// How a probe ended.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeReport {
    /// The probe ran until its result was decisive or its retries were spent
    Completed(ProbeOutcome),
    /// Cut short by cancellation or the run deadline. `last` holds the
    /// outcome of the last call that finished, with the cost of every
    /// finished call.
    Interrupted {
        last: Option<ProbeOutcome>,
        interruption: Interruption,
    },
}

impl ProbeReport {
    /// The outcome recorded for this probe, if any call finished
    pub fn outcome(&self) -> Option<&ProbeOutcome> {
        match self {
            ProbeReport::Completed(outcome) => Some(outcome),
            ProbeReport::Interrupted { last, .. } => last.as_ref(),
        }
    }
}

/// Everything a probe needs from the run it belongs to.
pub struct ProbeContext<'a> {
    pub model: &'a Model,
    pub params: &'a ProbeParams,
    /// Calls in flight are abandoned and no retry starts at or past this instant
    pub deadline: Option<Instant>,
    pub cancellation: Option<&'a CancellationToken>,
    pub progress: &'a dyn ProbeProgressNotifier,
}

pub struct ProbeExecutor {
    client: Arc<dyn ModelClient>,
    generator: Arc<dyn SampleGenerator>,
    pricing: Arc<dyn PricingTable>,
    ledger: Arc<dyn UsageLedger>,
    classifier: OutcomeClassifier,
    /// Models already warned about for missing pricing
    unpriced: Mutex<HashSet<Model>>,
}

impl ProbeExecutor {
    pub fn new(
        client: Arc<dyn ModelClient>,
        generator: Arc<dyn SampleGenerator>,
        pricing: Arc<dyn PricingTable>,
        ledger: Arc<dyn UsageLedger>,
    ) -> Self {
        Self {
            client,
            generator,
            pricing,
            ledger,
            classifier: OutcomeClassifier::default(),
            unpriced: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_classifier(mut self, classifier: OutcomeClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn ledger(&self) -> &Arc<dyn UsageLedger> {
        &self.ledger
    }

    /// Probe `target` tokens once, retrying non-decisive results.
    ///
    /// An [`Unknown`](Classification::Unknown) result is only reported as
    /// completed once its retry has run (or the policy allows no retry);
    /// a retry skipped because of cancellation or the deadline yields
    /// [`ProbeReport::Interrupted`].
    pub async fn probe(
        &self,
        ctx: &ProbeContext<'_>,
        attempt_index: usize,
        target: u64,
    ) -> Result<ProbeReport, ExecutorError> {
        let params = ctx.params;
        let reserved = params.reserved_output_tokens();
        let sample = self
            .generator
            .generate(target.saturating_sub(reserved).max(1))?;
        let options = CompletionOptions {
            max_output_tokens: params.output_tokens,
            timeout: params.timeout(),
        };
        let pricing = self.pricing_for(ctx.model);
        let fallback = TokenCounts {
            input: sample.actual_token_count,
            output: params.output_tokens,
        };
        let max_calls = params.retry.max_calls();

        let mut calls = 0u32;
        let mut total_cost = 0.0;
        let mut unknown_retried = false;
        let mut last: Option<ProbeOutcome> = None;

        loop {
            let started = Instant::now();
            let raw = match self.call_once(ctx, &sample.text, &options).await {
                Ok(raw) => raw,
                Err(interruption) => return Ok(ProbeReport::Interrupted { last, interruption }),
            };
            calls += 1;
            let latency_ms = started.elapsed().as_millis() as u64;

            let interpretation = self.classifier.interpret(&raw, fallback);
            let cost =
                pricing.estimate_cost(interpretation.input_tokens, interpretation.output_tokens);
            total_cost += cost;
            let timestamp = Utc::now();

            self.ledger.record(UsageEntry {
                timestamp,
                model: ctx.model.clone(),
                attempt_index,
                call_index: calls,
                requested_tokens: target,
                input_tokens: interpretation.input_tokens,
                output_tokens: interpretation.output_tokens,
                classification: interpretation.classification,
                latency_ms,
                cost,
            });

            let classification = interpretation.classification;
            let outcome = ProbeOutcome {
                attempt_index,
                requested_tokens: target,
                input_tokens: interpretation.input_tokens,
                output_tokens: interpretation.output_tokens,
                reserved_output_tokens: reserved,
                classification,
                latency_ms,
                estimated_cost: total_cost,
                calls,
                error_detail: interpretation.error_detail,
                timestamp,
            };

            let retry = match classification {
                Classification::Transient | Classification::RateLimited => calls < max_calls,
                Classification::Unknown if !unknown_retried => {
                    unknown_retried = true;
                    calls < max_calls
                }
                _ => false,
            };
            if !retry {
                return Ok(ProbeReport::Completed(outcome));
            }

            let retry_after = raw.as_ref().err().and_then(|e| e.retry_after);
            let delay = params.retry.delay_for(calls, classification, retry_after);
            if ctx.deadline.is_some_and(|d| Instant::now() + delay >= d) {
                debug!(
                    "Attempt {}: not retrying {} past the run deadline",
                    attempt_index, classification
                );
                return Ok(ProbeReport::Interrupted {
                    last: Some(outcome),
                    interruption: Interruption::Deadline,
                });
            }

            debug!(
                "Attempt {}: {} at {} tokens, retrying in {:?} (call {}/{})",
                attempt_index, classification, target, delay, calls, max_calls
            );
            ctx.progress
                .on_retry(ctx.model, attempt_index, classification, delay);

            tokio::select! {
                biased;
                _ = cancelled(ctx.cancellation) => {
                    return Ok(ProbeReport::Interrupted {
                        last: Some(outcome),
                        interruption: Interruption::Cancelled,
                    });
                }
                _ = tokio::time::sleep(delay) => {}
            }
            last = Some(outcome);
        }
    }

    /// One call bounded by the per-call timeout, the run deadline and the
    /// cancellation token.
    async fn call_once(
        &self,
        ctx: &ProbeContext<'_>,
        payload: &str,
        options: &CompletionOptions,
    ) -> Result<RawCallResult, Interruption> {
        let call = tokio::time::timeout(
            options.timeout,
            self.client.complete(ctx.model, payload, options),
        );
        tokio::select! {
            biased;
            _ = cancelled(ctx.cancellation) => Err(Interruption::Cancelled),
            _ = deadline_reached(ctx.deadline) => Err(Interruption::Deadline),
            result = call => {
                Ok(result.unwrap_or_else(|_| Err(CallError::timeout(options.timeout))))
            }
        }
    }

    /// Pricing for `model`, warning once per model when it is missing.
    fn pricing_for(&self, model: &Model) -> ModelPricing {
        if let Some(pricing) = self.pricing.lookup(model) {
            return pricing;
        }
        let first_time = self
            .unpriced
            .lock()
            .map(|mut seen| seen.insert(model.clone()))
            .unwrap_or(false);
        if first_time {
            warn!("No pricing for model {}; costs are recorded as 0", model);
        }
        ModelPricing::free()
    }
}

/// Resolves when `token` is cancelled; never without a token.
async fn cancelled(token: Option<&CancellationToken>) {
    match token {
        Some(token) => token.cancelled().await,
        None => std::future::pending().await,
    }
}

/// Resolves at `deadline`; never without one.
async fn deadline_reached(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryPolicy;
    use crate::ports::progress::NoProgress;
    use crate::ports::sample_generator::Sample;
    use crate::test_support::{
        MockClient, RecordingLedger, ScriptedGenerator, StaticPricing, ok, token_limit,
        transient,
    };
    use std::time::Duration;

    fn model() -> Model {
        Model::try_new("test/model").unwrap()
    }

    fn executor(client: Arc<MockClient>, ledger: Arc<RecordingLedger>) -> ProbeExecutor {
        ProbeExecutor::new(
            client,
            Arc::new(ScriptedGenerator::exact()),
            Arc::new(StaticPricing::single("test/model", 0.01, 0.03)),
            ledger,
        )
    }

    fn params(max_retries: u32) -> ProbeParams {
        ProbeParams::default().with_retry(
            RetryPolicy::default()
                .with_max_retries(max_retries)
                .with_initial_backoff_ms(10)
                .with_max_backoff_ms(100)
                .with_rate_limit_backoff_ms(50),
        )
    }

    fn completed(report: Result<ProbeReport, ExecutorError>) -> ProbeOutcome {
        match report {
            Ok(ProbeReport::Completed(outcome)) => outcome,
            other => panic!("expected a completed probe, got {other:?}"),
        }
    }

    fn ctx<'a>(model: &'a Model, params: &'a ProbeParams) -> ProbeContext<'a> {
        ProbeContext {
            model,
            params,
            deadline: None,
            cancellation: None,
            progress: &NoProgress,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_records_usage_and_cost() {
        let client = Arc::new(MockClient::new(vec![ok(Some((2000, 16)))]));
        let ledger = Arc::new(RecordingLedger::default());
        let exec = executor(client.clone(), ledger.clone());
        let (m, p) = (model(), params(3));

        let outcome = completed(exec.probe(&ctx(&m, &p), 1, 2000).await);
        assert_eq!(outcome.classification, Classification::Success);
        assert_eq!(outcome.input_tokens, 2000);
        assert_eq!(outcome.output_tokens, 16);
        assert_eq!(outcome.calls, 1);
        let expected = 2.0 * 0.01 + 0.016 * 0.03;
        assert!((outcome.estimated_cost - expected).abs() < 1e-12);
        assert_eq!(ledger.entries().len(), 1);
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_usage_falls_back_to_measured_counts() {
        let client = Arc::new(MockClient::new(vec![ok(None)]));
        let exec = executor(client, Arc::new(RecordingLedger::default()));
        let (m, p) = (model(), params(3));

        let outcome = completed(exec.probe(&ctx(&m, &p), 1, 3000).await);
        assert_eq!(outcome.input_tokens, 3000);
        assert_eq!(outcome.output_tokens, p.output_tokens);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scenario_d_three_transients_make_exactly_three_calls() {
        let client = Arc::new(MockClient::new(vec![
            transient(),
            transient(),
            transient(),
            ok(None),
        ]));
        let ledger = Arc::new(RecordingLedger::default());
        let exec = executor(client.clone(), ledger.clone());
        let (m, p) = (model(), params(3));

        let outcome = completed(exec.probe(&ctx(&m, &p), 1, 4000).await);
        assert_eq!(outcome.classification, Classification::Transient);
        assert_eq!(outcome.calls, 3);
        assert_eq!(client.calls(), 3);
        assert_eq!(ledger.entries().len(), 3);
        assert_ne!(outcome.classification, Classification::TokenLimitExceeded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_then_success_sums_cost() {
        let client = Arc::new(MockClient::new(vec![transient(), ok(Some((1000, 10)))]));
        let exec = executor(client, Arc::new(RecordingLedger::default()));
        let (m, p) = (model(), params(3));

        let outcome = completed(exec.probe(&ctx(&m, &p), 1, 1000).await);
        assert_eq!(outcome.classification, Classification::Success);
        assert_eq!(outcome.calls, 2);
        // Failed call: 1000 input tokens, no output. Successful call: 1000 + 10.
        let expected = 0.01 + (0.01 + 0.01 * 0.03);
        assert!((outcome.estimated_cost - expected).abs() < 1e-12);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_doubles_between_calls() {
        let client = Arc::new(MockClient::new(vec![transient(), transient(), ok(None)]));
        let exec = executor(client, Arc::new(RecordingLedger::default()));
        let (m, p) = (model(), params(3));

        let start = Instant::now();
        completed(exec.probe(&ctx(&m, &p), 1, 1000).await);
        // 10ms after the first failure, 20ms after the second.
        assert_eq!(start.elapsed(), Duration::from_millis(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_waits_for_floor() {
        let client = Arc::new(MockClient::new(vec![
            Err(CallError::new("Rate limit reached").with_status(429)),
            ok(None),
        ]));
        let exec = executor(client, Arc::new(RecordingLedger::default()));
        let (m, p) = (model(), params(3));

        let start = Instant::now();
        let outcome = completed(exec.probe(&ctx(&m, &p), 1, 1000).await);
        assert_eq!(outcome.classification, Classification::Success);
        assert_eq!(start.elapsed(), Duration::from_millis(50));
    }

    #[tokio::test(start_paused = true)]
    async fn test_auth_error_is_not_retried() {
        let client = Arc::new(MockClient::new(vec![
            Err(CallError::new("Incorrect API key provided").with_status(401)),
            ok(None),
        ]));
        let exec = executor(client.clone(), Arc::new(RecordingLedger::default()));
        let (m, p) = (model(), params(3));

        let outcome = completed(exec.probe(&ctx(&m, &p), 1, 1000).await);
        assert_eq!(outcome.classification, Classification::AuthError);
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_token_limit_is_returned_immediately() {
        let client = Arc::new(MockClient::new(vec![token_limit(), ok(None)]));
        let exec = executor(client.clone(), Arc::new(RecordingLedger::default()));
        let (m, p) = (model(), params(3));

        let outcome = completed(exec.probe(&ctx(&m, &p), 1, 9000).await);
        assert_eq!(outcome.classification, Classification::TokenLimitExceeded);
        assert_eq!(outcome.output_tokens, 0);
        assert!(outcome.error_detail.unwrap().contains("maximum context length"));
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_is_retried_once() {
        let client = Arc::new(MockClient::new(vec![
            Err(CallError::new("something odd")),
            Err(CallError::new("something odd")),
            ok(None),
        ]));
        let exec = executor(client.clone(), Arc::new(RecordingLedger::default()));
        let (m, p) = (model(), params(5));

        let outcome = completed(exec.probe(&ctx(&m, &p), 1, 1000).await);
        assert_eq!(outcome.classification, Classification::Unknown);
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_resolving_to_success() {
        let client = Arc::new(MockClient::new(vec![
            Err(CallError::new("something odd")),
            ok(None),
        ]));
        let exec = executor(client, Arc::new(RecordingLedger::default()));
        let (m, p) = (model(), params(3));

        let outcome = completed(exec.probe(&ctx(&m, &p), 1, 1000).await);
        assert_eq!(outcome.classification, Classification::Success);
        assert_eq!(outcome.calls, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_transient() {
        let client = Arc::new(
            MockClient::new(vec![ok(None), ok(None)]).with_delay(Duration::from_secs(10)),
        );
        let exec = executor(client.clone(), Arc::new(RecordingLedger::default()));
        let (m, p) = (model(), params(2).with_timeout_ms(1000));

        let outcome = completed(exec.probe(&ctx(&m, &p), 1, 1000).await);
        assert_eq!(outcome.classification, Classification::Transient);
        assert_eq!(outcome.calls, 2);
        assert!(outcome.error_detail.unwrap().contains("timed out"));
        assert_eq!(outcome.latency_ms, 1000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_retry_past_deadline() {
        let client = Arc::new(MockClient::new(vec![transient(), ok(None)]));
        let exec = executor(client.clone(), Arc::new(RecordingLedger::default()));
        let (m, p) = (model(), params(3));
        let context = ProbeContext {
            deadline: Some(Instant::now() + Duration::from_millis(5)),
            ..ctx(&m, &p)
        };

        match exec.probe(&context, 1, 1000).await {
            Ok(ProbeReport::Interrupted {
                last: Some(last),
                interruption: Interruption::Deadline,
            }) => assert_eq!(last.classification, Classification::Transient),
            other => panic!("unexpected report {other:?}"),
        }
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_retry_skipped_at_deadline_is_interrupted() {
        let client = Arc::new(MockClient::new(vec![
            Err(CallError::new("I'm a teapot").with_status(418)),
            ok(None),
        ]));
        let exec = executor(client.clone(), Arc::new(RecordingLedger::default()));
        let m = model();
        let p = params(3).with_retry(
            RetryPolicy::default()
                .with_initial_backoff_ms(10_000)
                .with_max_backoff_ms(60_000),
        );
        let context = ProbeContext {
            deadline: Some(Instant::now() + Duration::from_secs(5)),
            ..ctx(&m, &p)
        };

        match exec.probe(&context, 1, 1000).await {
            Ok(ProbeReport::Interrupted {
                last: Some(last),
                interruption: Interruption::Deadline,
            }) => assert_eq!(last.classification, Classification::Unknown),
            other => panic!("unexpected report {other:?}"),
        }
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_during_first_call_has_no_outcome() {
        let client = Arc::new(MockClient::new(vec![ok(None)]).with_delay(Duration::from_secs(10)));
        let ledger = Arc::new(RecordingLedger::default());
        let exec = executor(client, ledger.clone());
        let (m, p) = (model(), params(3).with_timeout_ms(60_000));
        let context = ProbeContext {
            deadline: Some(Instant::now() + Duration::from_secs(1)),
            ..ctx(&m, &p)
        };

        let start = Instant::now();
        let report = exec.probe(&context, 1, 1000).await;
        assert_eq!(
            report,
            Ok(ProbeReport::Interrupted {
                last: None,
                interruption: Interruption::Deadline,
            })
        );
        assert_eq!(start.elapsed(), Duration::from_secs(1));
        assert!(ledger.entries().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_during_retry_keeps_finished_calls() {
        let client = Arc::new(
            MockClient::new(vec![transient(), transient(), transient()])
                .with_delay(Duration::from_millis(400)),
        );
        let ledger = Arc::new(RecordingLedger::default());
        let exec = executor(client, ledger.clone());
        let (m, p) = (model(), params(3));
        let context = ProbeContext {
            deadline: Some(Instant::now() + Duration::from_millis(1000)),
            ..ctx(&m, &p)
        };

        let last = match exec.probe(&context, 1, 1000).await {
            Ok(ProbeReport::Interrupted {
                last: Some(last),
                interruption: Interruption::Deadline,
            }) => last,
            other => panic!("unexpected report {other:?}"),
        };
        assert_eq!(last.calls, 2);
        assert_eq!(ledger.entries().len(), 2);
        let recorded: f64 = ledger.entries().iter().map(|e| e.cost).sum();
        assert!(last.estimated_cost > 0.0);
        assert!((last.estimated_cost - recorded).abs() < 1e-12);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_during_call() {
        let client = Arc::new(MockClient::new(vec![ok(None)]).with_delay(Duration::from_secs(10)));
        let exec = executor(client, Arc::new(RecordingLedger::default()));
        let (m, p) = (model(), params(3));
        let token = CancellationToken::new();
        let context = ProbeContext {
            cancellation: Some(&token),
            ..ctx(&m, &p)
        };

        let cancel = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            cancel.cancel();
        });
        let result = exec.probe(&context, 1, 1000).await;
        assert_eq!(
            result,
            Ok(ProbeReport::Interrupted {
                last: None,
                interruption: Interruption::Cancelled,
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_token_prevents_first_call() {
        let client = Arc::new(MockClient::new(vec![ok(None)]));
        let exec = executor(client.clone(), Arc::new(RecordingLedger::default()));
        let (m, p) = (model(), params(3));
        let token = CancellationToken::new();
        token.cancel();
        let context = ProbeContext {
            cancellation: Some(&token),
            ..ctx(&m, &p)
        };

        let report = exec.probe(&context, 1, 1000).await;
        assert!(matches!(
            report,
            Ok(ProbeReport::Interrupted {
                last: None,
                interruption: Interruption::Cancelled,
            })
        ));
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_during_backoff_returns_last_outcome() {
        let client = Arc::new(MockClient::new(vec![transient(), ok(None)]));
        let exec = executor(client.clone(), Arc::new(RecordingLedger::default()));
        let m = model();
        let p = params(3).with_retry(
            RetryPolicy::default()
                .with_initial_backoff_ms(10_000)
                .with_max_backoff_ms(60_000),
        );
        let token = CancellationToken::new();
        let context = ProbeContext {
            cancellation: Some(&token),
            ..ctx(&m, &p)
        };

        let cancel = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            cancel.cancel();
        });
        let start = Instant::now();
        let report = exec.probe(&context, 1, 1000).await;
        assert_eq!(
            report.as_ref().ok().and_then(ProbeReport::outcome).map(|o| o.classification),
            Some(Classification::Transient)
        );
        assert!(matches!(
            report,
            Ok(ProbeReport::Interrupted {
                interruption: Interruption::Cancelled,
                ..
            })
        ));
        assert_eq!(client.calls(), 1);
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_cancelled_during_backoff_is_interrupted() {
        let client = Arc::new(MockClient::new(vec![
            Err(CallError::new("I'm a teapot").with_status(418)),
            ok(None),
        ]));
        let exec = executor(client.clone(), Arc::new(RecordingLedger::default()));
        let m = model();
        let p = params(3).with_retry(
            RetryPolicy::default()
                .with_initial_backoff_ms(10_000)
                .with_max_backoff_ms(60_000),
        );
        let token = CancellationToken::new();
        let context = ProbeContext {
            cancellation: Some(&token),
            ..ctx(&m, &p)
        };

        let cancel = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            cancel.cancel();
        });
        match exec.probe(&context, 1, 1000).await {
            Ok(ProbeReport::Interrupted {
                last: Some(last),
                interruption: Interruption::Cancelled,
            }) => assert_eq!(last.classification, Classification::Unknown),
            other => panic!("unexpected report {other:?}"),
        }
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_output_budget_is_reserved() {
        let client = Arc::new(MockClient::new(vec![ok(None)]));
        let exec = executor(client.clone(), Arc::new(RecordingLedger::default()));
        let m = model();
        let p = params(3).with_output_budget(500, true);

        let outcome = completed(exec.probe(&ctx(&m, &p), 1, 4000).await);
        assert_eq!(outcome.input_tokens, 3500);
        assert_eq!(outcome.reserved_output_tokens, 500);
        assert_eq!(outcome.measured_size(), 4000);
        assert_eq!(client.last_max_output_tokens(), Some(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_generator_failure_is_an_error() {
        let exec = ProbeExecutor::new(
            Arc::new(MockClient::new(vec![])),
            Arc::new(ScriptedGenerator::failing()),
            Arc::new(StaticPricing::empty()),
            Arc::new(RecordingLedger::default()),
        );
        let (m, p) = (model(), params(3));
        let result = exec.probe(&ctx(&m, &p), 1, 1000).await;
        assert!(matches!(result, Err(ExecutorError::SampleGeneration(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unpriced_model_costs_nothing() {
        let exec = ProbeExecutor::new(
            Arc::new(MockClient::new(vec![ok(Some((1000, 10))), ok(Some((1000, 10)))])),
            Arc::new(ScriptedGenerator::exact()),
            Arc::new(StaticPricing::empty()),
            Arc::new(RecordingLedger::default()),
        );
        let (m, p) = (model(), params(3));
        let first = completed(exec.probe(&ctx(&m, &p), 1, 1000).await);
        let second = completed(exec.probe(&ctx(&m, &p), 2, 1000).await);
        assert_eq!(first.estimated_cost, 0.0);
        assert_eq!(second.estimated_cost, 0.0);
        assert_eq!(exec.unpriced.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_generator_overshoot_is_recorded() {
        let exec = ProbeExecutor::new(
            Arc::new(MockClient::new(vec![ok(None)])),
            Arc::new(ScriptedGenerator::with(|target| Sample {
                text: "x".repeat(target as usize),
                actual_token_count: target + 37,
            })),
            Arc::new(StaticPricing::empty()),
            Arc::new(RecordingLedger::default()),
        );
        let (m, p) = (model(), params(3));
        let outcome = completed(exec.probe(&ctx(&m, &p), 1, 1000).await);
        assert_eq!(outcome.requested_tokens, 1000);
        assert_eq!(outcome.input_tokens, 1037);
    }
}

//! Run Probe use case
//!
//! Drives a search strategy and the probe executor until the search
//! converges or a budget, the deadline, cancellation or a fatal error
//! halts it. Each halt maps to exactly one [`StopCondition`].
//!
//! ```text
//! loop:
//!   cancelled?          -> Cancelled
//!   deadline passed?    -> WallClockTimeout
//!   strategy decision   -> Converged / CeilingReached / BoundaryNotFound
//!   attempts exhausted? -> AttemptBudgetExhausted
//!   probe, append finished calls, notify
//!   probe interrupted?  -> Cancelled / WallClockTimeout
//!   AuthError / Unknown -> Fatal
//! ```
//!
//! The deadline and the cancellation token reach into the executor, so a
//! probe cut short still contributes the calls it finished (and their cost)
//! to the result.

use crate::config::ProbeParams;
use crate::ports::model_client::ModelClient;
use crate::ports::pricing_table::PricingTable;
use crate::ports::progress::{NoProgress, ProbeProgressNotifier};
use crate::ports::sample_generator::SampleGenerator;
use crate::ports::usage_ledger::UsageLedger;
use crate::use_cases::probe_executor::{
    ExecutorError, ProbeContext, ProbeExecutor, ProbeReport,
};
use chrono::Utc;
use ctxprobe_domain::{
    Classification, FatalProbeFailure, FatalReason, Model, ProbeHistory, ProbeRunOutcome,
    RunContext, SearchDecision, SearchStrategy, StopCondition, aggregate,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that prevent a run from starting or finishing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunProbeError {
    #[error("Invalid probe configuration: {}", .0.join("; "))]
    InvalidConfig(Vec<String>),

    #[error("Probe task failed: {0}")]
    TaskFailed(String),
}

/// Input for the RunProbe use case
#[derive(Debug, Clone)]
pub struct RunProbeInput {
    pub model: Model,
    pub params: ProbeParams,
}

impl RunProbeInput {
    pub fn new(model: Model, params: ProbeParams) -> Self {
        Self { model, params }
    }
}

/// Use case for probing a model's context window
#[derive(Clone)]
pub struct RunProbeUseCase {
    executor: Arc<ProbeExecutor>,
    cancellation_token: Option<CancellationToken>,
}

impl RunProbeUseCase {
    pub fn new(
        client: Arc<dyn ModelClient>,
        generator: Arc<dyn SampleGenerator>,
        pricing: Arc<dyn PricingTable>,
        ledger: Arc<dyn UsageLedger>,
    ) -> Self {
        Self {
            executor: Arc::new(ProbeExecutor::new(client, generator, pricing, ledger)),
            cancellation_token: None,
        }
    }

    /// Use a preconfigured executor, e.g. one with a custom classifier
    pub fn from_executor(executor: ProbeExecutor) -> Self {
        Self {
            executor: Arc::new(executor),
            cancellation_token: None,
        }
    }

    /// Set a cancellation token for graceful interruption
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub fn ledger(&self) -> &Arc<dyn UsageLedger> {
        self.executor.ledger()
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, input: RunProbeInput) -> Result<ProbeRunOutcome, RunProbeError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: RunProbeInput,
        progress: &dyn ProbeProgressNotifier,
    ) -> Result<ProbeRunOutcome, RunProbeError> {
        let RunProbeInput { model, params } = input;

        let errors: Vec<String> = params
            .validate()
            .into_iter()
            .filter(|issue| issue.is_error())
            .map(|issue| issue.message)
            .collect();
        if !errors.is_empty() {
            return Err(RunProbeError::InvalidConfig(errors));
        }
        let search = params.search_params().map_err(RunProbeError::InvalidConfig)?;
        let mut strategy = SearchStrategy::new(params.strategy, search);

        let started_at = Utc::now();
        let start = Instant::now();
        let deadline = params.total_timeout().map(|t| start + t);
        let token = self.cancellation_token.as_ref();
        let mut history = ProbeHistory::new();

        info!(
            "Probing {} with {} strategy over [{}, {}], precision {}",
            model, params.strategy, params.min_test_length, params.max_test_length,
            params.precision_threshold
        );
        progress.on_run_start(&model, params.strategy, params.max_attempts);

        let ctx = ProbeContext {
            model: &model,
            params: &params,
            deadline,
            cancellation: token,
            progress,
        };

        let stop = loop {
            if token.is_some_and(|t| t.is_cancelled()) {
                break StopCondition::Cancelled;
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                break StopCondition::WallClockTimeout;
            }

            let target = match strategy.next_probe(history.as_slice()) {
                Ok(SearchDecision::Probe(tokens)) => tokens,
                Ok(SearchDecision::Converged) => break StopCondition::ConvergedWithinPrecision,
                Ok(SearchDecision::CeilingReached) => break StopCondition::CeilingReached,
                Ok(SearchDecision::BoundaryNotFound) => break StopCondition::BoundaryNotFound,
                Err(e) => {
                    warn!("Search for {} aborted: {}", model, e);
                    progress.on_run_complete(&model, StopCondition::FatalError);
                    return Ok(fatal(
                        &model,
                        &params,
                        FatalReason::Configuration,
                        e.to_string(),
                        history,
                        started_at,
                    ));
                }
            };

            if history.len() >= params.max_attempts {
                break StopCondition::AttemptBudgetExhausted;
            }

            let attempt_index = history.next_attempt_index();
            progress.on_probe_start(&model, attempt_index, target);

            let report = self.executor.probe(&ctx, attempt_index, target).await;
            let (outcome, interruption) = match report {
                Ok(ProbeReport::Completed(outcome)) => (Some(outcome), None),
                Ok(ProbeReport::Interrupted { last, interruption }) => (last, Some(interruption)),
                Err(ExecutorError::SampleGeneration(e)) => {
                    warn!("Sample generation for {} tokens failed: {}", target, e);
                    progress.on_run_complete(&model, StopCondition::FatalError);
                    return Ok(fatal(
                        &model,
                        &params,
                        FatalReason::SampleGeneration,
                        e.to_string(),
                        history,
                        started_at,
                    ));
                }
            };

            let Some(outcome) = outcome else {
                // Interrupted before any call finished
                break interruption.map_or(StopCondition::Cancelled, |i| i.stop_condition());
            };
            debug!(
                "Attempt {}: {} tokens requested, {} measured -> {} ({}ms, {} call(s))",
                outcome.attempt_index,
                outcome.requested_tokens,
                outcome.measured_size(),
                outcome.classification,
                outcome.latency_ms,
                outcome.calls
            );

            let classification = outcome.classification;
            let detail = outcome.error_detail.clone();
            history.push(outcome);
            if let Some(last) = history.last() {
                progress.on_probe_complete(&model, last, history.best_success());
            }
            if let Some(interruption) = interruption {
                debug!("Attempt {} interrupted: {:?}", attempt_index, interruption);
                break interruption.stop_condition();
            }

            let reason = match classification {
                Classification::AuthError => Some(FatalReason::Authentication),
                Classification::Unknown => Some(FatalReason::UnresolvedUnknown),
                _ => None,
            };
            if let Some(reason) = reason {
                let message = detail.unwrap_or_else(|| classification.to_string());
                warn!("Probe run for {} aborted ({}): {}", model, reason, message);
                progress.on_run_complete(&model, StopCondition::FatalError);
                return Ok(fatal(&model, &params, reason, message, history, started_at));
            }
        };

        progress.on_run_complete(&model, stop);
        let attempts = history.len();
        let result = aggregate(
            history.freeze(),
            stop,
            RunContext {
                model,
                strategy: params.strategy,
                max_test_length: params.max_test_length,
                started_at,
                finished_at: Utc::now(),
            },
        );

        if result.inconsistent_observations {
            warn!(
                "Inconsistent observations for {}: a larger input was accepted after a smaller one was rejected",
                result.model
            );
        }
        info!(
            "Probe of {} finished: {} after {} attempt(s), estimate {:?} in [{}, {}]",
            result.model,
            stop,
            attempts,
            result.max_tokens,
            result.interval.min,
            result.interval.max
        );

        Ok(ProbeRunOutcome::Completed(result))
    }

    /// Run independent probes concurrently.
    ///
    /// Runs share only the executor's read-only pricing table and the
    /// ledger. Results are returned in input order.
    pub async fn execute_batch(
        &self,
        inputs: Vec<RunProbeInput>,
        progress: Arc<dyn ProbeProgressNotifier>,
    ) -> Vec<Result<ProbeRunOutcome, RunProbeError>> {
        info!("Starting batch of {} probe run(s)", inputs.len());

        let mut join_set = JoinSet::new();
        let mut results: Vec<Option<Result<ProbeRunOutcome, RunProbeError>>> =
            inputs.iter().map(|_| None).collect();

        for (index, input) in inputs.into_iter().enumerate() {
            let use_case = self.clone();
            let progress = Arc::clone(&progress);
            join_set.spawn(async move {
                let result = use_case.execute_with_progress(input, progress.as_ref()).await;
                (index, result)
            });
        }

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, result)) => results[index] = Some(result),
                Err(e) => warn!("Probe task join error: {}", e),
            }
        }

        results
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| {
                    Err(RunProbeError::TaskFailed("task did not complete".into()))
                })
            })
            .collect()
    }
}

fn fatal(
    model: &Model,
    params: &ProbeParams,
    reason: FatalReason,
    message: String,
    history: ProbeHistory,
    started_at: chrono::DateTime<Utc>,
) -> ProbeRunOutcome {
    let outcomes = history.freeze();
    let total_cost = outcomes.iter().fold(0.0, |acc, o| acc + o.estimated_cost);
    ProbeRunOutcome::Fatal(FatalProbeFailure {
        model: model.clone(),
        strategy: params.strategy,
        reason,
        message,
        outcomes,
        total_cost,
        started_at,
        finished_at: Utc::now(),
    })
}

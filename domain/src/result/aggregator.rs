//! Probe history → [`ProbeRunResult`].
//!
//! The aggregator is the only place estimates and statistics are computed.
//! It never invents a number: with no accepted probe the estimate is absent
//! and the result is marked [`EstimateKind::NotFound`].

use super::stats::mean;
use super::value_objects::{ConfidenceInterval, EstimateKind, LatencyPercentiles, ProbeRunResult};
use crate::core::model::Model;
use crate::probe::outcome::ProbeOutcome;
use crate::probe::stop::StopCondition;
use crate::search::StrategyKind;
use chrono::{DateTime, Utc};

/// Run-level facts the history alone does not carry.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub model: Model,
    pub strategy: StrategyKind,
    /// Upper end of the interval when no failure was observed
    pub max_test_length: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Build the final result from a frozen history.
pub fn aggregate(
    outcomes: Vec<ProbeOutcome>,
    stop_condition: StopCondition,
    context: RunContext,
) -> ProbeRunResult {
    let max_success = outcomes
        .iter()
        .filter(|o| o.is_success())
        .map(|o| o.measured_size())
        .max();
    let min_failure = outcomes
        .iter()
        .filter(|o| o.is_token_limit())
        .map(|o| o.measured_size())
        .min();

    let lower = max_success.unwrap_or(0);
    let mut upper = min_failure.unwrap_or(context.max_test_length);
    let inconsistent = max_success.zip(min_failure).is_some_and(|(s, f)| s >= f);
    if upper < lower {
        upper = lower;
    }
    let interval = ConfidenceInterval {
        min: lower,
        max: upper,
        ceiling_unknown: min_failure.is_none(),
    };

    let estimate_kind = match (max_success, interval.ceiling_unknown) {
        (None, _) => EstimateKind::NotFound,
        (Some(_), true) => EstimateKind::LowerBound,
        (Some(_), false) => EstimateKind::Bracketed,
    };

    let absolute_width = interval.width();
    let precision_pct = if interval.max == 0 {
        0.0
    } else {
        100.0 * (1.0 - absolute_width as f64 / interval.max as f64)
    };

    let successes = outcomes.iter().filter(|o| o.is_success()).count();
    let success_rate = if outcomes.is_empty() {
        0.0
    } else {
        successes as f64 / outcomes.len() as f64
    };

    let total_cost = outcomes.iter().fold(0.0, |acc, o| acc + o.estimated_cost);

    let latencies: Vec<u64> = outcomes.iter().map(|o| o.latency_ms).collect();

    ProbeRunResult {
        model: context.model,
        strategy: context.strategy,
        stop_condition,
        max_tokens: max_success,
        interval,
        estimate_kind,
        precision_pct,
        absolute_width,
        inconsistent_observations: inconsistent,
        success_rate,
        total_cost,
        average_latency_ms: mean(&latencies),
        latency: LatencyPercentiles::from_latencies(&latencies),
        throughput_tokens_per_sec: throughput(&outcomes),
        started_at: context.started_at,
        finished_at: context.finished_at,
        outcomes,
    }
}

/// Accepted input tokens per second of accepted-call latency, 0 if undefined.
fn throughput(outcomes: &[ProbeOutcome]) -> f64 {
    let (tokens, latency_ms) = outcomes
        .iter()
        .filter(|o| o.is_success())
        .fold((0u64, 0u64), |(t, l), o| (t + o.input_tokens, l + o.latency_ms));
    if latency_ms == 0 {
        0.0
    } else {
        tokens as f64 / latency_ms as f64 * 1000.0
    }
}

//! Result value objects - what a finished run hands back to the caller.
//!
//! - [`ProbeRunResult`] - estimate, interval and statistics of a completed run
//! - [`FatalProbeFailure`] - a run aborted by an unrecoverable error (no estimate)
//! - [`ProbeRunOutcome`] - one of the two

use crate::core::model::Model;
use crate::probe::outcome::ProbeOutcome;
use crate::probe::stop::StopCondition;
use crate::search::StrategyKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bracket between the largest known success and the smallest known failure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub min: u64,
    pub max: u64,
    /// No failure was observed; `max` is the configured ceiling, not a measurement.
    pub ceiling_unknown: bool,
}

impl ConfidenceInterval {
    pub fn width(&self) -> u64 {
        self.max.saturating_sub(self.min)
    }

    pub fn contains(&self, tokens: u64) -> bool {
        self.min <= tokens && tokens <= self.max
    }
}

/// How much the point estimate can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateKind {
    /// Both a success and a failure were observed around the estimate.
    Bracketed,
    /// Only successes were observed; the true limit is at least the estimate.
    LowerBound,
    /// No probe succeeded.
    NotFound,
}

impl fmt::Display for EstimateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstimateKind::Bracketed => write!(f, "bracketed"),
            EstimateKind::LowerBound => write!(f, "lower bound"),
            EstimateKind::NotFound => write!(f, "not found"),
        }
    }
}

/// Nearest-rank latency percentiles in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencyPercentiles {
    pub p50: u64,
    pub p90: u64,
    pub p95: u64,
    pub p99: u64,
}

/// Result of a run that halted without a fatal error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeRunResult {
    pub model: Model,
    pub strategy: StrategyKind,
    /// Frozen history in completion order
    pub outcomes: Vec<ProbeOutcome>,
    pub stop_condition: StopCondition,
    /// Largest accepted size, absent if nothing was accepted
    pub max_tokens: Option<u64>,
    pub interval: ConfidenceInterval,
    pub estimate_kind: EstimateKind,
    /// `100 * (1 - width / interval.max)`
    pub precision_pct: f64,
    /// Interval width in tokens
    pub absolute_width: u64,
    /// A success was observed above a failure; the interval was widened.
    #[serde(default)]
    pub inconsistent_observations: bool,
    pub success_rate: f64,
    pub total_cost: f64,
    pub average_latency_ms: f64,
    pub latency: LatencyPercentiles,
    /// Accepted input tokens per second of accepted-call latency
    pub throughput_tokens_per_sec: f64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ProbeRunResult {
    pub fn attempts(&self) -> usize {
        self.outcomes.len()
    }

    /// Total model calls including retries
    pub fn total_calls(&self) -> u64 {
        self.outcomes.iter().map(|o| o.calls as u64).sum()
    }

    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

/// Why a run was aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FatalReason {
    /// The endpoint rejected the credentials.
    Authentication,
    /// An unrecognized error persisted after its retry.
    UnresolvedUnknown,
    /// The sample generator could not produce a payload.
    SampleGeneration,
    /// The search parameters led to an impossible proposal.
    Configuration,
}

impl fmt::Display for FatalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FatalReason::Authentication => write!(f, "authentication failed"),
            FatalReason::UnresolvedUnknown => write!(f, "unrecognized error"),
            FatalReason::SampleGeneration => write!(f, "sample generation failed"),
            FatalReason::Configuration => write!(f, "configuration error"),
        }
    }
}

/// A run aborted by an unrecoverable error. Carries no estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FatalProbeFailure {
    pub model: Model,
    pub strategy: StrategyKind,
    pub reason: FatalReason,
    pub message: String,
    pub outcomes: Vec<ProbeOutcome>,
    pub total_cost: f64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl FatalProbeFailure {
    pub fn attempts(&self) -> usize {
        self.outcomes.len()
    }
}

/// What a run returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProbeRunOutcome {
    Completed(ProbeRunResult),
    Fatal(FatalProbeFailure),
}

impl ProbeRunOutcome {
    pub fn model(&self) -> &Model {
        match self {
            ProbeRunOutcome::Completed(r) => &r.model,
            ProbeRunOutcome::Fatal(f) => &f.model,
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, ProbeRunOutcome::Fatal(_))
    }

    pub fn stop_condition(&self) -> StopCondition {
        match self {
            ProbeRunOutcome::Completed(r) => r.stop_condition,
            ProbeRunOutcome::Fatal(_) => StopCondition::FatalError,
        }
    }

    pub fn result(&self) -> Option<&ProbeRunResult> {
        match self {
            ProbeRunOutcome::Completed(r) => Some(r),
            ProbeRunOutcome::Fatal(_) => None,
        }
    }

    pub fn fatal(&self) -> Option<&FatalProbeFailure> {
        match self {
            ProbeRunOutcome::Completed(_) => None,
            ProbeRunOutcome::Fatal(f) => Some(f),
        }
    }

    pub fn outcomes(&self) -> &[ProbeOutcome] {
        match self {
            ProbeRunOutcome::Completed(r) => &r.outcomes,
            ProbeRunOutcome::Fatal(f) => &f.outcomes,
        }
    }

    pub fn total_cost(&self) -> f64 {
        match self {
            ProbeRunOutcome::Completed(r) => r.total_cost,
            ProbeRunOutcome::Fatal(f) => f.total_cost,
        }
    }
}

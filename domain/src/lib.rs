//! Domain layer for ctxprobe
//!
//! This crate contains the probing engine's pure logic: how a raw call
//! result is classified, how a search strategy picks the next token count,
//! and how a frozen probe history becomes an estimate. It has no async
//! code and no I/O.
//!
//! # Core Concepts
//!
//! ## Probe
//!
//! One attempt to submit a payload of a given size. Each probe yields a
//! [`ProbeOutcome`] carrying a [`Classification`]; only `Success` and
//! `TokenLimitExceeded` move a search forward.
//!
//! ## Strategy
//!
//! - **Binary**: bisection over `[min, max]`
//! - **Linear**: fixed steps upward from `min`
//! - **Adaptive** (default): doubling from `min`, then bisection inside the bracket
//!
//! ## Result
//!
//! [`aggregate`] turns the history into a [`ProbeRunResult`]: point
//! estimate, [`ConfidenceInterval`], precision and latency statistics.

pub mod config;
pub mod core;
pub mod pricing;
pub mod probe;
pub mod result;
pub mod search;

// Re-export commonly used types
pub use config::{
    OutputFormat,
    validation::{ConfigIssue, ConfigIssueCode, Severity, has_errors},
};
pub use core::{error::DomainError, model::Model};
pub use pricing::ModelPricing;
pub use probe::{
    call::{CallError, CompletionResponse, RawCallResult},
    classification::Classification,
    classifier::{ClassificationRule, Interpretation, OutcomeClassifier, PatternTable, TokenCounts},
    outcome::{ProbeHistory, ProbeOutcome},
    stop::StopCondition,
};
pub use result::{
    ConfidenceInterval, EstimateKind, FatalProbeFailure, FatalReason, LatencyPercentiles,
    ProbeRunOutcome, ProbeRunResult, RunContext, aggregate,
};
pub use search::{
    AdaptiveHybrid, BinarySearch, LinearSweep, SearchDecision, SearchParams, SearchStrategy,
    StrategyKind,
};

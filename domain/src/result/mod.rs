//! Run results: aggregation of a frozen probe history.
//!
//! - [`aggregator::aggregate`]: history + stop condition → [`ProbeRunResult`]
//! - [`value_objects`]: result, fatal failure and the outcome enum wrapping both

pub mod aggregator;
pub mod stats;
pub mod value_objects;

pub use aggregator::{RunContext, aggregate};
pub use value_objects::{
    ConfidenceInterval, EstimateKind, FatalProbeFailure, FatalReason, LatencyPercentiles,
    ProbeRunOutcome, ProbeRunResult,
};

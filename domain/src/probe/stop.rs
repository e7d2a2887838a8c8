//! Why a probe run halted.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reason a run stopped issuing probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopCondition {
    /// The bracket is narrower than the precision threshold.
    ConvergedWithinPrecision,
    /// The configured maximum itself was accepted; the estimate is a lower bound.
    CeilingReached,
    /// `max_attempts` probes were issued.
    AttemptBudgetExhausted,
    /// The run-level deadline passed.
    WallClockTimeout,
    /// The caller cancelled the run.
    Cancelled,
    /// Even the minimum test length was rejected.
    BoundaryNotFound,
    /// An unrecoverable error aborted the run.
    FatalError,
}

impl StopCondition {
    /// Whether the search reached a conclusion of its own rather than being cut short.
    pub fn is_natural(&self) -> bool {
        matches!(
            self,
            StopCondition::ConvergedWithinPrecision
                | StopCondition::CeilingReached
                | StopCondition::BoundaryNotFound
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StopCondition::ConvergedWithinPrecision => "converged_within_precision",
            StopCondition::CeilingReached => "ceiling_reached",
            StopCondition::AttemptBudgetExhausted => "attempt_budget_exhausted",
            StopCondition::WallClockTimeout => "wall_clock_timeout",
            StopCondition::Cancelled => "cancelled",
            StopCondition::BoundaryNotFound => "boundary_not_found",
            StopCondition::FatalError => "fatal_error",
        }
    }

    /// Human-readable description for reports
    pub fn description(&self) -> &'static str {
        match self {
            StopCondition::ConvergedWithinPrecision => "converged within precision threshold",
            StopCondition::CeilingReached => "configured maximum accepted (limit may be higher)",
            StopCondition::AttemptBudgetExhausted => "attempt budget exhausted",
            StopCondition::WallClockTimeout => "run timed out",
            StopCondition::Cancelled => "cancelled",
            StopCondition::BoundaryNotFound => "minimum test length rejected",
            StopCondition::FatalError => "fatal error",
        }
    }
}

impl fmt::Display for StopCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Search strategies: decide which token count to probe next.
//!
//! Every strategy answers the same question: given the outcomes so far,
//! what should be probed next, or is the search done? The three variants
//! share one tagged [`SearchStrategy`] enum so convergence rules live in
//! exactly one place per variant.
//!
//! | Strategy   | Probes                        | Needs tight ceiling? |
//! |------------|-------------------------------|----------------------|
//! | `Binary`   | O(log(range / precision))     | Yes                  |
//! | `Linear`   | O(range / step)               | No                   |
//! | `Adaptive` | O(log(limit)) + O(log(bracket / precision)) | No     |
//!
//! Strategies only learn from decisive outcomes (`Success`,
//! `TokenLimitExceeded`). After a non-decisive outcome the same point is
//! proposed again; the executor has already spent its retries on it, so
//! the orchestrator's attempt budget bounds the repetition.

pub mod adaptive;
pub mod binary;
pub mod linear;
pub mod params;

pub use adaptive::AdaptiveHybrid;
pub use binary::BinarySearch;
pub use linear::LinearSweep;
pub use params::SearchParams;

use crate::core::error::DomainError;
use crate::probe::outcome::ProbeOutcome;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a strategy wants to happen next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchDecision {
    /// Probe this many tokens.
    Probe(u64),
    /// The bracket is within the precision threshold.
    Converged,
    /// The floor was rejected; there is no boundary inside the range.
    BoundaryNotFound,
    /// The configured ceiling was accepted; the true limit may be higher.
    CeilingReached,
}

impl SearchDecision {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SearchDecision::Probe(_))
    }
}

/// User-facing strategy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Binary,
    Linear,
    /// Doubling from the floor, then bisection (default)
    #[default]
    Adaptive,
}

impl StrategyKind {
    /// Get a short description for display
    pub fn description(&self) -> &'static str {
        match self {
            StrategyKind::Binary => "binary search over [min, max]",
            StrategyKind::Linear => "linear sweep in fixed steps",
            StrategyKind::Adaptive => "exponential bracketing, then binary search",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Binary => write!(f, "binary"),
            StrategyKind::Linear => write!(f, "linear"),
            StrategyKind::Adaptive => write!(f, "adaptive"),
        }
    }
}

impl std::str::FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "binary" | "bin" | "b" => Ok(StrategyKind::Binary),
            "linear" | "lin" | "l" => Ok(StrategyKind::Linear),
            "adaptive" | "hybrid" | "a" => Ok(StrategyKind::Adaptive),
            _ => Err(format!("Invalid strategy: {}", s)),
        }
    }
}

/// A strategy instance owned by exactly one run.
#[derive(Debug, Clone)]
pub enum SearchStrategy {
    Binary(BinarySearch),
    Linear(LinearSweep),
    Adaptive(AdaptiveHybrid),
}

impl SearchStrategy {
    pub fn new(kind: StrategyKind, params: SearchParams) -> Self {
        match kind {
            StrategyKind::Binary => SearchStrategy::Binary(BinarySearch::new(params)),
            StrategyKind::Linear => SearchStrategy::Linear(LinearSweep::new(params)),
            StrategyKind::Adaptive => SearchStrategy::Adaptive(AdaptiveHybrid::new(params)),
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            SearchStrategy::Binary(_) => StrategyKind::Binary,
            SearchStrategy::Linear(_) => StrategyKind::Linear,
            SearchStrategy::Adaptive(_) => StrategyKind::Adaptive,
        }
    }

    /// Propose the next probe from the run's history.
    ///
    /// Returns [`DomainError::ClampCollision`] when clamping a proposal
    /// into range would land on an already-resolved point.
    pub fn next_probe(&mut self, history: &[ProbeOutcome]) -> Result<SearchDecision, DomainError> {
        match self {
            SearchStrategy::Binary(s) => s.next_probe(history),
            SearchStrategy::Linear(s) => s.next_probe(history),
            SearchStrategy::Adaptive(s) => s.next_probe(history),
        }
    }

    /// The strategy's current `[low, high]` bracket, if it has one.
    pub fn bracket(&self) -> Option<(u64, u64)> {
        match self {
            SearchStrategy::Binary(s) => s.bracket(),
            SearchStrategy::Linear(s) => s.bracket(),
            SearchStrategy::Adaptive(s) => s.bracket(),
        }
    }
}

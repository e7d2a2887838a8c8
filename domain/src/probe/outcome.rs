//! Probe outcomes and the append-only probe history.

use super::classification::Classification;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The classified result of one probe (Value Object).
///
/// A probe may make several calls when transient failures are retried;
/// the outcome records the final call's classification and latency and
/// the cost summed over every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    /// 1-based position in the run's history
    pub attempt_index: usize,
    /// Token count the strategy asked for
    pub requested_tokens: u64,
    /// Input tokens actually sent (provider usage, else the generator's measurement)
    pub input_tokens: u64,
    /// Output tokens produced (zero for rejected calls)
    pub output_tokens: u64,
    /// Output budget reserved inside the probed size (`include_output_budget`)
    #[serde(default)]
    pub reserved_output_tokens: u64,
    pub classification: Classification,
    /// Wall-clock latency of the final call in milliseconds
    pub latency_ms: u64,
    /// Estimated cost in USD across all calls of this probe
    pub estimated_cost: f64,
    /// Number of calls made, including retries (always >= 1)
    pub calls: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ProbeOutcome {
    pub fn is_success(&self) -> bool {
        self.classification.is_success()
    }

    pub fn is_token_limit(&self) -> bool {
        self.classification == Classification::TokenLimitExceeded
    }

    pub fn is_decisive(&self) -> bool {
        self.classification.is_decisive()
    }

    /// The context size this probe actually tested: measured input plus
    /// any reserved output budget. Strategies and the aggregator reason
    /// in this unit, never in the requested count.
    pub fn measured_size(&self) -> u64 {
        self.input_tokens + self.reserved_output_tokens
    }

    /// Number of calls beyond the first
    pub fn retries(&self) -> u32 {
        self.calls.saturating_sub(1)
    }
}

/// Ordered, append-only record of a run's probe outcomes.
///
/// Order equals completion order. Outcomes cannot be removed or edited;
/// [`ProbeHistory::freeze`] hands the outcomes off once the run halts.
#[derive(Debug, Clone, Default)]
pub struct ProbeHistory {
    outcomes: Vec<ProbeOutcome>,
}

impl ProbeHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, outcome: ProbeOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn as_slice(&self) -> &[ProbeOutcome] {
        &self.outcomes
    }

    pub fn last(&self) -> Option<&ProbeOutcome> {
        self.outcomes.last()
    }

    /// Index the next outcome will carry.
    pub fn next_attempt_index(&self) -> usize {
        self.outcomes.len() + 1
    }

    /// Largest accepted input so far.
    pub fn best_success(&self) -> Option<u64> {
        self.outcomes
            .iter()
            .filter(|o| o.is_success())
            .map(|o| o.measured_size())
            .max()
    }

    /// Stop recording and return the outcomes in completion order.
    pub fn freeze(self) -> Vec<ProbeOutcome> {
        self.outcomes
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Build an outcome where requested and actual input tokens agree.
    pub fn outcome(index: usize, tokens: u64, classification: Classification) -> ProbeOutcome {
        ProbeOutcome {
            attempt_index: index,
            requested_tokens: tokens,
            input_tokens: tokens,
            output_tokens: if classification.is_success() { 16 } else { 0 },
            reserved_output_tokens: 0,
            classification,
            latency_ms: 100,
            estimated_cost: 0.0,
            calls: 1,
            error_detail: None,
            timestamp: DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap(),
        }
    }
}

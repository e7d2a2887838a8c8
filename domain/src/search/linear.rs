//! Linear sweep: step upward from the floor until the first rejection.
//!
//! Costs O((max - min) / step) probes in the worst case. Used when
//! deterministic coverage of the range matters more than probe count.

use super::SearchDecision;
use super::params::SearchParams;
use crate::core::error::DomainError;
use crate::probe::classification::Classification;
use crate::probe::outcome::ProbeOutcome;

#[derive(Debug, Clone)]
pub struct LinearSweep {
    params: SearchParams,
    /// Next size to probe (requested units)
    current: u64,
    last_success: Option<u64>,
    /// Requested size of the last accepted probe
    last_success_requested: Option<u64>,
    first_failure: Option<u64>,
    ceiling_accepted: bool,
    floor_rejected: bool,
    consumed: usize,
}

impl LinearSweep {
    pub fn new(params: SearchParams) -> Self {
        Self {
            params,
            current: params.min_test_length(),
            last_success: None,
            last_success_requested: None,
            first_failure: None,
            ceiling_accepted: false,
            floor_rejected: false,
            consumed: 0,
        }
    }

    /// `[last success, first failure]` once the sweep has converged.
    pub fn bracket(&self) -> Option<(u64, u64)> {
        self.last_success.zip(self.first_failure)
    }

    fn absorb(&mut self, outcome: &ProbeOutcome) {
        let size = outcome.measured_size();
        match outcome.classification {
            Classification::Success => {
                self.last_success = Some(self.last_success.map_or(size, |s| s.max(size)));
                self.last_success_requested = Some(outcome.requested_tokens);
                if self.current >= self.params.max_test_length()
                    || size >= self.params.max_test_length()
                {
                    self.ceiling_accepted = true;
                } else {
                    self.current = self.current.saturating_add(self.params.step_size());
                }
            }
            Classification::TokenLimitExceeded => {
                if self.last_success.is_none() {
                    self.floor_rejected = true;
                } else {
                    self.first_failure = Some(size);
                }
            }
            _ => {}
        }
    }

    pub fn next_probe(&mut self, history: &[ProbeOutcome]) -> Result<SearchDecision, DomainError> {
        for outcome in history.iter().skip(self.consumed) {
            self.absorb(outcome);
        }
        self.consumed = self.consumed.max(history.len());

        if self.floor_rejected {
            return Ok(SearchDecision::BoundaryNotFound);
        }
        if self.first_failure.is_some() {
            return Ok(SearchDecision::Converged);
        }
        if self.ceiling_accepted {
            return Ok(SearchDecision::CeilingReached);
        }
        let next = self
            .params
            .clamp_proposal(self.current, self.last_success_requested, None)?;
        self.current = next;
        Ok(SearchDecision::Probe(next))
    }
}

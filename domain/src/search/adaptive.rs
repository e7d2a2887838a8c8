//! Adaptive hybrid: exponential bracketing, then bisection.
//!
//! The coarse phase doubles from the floor (`min, 2·min, 4·min, …`,
//! clamped to the ceiling) until the first rejection. That establishes
//! `[last success, first failure]` in O(log(range)) probes without a
//! tight caller-supplied ceiling. The fine phase runs [`BinarySearch`]
//! over that bracket down to the precision threshold.

use super::SearchDecision;
use super::binary::BinarySearch;
use super::params::SearchParams;
use crate::core::error::DomainError;
use crate::probe::classification::Classification;
use crate::probe::outcome::ProbeOutcome;

#[derive(Debug, Clone)]
enum Phase {
    Coarse {
        next: u64,
        last_success: Option<u64>,
        last_success_requested: Option<u64>,
    },
    Fine(BinarySearch),
    CeilingAccepted,
    FloorRejected,
}

#[derive(Debug, Clone)]
pub struct AdaptiveHybrid {
    params: SearchParams,
    phase: Phase,
    consumed: usize,
}

impl AdaptiveHybrid {
    pub fn new(params: SearchParams) -> Self {
        Self {
            params,
            phase: Phase::Coarse {
                next: params.min_test_length(),
                last_success: None,
                last_success_requested: None,
            },
            consumed: 0,
        }
    }

    pub fn is_fine_phase(&self) -> bool {
        matches!(self.phase, Phase::Fine(_))
    }

    /// Current bracket once the coarse phase has found a failure.
    pub fn bracket(&self) -> Option<(u64, u64)> {
        match &self.phase {
            Phase::Fine(search) => search.bracket(),
            _ => None,
        }
    }

    /// Advance the coarse phase by one outcome at history position `index`.
    fn absorb_coarse(&mut self, outcome: &ProbeOutcome, index: usize) {
        let Phase::Coarse {
            next,
            last_success,
            last_success_requested,
        } = &mut self.phase
        else {
            return;
        };
        let size = outcome.measured_size();
        match outcome.classification {
            Classification::Success => {
                *last_success = Some(last_success.map_or(size, |s| s.max(size)));
                *last_success_requested = Some(outcome.requested_tokens);
                if *next >= self.params.max_test_length() || size >= self.params.max_test_length()
                {
                    self.phase = Phase::CeilingAccepted;
                } else {
                    *next = next.saturating_mul(2);
                }
            }
            Classification::TokenLimitExceeded => {
                let low = *last_success;
                self.phase = match low {
                    None => Phase::FloorRejected,
                    Some(low) => {
                        Phase::Fine(BinarySearch::bracketed(self.params, low, size, index + 1))
                    }
                };
            }
            _ => {}
        }
    }

    pub fn next_probe(&mut self, history: &[ProbeOutcome]) -> Result<SearchDecision, DomainError> {
        while self.consumed < history.len() && matches!(self.phase, Phase::Coarse { .. }) {
            let index = self.consumed;
            self.absorb_coarse(&history[index], index);
            self.consumed += 1;
        }

        match &mut self.phase {
            Phase::Coarse {
                next,
                last_success_requested,
                ..
            } => {
                let clamped = self
                    .params
                    .clamp_proposal(*next, *last_success_requested, None)?;
                *next = clamped;
                Ok(SearchDecision::Probe(clamped))
            }
            Phase::Fine(search) => search.next_probe(history),
            Phase::CeilingAccepted => Ok(SearchDecision::CeilingReached),
            Phase::FloorRejected => Ok(SearchDecision::BoundaryNotFound),
        }
    }
}

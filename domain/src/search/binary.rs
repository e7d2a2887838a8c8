//! Binary search over `[low, high]`.

use super::SearchDecision;
use super::params::{SearchParams, midpoint};
use crate::core::error::DomainError;
use crate::probe::classification::Classification;
use crate::probe::outcome::ProbeOutcome;

/// Bisection state for one run.
///
/// `low` is the largest accepted size, `high` the smallest rejected one.
/// Until each end has been observed it holds the configured bound and
/// the matching `*_observed` flag is false. `low` only grows, `high`
/// only shrinks, and `low <= high` always holds.
#[derive(Debug, Clone)]
pub struct BinarySearch {
    params: SearchParams,
    low: u64,
    high: u64,
    low_observed: bool,
    high_observed: bool,
    floor_rejected: bool,
    consumed: usize,
}

impl BinarySearch {
    /// Full-range search starting with a sanity probe at the floor.
    pub fn new(params: SearchParams) -> Self {
        Self {
            params,
            low: params.min_test_length(),
            high: params.max_test_length(),
            low_observed: false,
            high_observed: false,
            floor_rejected: false,
            consumed: 0,
        }
    }

    /// Search inside a bracket whose ends were already observed.
    ///
    /// `consumed` is the number of history entries that produced the
    /// bracket; they are not re-read.
    pub fn bracketed(params: SearchParams, low: u64, high: u64, consumed: usize) -> Self {
        let high = high.max(low);
        Self {
            params,
            low,
            high,
            low_observed: true,
            high_observed: true,
            floor_rejected: false,
            consumed,
        }
    }

    pub fn low(&self) -> u64 {
        self.low
    }

    pub fn high(&self) -> u64 {
        self.high
    }

    /// Current bracket, or `None` before the floor has been accepted.
    pub fn bracket(&self) -> Option<(u64, u64)> {
        self.low_observed.then_some((self.low, self.high))
    }

    fn absorb(&mut self, outcome: &ProbeOutcome) {
        let size = outcome.measured_size();
        match outcome.classification {
            Classification::Success => {
                self.low = self.low.max(size.min(self.high));
                self.low_observed = true;
            }
            Classification::TokenLimitExceeded => {
                if !self.low_observed && outcome.requested_tokens <= self.params.min_test_length()
                {
                    self.floor_rejected = true;
                }
                self.high = self.high.min(size.max(self.low));
                self.high_observed = true;
            }
            // Non-decisive: the same point is proposed again.
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
        if !self.low_observed {
            return Ok(SearchDecision::Probe(self.params.min_test_length()));
        }

        let width = self.high - self.low;
        if width <= self.params.precision_threshold() || width <= 1 {
            if self.high_observed {
                return Ok(SearchDecision::Converged);
            }
            if self.low >= self.params.max_test_length() {
                return Ok(SearchDecision::CeilingReached);
            }
            // The configured ceiling was never tested; confirm it rejects.
            return Ok(SearchDecision::Probe(self.params.max_test_length()));
        }

        let next = self.params.clamp_proposal(
            midpoint(self.low, self.high),
            Some(self.low),
            self.high_observed.then_some(self.high),
        )?;
        Ok(SearchDecision::Probe(next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::test_support::{drive, limit_at};

    fn params(min: u64, max: u64, precision: u64) -> SearchParams {
        SearchParams::try_new(min, max, precision, 1000).unwrap()
    }

    #[test]
    fn test_scenario_a_converges_around_4096_within_five_probes() {
        let mut search = BinarySearch::new(params(1000, 8000, 500));
        let run = drive(|h| search.next_probe(h), limit_at(4096), 50);

        assert_eq!(run.decision, SearchDecision::Converged);
        assert!(run.probes.len() <= 5, "probes: {:?}", run.probes);
        assert_eq!(run.probes[0], 1000);
        assert!(search.low() < 4096 && 4096 <= search.high());
        assert!(search.high() - search.low() <= 500);
    }

    #[test]
    fn test_bisection_probe_count_is_logarithmic() {
        // Bisection probes exclude the sanity probes at floor and ceiling.
        for (min, max, precision, limit) in [
            (1000u64, 8000u64, 500u64, 4096u64),
            (1000, 200_000, 1000, 128_000),
            (1000, 200_000, 1000, 1001),
            (1000, 200_000, 1000, 199_999),
            (1, 1_000_000, 1, 777_777),
        ] {
            let mut search = BinarySearch::new(params(min, max, precision));
            let run = drive(|h| search.next_probe(h), limit_at(limit), 200);
            let range = (max - min) as f64;
            let bound = (range / precision as f64).log2().ceil() as usize;
            let sanity = run
                .probes
                .iter()
                .filter(|&&p| p == min || p == max)
                .count();
            assert!(
                run.probes.len() - sanity <= bound,
                "limit {limit}: {} bisection probes > {bound}",
                run.probes.len() - sanity
            );
            assert_eq!(run.decision, SearchDecision::Converged);
        }
    }

    #[test]
    fn test_bounds_are_monotonic() {
        let mut search = BinarySearch::new(params(1000, 100_000, 100));
        let oracle = limit_at(31_337);
        let mut history = Vec::new();
        let (mut prev_low, mut prev_high) = (search.low(), search.high());

        while let SearchDecision::Probe(tokens) = search.next_probe(&history).unwrap() {
            assert!(search.low() <= search.high());
            assert!(search.low() >= prev_low);
            assert!(search.high() <= prev_high);
            prev_low = search.low();
            prev_high = search.high();
            history.push(crate::probe::outcome::test_support::outcome(
                history.len() + 1,
                tokens,
                oracle(tokens),
            ));
        }
        assert!(search.low() <= search.high());
    }

    #[test]
    fn test_never_reprobes_resolved_region() {
        let mut search = BinarySearch::new(params(1000, 64_000, 50));
        let run = drive(|h| search.next_probe(h), limit_at(20_000), 100);
        let mut max_success = 0;
        let mut min_failure = u64::MAX;
        for &p in &run.probes {
            assert!(p > max_success, "{p} at or below known success");
            assert!(p < min_failure, "{p} at or above known failure");
            if p < 20_000 {
                max_success = max_success.max(p);
            } else {
                min_failure = min_failure.min(p);
            }
        }
    }

    #[test]
    fn test_scenario_c_floor_failure_is_boundary_not_found() {
        let mut search = BinarySearch::new(params(1000, 8000, 500));
        let run = drive(|h| search.next_probe(h), limit_at(500), 50);
        assert_eq!(run.probes, vec![1000]);
        assert_eq!(run.decision, SearchDecision::BoundaryNotFound);
    }

    #[test]
    fn test_untested_ceiling_gets_a_sanity_probe() {
        let mut search = BinarySearch::new(params(1000, 8000, 500));
        let run = drive(|h| search.next_probe(h), limit_at(7900), 50);
        assert_eq!(run.probes.last(), Some(&8000));
        assert_eq!(run.decision, SearchDecision::Converged);
        assert_eq!(search.high(), 8000);
    }

    #[test]
    fn test_accepted_ceiling_is_ceiling_reached() {
        let mut search = BinarySearch::new(params(1000, 8000, 500));
        let run = drive(|h| search.next_probe(h), limit_at(1_000_000), 50);
        assert_eq!(run.probes.last(), Some(&8000));
        assert_eq!(run.decision, SearchDecision::CeilingReached);
    }

    #[test]
    fn test_non_decisive_outcome_repeats_the_same_point() {
        use crate::probe::outcome::test_support::outcome;

        let mut search = BinarySearch::new(params(1000, 8000, 500));
        let mut history = vec![outcome(1, 1000, Classification::Success)];
        assert_eq!(search.next_probe(&history).unwrap(), SearchDecision::Probe(4500));
        history.push(outcome(2, 4500, Classification::Transient));
        assert_eq!(search.next_probe(&history).unwrap(), SearchDecision::Probe(4500));
        assert_eq!(search.high(), 8000);
    }

    #[test]
    fn test_bracketed_search_skips_consumed_history() {
        use crate::probe::outcome::test_support::outcome;

        let history = vec![
            outcome(1, 8000, Classification::Success),
            outcome(2, 16_000, Classification::TokenLimitExceeded),
        ];
        let p = SearchParams::try_new(1000, 32_000, 500, 1000).unwrap();
        let mut search = BinarySearch::bracketed(p, 8000, 16_000, history.len());
        assert_eq!(search.next_probe(&history).unwrap(), SearchDecision::Probe(12_000));
        assert_eq!(search.bracket(), Some((8000, 16_000)));
    }
}

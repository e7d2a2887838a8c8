//! Probe parameters: run loop control.
//!
//! [`ProbeParams`] groups every knob of one probe run: the search range
//! and resolution, the strategy, attempt and time budgets, the output
//! budget and the [`RetryPolicy`]. These are application-layer concerns;
//! the domain only sees the validated [`SearchParams`].

use super::retry_policy::RetryPolicy;
use ctxprobe_domain::{ConfigIssue, ConfigIssueCode, SearchParams, StrategyKind};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Run loop control parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeParams {
    /// Smallest size probed; always the first probe
    pub min_test_length: u64,
    /// Configured ceiling; proposals never exceed it
    pub max_test_length: u64,
    /// Linear sweep increment
    pub step_size: u64,
    /// Bracket width at which the search converges
    pub precision_threshold: u64,
    pub strategy: StrategyKind,
    /// Maximum probes per run (retries do not count)
    pub max_attempts: usize,
    /// Per-call timeout
    pub timeout_ms: u64,
    /// Run-level deadline
    pub total_timeout_ms: Option<u64>,
    /// Reserve `output_tokens` inside the probed size
    pub include_output_budget: bool,
    /// Output tokens requested from the endpoint
    pub output_tokens: u64,
    pub retry: RetryPolicy,
}

impl Default for ProbeParams {
    fn default() -> Self {
        let search = SearchParams::default();
        Self {
            min_test_length: search.min_test_length(),
            max_test_length: search.max_test_length(),
            step_size: search.step_size(),
            precision_threshold: search.precision_threshold(),
            strategy: StrategyKind::default(),
            max_attempts: 30,
            timeout_ms: 120_000,
            total_timeout_ms: None,
            include_output_budget: false,
            output_tokens: 16,
            retry: RetryPolicy::default(),
        }
    }
}

impl ProbeParams {
    /// Validated search parameters, or every violated constraint.
    pub fn search_params(&self) -> Result<SearchParams, Vec<String>> {
        SearchParams::try_new(
            self.min_test_length,
            self.max_test_length,
            self.precision_threshold,
            self.step_size,
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn total_timeout(&self) -> Option<Duration> {
        self.total_timeout_ms.map(Duration::from_millis)
    }

    /// Output tokens reserved inside each probed size.
    pub fn reserved_output_tokens(&self) -> u64 {
        if self.include_output_budget {
            self.output_tokens
        } else {
            0
        }
    }

    /// Check the parameters without running anything.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if let Err(errors) = self.search_params() {
            issues.extend(
                errors
                    .into_iter()
                    .map(|e| ConfigIssue::error(ConfigIssueCode::InvalidSearchParams, e)),
            );
        } else if self.precision_threshold >= self.max_test_length - self.min_test_length {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::PrecisionWiderThanRange,
                format!(
                    "precision_threshold ({}) is not narrower than the search range ({}..{}); \
                     the search converges immediately",
                    self.precision_threshold, self.min_test_length, self.max_test_length
                ),
            ));
        }

        if self.max_attempts == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroMaxAttempts,
                "max_attempts must be >= 1",
            ));
        }
        if self.timeout_ms == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroTimeout,
                "timeout_ms must be >= 1",
            ));
        }
        match self.total_timeout_ms {
            Some(0) => issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroTimeout,
                "total_timeout_ms must be >= 1",
            )),
            Some(total) if total < self.timeout_ms => issues.push(ConfigIssue::warning(
                ConfigIssueCode::TotalTimeoutShorterThanCall,
                format!(
                    "total_timeout_ms ({}) is shorter than timeout_ms ({})",
                    total, self.timeout_ms
                ),
            )),
            _ => {}
        }

        if self.include_output_budget && self.output_tokens >= self.min_test_length {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutputBudgetTooLarge,
                format!(
                    "output_tokens ({}) leaves no input budget at min_test_length ({})",
                    self.output_tokens, self.min_test_length
                ),
            ));
        }

        if self.retry.initial_backoff_ms > self.retry.max_backoff_ms {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::BackoffInverted,
                format!(
                    "initial_backoff_ms ({}) exceeds max_backoff_ms ({}); every delay is capped",
                    self.retry.initial_backoff_ms, self.retry.max_backoff_ms
                ),
            ));
        }

        issues
    }

    // ==================== Builder Methods ====================

    pub fn with_range(mut self, min: u64, max: u64) -> Self {
        self.min_test_length = min;
        self.max_test_length = max;
        self
    }

    pub fn with_precision(mut self, precision: u64) -> Self {
        self.precision_threshold = precision;
        self
    }

    pub fn with_step_size(mut self, step: u64) -> Self {
        self.step_size = step;
        self
    }

    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_max_attempts(mut self, max: usize) -> Self {
        self.max_attempts = max;
        self
    }

    pub fn with_timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = ms;
        self
    }

    pub fn with_total_timeout_ms(mut self, ms: Option<u64>) -> Self {
        self.total_timeout_ms = ms;
        self
    }

    pub fn with_output_budget(mut self, output_tokens: u64, include: bool) -> Self {
        self.output_tokens = output_tokens;
        self.include_output_budget = include;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctxprobe_domain::{Severity, has_errors};

    #[test]
    fn test_default_is_valid() {
        let params = ProbeParams::default();
        assert!(params.validate().is_empty());
        assert_eq!(params.strategy, StrategyKind::Adaptive);
        assert_eq!(params.reserved_output_tokens(), 0);
    }

    #[test]
    fn test_builder() {
        let params = ProbeParams::default()
            .with_range(1000, 8000)
            .with_precision(500)
            .with_strategy(StrategyKind::Binary)
            .with_max_attempts(12);

        assert_eq!(params.min_test_length, 1000);
        assert_eq!(params.max_test_length, 8000);
        assert_eq!(params.search_params().unwrap().precision_threshold(), 500);
        assert_eq!(params.max_attempts, 12);
    }

    #[test]
    fn test_invalid_range_reports_errors() {
        let params = ProbeParams::default().with_range(5000, 1000).with_max_attempts(0);
        let issues = params.validate();
        assert!(has_errors(&issues));
        let codes: Vec<_> = issues.iter().map(|i| i.code).collect();
        assert!(codes.contains(&ConfigIssueCode::InvalidSearchParams));
        assert!(codes.contains(&ConfigIssueCode::ZeroMaxAttempts));
    }

    #[test]
    fn test_zero_timeouts_are_errors() {
        let issues = ProbeParams::default()
            .with_timeout_ms(0)
            .with_total_timeout_ms(Some(0))
            .validate();
        assert_eq!(
            issues
                .iter()
                .filter(|i| i.code == ConfigIssueCode::ZeroTimeout)
                .count(),
            2
        );
    }

    #[test]
    fn test_output_budget_must_fit_the_floor() {
        let params = ProbeParams::default()
            .with_range(1000, 8000)
            .with_output_budget(1000, true);
        let issues = params.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, ConfigIssueCode::OutputBudgetTooLarge);
        assert_eq!(params.reserved_output_tokens(), 1000);

        // Not reserved, so not checked.
        assert!(ProbeParams::default()
            .with_output_budget(5000, false)
            .validate()
            .is_empty());
    }

    #[test]
    fn test_warnings_do_not_block() {
        let params = ProbeParams::default()
            .with_range(1000, 2000)
            .with_precision(5000)
            .with_total_timeout_ms(Some(10))
            .with_retry(RetryPolicy::default().with_initial_backoff_ms(60_000));
        let issues = params.validate();
        assert_eq!(issues.len(), 3);
        assert!(issues.iter().all(|i| i.severity == Severity::Warning));
    }
}

//! Search parameters and the shared numeric rules every strategy follows.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Bounds and resolution of a context-window search.
///
/// Four knobs:
/// - `min_test_length`: the floor; the first probe of every strategy
/// - `max_test_length`: the configured ceiling; proposals never exceed it
/// - `precision_threshold`: bracket width (tokens) at which a search converges
/// - `step_size`: cursor increment for the linear sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    min_test_length: u64,
    max_test_length: u64,
    precision_threshold: u64,
    step_size: u64,
}

impl SearchParams {
    /// Create parameters, returning every violated constraint.
    ///
    /// Rules:
    /// - `min_test_length >= 1`
    /// - `max_test_length > min_test_length`
    /// - `precision_threshold >= 1`
    /// - `step_size >= 1`
    pub fn try_new(
        min_test_length: u64,
        max_test_length: u64,
        precision_threshold: u64,
        step_size: u64,
    ) -> Result<Self, Vec<String>> {
        let mut errors = Vec::new();
        if min_test_length < 1 {
            errors.push("min_test_length must be >= 1".to_string());
        }
        if max_test_length <= min_test_length {
            errors.push(format!(
                "max_test_length ({}) must be > min_test_length ({})",
                max_test_length, min_test_length
            ));
        }
        if precision_threshold < 1 {
            errors.push("precision_threshold must be >= 1".to_string());
        }
        if step_size < 1 {
            errors.push("step_size must be >= 1".to_string());
        }
        if errors.is_empty() {
            Ok(Self {
                min_test_length,
                max_test_length,
                precision_threshold,
                step_size,
            })
        } else {
            Err(errors)
        }
    }

    // ==================== Accessors ====================

    pub fn min_test_length(&self) -> u64 {
        self.min_test_length
    }

    pub fn max_test_length(&self) -> u64 {
        self.max_test_length
    }

    pub fn precision_threshold(&self) -> u64 {
        self.precision_threshold
    }

    pub fn step_size(&self) -> u64 {
        self.step_size
    }

    /// Width of the configured range.
    pub fn range(&self) -> u64 {
        self.max_test_length - self.min_test_length
    }

    // ==================== Numeric Rules ====================

    /// Clamp a proposal into `[min_test_length, max_test_length]`.
    ///
    /// `resolved` is the open interval `(known_success, known_failure)` of
    /// still-unresolved sizes. A clamped value that falls outside it would
    /// re-test an already-resolved point, which is reported as a
    /// configuration error.
    pub fn clamp_proposal(
        &self,
        proposed: u64,
        known_success: Option<u64>,
        known_failure: Option<u64>,
    ) -> Result<u64, DomainError> {
        let clamped = proposed.clamp(self.min_test_length, self.max_test_length);
        let collides = known_success.is_some_and(|s| clamped <= s)
            || known_failure.is_some_and(|f| clamped >= f);
        if collides {
            return Err(DomainError::ClampCollision { proposed, clamped });
        }
        Ok(clamped)
    }
}

impl Default for SearchParams {
    /// Default: 1,000 to 200,000 tokens, converge within 1,000, linear steps of 10,000.
    fn default() -> Self {
        Self {
            min_test_length: 1_000,
            max_test_length: 200_000,
            precision_threshold: 1_000,
            step_size: 10_000,
        }
    }
}

/// Integer midpoint, rounding down.
pub fn midpoint(low: u64, high: u64) -> u64 {
    low + (high - low) / 2
}

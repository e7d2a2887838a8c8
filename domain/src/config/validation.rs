//! Structured configuration issues.
//!
//! Probe settings come from defaults, files, environment and flags, so a
//! bad combination is reported as a list of issues with a severity rather
//! than failing at the first problem. Callers decide what to do with
//! warnings; any [`Severity::Error`] means the run must not start.
//!
//! # Examples
//!
//! ```
//! use ctxprobe_domain::config::validation::{ConfigIssue, ConfigIssueCode, Severity, has_errors};
//!
//! let issues = vec![ConfigIssue::warning(
//!     ConfigIssueCode::PrecisionWiderThanRange,
//!     "precision 50000 is wider than the search range",
//! )];
//! assert!(!has_errors(&issues));
//! ```

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// `min_test_length`, `max_test_length`, `precision_threshold` or `step_size` out of range.
    InvalidSearchParams,
    /// `max_attempts` is zero.
    ZeroMaxAttempts,
    /// `timeout_ms` is zero.
    ZeroTimeout,
    /// The reserved output budget swallows the whole minimum probe.
    OutputBudgetTooLarge,
    /// Precision threshold is at least the search range; one probe converges.
    PrecisionWiderThanRange,
    /// The run deadline is shorter than a single call timeout.
    TotalTimeoutShorterThanCall,
    /// `initial_backoff_ms` exceeds `max_backoff_ms`.
    BackoffInverted,
    /// A pricing override has a negative or non-finite price.
    InvalidPricing,
    /// A configured `model` id is empty.
    EmptyModel,
    /// A string setting is not one of its accepted values.
    InvalidEnumValue,
    /// The endpoint base URL is empty or not http(s).
    InvalidEndpoint,
}

/// A detected issue in the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Whether any issue is fatal.
pub fn has_errors(issues: &[ConfigIssue]) -> bool {
    issues.iter().any(ConfigIssue::is_error)
}

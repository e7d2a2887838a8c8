//! Application-level configuration.
//!
//! This module provides configuration types that control how use cases behave:
//!
//! - [`ProbeParams`]: run loop control (range, strategy, budgets, output budget)
//! - [`RetryPolicy`]: backoff for transient and rate-limited calls

pub mod probe_params;
pub mod retry_policy;

pub use probe_params::ProbeParams;
pub use retry_policy::RetryPolicy;

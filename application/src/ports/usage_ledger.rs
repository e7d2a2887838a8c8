//! Port for recording every model call.
//!
//! Defines the [`UsageLedger`] trait. One [`UsageEntry`] is recorded per
//! call, retries included, so spend can be audited independently of the
//! per-probe outcomes.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostics, while the ledger is a machine-readable
//! record (in memory or JSONL).

use chrono::{DateTime, Utc};
use ctxprobe_domain::{Classification, Model};
use serde::{Deserialize, Serialize};

/// One model call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageEntry {
    pub timestamp: DateTime<Utc>,
    pub model: Model,
    /// Probe this call belonged to
    pub attempt_index: usize,
    /// 1-based call number within the probe
    pub call_index: u32,
    pub requested_tokens: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub classification: Classification,
    pub latency_ms: u64,
    pub cost: f64,
}

/// Append-only record of calls, safe to share between concurrent runs.
///
/// `record` cannot fail; implementations log write failures instead.
pub trait UsageLedger: Send + Sync {
    fn record(&self, entry: UsageEntry);

    /// Entries recorded so far, in recording order.
    fn entries(&self) -> Vec<UsageEntry>;

    fn total_cost(&self) -> f64 {
        self.entries().iter().fold(0.0, |acc, e| acc + e.cost)
    }
}

/// No-op implementation for tests and when auditing is disabled.
pub struct NoUsageLedger;

impl UsageLedger for NoUsageLedger {
    fn record(&self, _entry: UsageEntry) {}

    fn entries(&self) -> Vec<UsageEntry> {
        Vec::new()
    }
}

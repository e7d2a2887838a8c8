//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod classifier;
mod endpoint;
mod ledger;
mod output;
mod pricing;
mod probe;
mod retry;

pub use classifier::FileClassifierConfig;
pub use endpoint::FileEndpointConfig;
pub use ledger::FileLedgerConfig;
pub use output::FileOutputConfig;
pub use pricing::{FilePricingConfig, FilePricingEntry, validate_pricing};
pub use probe::FileProbeConfig;
pub use retry::FileRetryConfig;

use ctxprobe_application::ProbeParams;
use ctxprobe_domain::{ConfigIssue, Model};
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Search range, strategy and budgets
    pub probe: FileProbeConfig,
    /// Backoff between calls of one probe
    pub retry: FileRetryConfig,
    /// OpenAI-compatible endpoint
    pub endpoint: FileEndpointConfig,
    /// Per-model price overrides
    pub pricing: FilePricingConfig,
    /// Extra error phrasings for classification
    pub classifier: FileClassifierConfig,
    /// Usage ledger destination
    pub ledger: FileLedgerConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Probe parameters described by the `[probe]` and `[retry]` sections.
    pub fn to_probe_params(&self) -> (ProbeParams, Vec<ConfigIssue>) {
        let params = ProbeParams::default().with_retry(self.retry.to_policy());
        self.probe.apply_to(params)
    }

    /// Models listed under `[probe]`, skipping empty entries.
    pub fn models(&self) -> Vec<Model> {
        self.probe.parse_models().0
    }

    /// Validate the entire configuration, returning all detected issues.
    ///
    /// This is the single entry point for config validation. It checks:
    /// 1. Model ids and the strategy name
    /// 2. Probe parameters and retry policy
    /// 3. Endpoint URL and pricing overrides
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        issues.extend(self.probe.parse_models().1);
        let (params, strategy_issues) = self.to_probe_params();
        issues.extend(strategy_issues);
        issues.extend(params.validate());

        issues.extend(self.endpoint.validate());
        issues.extend(validate_pricing(&self.pricing));

        issues
    }
}

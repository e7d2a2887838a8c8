//! Probe run configuration from TOML (`[probe]` section)

use ctxprobe_application::ProbeParams;
use ctxprobe_domain::{ConfigIssue, ConfigIssueCode, Model, StrategyKind};
use serde::{Deserialize, Serialize};

/// Raw probe configuration from TOML
///
/// # Example
///
/// ```toml
/// [probe]
/// models = ["gpt-4o-mini", "openai/gpt-4.1"]
/// min_test_length = 1000
/// max_test_length = 128000
/// precision_threshold = 500
/// strategy = "adaptive"              # "binary", "linear" or "adaptive"
/// step_size = 4000                   # linear sweep only
/// max_attempts = 30
/// timeout_ms = 120000
/// total_timeout_ms = 900000          # optional run deadline
/// include_output_budget = false
/// output_tokens = 16
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProbeConfig {
    /// Models probed when none are given on the command line
    pub models: Vec<String>,
    pub min_test_length: u64,
    pub max_test_length: u64,
    pub step_size: u64,
    pub precision_threshold: u64,
    /// Search strategy name
    pub strategy: String,
    pub max_attempts: usize,
    pub timeout_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_timeout_ms: Option<u64>,
    pub include_output_budget: bool,
    pub output_tokens: u64,
}

impl Default for FileProbeConfig {
    fn default() -> Self {
        let params = ProbeParams::default();
        Self {
            models: Vec::new(),
            min_test_length: params.min_test_length,
            max_test_length: params.max_test_length,
            step_size: params.step_size,
            precision_threshold: params.precision_threshold,
            strategy: params.strategy.to_string(),
            max_attempts: params.max_attempts,
            timeout_ms: params.timeout_ms,
            total_timeout_ms: params.total_timeout_ms,
            include_output_budget: params.include_output_budget,
            output_tokens: params.output_tokens,
        }
    }
}

impl FileProbeConfig {
    /// Parse strategy string into StrategyKind, returning warnings on failure.
    ///
    /// Accepts: "binary", "bin", "linear", "lin", "adaptive", "hybrid"
    pub fn parse_strategy(&self) -> (StrategyKind, Vec<ConfigIssue>) {
        match self.strategy.parse::<StrategyKind>() {
            Ok(kind) => (kind, vec![]),
            Err(_) => {
                let fallback = StrategyKind::default();
                let issue = ConfigIssue::warning(
                    ConfigIssueCode::InvalidEnumValue,
                    format!(
                        "probe.strategy: unknown value '{}', falling back to '{}'",
                        self.strategy, fallback
                    ),
                );
                (fallback, vec![issue])
            }
        }
    }

    /// Parse model ids, collecting an error for every empty entry.
    pub fn parse_models(&self) -> (Vec<Model>, Vec<ConfigIssue>) {
        let mut models = Vec::new();
        let mut issues = Vec::new();
        for (i, raw) in self.models.iter().enumerate() {
            match Model::try_new(raw.as_str()) {
                Some(model) => models.push(model),
                None => issues.push(ConfigIssue::error(
                    ConfigIssueCode::EmptyModel,
                    format!("probe.models[{}]: model name cannot be empty", i),
                )),
            }
        }
        (models, issues)
    }

    /// Copy these settings onto `params`, leaving its retry policy alone.
    pub fn apply_to(&self, params: ProbeParams) -> (ProbeParams, Vec<ConfigIssue>) {
        let (strategy, issues) = self.parse_strategy();
        let params = ProbeParams {
            min_test_length: self.min_test_length,
            max_test_length: self.max_test_length,
            step_size: self.step_size,
            precision_threshold: self.precision_threshold,
            strategy,
            max_attempts: self.max_attempts,
            timeout_ms: self.timeout_ms,
            total_timeout_ms: self.total_timeout_ms,
            include_output_budget: self.include_output_budget,
            output_tokens: self.output_tokens,
            ..params
        };
        (params, issues)
    }
}

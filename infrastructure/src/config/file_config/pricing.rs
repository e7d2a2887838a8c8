//! Pricing overrides from TOML (`[pricing.<model>]` tables)

use ctxprobe_domain::{ConfigIssue, ConfigIssueCode, ModelPricing};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Price of one model in USD per 1,000 tokens
///
/// # Example
///
/// ```toml
/// [pricing."gpt-4o"]
/// input_price_per_1k = 0.0025
/// output_price_per_1k = 0.01
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilePricingEntry {
    pub input_price_per_1k: f64,
    pub output_price_per_1k: f64,
}

impl From<FilePricingEntry> for ModelPricing {
    fn from(entry: FilePricingEntry) -> Self {
        ModelPricing::new(entry.input_price_per_1k, entry.output_price_per_1k)
    }
}

/// Per-model overrides, keyed by model id
pub type FilePricingConfig = BTreeMap<String, FilePricingEntry>;

/// Report every override with a negative or non-finite price.
pub fn validate_pricing(pricing: &FilePricingConfig) -> Vec<ConfigIssue> {
    pricing
        .iter()
        .filter(|(_, entry)| !ModelPricing::from(**entry).is_valid())
        .map(|(model, entry)| {
            ConfigIssue::error(
                ConfigIssueCode::InvalidPricing,
                format!(
                    "pricing.{}: prices must be finite and non-negative (got {} / {})",
                    model, entry.input_price_per_1k, entry.output_price_per_1k
                ),
            )
        })
        .collect()
}

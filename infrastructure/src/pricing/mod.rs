//! Static pricing table with configurable overrides.

use ctxprobe_application::PricingTable;
use ctxprobe_domain::{Model, ModelPricing};
use std::collections::HashMap;

/// Built-in list prices in USD per 1,000 tokens (input, output).
const BUILTIN_PRICES: &[(&str, f64, f64)] = &[
    ("gpt-4o", 0.0025, 0.01),
    ("gpt-4o-mini", 0.000_15, 0.000_6),
    ("gpt-4.1", 0.002, 0.008),
    ("gpt-4.1-mini", 0.000_4, 0.001_6),
    ("gpt-4.1-nano", 0.000_1, 0.000_4),
    ("gpt-4-turbo", 0.01, 0.03),
    ("gpt-3.5-turbo", 0.000_5, 0.001_5),
    ("o3-mini", 0.001_1, 0.004_4),
    ("claude-3-5-sonnet", 0.003, 0.015),
    ("claude-3-5-haiku", 0.000_8, 0.004),
    ("claude-3-opus", 0.015, 0.075),
];

/// Pricing keyed by model id.
///
/// Lookup tries the full id first, then the id without its `provider/`
/// prefix, so `openai/gpt-4o` finds the `gpt-4o` entry.
#[derive(Debug, Clone, Default)]
pub struct StaticPricingTable {
    prices: HashMap<String, ModelPricing>,
}

impl StaticPricingTable {
    /// An empty table: every model is unpriced.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in list prices.
    pub fn builtin() -> Self {
        let prices = BUILTIN_PRICES
            .iter()
            .map(|&(id, input, output)| (id.to_string(), ModelPricing::new(input, output)))
            .collect();
        Self { prices }
    }

    /// Add or replace entries; later entries win.
    pub fn with_overrides<I, K>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, ModelPricing)>,
        K: Into<String>,
    {
        for (id, pricing) in overrides {
            self.prices.insert(id.into(), pricing);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl PricingTable for StaticPricingTable {
    fn lookup(&self, model: &Model) -> Option<ModelPricing> {
        self.prices
            .get(model.as_str())
            .or_else(|| self.prices.get(model.name()))
            .copied()
    }
}

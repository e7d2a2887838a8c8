//! Per-model pricing arithmetic.
//!
//! Lookup of prices lives behind the application's `PricingTable` port;
//! this module only knows how to turn token counts into a cost.

use serde::{Deserialize, Serialize};

/// USD prices per 1,000 tokens for one model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelPricing {
    pub input_price_per_1k: f64,
    pub output_price_per_1k: f64,
}

impl ModelPricing {
    pub fn new(input_price_per_1k: f64, output_price_per_1k: f64) -> Self {
        Self {
            input_price_per_1k,
            output_price_per_1k,
        }
    }

    /// Zero-cost pricing, used when a model has no entry
    pub fn free() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Cost of one call in USD.
    pub fn estimate_cost(&self, input_tokens: u64, output_tokens: u64) -> f64 {
        (input_tokens as f64 / 1000.0) * self.input_price_per_1k
            + (output_tokens as f64 / 1000.0) * self.output_price_per_1k
    }

    pub fn is_valid(&self) -> bool {
        self.input_price_per_1k.is_finite()
            && self.output_price_per_1k.is_finite()
            && self.input_price_per_1k >= 0.0
            && self.output_price_per_1k >= 0.0
    }
}

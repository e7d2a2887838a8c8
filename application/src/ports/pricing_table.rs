//! Pricing table port

use ctxprobe_domain::{Model, ModelPricing};

/// Read-only per-model prices.
///
/// Shared between concurrent runs; implementations must not mutate after
/// construction.
pub trait PricingTable: Send + Sync {
    fn lookup(&self, model: &Model) -> Option<ModelPricing>;
}

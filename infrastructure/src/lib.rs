//! Infrastructure layer for ctxprobe
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod client;
pub mod config;
pub mod generator;
pub mod ledger;
pub mod pricing;

// Re-export commonly used types
pub use client::{OpenAiCompatibleClient, SimulatedModelClient};
pub use config::{ConfigLoader, FileConfig};
pub use generator::FillerSampleGenerator;
pub use ledger::{InMemoryUsageLedger, JsonlUsageLedger};
pub use pricing::StaticPricingTable;

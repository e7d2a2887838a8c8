//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod model_client;
pub mod pricing_table;
pub mod progress;
pub mod sample_generator;
pub mod usage_ledger;

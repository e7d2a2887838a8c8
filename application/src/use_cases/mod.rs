//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod probe_executor;
pub mod run_probe;

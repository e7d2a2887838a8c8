//! Application layer for ctxprobe
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use config::{ProbeParams, RetryPolicy};
pub use ports::{
    model_client::{CompletionOptions, ModelClient},
    pricing_table::PricingTable,
    progress::{ChannelProgressNotifier, NoProgress, ProbeProgressNotifier, ProgressEvent},
    sample_generator::{GeneratorError, Sample, SampleGenerator},
    usage_ledger::{NoUsageLedger, UsageEntry, UsageLedger},
};
pub use use_cases::probe_executor::{
    ExecutorError, Interruption, ProbeContext, ProbeExecutor, ProbeReport,
};
pub use use_cases::run_probe::{RunProbeError, RunProbeInput, RunProbeUseCase};

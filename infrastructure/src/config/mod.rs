//! Configuration file loading for ctxprobe
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `CTXPROBE_` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./ctxprobe.toml` or `./.ctxprobe.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/ctxprobe/config.toml`
//! 5. Default values
//!
//! Command line flags are applied on top by the binary.

mod file_config;
mod loader;

pub use file_config::{
    FileClassifierConfig, FileConfig, FileEndpointConfig, FileLedgerConfig, FileOutputConfig,
    FilePricingConfig, FilePricingEntry, FileProbeConfig, FileRetryConfig,
};
pub use loader::ConfigLoader;

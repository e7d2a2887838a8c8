//! Presentation-level configuration
//!
//! How results are rendered, resolved from the config file's `[output]`
//! section and the command line.

use crate::cli::commands::Cli;
use ctxprobe_domain::OutputFormat;
use serde::{Deserialize, Serialize};

/// Output configuration for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Enable colored terminal output
    pub color: bool,
    /// Show progress indicators while probing
    pub show_progress: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            color: true,
            show_progress: true,
        }
    }
}

impl OutputConfig {
    /// Command line flags win over file values.
    ///
    /// JSON output never shows progress so stdout stays machine readable.
    pub fn resolve(file_format: Option<OutputFormat>, file_color: bool, cli: &Cli) -> Self {
        let format = cli.output.or(file_format).unwrap_or_default();
        Self {
            format,
            color: file_color && !cli.no_color,
            show_progress: !cli.quiet && format != OutputFormat::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_format_overrides_file() {
        let cli = Cli::try_parse_from(["ctxprobe", "-o", "full"]).unwrap();
        let config = OutputConfig::resolve(Some(OutputFormat::Json), true, &cli);
        assert_eq!(config.format, OutputFormat::Full);
        assert!(config.show_progress);
    }

    #[test]
    fn test_file_values_apply_without_flags() {
        let cli = Cli::try_parse_from(["ctxprobe"]).unwrap();
        let config = OutputConfig::resolve(Some(OutputFormat::Json), false, &cli);
        assert_eq!(config.format, OutputFormat::Json);
        assert!(!config.color);
        assert!(!config.show_progress);
    }

    #[test]
    fn test_no_color_and_quiet_flags() {
        let cli = Cli::try_parse_from(["ctxprobe", "--no-color", "-q"]).unwrap();
        let config = OutputConfig::resolve(None, true, &cli);
        assert_eq!(config.format, OutputFormat::Summary);
        assert!(!config.color);
        assert!(!config.show_progress);
    }
}

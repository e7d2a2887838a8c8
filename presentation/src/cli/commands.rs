//! CLI command definitions

use clap::Parser;
use ctxprobe_application::ProbeParams;
use ctxprobe_domain::{OutputFormat, StrategyKind};
use std::path::PathBuf;

/// CLI arguments for ctxprobe
#[derive(Parser, Debug)]
#[command(name = "ctxprobe")]
#[command(author, version, about = "Empirically measure the context window of an AI completion endpoint")]
#[command(long_about = r#"
ctxprobe sends padded prompts of chosen sizes to a completion endpoint and
searches for the largest input it accepts, reporting an estimate together
with a confidence interval, cost and latency statistics.

Strategies:
  binary    bisect [min, max] after a sanity probe at min
  linear    step upward from min by --step until the first rejection
  adaptive  double from min until rejected, then bisect (default)

Configuration files are loaded from (in priority order):
1. CTXPROBE_* environment variables (e.g. CTXPROBE_PROBE__MAX_ATTEMPTS=10)
2. --config <path>     Explicit config file
3. ./ctxprobe.toml     Project-level config
4. ~/.config/ctxprobe/config.toml   Global config

Example:
  ctxprobe -m gpt-4o-mini
  ctxprobe -m gpt-4o -m gpt-4.1 --max 1000000 --precision 1000 -o full
  ctxprobe --simulate 8192 -m demo -s binary --max 16000
"#)]
pub struct Cli {
    /// Models to probe (can be specified multiple times)
    #[arg(short, long, value_name = "MODEL")]
    pub model: Vec<String>,

    /// Smallest input size to test, in tokens
    #[arg(long = "min", value_name = "TOKENS")]
    pub min_test_length: Option<u64>,

    /// Largest input size to test, in tokens
    #[arg(long = "max", value_name = "TOKENS")]
    pub max_test_length: Option<u64>,

    /// Stop once the boundary is bracketed within this many tokens
    #[arg(short, long = "precision", value_name = "TOKENS")]
    pub precision_threshold: Option<u64>,

    /// Step size for the linear strategy
    #[arg(long = "step", value_name = "TOKENS")]
    pub step_size: Option<u64>,

    /// Search strategy: binary, linear or adaptive
    #[arg(short, long, value_name = "STRATEGY")]
    pub strategy: Option<StrategyKind>,

    /// Maximum number of probes per model
    #[arg(long, value_name = "N")]
    pub max_attempts: Option<usize>,

    /// Timeout for a single call, in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Deadline for a whole run, in milliseconds
    #[arg(long, value_name = "MS")]
    pub total_timeout_ms: Option<u64>,

    /// Total calls allowed per probe (1 = no retries)
    #[arg(long, value_name = "N")]
    pub max_retries: Option<u32>,

    /// Count the requested output tokens as part of each probed size
    #[arg(long)]
    pub include_output_budget: bool,

    /// Output tokens requested from the endpoint
    #[arg(long, value_name = "TOKENS")]
    pub output_tokens: Option<u64>,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Probe an in-process simulated endpoint with this context window
    #[arg(long, value_name = "TOKENS")]
    pub simulate: Option<u64>,

    /// Append every call to this JSONL usage ledger
    #[arg(long, value_name = "PATH")]
    pub ledger: Option<PathBuf>,

    /// Output format: summary, full or json
    #[arg(short, long, value_name = "FORMAT")]
    pub output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Also write logs to a daily rolling file in this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

impl Cli {
    /// Apply command line overrides on top of `params`.
    pub fn apply_to(&self, mut params: ProbeParams) -> ProbeParams {
        if let Some(v) = self.min_test_length {
            params.min_test_length = v;
        }
        if let Some(v) = self.max_test_length {
            params.max_test_length = v;
        }
        if let Some(v) = self.precision_threshold {
            params.precision_threshold = v;
        }
        if let Some(v) = self.step_size {
            params.step_size = v;
        }
        if let Some(v) = self.strategy {
            params.strategy = v;
        }
        if let Some(v) = self.max_attempts {
            params.max_attempts = v;
        }
        if let Some(v) = self.timeout_ms {
            params.timeout_ms = v;
        }
        if let Some(v) = self.total_timeout_ms {
            params.total_timeout_ms = Some(v);
        }
        if let Some(v) = self.max_retries {
            params.retry.max_retries = v;
        }
        if self.include_output_budget {
            params.include_output_budget = true;
        }
        if let Some(v) = self.output_tokens {
            params.output_tokens = v;
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_repeated_models_and_flags() {
        let cli = Cli::try_parse_from([
            "ctxprobe", "-m", "gpt-4o", "-m", "gpt-4.1", "--min", "2000", "--max", "64000", "-s",
            "bin", "-o", "json", "-vv",
        ])
        .unwrap();
        assert_eq!(cli.model, vec!["gpt-4o", "gpt-4.1"]);
        assert_eq!(cli.min_test_length, Some(2000));
        assert_eq!(cli.strategy, Some(StrategyKind::Binary));
        assert_eq!(cli.output, Some(OutputFormat::Json));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_invalid_strategy_is_rejected() {
        assert!(Cli::try_parse_from(["ctxprobe", "-s", "random"]).is_err());
    }

    #[test]
    fn test_flags_override_params() {
        let cli = Cli::try_parse_from([
            "ctxprobe",
            "--max",
            "32000",
            "--max-retries",
            "1",
            "--total-timeout-ms",
            "60000",
            "--include-output-budget",
        ])
        .unwrap();
        let params = cli.apply_to(ProbeParams::default());
        assert_eq!(params.max_test_length, 32000);
        assert_eq!(params.retry.max_retries, 1);
        assert_eq!(params.total_timeout_ms, Some(60_000));
        assert!(params.include_output_budget);
        assert_eq!(params.min_test_length, ProbeParams::default().min_test_length);
    }

    #[test]
    fn test_no_flags_leave_params_untouched() {
        let cli = Cli::try_parse_from(["ctxprobe"]).unwrap();
        assert_eq!(cli.apply_to(ProbeParams::default()), ProbeParams::default());
    }
}

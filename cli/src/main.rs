//! CLI entrypoint for ctxprobe
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use ctxprobe_application::{
    ModelClient, NoProgress, ProbeExecutor, ProbeProgressNotifier, RunProbeInput, RunProbeUseCase,
    UsageLedger,
};
use ctxprobe_domain::Model;
use ctxprobe_infrastructure::{
    ConfigLoader, FileConfig, FillerSampleGenerator, InMemoryUsageLedger, JsonlUsageLedger,
    OpenAiCompatibleClient, SimulatedModelClient, StaticPricingTable,
};
use ctxprobe_presentation::{Cli, ConsoleFormatter, OutputConfig, ProgressReporter, SimpleProgress};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(ExitCode::SUCCESS);
    }

    let _log_guard = init_logging(cli.verbose, cli.log_dir.as_ref())?;

    info!("Starting ctxprobe");

    // === Configuration ===
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("failed to load configuration")?
    };

    let issues = config.validate();
    for issue in issues.iter().filter(|i| !i.is_error()) {
        warn!("{}", issue.message);
    }
    let errors: Vec<&str> = issues
        .iter()
        .filter(|i| i.is_error())
        .map(|i| i.message.as_str())
        .collect();
    if !errors.is_empty() {
        bail!("invalid configuration:\n  {}", errors.join("\n  "));
    }

    let output = OutputConfig::resolve(config.output.format, config.output.color, &cli);
    if !output.color {
        colored::control::set_override(false);
    }

    let (file_params, _) = config.to_probe_params();
    let params = cli.apply_to(file_params);

    let models: Vec<Model> = if cli.model.is_empty() {
        config.models()
    } else {
        models_from_flags(&cli.model)
    };
    if models.is_empty() {
        bail!("No model given. Use -m <MODEL> or set probe.models in the config file.");
    }

    // === Dependency Injection ===
    let client = build_client(&cli, &config);
    let generator = Arc::new(FillerSampleGenerator::new());
    let pricing = Arc::new(StaticPricingTable::builtin().with_overrides(
        config.pricing.iter().map(|(id, entry)| (id.clone(), (*entry).into())),
    ));
    let ledger = build_ledger(cli.ledger.clone().or_else(|| config.ledger.resolved_path()))?;

    let cancellation = CancellationToken::new();
    {
        let token = cancellation.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, finishing with the probes recorded so far");
                token.cancel();
            }
        });
    }

    let mut executor = ProbeExecutor::new(client, generator, pricing, ledger.clone());
    if !config.classifier.is_empty() {
        executor = executor.with_classifier(config.classifier.to_classifier());
    }
    let use_case = RunProbeUseCase::from_executor(executor).with_cancellation(cancellation);

    let progress: Arc<dyn ProbeProgressNotifier> = if !output.show_progress {
        Arc::new(NoProgress)
    } else if std::io::stderr().is_terminal() {
        Arc::new(ProgressReporter::new())
    } else {
        Arc::new(SimpleProgress)
    };

    let inputs = models
        .iter()
        .map(|model| RunProbeInput::new(model.clone(), params.clone()))
        .collect();
    let results = use_case.execute_batch(inputs, progress).await;

    let failed = results
        .iter()
        .any(|r| r.as_ref().map_or(true, |outcome| outcome.is_fatal()));
    let runs: Vec<_> = models.into_iter().zip(results).collect();

    println!("{}", ConsoleFormatter::format_batch(&runs, output.format));
    info!(
        "Recorded {} call(s), total cost ${:.4}",
        ledger.entries().len(),
        ledger.total_cost()
    );

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Logs go to stderr, filtered by `-v` unless `RUST_LOG` is set, and to a
/// daily rolling file when `--log-dir` is given.
fn init_logging(verbose: u8, log_dir: Option<&PathBuf>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, "ctxprobe.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

/// Model ids from repeated `-m`, skipping blank ones with a warning.
fn models_from_flags(ids: &[String]) -> Vec<Model> {
    let mut models = Vec::with_capacity(ids.len());
    for id in ids {
        match Model::try_new(id) {
            Some(model) => models.push(model),
            None => warn!("Ignoring empty model id given with -m"),
        }
    }
    models
}

fn build_client(cli: &Cli, config: &FileConfig) -> Arc<dyn ModelClient> {
    match cli.simulate {
        Some(window) => {
            info!("Using simulated endpoint with a {} token window", window);
            Arc::new(
                SimulatedModelClient::new(window)
                    .with_latency(Duration::from_millis(50), Duration::from_millis(2)),
            )
        }
        None => {
            let base_url = cli
                .base_url
                .clone()
                .unwrap_or_else(|| config.endpoint.base_url.clone());
            let api_key = config.endpoint.api_key();
            if api_key.is_none() {
                warn!(
                    "{} is not set; requests are sent without an API key",
                    config.endpoint.api_key_env
                );
            }
            Arc::new(OpenAiCompatibleClient::new(base_url, api_key))
        }
    }
}

fn build_ledger(path: Option<PathBuf>) -> Result<Arc<dyn UsageLedger>> {
    match path {
        Some(path) => {
            let ledger = JsonlUsageLedger::open(&path)
                .with_context(|| format!("failed to open usage ledger {}", path.display()))?;
            info!("Recording usage to {}", path.display());
            Ok(Arc::new(ledger))
        }
        None => Ok(Arc::new(InMemoryUsageLedger::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_model_flags_are_skipped() {
        let ids = vec!["gpt-4o".to_string(), "  ".to_string(), String::new()];
        let models = models_from_flags(&ids);
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].as_str(), "gpt-4o");
    }

    #[test]
    fn test_only_blank_model_flags_leave_nothing() {
        assert!(models_from_flags(&["".to_string()]).is_empty());
    }
}

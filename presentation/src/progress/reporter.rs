//! Progress reporting for probe runs

use crate::output::console::group_digits;
use colored::Colorize;
use ctxprobe_application::ProbeProgressNotifier;
use ctxprobe_domain::{Classification, Model, ProbeOutcome, StopCondition, StrategyKind};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Reports progress with one bar per model being probed
pub struct ProgressReporter {
    multi: MultiProgress,
    bars: Mutex<HashMap<Model, ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: Mutex::new(HashMap::new()),
        }
    }

    fn run_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn bars(&self) -> MutexGuard<'_, HashMap<Model, ProgressBar>> {
        self.bars.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn with_bar(&self, model: &Model, f: impl FnOnce(&ProgressBar)) {
        if let Some(pb) = self.bars().get(model) {
            f(pb);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProbeProgressNotifier for ProgressReporter {
    fn on_run_start(&self, model: &Model, strategy: StrategyKind, max_attempts: usize) {
        let pb = self.multi.add(ProgressBar::new(max_attempts as u64));
        pb.set_style(Self::run_style());
        pb.set_prefix(format!("{} ({})", model, strategy));
        pb.set_message("Starting...");
        pb.enable_steady_tick(Duration::from_millis(120));
        self.bars().insert(model.clone(), pb);
    }

    fn on_probe_start(&self, model: &Model, _attempt_index: usize, tokens: u64) {
        self.with_bar(model, |pb| {
            pb.set_message(format!("{} probing {} tokens", "->".cyan(), group_digits(tokens)));
        });
    }

    fn on_retry(
        &self,
        model: &Model,
        _attempt_index: usize,
        classification: Classification,
        delay: Duration,
    ) {
        self.with_bar(model, |pb| {
            pb.set_message(format!(
                "{} {}, retrying in {}ms",
                "~".yellow(),
                classification,
                delay.as_millis()
            ));
        });
    }

    fn on_probe_complete(
        &self,
        model: &Model,
        outcome: &ProbeOutcome,
        running_estimate: Option<u64>,
    ) {
        self.with_bar(model, |pb| {
            let mark = if outcome.is_success() {
                "v".green()
            } else {
                "x".red()
            };
            let best = running_estimate
                .map(|t| format!(", best {}", group_digits(t)))
                .unwrap_or_default();
            pb.set_message(format!(
                "{} {} {}{}",
                mark,
                group_digits(outcome.measured_size()),
                outcome.classification,
                best
            ));
            pb.inc(1);
        });
    }

    fn on_run_complete(&self, model: &Model, stop: StopCondition) {
        if let Some(pb) = self.bars().remove(model) {
            let message = match stop {
                StopCondition::FatalError => stop.description().red(),
                StopCondition::ConvergedWithinPrecision | StopCondition::CeilingReached => {
                    stop.description().green()
                }
                _ => stop.description().yellow(),
            };
            pb.finish_with_message(message.to_string());
        }
    }
}

/// Simple line-based progress on stderr (no fancy UI)
pub struct SimpleProgress;

impl ProbeProgressNotifier for SimpleProgress {
    fn on_run_start(&self, model: &Model, strategy: StrategyKind, max_attempts: usize) {
        eprintln!(
            "{} {} ({}, up to {} probes)",
            "->".cyan(),
            model.to_string().bold(),
            strategy,
            max_attempts
        );
    }

    fn on_retry(
        &self,
        model: &Model,
        attempt_index: usize,
        classification: Classification,
        delay: Duration,
    ) {
        eprintln!(
            "  {} {} #{} {}, retrying in {}ms",
            "~".yellow(),
            model,
            attempt_index,
            classification,
            delay.as_millis()
        );
    }

    fn on_probe_complete(
        &self,
        model: &Model,
        outcome: &ProbeOutcome,
        _running_estimate: Option<u64>,
    ) {
        let mark = if outcome.is_success() {
            "v".green()
        } else {
            "x".red()
        };
        eprintln!(
            "  {} {} #{} {} tokens: {}",
            mark,
            model,
            outcome.attempt_index,
            group_digits(outcome.measured_size()),
            outcome.classification
        );
    }

    fn on_run_complete(&self, model: &Model, stop: StopCondition) {
        eprintln!("  {} {}: {}", "=".cyan(), model, stop.description());
    }
}

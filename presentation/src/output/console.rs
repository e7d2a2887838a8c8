//! Console output formatter for probe results

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use ctxprobe_application::RunProbeError;
use ctxprobe_domain::{
    Classification, EstimateKind, FatalProbeFailure, Model, OutputFormat, ProbeOutcome,
    ProbeRunOutcome, ProbeRunResult,
};

/// Formats probe results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the summary and the table of every probe
    pub fn format_full(outcome: &ProbeRunOutcome) -> String {
        let mut output = Self::format_summary(outcome);
        output.push_str(&Self::section_header("Probes"));
        output.push_str(&Self::probe_table(outcome.outcomes()));
        output.push_str(&Self::footer());
        output
    }

    /// Format estimate, interval and headline statistics
    pub fn format_summary(outcome: &ProbeRunOutcome) -> String {
        match outcome {
            ProbeRunOutcome::Completed(result) => Self::completed_summary(result),
            ProbeRunOutcome::Fatal(failure) => Self::fatal_summary(failure),
        }
    }

    /// Format as JSON
    pub fn format_json(outcome: &ProbeRunOutcome) -> String {
        serde_json::to_string_pretty(outcome).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the results of several runs, in input order.
    ///
    /// JSON output is a single array; runs that could not start appear as
    /// `{"status": "error", ...}` objects.
    pub fn format_batch(
        runs: &[(Model, Result<ProbeRunOutcome, RunProbeError>)],
        format: OutputFormat,
    ) -> String {
        if format == OutputFormat::Json {
            let values: Vec<serde_json::Value> = runs
                .iter()
                .map(|(model, result)| match result {
                    Ok(outcome) => serde_json::to_value(outcome).unwrap_or_default(),
                    Err(e) => serde_json::json!({
                        "status": "error",
                        "model": model,
                        "error": e.to_string(),
                    }),
                })
                .collect();
            return serde_json::to_string_pretty(&values).unwrap_or_else(|_| "[]".to_string());
        }

        runs.iter()
            .map(|(model, result)| match result {
                Ok(outcome) => Self.render(outcome, format),
                Err(e) => format!(
                    "{}\n{} {}\n",
                    Self::header(&format!("Context window probe: {}", model)),
                    "Error:".red().bold(),
                    e
                ),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn completed_summary(result: &ProbeRunResult) -> String {
        let mut output = String::new();
        output.push_str(&Self::header(&format!("Context window probe: {}", result.model)));
        output.push('\n');

        let estimate = match result.max_tokens {
            Some(tokens) => {
                let value = format!("{} tokens", group_digits(tokens));
                match result.estimate_kind {
                    EstimateKind::Bracketed => value.green().bold(),
                    _ => format!("≥ {}", value).yellow().bold(),
                }
            }
            None => "not found".red().bold(),
        };
        output.push_str(&format!("{} {}\n", "Estimate:".cyan().bold(), estimate));

        let upper = if result.interval.ceiling_unknown {
            format!("{}+", group_digits(result.interval.max))
        } else {
            group_digits(result.interval.max)
        };
        output.push_str(&format!(
            "{} [{}, {}] (width {}, precision {:.1}%, {})\n",
            "Interval:".cyan().bold(),
            group_digits(result.interval.min),
            upper,
            group_digits(result.absolute_width),
            result.precision_pct,
            result.estimate_kind
        ));
        output.push_str(&format!(
            "{} {} ({})\n",
            "Stopped:".cyan().bold(),
            result.stop_condition.description(),
            result.strategy
        ));
        if result.inconsistent_observations {
            output.push_str(&format!(
                "{} a larger input was accepted after a smaller one was rejected\n",
                "Warning:".yellow().bold()
            ));
        }

        output.push_str(&format!(
            "{} {} probes, {} calls, {:.0}% accepted, {:.1}s\n",
            "Attempts:".cyan().bold(),
            result.attempts(),
            result.total_calls(),
            result.success_rate * 100.0,
            result.duration_ms() as f64 / 1000.0
        ));
        output.push_str(&format!(
            "{} mean {:.0}ms, p50 {}ms, p95 {}ms, p99 {}ms\n",
            "Latency:".cyan().bold(),
            result.average_latency_ms,
            result.latency.p50,
            result.latency.p95,
            result.latency.p99
        ));
        if result.throughput_tokens_per_sec > 0.0 {
            output.push_str(&format!(
                "{} {} tokens/s\n",
                "Throughput:".cyan().bold(),
                group_digits(result.throughput_tokens_per_sec.round() as u64)
            ));
        }
        output.push_str(&format!(
            "{} ${:.4}\n",
            "Cost:".cyan().bold(),
            result.total_cost
        ));

        output
    }

    fn fatal_summary(failure: &FatalProbeFailure) -> String {
        let mut output = String::new();
        output.push_str(&Self::header(&format!("Context window probe: {}", failure.model)));
        output.push('\n');
        output.push_str(&format!(
            "{} {}\n",
            "Aborted:".red().bold(),
            failure.reason.to_string().red()
        ));
        output.push_str(&format!("{} {}\n", "Detail:".cyan().bold(), failure.message));
        output.push_str(&format!(
            "{} {} probes ({})\n",
            "Attempts:".cyan().bold(),
            failure.attempts(),
            failure.strategy
        ));
        output.push_str(&format!(
            "{} ${:.4}\n",
            "Cost:".cyan().bold(),
            failure.total_cost
        ));
        output
    }

    fn probe_table(outcomes: &[ProbeOutcome]) -> String {
        let mut output = format!(
            "{:>3}  {:>10}  {:>10}  {:<22}  {:>9}  {:>5}  {:>10}\n",
            "#", "requested", "measured", "result", "latency", "calls", "cost"
        );
        for o in outcomes {
            let label = format!("{:<22}", o.classification.to_string());
            let label = match o.classification {
                Classification::Success => label.green(),
                Classification::TokenLimitExceeded => label.yellow(),
                Classification::Transient | Classification::RateLimited => label.dimmed(),
                Classification::AuthError | Classification::Unknown => label.red(),
            };
            output.push_str(&format!(
                "{:>3}  {:>10}  {:>10}  {}  {:>7}ms  {:>5}  {:>10}\n",
                o.attempt_index,
                group_digits(o.requested_tokens),
                group_digits(o.measured_size()),
                label,
                o.latency_ms,
                o.calls,
                format!("${:.5}", o.estimated_cost)
            ));
            if let Some(detail) = o.error_detail.as_deref().filter(|_| !o.is_decisive()) {
                output.push_str(&format!("     {}\n", detail.dimmed()));
            }
        }
        output
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("{}\n", "=".repeat(60).cyan())
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_full(&self, outcome: &ProbeRunOutcome) -> String {
        Self::format_full(outcome)
    }

    fn format_summary(&self, outcome: &ProbeRunOutcome) -> String {
        Self::format_summary(outcome)
    }

    fn format_json(&self, outcome: &ProbeRunOutcome) -> String {
        Self::format_json(outcome)
    }
}

/// `1234567` -> `1,234,567`
pub fn group_digits(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

//! Output formatter trait

use ctxprobe_domain::{OutputFormat, ProbeRunOutcome};

/// Trait for formatting probe run outcomes
pub trait OutputFormatter {
    /// Summary followed by the per-probe table
    fn format_full(&self, outcome: &ProbeRunOutcome) -> String;

    /// Estimate, interval and headline statistics
    fn format_summary(&self, outcome: &ProbeRunOutcome) -> String;

    /// Format as JSON
    fn format_json(&self, outcome: &ProbeRunOutcome) -> String;

    /// Format in the requested style
    fn render(&self, outcome: &ProbeRunOutcome, format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => self.format_full(outcome),
            OutputFormat::Summary => self.format_summary(outcome),
            OutputFormat::Json => self.format_json(outcome),
        }
    }
}

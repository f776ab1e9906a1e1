//! Output formatting for deployment outcomes.
//!
//! Everything here is written to stdout by the binary, so a failed run
//! must render as a single diagnostic line in text mode.

use colored::Colorize;
use serde::Serialize;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::deployer::DeploymentOutcome;
use crate::sequencer::{DeploymentReport, FailureRecord, StepStatus};

use super::commands::OutputFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
    /// Whether to include the per-step table.
    detailed: bool,
}

/// Step row for table display.
#[derive(Tabled)]
struct StepRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Step")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Duration")]
    duration: String,
}

#[derive(Serialize)]
struct OutcomeJson<'a> {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<FailureRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<&'a DeploymentReport>,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self {
            format,
            detailed: false,
        }
    }

    /// Includes the per-step table in successful text output.
    #[must_use]
    pub const fn with_details(mut self, detailed: bool) -> Self {
        self.detailed = detailed;
        self
    }

    /// Formats a deployment outcome for display.
    #[must_use]
    pub fn format_outcome(&self, outcome: &DeploymentOutcome) -> String {
        match self.format {
            OutputFormat::Json => {
                let json = OutcomeJson {
                    status: if outcome.is_success() { "success" } else { "error" },
                    error: outcome.error.as_ref().map(FailureRecord::from),
                    report: outcome.report.as_ref(),
                };
                serde_json::to_string_pretty(&json).unwrap_or_default()
            }
            OutputFormat::Text => self.format_outcome_text(outcome),
        }
    }

    fn format_outcome_text(&self, outcome: &DeploymentOutcome) -> String {
        if let Some(error) = &outcome.error {
            return format!("{} {}", "✗".red(), error.diagnostic());
        }

        let Some(report) = &outcome.report else {
            return format!("{} Nothing deployed", "✓".green());
        };

        let mut output = String::new();

        if self.detailed {
            output.push_str(&Self::format_steps(report));
            output.push('\n');
        }

        let executed = report.executed_steps().len();
        let skipped = report.skipped_steps().len();
        let prefix = if report.dry_run { "[dry-run] " } else { "" };
        let _ = write!(
            output,
            "{} {prefix}Deployed {} on {} ({executed} run, {skipped} skipped) in {:.1}s",
            "✓".green(),
            report.environment,
            report.hostname,
            Self::seconds(report),
        );

        output
    }

    /// Formats the step table of a report.
    fn format_steps(report: &DeploymentReport) -> String {
        let rows: Vec<StepRow> = report
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| StepRow {
                index: i + 1,
                name: step.name.clone(),
                status: Self::format_status(step.status),
                duration: format!("{}ms", step.duration_ms),
            })
            .collect();

        Table::new(rows).to_string()
    }

    /// Formats a step status with color.
    fn format_status(status: StepStatus) -> String {
        match status {
            StepStatus::Completed => "completed".green().to_string(),
            StepStatus::Skipped => "skipped".dimmed().to_string(),
            StepStatus::Failed => "failed".red().to_string(),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn seconds(report: &DeploymentReport) -> f64 {
        report.elapsed().num_milliseconds() as f64 / 1000.0
    }
}

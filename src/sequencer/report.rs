//! Record of a deployment run.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

use crate::config::DeploymentContext;
use crate::error::DeployError;

/// What happened during one deployment run.
#[derive(Debug, Clone, Serialize)]
pub struct DeploymentReport {
    /// Unique run identifier.
    pub run_id: Uuid,
    /// Host the deployment ran on.
    pub hostname: String,
    /// Deployment environment.
    pub environment: String,
    /// Home directory.
    pub home_directory: PathBuf,
    /// Whether commands were only logged.
    pub dry_run: bool,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub finished_at: Option<DateTime<Utc>>,
    /// Steps reached, in order.
    pub steps: Vec<StepRecord>,
    /// The failure that aborted the run, if any.
    pub failure: Option<FailureRecord>,
}

/// Outcome of one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    /// Step name.
    pub name: String,
    /// Step status.
    pub status: StepStatus,
    /// Time spent in the step.
    pub duration_ms: u64,
}

/// Status of a step that was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// The action ran and succeeded.
    Completed,
    /// The guard rejected the step.
    Skipped,
    /// The action ran and failed.
    Failed,
}

/// Serializable summary of the aborting error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    /// Failing step, if any.
    pub step: Option<String>,
    /// Taxonomy kind.
    pub kind: String,
    /// Error message.
    pub message: String,
}

impl DeploymentReport {
    /// Starts a report for a context.
    #[must_use]
    pub fn new(context: &DeploymentContext) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            hostname: current_hostname(),
            environment: context.environment().to_string(),
            home_directory: context.home_directory().to_path_buf(),
            dry_run: false,
            started_at: Utc::now(),
            finished_at: None,
            steps: Vec::new(),
            failure: None,
        }
    }

    /// Marks the report as a dry run.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Records a step outcome.
    pub fn record(&mut self, name: &str, status: StepStatus, elapsed: Duration) {
        self.steps.push(StepRecord {
            name: name.to_string(),
            status,
            duration_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        });
    }

    /// Records the aborting error.
    pub fn fail(&mut self, error: &DeployError) {
        self.failure = Some(FailureRecord::from(error));
    }

    /// Stamps the finish time.
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Returns true if no step failed.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Names of the steps whose action was invoked, in order.
    #[must_use]
    pub fn executed_steps(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|s| s.status != StepStatus::Skipped)
            .map(|s| s.name.as_str())
            .collect()
    }

    /// Names of the steps skipped by their guard, in order.
    #[must_use]
    pub fn skipped_steps(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|s| s.status == StepStatus::Skipped)
            .map(|s| s.name.as_str())
            .collect()
    }

    /// Total wall time of the run so far.
    #[must_use]
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at.unwrap_or_else(Utc::now) - self.started_at
    }
}

impl From<&DeployError> for FailureRecord {
    fn from(error: &DeployError) -> Self {
        Self {
            step: error.step().map(str::to_string),
            kind: error.kind().to_string(),
            message: error.to_string(),
        }
    }
}

fn current_hostname() -> String {
    hostname::get().map_or_else(
        |_| String::from("unknown"),
        |name| name.to_string_lossy().into_owned(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CommandError, ErrorKind};

    fn report() -> DeploymentReport {
        let home = tempfile::tempdir().unwrap();
        let home_str = home.path().to_str().unwrap().to_string();
        let context = DeploymentContext::from_lookup(move |name| match name {
            "DINO_ENVIRONMENT" => Some(String::from("prod")),
            "DINO_HOME" => Some(home_str.clone()),
            _ => None,
        })
        .unwrap();
        DeploymentReport::new(&context)
    }

    #[test]
    fn test_executed_and_skipped_steps() {
        let mut report = report();
        report.record("pull", StepStatus::Completed, Duration::from_millis(12));
        report.record("stop-web", StepStatus::Skipped, Duration::ZERO);
        report.record("stop-app", StepStatus::Failed, Duration::from_millis(3));

        assert_eq!(report.executed_steps(), vec!["pull", "stop-app"]);
        assert_eq!(report.skipped_steps(), vec!["stop-web"]);
        assert_eq!(report.steps[0].duration_ms, 12);
    }

    #[test]
    fn test_failure_marks_report_unsuccessful() {
        let mut report = report();
        assert!(report.is_success());

        let error = ErrorKind::DataClear
            .into_error("clear-db", CommandError::failed("python", Some(1), "no table").into());
        report.fail(&error);
        report.finish();

        assert!(!report.is_success());
        let failure = report.failure.as_ref().unwrap();
        assert_eq!(failure.step.as_deref(), Some("clear-db"));
        assert_eq!(failure.kind, "DataClearError");
        assert!(report.finished_at.is_some());
    }

    #[test]
    fn test_report_serializes_status_lowercase() {
        let mut report = report();
        report.record("pull", StepStatus::Completed, Duration::ZERO);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["environment"], "prod");
        assert_eq!(json["steps"][0]["status"], "completed");
        assert!(json["failure"].is_null());
    }
}

//! Top-level deployment orchestration.
//!
//! This module wires the pieces together: resolve the context from the
//! environment, build the standard plan, and run it through the sequencer.

use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

use crate::config::DeploymentContext;
use crate::error::DeployError;
use crate::runner::CommandRunner;
use crate::sequencer::{DeploymentPlan, DeploymentReport, Sequencer};

/// Runs complete deployments.
pub struct Deployer<'a> {
    /// Command runner.
    runner: &'a dyn CommandRunner,
    /// Whether the runner only logs commands.
    dry_run: bool,
    /// Unit directory override.
    unit_directory: Option<PathBuf>,
}

/// Result of a deployment attempt.
#[derive(Debug)]
pub struct DeploymentOutcome {
    /// Run record; absent when the context could not be resolved.
    pub report: Option<DeploymentReport>,
    /// The aborting error, if any.
    pub error: Option<DeployError>,
}

impl<'a> Deployer<'a> {
    /// Creates a new deployer.
    #[must_use]
    pub const fn new(runner: &'a dyn CommandRunner) -> Self {
        Self {
            runner,
            dry_run: false,
            unit_directory: None,
        }
    }

    /// Marks runs as dry runs in their reports.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Overrides the unit directory.
    #[must_use]
    pub fn with_unit_directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.unit_directory = Some(path.into());
        self
    }

    /// Resolves the context from `lookup` and deploys it.
    #[must_use]
    pub fn deploy<F>(&self, lookup: F) -> DeploymentOutcome
    where
        F: Fn(&str) -> Option<String>,
    {
        match DeploymentContext::from_lookup(lookup) {
            Ok(context) => {
                let context = match &self.unit_directory {
                    Some(dir) => context.with_unit_directory(dir),
                    None => context,
                };
                self.deploy_context(&context)
            }
            Err(e) => {
                error!("{e}");
                DeploymentOutcome {
                    report: None,
                    error: Some(e),
                }
            }
        }
    }

    /// Deploys an already resolved context.
    #[must_use]
    pub fn deploy_context(&self, context: &DeploymentContext) -> DeploymentOutcome {
        let plan = DeploymentPlan::standard(context);
        let mut report = DeploymentReport::new(context).with_dry_run(self.dry_run);
        let result = Sequencer::new(context, self.runner).run(&plan, &mut report);

        DeploymentOutcome {
            report: Some(report),
            error: result.err(),
        }
    }
}

impl std::fmt::Debug for Deployer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deployer")
            .field("dry_run", &self.dry_run)
            .field("unit_directory", &self.unit_directory)
            .finish_non_exhaustive()
    }
}

impl DeploymentOutcome {
    /// Returns true if every step succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Returns the numeric exit status: 0 on success, 1 on the first failure.
    #[must_use]
    pub const fn exit_status(&self) -> u8 {
        if self.is_success() { 0 } else { 1 }
    }

    /// Returns the process exit code.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, ErrorKind};
    use crate::service::{STOP_ORDER, Service};
    use crate::testing::{Fixture, RecordingRunner};

    #[test]
    fn test_unset_environment_has_no_side_effects() {
        let fixture = Fixture::new("prod")
            .with_units(&STOP_ORDER)
            .without_var("DINO_ENVIRONMENT");
        let runner = RecordingRunner::new();

        let outcome = Deployer::new(&runner)
            .with_unit_directory(fixture.units.path())
            .deploy(fixture.lookup());

        assert!(!outcome.is_success());
        assert!(outcome.report.is_none());
        assert!(matches!(
            outcome.error,
            Some(DeployError::Config(ConfigError::MissingEnvVar { .. }))
        ));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_missing_home_has_no_side_effects() {
        let fixture = Fixture::new("prod").with_units(&STOP_ORDER);
        let missing = fixture.home.path().join("gone");
        let fixture = fixture.with_var("DINO_HOME", missing.to_str().unwrap());
        let runner = RecordingRunner::new();

        let outcome = Deployer::new(&runner)
            .with_unit_directory(fixture.units.path())
            .deploy(fixture.lookup());

        let error = outcome.error.as_ref().unwrap();
        assert_eq!(error.kind(), ErrorKind::Config);
        assert!(matches!(error, DeployError::Config(ConfigError::HomeNotFound { .. })));
        assert!(runner.calls().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_unenterable_home_has_no_side_effects() {
        use std::os::unix::fs::PermissionsExt;

        let fixture = Fixture::new("prod").with_units(&STOP_ORDER);
        let locked = fixture.home.path().join("locked");
        std::fs::create_dir(&locked).unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o644)).unwrap();
        if std::fs::metadata(locked.join(".")).is_ok() {
            std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }
        let fixture = fixture.with_var("DINO_HOME", locked.to_str().unwrap());
        let runner = RecordingRunner::new();

        let outcome = Deployer::new(&runner)
            .with_unit_directory(fixture.units.path())
            .deploy(fixture.lookup());
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();

        assert!(matches!(
            outcome.error,
            Some(DeployError::Config(ConfigError::HomeNotEnterable { .. }))
        ));
        assert_eq!(outcome.exit_status(), 1);
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_successful_deploy_reports_every_step() {
        let fixture = Fixture::new("prod").with_units(&[Service::App]);
        let runner = RecordingRunner::new();

        let outcome = Deployer::new(&runner)
            .with_unit_directory(fixture.units.path())
            .deploy(fixture.lookup());

        assert!(outcome.is_success());
        assert_eq!(outcome.exit_status(), 0);
        let report = outcome.report.unwrap();
        assert_eq!(report.steps.len(), 10);
        assert_eq!(
            report.executed_steps(),
            vec!["pull", "stop-app", "clear-cache", "clear-db", "start-app"]
        );
        assert_eq!(report.environment, "prod");
        assert!(!report.dry_run);
    }

    #[test]
    fn test_failed_deploy_exits_with_failure() {
        let fixture = Fixture::new("prod").with_units(&STOP_ORDER);
        let runner = RecordingRunner::failing_on("start-rest");

        let outcome = Deployer::new(&runner)
            .with_dry_run(true)
            .deploy_context(&fixture.context());

        assert_eq!(outcome.exit_status(), 1);
        let report = outcome.report.as_ref().unwrap();
        assert!(report.dry_run);
        assert_eq!(
            report.failure.as_ref().and_then(|f| f.step.as_deref()),
            Some("start-rest")
        );
        assert_eq!(runner.labels().last().map(String::as_str), Some("start-rest"));
        assert!(!runner.labels().contains(&String::from("start-web")));
    }
}

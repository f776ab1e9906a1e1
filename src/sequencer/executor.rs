//! Fail-fast execution of deployment plans.
//!
//! Steps run strictly in plan order, each awaited to completion. The first
//! failing step aborts the run; nothing already done is undone.

use std::time::Instant;
use tracing::{error, info};

use crate::config::DeploymentContext;
use crate::error::Result;
use crate::runner::CommandRunner;

use super::plan::DeploymentPlan;
use super::report::{DeploymentReport, StepStatus};
use super::session::Session;

/// Runs a [`DeploymentPlan`] against a context.
pub struct Sequencer<'a> {
    /// Deployment context.
    context: &'a DeploymentContext,
    /// Command runner.
    runner: &'a dyn CommandRunner,
}

impl<'a> Sequencer<'a> {
    /// Creates a new sequencer.
    #[must_use]
    pub const fn new(context: &'a DeploymentContext, runner: &'a dyn CommandRunner) -> Self {
        Self { context, runner }
    }

    /// Runs every step of the plan in order, recording outcomes in `report`.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing step. Later steps are not run.
    pub fn run(&self, plan: &DeploymentPlan, report: &mut DeploymentReport) -> Result<()> {
        info!(
            "Deploying environment '{}' from {} ({} steps)",
            self.context.environment(),
            self.context.home_directory().display(),
            plan.len()
        );

        let mut session = Session::new(self.context, self.runner);
        let total = plan.len();

        for (index, step) in plan.steps().iter().enumerate() {
            let position = index + 1;

            if !step.guard().admits(&session) {
                info!(
                    "[{position}/{total}] Skipping {}: {}",
                    step.name(),
                    step.guard().skip_reason(&session)
                );
                report.record(step.name(), StepStatus::Skipped, std::time::Duration::ZERO);
                continue;
            }

            info!(
                "[{position}/{total}] {}: {}",
                step.name(),
                step.action().describe(&session)
            );

            let started = Instant::now();
            match step.action().perform(&mut session) {
                Ok(()) => {
                    report.record(step.name(), StepStatus::Completed, started.elapsed());
                }
                Err(cause) => {
                    report.record(step.name(), StepStatus::Failed, started.elapsed());
                    let err = step.error_kind().into_error(step.name(), cause);
                    error!("Deployment aborted: {err}");
                    report.fail(&err);
                    report.finish();
                    return Err(err);
                }
            }
        }

        report.finish();
        info!("Deployment of '{}' completed", self.context.environment());
        Ok(())
    }
}

impl std::fmt::Debug for Sequencer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequencer")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

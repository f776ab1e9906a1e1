//! The standard rolling-deployment plan.

use std::path::PathBuf;

use crate::config::DeploymentContext;
use crate::error::ErrorKind;
use crate::runner::CommandSpec;
use crate::service::{START_ORDER, STOP_ORDER, Service};

use super::step::{Action, Guard, Step};

/// Script that flushes the cache.
pub const CLEAR_CACHE_SCRIPT: &str = "bin/clear_redis.py";

/// Script that truncates the derived online-users tables.
pub const CLEAR_DATA_SCRIPT: &str = "bin/clear_db_online_table.py";

/// An ordered table of deployment steps.
#[derive(Debug, Clone)]
pub struct DeploymentPlan {
    /// Steps in execution order.
    steps: Vec<Step>,
}

impl DeploymentPlan {
    /// Builds the standard plan for a context.
    ///
    /// Order: activate, pull, stop web/rest/app, clear cache, clear data,
    /// start app/rest/web.
    #[must_use]
    pub fn standard(context: &DeploymentContext) -> Self {
        let home = context.home_directory();
        let script_args = vec![
            context.environment().to_string(),
            home.display().to_string(),
        ];

        let mut steps = vec![
            Step::new(
                "activate-env",
                Guard::RuntimeInactive,
                Action::Activate {
                    runtime_dir: context.runtime_directory(),
                },
                ErrorKind::Environment,
            ),
            Step::new(
                "pull",
                Guard::Always,
                Action::Run(CommandSpec::new("git").arg("pull").current_dir(home)),
                ErrorKind::SourceUpdate,
            ),
        ];

        steps.extend(
            STOP_ORDER
                .iter()
                .map(|&service| service_step(context, service, "stop")),
        );

        steps.push(Step::new(
            "clear-cache",
            Guard::Always,
            Action::Script {
                script: PathBuf::from(CLEAR_CACHE_SCRIPT),
                args: script_args.clone(),
            },
            ErrorKind::CacheClear,
        ));
        steps.push(Step::new(
            "clear-db",
            Guard::Always,
            Action::Script {
                script: PathBuf::from(CLEAR_DATA_SCRIPT),
                args: script_args,
            },
            ErrorKind::DataClear,
        ));

        steps.extend(
            START_ORDER
                .iter()
                .map(|&service| service_step(context, service, "start")),
        );

        Self { steps }
    }

    /// Returns the steps in execution order.
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Returns the step names in execution order.
    #[must_use]
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(Step::name).collect()
    }

    /// Returns the number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if the plan has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

fn service_step(context: &DeploymentContext, service: Service, verb: &str) -> Step {
    Step::new(
        format!("{verb}-{service}"),
        Guard::UnitFilePresent(context.unit_file(service)),
        Action::Run(
            CommandSpec::new("systemctl")
                .arg(verb)
                .arg(service.unit_name(context.environment())),
        ),
        ErrorKind::ServiceControl,
    )
}

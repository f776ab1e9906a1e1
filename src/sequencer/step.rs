//! Typed step descriptors.

use std::path::PathBuf;

use crate::error::{ErrorKind, StepFailure};
use crate::runner::CommandSpec;

use super::session::Session;

/// A single deployment step: what to do, when to skip it, and how a
/// failure is classified.
#[derive(Debug, Clone)]
pub struct Step {
    /// Short step name (e.g. `stop-web`).
    name: String,
    /// Condition under which the step runs.
    guard: Guard,
    /// What the step does.
    action: Action,
    /// Kind reported when the action fails.
    error_kind: ErrorKind,
}

/// Condition evaluated immediately before a step would run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guard {
    /// Always run.
    Always,
    /// Run only if the unit file exists.
    UnitFilePresent(PathBuf),
    /// Run only if no virtual environment is in effect.
    RuntimeInactive,
}

/// What a step does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Activate the virtual environment in this directory.
    Activate {
        /// Virtual environment directory.
        runtime_dir: PathBuf,
    },
    /// Run a command.
    Run(CommandSpec),
    /// Run a Python script from the home directory with the session interpreter.
    Script {
        /// Script path, relative to the home directory.
        script: PathBuf,
        /// Script arguments.
        args: Vec<String>,
    },
}

impl Step {
    /// Creates a new step.
    #[must_use]
    pub fn new(name: impl Into<String>, guard: Guard, action: Action, error_kind: ErrorKind) -> Self {
        Self {
            name: name.into(),
            guard,
            action,
            error_kind,
        }
    }

    /// Returns the step name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the guard.
    #[must_use]
    pub const fn guard(&self) -> &Guard {
        &self.guard
    }

    /// Returns the action.
    #[must_use]
    pub const fn action(&self) -> &Action {
        &self.action
    }

    /// Returns the error kind reported on failure.
    #[must_use]
    pub const fn error_kind(&self) -> ErrorKind {
        self.error_kind
    }
}

impl Guard {
    /// Returns whether the guarded step should run now.
    #[must_use]
    pub fn admits(&self, session: &Session<'_>) -> bool {
        match self {
            Self::Always => true,
            Self::UnitFilePresent(path) => path.is_file(),
            Self::RuntimeInactive => session.runtime().is_none(),
        }
    }

    /// Describes why a step was skipped.
    #[must_use]
    pub fn skip_reason(&self, session: &Session<'_>) -> String {
        match self {
            Self::Always => String::from("never skipped"),
            Self::UnitFilePresent(path) => format!("no unit file at {}", path.display()),
            Self::RuntimeInactive => session.runtime().map_or_else(
                || String::from("no runtime environment active"),
                |dir| format!("runtime environment already active at {}", dir.display()),
            ),
        }
    }
}

impl Action {
    /// Performs the action.
    ///
    /// # Errors
    ///
    /// Returns the failure cause if the action does not succeed.
    pub fn perform(&self, session: &mut Session<'_>) -> Result<(), StepFailure> {
        match self {
            Self::Activate { runtime_dir } => session.activate(runtime_dir),
            Self::Run(command) => session.run(command).map(|_| ()),
            Self::Script { script, args } => {
                let command = Self::script_command(session, script, args);
                session.run(&command).map(|_| ())
            }
        }
    }

    /// Describes the action for logs and plans.
    #[must_use]
    pub fn describe(&self, session: &Session<'_>) -> String {
        match self {
            Self::Activate { runtime_dir } => {
                format!("activate virtual environment {}", runtime_dir.display())
            }
            Self::Run(command) => command.to_string(),
            Self::Script { script, args } => {
                Self::script_command(session, script, args).to_string()
            }
        }
    }

    fn script_command(session: &Session<'_>, script: &std::path::Path, args: &[String]) -> CommandSpec {
        CommandSpec::new(session.python())
            .arg(script.display().to_string())
            .args(args.iter().cloned())
            .current_dir(session.context().home_directory())
    }
}

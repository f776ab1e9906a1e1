//! Mutable state threaded through a single deployment run.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::DeploymentContext;
use crate::error::StepFailure;
use crate::runner::{CommandOutput, CommandRunner, CommandSpec};

const VIRTUAL_ENV_VAR: &str = "VIRTUAL_ENV";
const PATH_VAR: &str = "PATH";

/// Search path used behind the activated `bin` when no `PATH` was inherited.
const DEFAULT_SEARCH_PATH: &str = "/usr/local/sbin:/usr/local/bin:/usr/sbin:/usr/bin:/sbin:/bin";

/// State shared by the steps of one run: the runner and the environment
/// overlay that runtime activation adds for later child processes.
pub struct Session<'a> {
    /// Read-only deployment context.
    context: &'a DeploymentContext,
    /// Command runner.
    runner: &'a dyn CommandRunner,
    /// Virtual environment in effect, whether inherited or activated.
    runtime: Option<PathBuf>,
    /// Virtual environment activated by this run.
    activated: Option<PathBuf>,
    /// Variables added to every command.
    overlay: BTreeMap<String, String>,
}

impl<'a> Session<'a> {
    /// Creates a session for a context.
    #[must_use]
    pub fn new(context: &'a DeploymentContext, runner: &'a dyn CommandRunner) -> Self {
        Self {
            context,
            runner,
            runtime: context.active_runtime().map(Path::to_path_buf),
            activated: None,
            overlay: BTreeMap::new(),
        }
    }

    /// Returns the deployment context.
    #[must_use]
    pub const fn context(&self) -> &DeploymentContext {
        self.context
    }

    /// Returns the virtual environment in effect, if any.
    #[must_use]
    pub fn runtime(&self) -> Option<&Path> {
        self.runtime.as_deref()
    }

    /// Returns the variables added to every command.
    #[must_use]
    pub const fn overlay(&self) -> &BTreeMap<String, String> {
        &self.overlay
    }

    /// Returns the Python interpreter scripts run with.
    ///
    /// An inherited environment is already first on the inherited `PATH`, so
    /// plain `python` is resolved through it.
    #[must_use]
    pub fn python(&self) -> String {
        self.activated.as_ref().map_or_else(
            || String::from("python"),
            |dir| dir.join("bin").join("python").display().to_string(),
        )
    }

    /// Makes the virtual environment at `dir` active for later commands.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment has no activation script or its
    /// `bin` directory cannot be placed on `PATH`.
    pub fn activate(&mut self, dir: &Path) -> Result<(), StepFailure> {
        let activate_script = dir.join("bin").join("activate");
        if !activate_script.is_file() {
            return Err(StepFailure::message(format!(
                "no virtual environment found at {} (missing {})",
                dir.display(),
                activate_script.display()
            )));
        }

        let bin = dir.join("bin");
        let mut entries = vec![bin];
        match self.context.search_path() {
            Some(inherited) => entries.extend(std::env::split_paths(inherited)),
            None => {
                warn!("No PATH inherited, using {DEFAULT_SEARCH_PATH}");
                entries.extend(std::env::split_paths(DEFAULT_SEARCH_PATH));
            }
        }
        let path = std::env::join_paths(entries)
            .map_err(|e| StepFailure::message(format!("cannot build PATH: {e}")))?
            .into_string()
            .map_err(|_| StepFailure::message("PATH is not valid UTF-8"))?;

        debug!("Activated PATH: {path}");
        self.overlay
            .insert(VIRTUAL_ENV_VAR.to_string(), dir.display().to_string());
        self.overlay.insert(PATH_VAR.to_string(), path);
        self.runtime = Some(dir.to_path_buf());
        self.activated = Some(dir.to_path_buf());

        info!("Activated virtual environment: {}", dir.display());
        Ok(())
    }

    /// Runs a command with the session overlay applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub fn run(&self, command: &CommandSpec) -> Result<CommandOutput, StepFailure> {
        let command = command.clone().envs(&self.overlay);
        Ok(self.runner.run(&command)?)
    }
}

impl std::fmt::Debug for Session<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("context", &self.context)
            .field("runtime", &self.runtime)
            .field("activated", &self.activated)
            .field("overlay", &self.overlay)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Fixture, RecordingRunner};

    #[test]
    fn test_inherited_runtime_uses_python_from_path() {
        let fixture = Fixture::new("prod");
        let context = fixture.context();
        let runner = RecordingRunner::new();
        let session = Session::new(&context, &runner);

        assert_eq!(session.runtime(), Some(Path::new("/opt/dino-venv")));
        assert_eq!(session.python(), "python");
    }

    #[test]
    fn test_activated_runtime_uses_its_own_python() {
        let fixture = Fixture::new("prod").with_runtime().without_active_runtime();
        let context = fixture.context();
        let runner = RecordingRunner::new();
        let mut session = Session::new(&context, &runner);
        let runtime = context.runtime_directory();

        assert_eq!(session.python(), "python");
        session.activate(&runtime).unwrap();
        assert_eq!(
            session.python(),
            runtime.join("bin").join("python").display().to_string()
        );
    }

    #[test]
    fn test_activation_without_inherited_path_keeps_system_directories() {
        let fixture = Fixture::new("prod")
            .with_runtime()
            .without_active_runtime()
            .without_var("PATH");
        let context = fixture.context();
        let runner = RecordingRunner::new();
        let mut session = Session::new(&context, &runner);
        let runtime = context.runtime_directory();

        session.activate(&runtime).unwrap();

        let path = &session.overlay()["PATH"];
        let entries: Vec<PathBuf> = std::env::split_paths(path).collect();
        assert_eq!(entries[0], runtime.join("bin"));
        assert!(entries.contains(&PathBuf::from("/usr/bin")));
        assert!(entries.contains(&PathBuf::from("/bin")));
    }

    #[test]
    fn test_missing_activation_script_fails() {
        let fixture = Fixture::new("prod").without_active_runtime();
        let context = fixture.context();
        let runner = RecordingRunner::new();
        let mut session = Session::new(&context, &runner);

        let err = session.activate(&context.runtime_directory()).unwrap_err();
        assert!(err.to_string().contains("no virtual environment found"));
        assert!(session.overlay().is_empty());
    }
}

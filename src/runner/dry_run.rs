//! Runner that logs commands instead of running them.

use tracing::info;

use crate::error::CommandError;

use super::command::{CommandOutput, CommandSpec};
use super::CommandRunner;

/// Logs every command and reports success without spawning anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunRunner;

impl DryRunRunner {
    /// Creates a new dry-run runner.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl CommandRunner for DryRunRunner {
    fn run(&self, command: &CommandSpec) -> Result<CommandOutput, CommandError> {
        match command.working_dir() {
            Some(dir) => info!("[dry-run] would run in {}: {command}", dir.display()),
            None => info!("[dry-run] would run: {command}"),
        }
        Ok(CommandOutput {
            exit_code: Some(0),
            ..CommandOutput::default()
        })
    }
}

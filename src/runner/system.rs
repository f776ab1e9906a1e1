//! Runner that spawns real processes.

use std::process::{Command, Stdio};
use tracing::debug;

use crate::error::CommandError;

use super::command::{CommandOutput, CommandSpec};
use super::CommandRunner;

/// Runs commands with [`std::process::Command`], one at a time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    /// Creates a new system runner.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, command: &CommandSpec) -> Result<CommandOutput, CommandError> {
        debug!("Running: {command}");

        let mut process = Command::new(command.program());
        process
            .args(command.arguments())
            .envs(command.environment())
            .stdin(Stdio::null());
        if let Some(dir) = command.working_dir() {
            process.current_dir(dir);
        }

        let output = process.output().map_err(|source| CommandError::Spawn {
            program: command.program().to_string(),
            source,
        })?;

        let captured = CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        };

        if !captured.stdout.trim().is_empty() {
            debug!("{} stdout: {}", command.program(), captured.stdout.trim());
        }

        if output.status.success() {
            Ok(captured)
        } else {
            Err(CommandError::failed(
                command.program(),
                captured.exit_code,
                captured.error_text(),
            ))
        }
    }
}

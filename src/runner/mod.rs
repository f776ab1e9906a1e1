//! External command execution.
//!
//! Every side effect of a deployment goes through the [`CommandRunner`]
//! seam: the system runner spawns real processes, the dry-run runner only
//! logs what would be spawned.

mod command;
mod dry_run;
mod system;

pub use command::{CommandOutput, CommandSpec};
pub use dry_run::DryRunRunner;
pub use system::SystemRunner;

use crate::error::CommandError;

/// Runs external commands to completion.
pub trait CommandRunner {
    /// Runs a command and waits for it to exit.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exits unsuccessfully.
    fn run(&self, command: &CommandSpec) -> Result<CommandOutput, CommandError>;
}

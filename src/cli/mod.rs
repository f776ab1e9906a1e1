//! CLI module for the dino deployment tool.
//!
//! This module provides the command-line flags and the formatting of the
//! final deployment outcome.

mod commands;
mod output;

pub use commands::{Cli, LogFormat, OutputFormat};
pub use output::OutputFormatter;

// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # Dino Deploy
//!
//! Ordered, fail-fast rolling deployment for the dino chat services.
//!
//! ## Overview
//!
//! A deployment pulls the latest source, stops the services, clears the
//! cache and derived database state, then starts the services again:
//!
//! 1. Resolve `DINO_ENVIRONMENT` and `DINO_HOME` into a context
//! 2. Activate the virtual environment unless one is already active
//! 3. `git pull` in the home directory
//! 4. Stop `web`, `rest`, `app` (entry point first)
//! 5. Clear the cache, then the online-users tables
//! 6. Start `app`, `rest`, `web` (entry point last)
//!
//! A service is only stopped or started if its unit file
//! `dino-<service>-<environment>.service` exists on this host. The first
//! failing step aborts the run; nothing is rolled back.
//!
//! ## Modules
//!
//! - [`config`]: Context resolution from the environment
//! - [`service`]: Services and their stop/start orders
//! - [`runner`]: External command execution
//! - [`sequencer`]: Step table, executor and run report
//! - [`deployer`]: Top-level orchestration
//! - [`cli`]: Command-line flags and output
//!
//! ## Example
//!
//! ```no_run
//! use dino_deploy::{Deployer, SystemRunner};
//!
//! let runner = SystemRunner::new();
//! let outcome = Deployer::new(&runner).deploy(|name| std::env::var(name).ok());
//! if let Some(error) = &outcome.error {
//!     eprintln!("{}", error.diagnostic());
//! }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod cli;
pub mod config;
pub mod deployer;
pub mod error;
pub mod runner;
pub mod sequencer;
pub mod service;

#[cfg(test)]
mod testing;

// ============================================================================
// Re-exports
// ============================================================================

pub use cli::{Cli, OutputFormatter};
pub use config::DeploymentContext;
pub use deployer::{Deployer, DeploymentOutcome};
pub use error::{DeployError, ErrorKind, Result};
pub use runner::{CommandRunner, CommandSpec, DryRunRunner, SystemRunner};
pub use sequencer::{DeploymentPlan, DeploymentReport, Sequencer};
pub use service::Service;

//! Deployment sequencing.
//!
//! This module turns a [`DeploymentContext`](crate::config::DeploymentContext)
//! into an ordered table of typed steps and runs them one after another,
//! stopping at the first failure.

mod executor;
mod plan;
mod report;
mod session;
mod step;

pub use executor::Sequencer;
pub use plan::{CLEAR_CACHE_SCRIPT, CLEAR_DATA_SCRIPT, DeploymentPlan};
pub use report::{DeploymentReport, FailureRecord, StepRecord, StepStatus};
pub use session::Session;
pub use step::{Action, Guard, Step};

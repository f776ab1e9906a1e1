//! Configuration module for the deployment sequencer.
//!
//! This module handles everything read from the environment at startup:
//! - Resolving `DINO_ENVIRONMENT` and `DINO_HOME` into a [`DeploymentContext`]
//! - Validating the home directory
//! - Loading an optional `.env` file

mod context;
mod dotenv;

pub use context::{
    DEFAULT_HOME, DeploymentContext, ENVIRONMENT_VAR, HOME_VAR, RUNTIME_DIR_NAME,
    SYSTEMD_UNIT_DIR,
};
pub use dotenv::load_dotenv;

//! Optional `.env` loading.

use std::path::Path;
use tracing::info;

use crate::error::{ConfigError, Result};

/// Loads `<dir>/.env` into the process environment if the file exists.
///
/// Variables already set are left untouched. Returns whether a file was loaded.
///
/// # Errors
///
/// Returns an error if the `.env` file exists but cannot be parsed.
pub fn load_dotenv(dir: &Path) -> Result<bool> {
    let env_path = dir.join(".env");

    if !env_path.exists() {
        return Ok(false);
    }

    info!("Loading environment from: {}", env_path.display());
    dotenvy::from_path(&env_path).map_err(|e| ConfigError::DotEnv {
        path: env_path.clone(),
        message: e.to_string(),
    })?;

    Ok(true)
}

//! Deployment context resolved once at process start.
//!
//! The context is read-only after construction and is passed by reference
//! to everything that needs it; nothing else reads the process environment.

use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::service::Service;

/// Environment variable naming the deployment environment.
pub const ENVIRONMENT_VAR: &str = "DINO_ENVIRONMENT";

/// Environment variable naming the home directory.
pub const HOME_VAR: &str = "DINO_HOME";

/// Home directory used when `DINO_HOME` is unset.
pub const DEFAULT_HOME: &str = "/home/dino/dino";

/// Directory holding the systemd unit definitions.
pub const SYSTEMD_UNIT_DIR: &str = "/usr/lib/systemd/system";

/// Name of the Python virtual environment directory inside the home directory.
pub const RUNTIME_DIR_NAME: &str = "env";

const VIRTUAL_ENV_VAR: &str = "VIRTUAL_ENV";
const PATH_VAR: &str = "PATH";

/// Everything the sequencer needs to know about this host and deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentContext {
    /// Deployment environment name (e.g. `prod`).
    environment: String,
    /// Directory holding the source checkout and runtime environment.
    home_directory: PathBuf,
    /// Directory holding the service unit files.
    unit_directory: PathBuf,
    /// Virtual environment already active when the process started.
    active_runtime: Option<PathBuf>,
    /// Inherited `PATH`.
    search_path: Option<String>,
}

impl DeploymentContext {
    /// Builds the context from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `DINO_ENVIRONMENT` is missing or
    /// invalid, or if the home directory cannot be entered.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the context from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `DINO_ENVIRONMENT` is missing or
    /// invalid, or if the home directory cannot be entered.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = resolve_environment(lookup(ENVIRONMENT_VAR))?;

        let home_directory = lookup(HOME_VAR)
            .filter(|value| !value.is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_HOME), PathBuf::from);
        check_home_directory(&home_directory)?;

        let active_runtime = lookup(VIRTUAL_ENV_VAR)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        debug!(
            "Resolved context: environment={}, home={}, active_runtime={:?}",
            environment,
            home_directory.display(),
            active_runtime
        );

        Ok(Self {
            environment,
            home_directory,
            unit_directory: PathBuf::from(SYSTEMD_UNIT_DIR),
            active_runtime,
            search_path: lookup(PATH_VAR),
        })
    }

    /// Overrides the unit directory.
    #[must_use]
    pub fn with_unit_directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.unit_directory = path.into();
        self
    }

    /// Returns the deployment environment name.
    #[must_use]
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Returns the home directory.
    #[must_use]
    pub fn home_directory(&self) -> &Path {
        &self.home_directory
    }

    /// Returns the unit directory.
    #[must_use]
    pub fn unit_directory(&self) -> &Path {
        &self.unit_directory
    }

    /// Returns the virtual environment that was active at startup, if any.
    #[must_use]
    pub fn active_runtime(&self) -> Option<&Path> {
        self.active_runtime.as_deref()
    }

    /// Returns the inherited `PATH`.
    #[must_use]
    pub fn search_path(&self) -> Option<&str> {
        self.search_path.as_deref()
    }

    /// Returns the virtual environment directory activated when none is active.
    #[must_use]
    pub fn runtime_directory(&self) -> PathBuf {
        self.home_directory.join(RUNTIME_DIR_NAME)
    }

    /// Returns the path of the unit file gating the given service.
    #[must_use]
    pub fn unit_file(&self, service: Service) -> PathBuf {
        self.unit_directory
            .join(service.unit_file_name(&self.environment))
    }
}

fn resolve_environment(value: Option<String>) -> Result<String> {
    let Some(environment) = value.filter(|v| !v.is_empty()) else {
        return Err(ConfigError::MissingEnvVar {
            name: ENVIRONMENT_VAR.to_string(),
        }
        .into());
    };

    if environment.contains('/') {
        return Err(ConfigError::InvalidEnvironment {
            value: environment,
            reason: String::from("must not contain '/'"),
        }
        .into());
    }

    Ok(environment)
}

fn check_home_directory(path: &Path) -> Result<()> {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == IoErrorKind::NotFound => {
            return Err(ConfigError::HomeNotFound {
                path: path.to_path_buf(),
            }
            .into());
        }
        Err(e) => {
            return Err(ConfigError::HomeNotEnterable {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
            .into());
        }
    };

    if !metadata.is_dir() {
        return Err(ConfigError::HomeNotEnterable {
            path: path.to_path_buf(),
            message: String::from("not a directory"),
        }
        .into());
    }

    // Resolving an entry inside the directory needs search permission.
    std::fs::metadata(path.join(".")).map_err(|e| ConfigError::HomeNotEnterable {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    std::fs::read_dir(path).map_err(|e| ConfigError::HomeNotEnterable {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    Ok(())
}

//! Error types for the dino deployment sequencer.
//!
//! This module provides the error taxonomy for every stage of a rolling
//! deployment: configuration, runtime environment activation, source
//! update, service control, and cache/data clearing. None of these errors
//! is recovered; the first one aborts the whole sequence.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the deployment sequencer.
#[derive(Debug, Error)]
pub enum DeployError {
    /// Configuration-related errors (missing environment, bad home directory).
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Runtime environment activation failed.
    #[error("Runtime environment error in step '{step}': {cause}")]
    Environment {
        /// Name of the failing step.
        step: String,
        /// Underlying failure.
        cause: StepFailure,
    },

    /// Pulling the latest source failed.
    #[error("Source update failed in step '{step}': {cause}")]
    SourceUpdate {
        /// Name of the failing step.
        step: String,
        /// Underlying failure.
        cause: StepFailure,
    },

    /// Starting or stopping a service failed.
    #[error("Service control failed in step '{step}': {cause}")]
    ServiceControl {
        /// Name of the failing step.
        step: String,
        /// Underlying failure.
        cause: StepFailure,
    },

    /// Clearing the cache failed.
    #[error("Cache clear failed in step '{step}': {cause}")]
    CacheClear {
        /// Name of the failing step.
        step: String,
        /// Underlying failure.
        cause: StepFailure,
    },

    /// Clearing the derived database tables failed.
    #[error("Data clear failed in step '{step}': {cause}")]
    DataClear {
        /// Name of the failing step.
        step: String,
        /// Underlying failure.
        cause: StepFailure,
    },
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is unset or empty.
    #[error("Missing environment variable: {name}")]
    MissingEnvVar {
        /// Name of the missing variable.
        name: String,
    },

    /// The deployment environment name cannot be used.
    #[error("Invalid deployment environment '{value}': {reason}")]
    InvalidEnvironment {
        /// The rejected value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The home directory does not exist.
    #[error("Home directory not found: {path}")]
    HomeNotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The home directory exists but cannot be entered.
    #[error("Cannot enter home directory {path}: {message}")]
    HomeNotEnterable {
        /// Path of the home directory.
        path: PathBuf,
        /// Description of the failure.
        message: String,
    },

    /// A configuration precondition checked inside a step did not hold.
    #[error("Precondition for step '{step}' failed: {message}")]
    Precondition {
        /// Name of the step.
        step: String,
        /// Description of the failure.
        message: String,
    },

    /// The `.env` file exists but could not be loaded.
    #[error("Failed to load .env file {path}: {message}")]
    DotEnv {
        /// Path of the `.env` file.
        path: PathBuf,
        /// Description of the failure.
        message: String,
    },
}

/// Errors from running an external command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The process could not be spawned at all.
    #[error("Failed to run {program}: {source}")]
    Spawn {
        /// Program that was invoked.
        program: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The process ran and exited unsuccessfully.
    #[error("{program} exited with {status}: {stderr}", status = exit_code_text(*.code))]
    Failed {
        /// Program that was invoked.
        program: String,
        /// Exit code, if the process was not killed by a signal.
        code: Option<i32>,
        /// Captured error output (stderr, falling back to stdout).
        stderr: String,
    },
}

/// What went wrong inside a single deployment step.
#[derive(Debug, Error)]
pub enum StepFailure {
    /// An external command failed.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// A precondition the step checks itself did not hold.
    #[error("{0}")]
    Message(String),
}

/// The error taxonomy, one kind per failure class a step can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or invalid configuration.
    Config,
    /// Runtime environment activation failure.
    Environment,
    /// Source pull failure.
    SourceUpdate,
    /// Service start/stop failure.
    ServiceControl,
    /// Cache clearing failure.
    CacheClear,
    /// Database table clearing failure.
    DataClear,
}

/// Result type alias for deployment operations.
pub type Result<T> = std::result::Result<T, DeployError>;

fn exit_code_text(code: Option<i32>) -> String {
    code.map_or_else(|| String::from("signal"), |c| format!("status {c}"))
}

impl DeployError {
    /// Returns the taxonomy kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::Environment { .. } => ErrorKind::Environment,
            Self::SourceUpdate { .. } => ErrorKind::SourceUpdate,
            Self::ServiceControl { .. } => ErrorKind::ServiceControl,
            Self::CacheClear { .. } => ErrorKind::CacheClear,
            Self::DataClear { .. } => ErrorKind::DataClear,
        }
    }

    /// Returns the name of the failing step, if the error came from one.
    #[must_use]
    pub fn step(&self) -> Option<&str> {
        match self {
            Self::Config(_) => None,
            Self::Environment { step, .. }
            | Self::SourceUpdate { step, .. }
            | Self::ServiceControl { step, .. }
            | Self::CacheClear { step, .. }
            | Self::DataClear { step, .. } => Some(step),
        }
    }

    /// Formats the one-line diagnostic printed when a deployment aborts.
    #[must_use]
    pub fn diagnostic(&self) -> String {
        let message = self.to_string().replace('\n', " ");
        match self.step() {
            Some(step) => format!("{} at step '{step}': {message}", self.kind()),
            None => format!("{}: {message}", self.kind()),
        }
    }
}

impl ErrorKind {
    /// Wraps a step failure into the error variant for this kind.
    #[must_use]
    pub fn into_error(self, step: impl Into<String>, cause: StepFailure) -> DeployError {
        let step = step.into();
        match self {
            Self::Config => DeployError::Config(ConfigError::Precondition {
                step,
                message: cause.to_string(),
            }),
            Self::Environment => DeployError::Environment { step, cause },
            Self::SourceUpdate => DeployError::SourceUpdate { step, cause },
            Self::ServiceControl => DeployError::ServiceControl { step, cause },
            Self::CacheClear => DeployError::CacheClear { step, cause },
            Self::DataClear => DeployError::DataClear { step, cause },
        }
    }

    /// Returns the taxonomy name used in diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Config => "ConfigError",
            Self::Environment => "EnvironmentError",
            Self::SourceUpdate => "SourceUpdateError",
            Self::ServiceControl => "ServiceControlError",
            Self::CacheClear => "CacheClearError",
            Self::DataClear => "DataClearError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StepFailure {
    /// Creates a message failure.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

impl CommandError {
    /// Creates a failed-exit error.
    #[must_use]
    pub fn failed(program: impl Into<String>, code: Option<i32>, stderr: impl Into<String>) -> Self {
        Self::Failed {
            program: program.into(),
            code,
            stderr: stderr.into(),
        }
    }
}

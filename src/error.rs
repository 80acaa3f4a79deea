//! Error types for orgtrack.

use std::time::Duration;
use thiserror::Error;

/// Misuse of a stage tracker: bad construction or a stage name outside the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageError {
    #[error("Stage pipeline must declare at least one stage")]
    EmptyPipeline,

    #[error("Duplicate stage name: {0}")]
    DuplicateStage(String),

    #[error("Unknown stage: {0}")]
    UnknownStage(String),
}

/// Crate-wide errors surfaced to commands and the CLI.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Stage error: {0}")]
    Stage(#[from] StageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid replay script: {0}")]
    InvalidScript(String),

    #[error("Timed out after {} waiting for {operation}", human(.elapsed))]
    PollTimeout {
        operation: String,
        elapsed: Duration,
    },

    #[error("Gave up after {attempts} attempt(s): {last_error}")]
    RetryExhausted { attempts: u32, last_error: String },

    #[error("Domain {0} did not resolve")]
    DomainUnresolved(String),

    #[error("Sandbox {name} failed: {reason}")]
    SandboxFailed { name: String, reason: String },

    #[error("Status source error: {0}")]
    SourceError(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<toml::de::Error> for ApiError {
    fn from(err: toml::de::Error) -> Self {
        ApiError::InvalidScript(err.to_string())
    }
}

fn human(duration: &Duration) -> String {
    crate::format::format_duration(*duration)
}

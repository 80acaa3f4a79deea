//! Configuration System
//!
//! Layered configuration: built-in defaults, the user's global config file, workspace
//! config files, then `ORGTRACK__SECTION__KEY` environment variables.

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::global_file::global_config_path;

pub const OUTPUT_FORMATS: [&str; 3] = ["text", "table", "json"];

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrgtrackConfig {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Polling cadence for long-running operations
    #[serde(default)]
    pub polling: PollingConfig,

    /// Progress rendering
    #[serde(default)]
    pub render: RenderConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Delay between status checks
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Give up after this long
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// How long to wait for a new org domain to resolve
    #[serde(default = "default_domain_retry_secs")]
    pub domain_retry_secs: u64,

    /// Delay between domain resolution attempts
    #[serde(default = "default_domain_retry_interval_ms")]
    pub domain_retry_interval_ms: u64,
}

fn default_interval_ms() -> u64 {
    30_000
}

fn default_timeout_secs() -> u64 {
    60 * 60
}

fn default_domain_retry_secs() -> u64 {
    240
}

fn default_domain_retry_interval_ms() -> u64 {
    5_000
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            timeout_secs: default_timeout_secs(),
            domain_retry_secs: default_domain_retry_secs(),
            domain_retry_interval_ms: default_domain_retry_interval_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Colored status icons in text output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format: text, table, json
    #[serde(default = "default_render_format")]
    pub format: String,
}

fn default_true() -> bool {
    true
}

fn default_render_format() -> String {
    "text".to_string()
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            color: default_true(),
            format: default_render_format(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Polling(String),
    Render(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Polling(msg) => write!(f, "Polling: {}", msg),
            ValidationError::Render(msg) => write!(f, "Render: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl OrgtrackConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.polling.interval_ms == 0 {
            errors.push(ValidationError::Polling(
                "interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.polling.timeout_secs == 0 {
            errors.push(ValidationError::Polling(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.polling.domain_retry_interval_ms == 0 {
            errors.push(ValidationError::Polling(
                "domain_retry_interval_ms must be greater than zero".to_string(),
            ));
        }
        if !OUTPUT_FORMATS.contains(&self.render.format.as_str()) {
            errors.push(ValidationError::Render(format!(
                "unknown format '{}' (expected text, table or json)",
                self.render.format
            )));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate, folding all problems into one error.
    pub fn validated(self) -> Result<Self, ApiError> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })?;
        Ok(self)
    }
}

//! Config loading entry points.

use config::{Environment, File};
use std::path::Path;

use super::merge::merge_policy::builder_with_defaults;
use super::sources::{global_file, workspace_file};
use super::OrgtrackConfig;
use crate::error::ApiError;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace: defaults, global file, workspace files,
    /// then `ORGTRACK__*` environment overrides.
    pub fn load(workspace_root: &Path) -> Result<OrgtrackConfig, ApiError> {
        let builder = builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let config = builder.add_source(env_source()).build()?;
        let config: OrgtrackConfig = config.try_deserialize()?;
        config.validated()
    }

    /// Load a single explicit file (plus environment overrides).
    pub fn load_from_file(path: &Path) -> Result<OrgtrackConfig, ApiError> {
        if !path.exists() {
            return Err(ApiError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let config = builder_with_defaults()?
            .add_source(File::from(path))
            .add_source(env_source())
            .build()?;
        let config: OrgtrackConfig = config.try_deserialize()?;
        config.validated()
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("ORGTRACK")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

//! Configuration schema definitions and loading.
//!
//! Defines the configuration structure for the applet: general settings and
//! the secrets agent. Configuration is read from TOML and every field has a
//! default, so a missing or partial file is valid.

mod agent;
mod general;
mod paths;

#[cfg(test)]
mod tests;

use std::{fs, io::ErrorKind, path::Path};

pub use agent::AgentConfig;
pub use general::{GeneralConfig, LogLevel};
pub use paths::ConfigPaths;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{AppletError, Result};

/// Main configuration structure for the applet.
///
/// Represents the complete configuration schema that can be loaded
/// from TOML files. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
pub struct Config {
    /// General application settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Secrets agent settings.
    #[serde(default)]
    pub agent: AgentConfig,
}

impl Config {
    /// Load the configuration from the user's config file.
    ///
    /// # Errors
    /// Returns error if the config directory cannot be determined or the file
    /// exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&ConfigPaths::main_config()?)
    }

    /// Load the configuration from `path`, falling back to defaults when the
    /// file does not exist.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or is not valid TOML.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(AppletError::io_at(&e, path)),
        };

        toml::from_str(&content).map_err(|e| AppletError::toml_parse(e, Some(path)))
    }

    /// Render the configuration as TOML.
    ///
    /// # Errors
    /// Returns error if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| AppletError::Serialize(e.to_string()))
    }

    /// JSON schema of the configuration file.
    ///
    /// # Errors
    /// Returns error if the schema cannot be rendered as JSON.
    pub fn schema() -> Result<String> {
        let schema = schemars::schema_for!(Config);
        serde_json::to_string_pretty(&schema).map_err(|e| AppletError::Serialize(e.to_string()))
    }
}

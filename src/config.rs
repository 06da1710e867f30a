//! Session configuration
//!
//! Loaded from a JSON file; every field has a default so an empty object is valid.

use crate::adapter::LoadPolicy;
use crate::error::ComputeError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default number of scored rows included in the dataset preview
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// Configuration for a dashboard session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Handling of malformed rows
    #[serde(default)]
    pub load_policy: LoadPolicy,
    /// Rows shown in the preview table
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
    /// Access gate credentials
    #[serde(default)]
    pub access: AccessConfig,
}

fn default_preview_rows() -> usize {
    DEFAULT_PREVIEW_ROWS
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            load_policy: LoadPolicy::default(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
            access: AccessConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Load configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        let config: SessionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, ComputeError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, ComputeError> {
        serde_json::to_string_pretty(self).map_err(ComputeError::JsonError)
    }

    pub fn validate(&self) -> Result<(), ComputeError> {
        if self.access.enabled && self.access.username.trim().is_empty() {
            return Err(ComputeError::ConfigError(
                "access.username must not be empty when the gate is enabled".to_string(),
            ));
        }
        Ok(())
    }
}

/// Credentials for the access gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_password")]
    pub password: String,
}

fn default_enabled() -> bool {
    true
}

fn default_username() -> String {
    "admin".to_string()
}

fn default_password() -> String {
    "1234".to_string()
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            username: default_username(),
            password: default_password(),
        }
    }
}

//! Access gate
//!
//! A plain username/password check deciding whether the dashboard is shown.
//! Credentials are compared as-is; this is a placeholder, not a security boundary.

use crate::config::AccessConfig;
use crate::error::ComputeError;
use tracing::{debug, warn};

/// Gate guarding the dashboard output
#[derive(Debug, Clone)]
pub struct AccessGate {
    config: AccessConfig,
}

impl AccessGate {
    pub fn new(config: AccessConfig) -> Self {
        Self { config }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Check the supplied credentials. Always passes when the gate is disabled.
    pub fn check(&self, username: Option<&str>, password: Option<&str>) -> Result<(), ComputeError> {
        if !self.config.enabled {
            debug!("access gate disabled");
            return Ok(());
        }

        match (username, password) {
            (Some(u), Some(p)) if u == self.config.username && p == self.config.password => {
                debug!(username = u, "access granted");
                Ok(())
            }
            _ => {
                warn!("access denied");
                Err(ComputeError::AccessDenied)
            }
        }
    }
}

impl Default for AccessGate {
    fn default() -> Self {
        Self::new(AccessConfig::default())
    }
}

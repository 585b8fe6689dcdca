//! Configuration management for prm-discovery
//!
//! This module handles loading, parsing, validating, and merging
//! configuration from files, environment variables, and CLI overrides.
//! The configuration only shapes the production HTTP client; the
//! validation pipeline itself has no tunables.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::client::http::DEFAULT_MAX_BODY_BYTES;
use crate::error::{DiscoveryError, Result};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,
}

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// `User-Agent` sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Largest metadata body accepted, in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("prm-discovery/{}", env!("CARGO_PKG_VERSION"))
}

fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            user_agent: default_user_agent(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl DiscoveryConfig {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// A missing file is not an error; defaults are used instead.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Config`] if the file exists but cannot be
    /// read or parsed.
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| DiscoveryError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| DiscoveryError::Config(format!("Failed to parse config: {}", e)))
    }

    fn apply_env_vars(&mut self) {
        if let Ok(timeout) = std::env::var("PRM_DISCOVERY_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.http.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid PRM_DISCOVERY_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(user_agent) = std::env::var("PRM_DISCOVERY_USER_AGENT") {
            tracing::debug!(user_agent = %user_agent, "Env override: PRM_DISCOVERY_USER_AGENT");
            self.http.user_agent = user_agent;
        }

        if let Ok(max_body) = std::env::var("PRM_DISCOVERY_MAX_BODY_BYTES") {
            if let Ok(value) = max_body.parse() {
                self.http.max_body_bytes = value;
            } else {
                tracing::warn!("Invalid PRM_DISCOVERY_MAX_BODY_BYTES: {}", max_body);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }
        if let Some(timeout) = cli.timeout_seconds {
            self.http.timeout_seconds = timeout;
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Config`] if any value is out of range.
    pub fn validate(&self) -> Result<()> {
        if self.http.timeout_seconds == 0 {
            return Err(DiscoveryError::Config(
                "http.timeout_seconds must be greater than 0".to_string(),
            ));
        }

        if self.http.timeout_seconds > 3600 {
            return Err(DiscoveryError::Config(
                "http.timeout_seconds must be less than or equal to 3600".to_string(),
            ));
        }

        if self.http.user_agent.trim().is_empty() {
            return Err(DiscoveryError::Config(
                "http.user_agent cannot be empty".to_string(),
            ));
        }

        if self.http.max_body_bytes == 0 {
            return Err(DiscoveryError::Config(
                "http.max_body_bytes must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

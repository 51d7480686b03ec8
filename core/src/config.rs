//! Client configuration.
//!
//! Defaults are embedded from `config/default.toml`. A user file, environment
//! variables, and finally explicit overrides are layered on top, in that order.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::error::ConfigError;

/// Built-in defaults, compiled into the binary.
pub const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_NOTICE_DURATION_MS: u64 = 3000;

pub const ENV_API_URL: &str = "PLANTDOC_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "PLANTDOC_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub notice_duration_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            notice_duration_ms: DEFAULT_NOTICE_DURATION_MS,
        }
    }
}

impl ClientConfig {
    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ClientConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// The embedded defaults.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_toml_str(DEFAULT_CONFIG)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded client config from {}", path.display());
        Ok(config)
    }

    /// Apply `PLANTDOC_API_URL` / `PLANTDOC_TIMEOUT_SECS` from a lookup
    /// function (normally `std::env::var`).
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            debug!("{} overrides api_base_url", ENV_API_URL);
            self.api_base_url = url.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS).filter(|v| !v.trim().is_empty()) {
            self.request_timeout_secs =
                raw.trim()
                    .parse()
                    .map_err(|e: std::num::ParseIntError| ConfigError::InvalidValue {
                        key: ENV_TIMEOUT_SECS.to_string(),
                        reason: e.to_string(),
                    })?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Result<Self, ConfigError> {
        self.api_base_url = url.into();
        self.validate()?;
        Ok(self)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn notice_duration(&self) -> Duration {
        Duration::from_millis(self.notice_duration_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid_url = |reason: String| ConfigError::InvalidBaseUrl {
            url: self.api_base_url.clone(),
            reason,
        };
        let url = Url::parse(self.api_base_url.trim()).map_err(|e| invalid_url(e.to_string()))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(invalid_url(format!("unsupported scheme '{}'", url.scheme())));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "request_timeout_secs".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

/// Default location of the user config file, e.g. `~/.config/plantdoc/config.toml`.
#[cfg(not(target_arch = "wasm32"))]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("plantdoc").join("config.toml"))
}

/// Resolve the effective native configuration.
///
/// `explicit` must exist when given; the default user file is optional.
#[cfg(not(target_arch = "wasm32"))]
pub fn resolve(explicit: Option<&Path>) -> Result<ClientConfig, ConfigError> {
    let base = match explicit {
        Some(path) => ClientConfig::load(path)?,
        None => match user_config_path().filter(|p| p.exists()) {
            Some(path) => ClientConfig::load(&path)?,
            None => {
                debug!("No user config file, using built-in defaults");
                ClientConfig::builtin()?
            }
        },
    };
    base.with_env(|key| std::env::var(key).ok())
}

//! Configuration management for Crowdin Export
//!
//! Settings come from, in increasing precedence: built-in defaults, a TOML
//! config file, `CROWDIN_*` environment variables (a `.env` file is loaded at
//! startup), and finally command-line flags applied by the CLI layer.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::app::ClientConfig;
use crate::constants::{build, crowdin, env as env_constants, files, http, limits, logging};
use crate::errors::{ConfigError, ConfigResult};

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP client settings
    pub client: ClientConfigToml,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// TOML-friendly client configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfigToml {
    /// API base URL
    pub base_url: String,
    /// Outbound proxy URL (None = direct)
    pub proxy: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
    /// Delay between build status polls in milliseconds
    pub poll_interval_ms: u64,
    /// Rate limit (requests per second)
    pub rate_limit_rps: u32,
}

impl Default for ClientConfigToml {
    fn default() -> Self {
        Self {
            base_url: crowdin::DEFAULT_BASE_URL.to_string(),
            proxy: None,
            timeout_secs: http::DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: http::CONNECT_TIMEOUT.as_secs(),
            poll_interval_ms: build::DEFAULT_POLL_INTERVAL_MS,
            rate_limit_rps: limits::DEFAULT_RATE_LIMIT_RPS,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default stderr log level (error, warn, info, debug, trace)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: logging::DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration with multi-source precedence:
    /// 1. Default values
    /// 2. Config file (explicit path, or the first one found)
    /// 3. Environment variables
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file is not.
    pub fn load(config_file_override: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match config_file_override {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound {
                        path: path.to_path_buf(),
                    });
                }
                Self::load_from_file(path)?
            }
            None => match Self::find_config_file() {
                Some(path) => Self::load_from_file(&path)?,
                None => Self::default(),
            },
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let mut search_paths = vec![PathBuf::from(files::LOCAL_CONFIG_FILE)];
        if let Some(user_config) = Self::default_config_path() {
            search_paths.push(user_config);
        }

        let found = search_paths.into_iter().find(|path| path.exists());
        match &found {
            Some(path) => debug!("Found config file: {}", path.display()),
            None => debug!("No config file found in standard locations"),
        }
        found
    }

    /// Default config file path for the current user
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(files::CONFIG_DIR_NAME).join("config.toml"))
    }

    /// Load configuration from a TOML file
    fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: AppConfig =
            toml::from_str(&content).map_err(|source| ConfigError::InvalidFormat {
                path: path.to_path_buf(),
                source,
            })?;

        debug!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Applies `CROWDIN_*` overrides read through `lookup`
    fn apply_env_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(env_constants::API_URL).filter(|v| !v.is_empty()) {
            self.client.base_url = url;
        }
        if let Some(proxy) = lookup(env_constants::PROXY).filter(|v| !v.is_empty()) {
            self.client.proxy = Some(proxy);
        }
        if let Some(timeout) = lookup(env_constants::TIMEOUT).filter(|v| !v.is_empty()) {
            self.client.timeout_secs =
                timeout
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue {
                        field: env_constants::TIMEOUT.to_string(),
                        value: timeout.clone(),
                        reason: "Expected a whole number of seconds".to_string(),
                    })?;
        }
        Ok(())
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.client.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "client.timeout_secs".to_string(),
                value: "0".to_string(),
                reason: "Timeout must be at least one second".to_string(),
            });
        }
        if self.client.rate_limit_rps == 0 {
            return Err(ConfigError::InvalidValue {
                field: "client.rate_limit_rps".to_string(),
                value: "0".to_string(),
                reason: "Rate limit must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// Convert to runtime client configuration
    pub fn to_client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.client.base_url.clone(),
            proxy: self.client.proxy.clone(),
            request_timeout: Duration::from_secs(self.client.timeout_secs),
            connect_timeout: Duration::from_secs(self.client.connect_timeout_secs),
            poll_interval: Duration::from_millis(self.client.poll_interval_ms),
            rate_limit_rps: self.client.rate_limit_rps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_creation() {
        let config = AppConfig::default();

        assert_eq!(config.client.base_url, crowdin::DEFAULT_BASE_URL);
        assert_eq!(config.client.timeout_secs, 50);
        assert_eq!(config.logging.level, "warn");

        let runtime = config.to_client_config();
        assert_eq!(runtime.request_timeout, Duration::from_secs(50));
        assert!(runtime.proxy.is_none());
    }

    #[test]
    fn test_config_loading_nonexistent_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        // Should fail when explicitly specified
        let result = AppConfig::load(Some(&config_path));
        assert!(matches!(result, Err(ConfigError::NotFound { .. })));
    }

    #[test]
    fn test_config_loading_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test_config.toml");

        // Partial file: unspecified fields keep their defaults
        let test_config = r#"
[client]
base_url = "https://acme.api.crowdin.com/api/v2"
timeout_secs = 120

[logging]
level = "debug"
"#;
        std::fs::write(&config_path, test_config).unwrap();

        let config = AppConfig::load_from_file(&config_path).unwrap();

        assert_eq!(config.client.base_url, "https://acme.api.crowdin.com/api/v2");
        assert_eq!(config.client.timeout_secs, 120);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.client.rate_limit_rps, limits::DEFAULT_RATE_LIMIT_RPS);
        assert!(config.client.proxy.is_none());
    }

    #[test]
    fn test_config_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("broken.toml");
        std::fs::write(&config_path, "[client\ntimeout_secs = ").unwrap();

        let result = AppConfig::load(Some(&config_path));
        assert!(matches!(result, Err(ConfigError::InvalidFormat { .. })));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            (env_constants::API_URL, "https://example.test/api/v2"),
            (env_constants::PROXY, "http://proxy.local:8080"),
            (env_constants::TIMEOUT, "75"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config
            .apply_env_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.client.base_url, "https://example.test/api/v2");
        assert_eq!(config.client.proxy.as_deref(), Some("http://proxy.local:8080"));
        assert_eq!(config.client.timeout_secs, 75);
    }

    #[test]
    fn test_env_override_bad_timeout() {
        let mut config = AppConfig::default();
        let result = config.apply_env_overrides(|key| {
            (key == env_constants::TIMEOUT).then(|| "soon".to_string())
        });
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = AppConfig::default();
        config.client.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let config = AppConfig::default();
        let text = toml::to_string(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}

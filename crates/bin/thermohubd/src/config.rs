//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `thermohub.toml` in the working directory (or the path in
//! `THERMOHUB_CONFIG`). Every field has a default except the EasyControl
//! credentials, which may also come from the environment. Environment
//! variables take precedence over file values.

use serde::Deserialize;
use thermohub_adapter_easycontrol::EasyControlConfig;

const DEFAULT_CONFIG_PATH: &str = "thermohub.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging settings.
    pub logging: LoggingConfig,
    /// EasyControl integration settings.
    pub easycontrol: EasyControlConfig,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "thermohubd=info,thermohub_app=info,thermohub_adapter_easycontrol=info"
                .to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the config file (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is incomplete.
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var("THERMOHUB_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("THERMOHUB_ACCESS_TOKEN") {
            self.easycontrol.access_token = val;
        }
        if let Ok(val) = std::env::var("THERMOHUB_DEVICE_ID") {
            self.easycontrol.device_id = val;
        }
        if let Ok(val) = std::env::var("THERMOHUB_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.easycontrol.access_token.is_empty() {
            return Err(ConfigError::Validation(
                "easycontrol.access_token must be set".to_string(),
            ));
        }
        if self.easycontrol.device_id.is_empty() {
            return Err(ConfigError::Validation(
                "easycontrol.device_id must be set".to_string(),
            ));
        }
        if self.easycontrol.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "easycontrol.timeout_secs must be non-zero".to_string(),
            ));
        }
        if self.easycontrol.poll_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "easycontrol.poll_interval_secs must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

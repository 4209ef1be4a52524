//! # Configuration
//!
//! Manages the loading and parsing of the bot's configuration file (`config.json`).
//! Defines the structs for login settings, command handling, the keyword table and monitoring.

use serde::Deserialize;
use std::path::Path;

use crate::application::errors::ConfigError;
use crate::application::dispatcher::BannedSenders;
use crate::application::keywords::KeywordTable;

/// Main application configuration structure.
/// Matches the layout of `data/config.json` (or an equivalent YAML file).
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub homeserver: String,
    /// Full Matrix ID of the bot account, e.g. `@bitbot:example.org`.
    pub user_id: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_device_name")]
    pub device_name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
    /// Minimum number of seconds between keyword replies in one room.
    #[serde(default = "default_response_cooldown")]
    pub response_cooldown: u64,
    /// Glob patterns (`*`, `?`) matched against the full sender ID.
    #[serde(default)]
    pub banned_senders: Vec<String>,
    #[serde(default)]
    pub responses: KeywordTable,
    #[serde(default)]
    pub health_check: Option<HealthCheckConfig>,
    #[serde(default = "default_handler_timeout")]
    pub handler_timeout_secs: u64,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HealthCheckConfig {
    pub url: String,
    #[serde(default = "default_health_interval")]
    pub interval_secs: u64,
}

fn default_device_name() -> String {
    "bitbot".to_string()
}

fn default_command_prefix() -> String {
    "!".to_string()
}

fn default_response_cooldown() -> u64 {
    60
}

fn default_handler_timeout() -> u64 {
    30
}

fn default_health_interval() -> u64 {
    30
}

fn default_data_dir() -> String {
    "data".to_string()
}

impl AppConfig {
    /// Reads and validates the configuration at `path`.
    /// `.yaml`/`.yml` files go through serde_yaml, everything else is parsed as JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;

        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );

        let config = if is_yaml {
            Self::from_yaml(&content)?
        } else {
            Self::from_json(&content)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.homeserver.trim().is_empty() {
            return Err(ConfigError::Invalid("homeserver must not be empty".to_string()));
        }
        if !self.user_id.starts_with('@') || !self.user_id.contains(':') {
            return Err(ConfigError::Invalid(format!(
                "user_id `{}` is not a full Matrix ID",
                self.user_id
            )));
        }
        if self.command_prefix.trim().is_empty() {
            return Err(ConfigError::Invalid("command_prefix must not be empty".to_string()));
        }
        if self.handler_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "handler_timeout_secs must be positive".to_string(),
            ));
        }
        if let Some(hc) = &self.health_check {
            if hc.interval_secs == 0 {
                return Err(ConfigError::Invalid(
                    "health_check.interval_secs must be positive".to_string(),
                ));
            }
        }
        BannedSenders::new(&self.banned_senders)?;
        Ok(())
    }

    /// Password from the config file, falling back to the `BOT_PASSWORD` environment variable.
    pub fn resolve_password(&self) -> Option<String> {
        self.password
            .clone()
            .or_else(|| std::env::var("BOT_PASSWORD").ok())
            .filter(|p| !p.is_empty())
    }
}

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::Config;

/// Environment variable overriding `[api].base_url`.
pub const API_URL_ENV: &str = "CAMPUS_CONNECT_API_URL";

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl Config {
    /// Returns the path to the configuration file.
    ///
    /// Uses `~/.config/campus-connect/config.toml` on Unix/macOS,
    /// or equivalent on other platforms via `dirs::config_dir()`.
    /// Falls back to current directory if config_dir is unavailable.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("campus-connect").join("config.toml")
    }

    /// Loads configuration from the default config file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Loads configuration from `path`.
    ///
    /// - If the file doesn't exist, starts from `Config::default()`.
    /// - If the file exists, parses it as TOML.
    /// - Applies the `CAMPUS_CONNECT_API_URL` override, then validates.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
                path: path.to_path_buf(),
                source: e,
            })?;

            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                source: e,
            })?
        } else {
            Config::default()
        };

        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                config.api.base_url = url.trim().to_string();
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - API and storage URLs are non-empty
    /// - Every poll interval and the debounce window are non-zero
    /// - The chat near-limit warning sits below the hard bound
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(validation("api.base_url must not be empty"));
        }
        if self.storage.base_url.trim().is_empty() {
            return Err(validation("storage.base_url must not be empty"));
        }

        let intervals = [
            ("polling.chat_messages_ms", self.polling.chat_messages_ms),
            ("polling.unread_count_ms", self.polling.unread_count_ms),
            ("polling.following_ms", self.polling.following_ms),
            ("search.debounce_ms", self.search.debounce_ms),
        ];
        if let Some((name, _)) = intervals.iter().find(|(_, value)| *value == 0) {
            return Err(validation(&format!("{} must be greater than zero", name)));
        }

        if self.chat.max_message_chars == 0 {
            return Err(validation("chat.max_message_chars must be greater than zero"));
        }
        if self.chat.near_limit_chars >= self.chat.max_message_chars {
            return Err(validation(&format!(
                "chat.near_limit_chars ({}) must be below chat.max_message_chars ({})",
                self.chat.near_limit_chars, self.chat.max_message_chars
            )));
        }

        Ok(())
    }
}

fn validation(message: &str) -> ConfigError {
    ConfigError::ValidationError {
        message: message.to_string(),
    }
}

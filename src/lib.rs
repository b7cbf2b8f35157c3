use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

pub mod email;
pub mod startup_checks;

use email::NotificationsConfig;

pub const API_KEY_ENV: &str = "SENDGRID_API_KEY";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub name: String,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "sendgrid-notify".to_string(),
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml_edit::de::Error),
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml_edit::de::from_str::<Config>(content)?)
    }

    /// Loads the file if it exists, otherwise falls back to defaults. The
    /// environment API key is applied in both cases.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)?
        } else {
            info!("Config file not found at {:?}, using defaults", path);
            Config::default()
        };

        if let Ok(api_key) = std::env::var(API_KEY_ENV) {
            config.apply_api_key(api_key);
        }

        Ok(config)
    }

    /// Fills in the SendGrid API key unless the file already set one.
    pub fn apply_api_key(&mut self, api_key: String) {
        let sendgrid = self.notifications.sendgrid.get_or_insert_with(Default::default);
        if sendgrid.api_key().is_none() {
            sendgrid.api_key = Some(api_key);
        }
    }
}

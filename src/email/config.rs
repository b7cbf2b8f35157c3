use serde::{Deserialize, Serialize};

use crate::email::has_text;

pub const SENDGRID_PROVIDER: &str = "sendgrid";
pub const NULL_PROVIDER: &str = "null";
pub const DEFAULT_SENDGRID_BASE_URL: &str = "https://api.sendgrid.com/v3/";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NotificationsConfig {
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub sendgrid: Option<SendGridConfig>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EmailConfig {
    /// Name of the provider that should handle email, e.g. `sendgrid`.
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub from_address: Option<String>,
    #[serde(default)]
    pub from_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SendGridConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_sendgrid_base_url")]
    pub base_url: String,
}

fn default_sendgrid_base_url() -> String {
    DEFAULT_SENDGRID_BASE_URL.to_string()
}

impl Default for SendGridConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_sendgrid_base_url(),
        }
    }
}

impl EmailConfig {
    /// Provider names compare case-insensitively.
    pub fn is_provider_selected(&self, name: &str) -> bool {
        self.provider
            .as_deref()
            .is_some_and(|provider| provider.trim().eq_ignore_ascii_case(name))
    }

    pub fn format_from(&self) -> Option<String> {
        let address = self.from_address.as_deref().filter(|a| has_text(a))?;
        match self.from_name.as_deref().filter(|n| has_text(n)) {
            Some(name) => Some(format!("{} <{}>", name, address)),
            None => Some(address.to_string()),
        }
    }
}

impl SendGridConfig {
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| has_text(key))
    }
}

impl NotificationsConfig {
    pub fn sendgrid_api_key(&self) -> Option<&str> {
        self.sendgrid.as_ref().and_then(SendGridConfig::api_key)
    }
}

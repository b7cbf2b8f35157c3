use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use crate::email::config::{
    DEFAULT_SENDGRID_BASE_URL, NULL_PROVIDER, NotificationsConfig, SENDGRID_PROVIDER,
};
use crate::email::providers::{
    null::NullProvider,
    sendgrid::{SendGridClient, SendGridProvider},
};
use crate::email::{DynEmailProvider, EmailError};

/// Providers keyed by name, plus the one that handles email.
///
/// Registration is first-registered-wins; [`ProviderRegistry::override_provider`]
/// is the only way to replace an entry.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, DynEmailProvider>,
    primary: Option<String>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false and keeps the existing entry if `name` is taken.
    pub fn register(&mut self, name: impl Into<String>, provider: DynEmailProvider) -> bool {
        let name = name.into();
        if self.providers.contains_key(&name) {
            return false;
        }
        if self.primary.is_none() {
            self.primary = Some(name.clone());
        }
        self.providers.insert(name, provider);
        true
    }

    pub fn override_provider(&mut self, name: impl Into<String>, provider: DynEmailProvider) {
        let name = name.into();
        self.providers.insert(name.clone(), provider);
        self.primary = Some(name);
    }

    pub fn get(&self, name: &str) -> Option<DynEmailProvider> {
        self.providers.get(name).cloned()
    }

    pub fn email_provider(&self) -> Option<DynEmailProvider> {
        self.primary.as_deref().and_then(|name| self.get(name))
    }

    pub fn primary_name(&self) -> Option<&str> {
        self.primary.as_deref()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

/// Wires up the providers selected by configuration.
///
/// The SendGrid client is only built when SendGrid is selected and an API key
/// is configured, and the adapter is only registered when no email provider
/// is present yet.
pub fn register_providers(
    config: &NotificationsConfig,
    registry: &mut ProviderRegistry,
) -> Result<(), EmailError> {
    if config.email.is_provider_selected(SENDGRID_PROVIDER) {
        match config.sendgrid_api_key() {
            Some(api_key) => {
                info!("Initializing SendGrid email provider");
                let base_url = config
                    .sendgrid
                    .as_ref()
                    .map(|sendgrid| sendgrid.base_url.as_str())
                    .unwrap_or(DEFAULT_SENDGRID_BASE_URL);
                let client = SendGridClient::with_base_url(api_key, base_url)?;
                register_if_missing(
                    registry,
                    SENDGRID_PROVIDER,
                    Arc::new(SendGridProvider::new(Arc::new(client))),
                );
            }
            None => warn!("SendGrid email provider selected but no API key is configured"),
        }
    } else if config.email.is_provider_selected(NULL_PROVIDER) {
        register_if_missing(registry, NULL_PROVIDER, Arc::new(NullProvider::new()));
    } else if let Some(provider) = &config.email.provider
        && registry.get(provider.trim()).is_none()
    {
        return Err(EmailError::UnknownProvider(provider.clone()));
    }

    Ok(())
}

pub fn create_registry(config: &NotificationsConfig) -> Result<ProviderRegistry, EmailError> {
    let mut registry = ProviderRegistry::new();
    register_providers(config, &mut registry)?;
    Ok(registry)
}

fn register_if_missing(registry: &mut ProviderRegistry, name: &str, provider: DynEmailProvider) {
    if let Some(existing) = registry.email_provider() {
        info!(
            "Email provider '{}' already registered, not registering {}",
            existing.name(),
            provider.name()
        );
        return;
    }
    registry.register(name, provider);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::email::config::{EmailConfig, SendGridConfig};

    fn config(provider: Option<&str>, api_key: Option<&str>) -> NotificationsConfig {
        NotificationsConfig {
            email: EmailConfig {
                provider: provider.map(str::to_string),
                ..Default::default()
            },
            sendgrid: Some(SendGridConfig {
                api_key: api_key.map(str::to_string),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn test_first_registered_wins() {
        let mut registry = ProviderRegistry::new();
        assert!(registry.register("null", Arc::new(NullProvider::new())));
        assert!(!registry.register("null", Arc::new(NullProvider::new())));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.primary_name(), Some("null"));
    }

    #[test]
    fn test_override_replaces_primary() {
        let mut registry = ProviderRegistry::new();
        registry.register("null", Arc::new(NullProvider::new()));
        let client = SendGridClient::new("SG.key").unwrap();
        registry.override_provider("sendgrid", Arc::new(SendGridProvider::new(Arc::new(client))));

        assert_eq!(registry.primary_name(), Some("sendgrid"));
        assert_eq!(registry.email_provider().unwrap().name(), "SendGrid");
        assert_eq!(registry.names(), vec!["null", "sendgrid"]);
    }

    #[test]
    fn test_sendgrid_registered_when_selected_with_key() {
        let registry = create_registry(&config(Some("sendgrid"), Some("SG.key"))).unwrap();

        assert_eq!(registry.primary_name(), Some("sendgrid"));
        assert_eq!(registry.get("sendgrid").unwrap().name(), "SendGrid");
    }

    #[test]
    fn test_sendgrid_skipped_without_key() {
        let registry = create_registry(&config(Some("sendgrid"), None)).unwrap();
        assert!(registry.is_empty());

        let registry = create_registry(&config(Some("sendgrid"), Some("  "))).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_sendgrid_skipped_when_not_selected() {
        let registry = create_registry(&config(None, Some("SG.key"))).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_existing_email_provider_is_kept() {
        let mut registry = ProviderRegistry::new();
        registry.register("custom", Arc::new(NullProvider::new()));

        register_providers(&config(Some("sendgrid"), Some("SG.key")), &mut registry).unwrap();

        assert_eq!(registry.primary_name(), Some("custom"));
        assert!(registry.get("sendgrid").is_none());
    }

    #[test]
    fn test_null_provider_selected() {
        let registry = create_registry(&config(Some("NULL"), None)).unwrap();
        assert_eq!(registry.primary_name(), Some("null"));
    }

    #[test]
    fn test_unknown_provider_is_an_error() {
        let result = create_registry(&config(Some("mailgun"), None));
        assert!(matches!(result, Err(EmailError::UnknownProvider(name)) if name == "mailgun"));
    }

    #[test]
    fn test_custom_provider_registered_beforehand() {
        let mut registry = ProviderRegistry::new();
        registry.register("custom", Arc::new(NullProvider::new()));

        register_providers(&config(Some("custom"), None), &mut registry).unwrap();

        assert_eq!(registry.primary_name(), Some("custom"));
    }

    #[test]
    fn test_invalid_base_url_is_an_error() {
        let mut config = config(Some("sendgrid"), Some("SG.key"));
        if let Some(sendgrid) = config.sendgrid.as_mut() {
            sendgrid.base_url = "::not a url::".to_string();
        }
        assert!(matches!(create_registry(&config), Err(EmailError::SendGrid(_))));
    }
}

use crate::Config;
use crate::email::{
    NULL_PROVIDER, ProviderRegistry, SENDGRID_PROVIDER, providers::sendgrid::parse_base_url,
};
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StartupCheckError {
    #[error("No email provider selected")]
    NoProviderSelected,

    #[error("Unknown email provider: {0}")]
    UnknownProvider(String),

    #[error("SendGrid is selected but no API key is configured")]
    MissingApiKey,

    #[error("Invalid SendGrid base URL: {0}")]
    InvalidBaseUrl(String),
}

impl StartupCheckError {
    /// Critical errors mean no email can be sent at all.
    pub fn is_critical(&self) -> bool {
        !matches!(self, StartupCheckError::NoProviderSelected)
    }
}

/// Validates the email configuration against the providers in `registry`.
///
/// A provider name that is neither built in nor present in `registry` is
/// unknown, matching what [`crate::email::register_providers`] accepts.
pub fn perform_startup_checks(
    config: &Config,
    registry: &ProviderRegistry,
) -> Result<(), Vec<StartupCheckError>> {
    let mut errors = Vec::new();
    let email = &config.notifications.email;

    info!("Performing startup checks...");

    match email.provider.as_deref().map(str::trim) {
        None | Some("") => {
            warn!("No email provider selected, emails will not be sent");
            errors.push(StartupCheckError::NoProviderSelected);
        }
        Some(_) if email.is_provider_selected(SENDGRID_PROVIDER) => {
            if config.notifications.sendgrid_api_key().is_none() {
                error!("SendGrid selected but no API key is configured");
                errors.push(StartupCheckError::MissingApiKey);
            } else {
                info!("SendGrid API key is configured");
            }

            if let Some(sendgrid) = &config.notifications.sendgrid {
                match parse_base_url(&sendgrid.base_url) {
                    Ok(url) => info!("SendGrid base URL: {}", url),
                    Err(e) => {
                        error!("Invalid SendGrid base URL {:?}: {}", sendgrid.base_url, e);
                        errors.push(StartupCheckError::InvalidBaseUrl(sendgrid.base_url.clone()));
                    }
                }
            }
        }
        Some(_) if email.is_provider_selected(NULL_PROVIDER) => {
            warn!("Null email provider selected, emails will only be logged");
        }
        Some(other) if registry.get(other).is_some() => {
            info!("Email provider '{}' is registered externally", other);
        }
        Some(other) => {
            error!("Unknown email provider: {}", other);
            errors.push(StartupCheckError::UnknownProvider(other.to_string()));
        }
    }

    match email.format_from() {
        Some(from) => info!("Default from address: {}", from),
        None => warn!("No default from address configured"),
    }

    if errors.is_empty() {
        info!("All startup checks passed");
        Ok(())
    } else {
        error!("Startup checks failed with {} errors", errors.len());
        Err(errors)
    }
}

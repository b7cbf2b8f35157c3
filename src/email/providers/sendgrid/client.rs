use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::{Client, Method, header::CONTENT_TYPE};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::email::config::DEFAULT_SENDGRID_BASE_URL;

pub const MAIL_SEND_ENDPOINT: &str = "mail/send";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum SendGridError {
    /// Displays only the innermost cause, e.g. "Connection refused".
    #[error("{message}")]
    Transport {
        message: String,
        #[source]
        source: BoxError,
    },

    #[error("Invalid SendGrid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Failed to serialize request: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SendGridError {
    pub fn transport(source: impl Into<BoxError>) -> Self {
        let source = source.into();
        Self::Transport {
            message: root_cause(source.as_ref()),
            source,
        }
    }
}

impl From<reqwest::Error> for SendGridError {
    fn from(error: reqwest::Error) -> Self {
        Self::transport(error)
    }
}

impl From<std::io::Error> for SendGridError {
    fn from(error: std::io::Error) -> Self {
        Self::transport(error)
    }
}

fn root_cause(error: &(dyn std::error::Error + 'static)) -> String {
    let mut current = error;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API base URL, e.g. `mail/send`.
    pub endpoint: String,
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiResponse {
    pub status_code: u16,
    pub body: String,
    pub headers: HashMap<String, String>,
}

/// Transport to the SendGrid REST API.
#[async_trait]
pub trait SendGridApi: Send + Sync {
    async fn api(&self, request: ApiRequest) -> Result<ApiResponse, SendGridError>;
}

/// reqwest-backed client authenticated with a bearer API key.
///
/// Shared read-only between concurrent sends.
pub struct SendGridClient {
    http: Client,
    api_key: String,
    base_url: Url,
}

impl SendGridClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, SendGridError> {
        Self::with_base_url(api_key, DEFAULT_SENDGRID_BASE_URL)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: &str) -> Result<Self, SendGridError> {
        Ok(Self {
            http: Client::builder().build()?,
            api_key: api_key.into(),
            base_url: parse_base_url(base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

/// Endpoints are joined relative to the base, so it must end with a slash.
pub fn parse_base_url(base_url: &str) -> Result<Url, url::ParseError> {
    if base_url.ends_with('/') {
        Url::parse(base_url)
    } else {
        Url::parse(&format!("{}/", base_url))
    }
}

#[async_trait]
impl SendGridApi for SendGridClient {
    async fn api(&self, request: ApiRequest) -> Result<ApiResponse, SendGridError> {
        let url = self.base_url.join(request.endpoint.trim_start_matches('/'))?;
        debug!("SendGrid {} {}", request.method, url);

        let response = self
            .http
            .request(request.method, url)
            .bearer_auth(&self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .body(request.body)
            .send()
            .await?;

        let status_code = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.text().await?;

        Ok(ApiResponse {
            status_code,
            body,
            headers,
        })
    }
}

pub mod client;
pub mod payload;

pub use client::*;
pub use payload::Mail;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use tracing::{debug, error};

use crate::email::{EmailProvider, EmailRequest, EmailResponse};

const MESSAGE_ID_HEADERS: [&str; 2] = ["X-Message-Id", "X-Message-ID"];

pub struct SendGridProvider<C = SendGridClient> {
    client: Arc<C>,
}

impl<C: SendGridApi + 'static> SendGridProvider<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }
}

/// Builds the payload, performs one `POST mail/send` and maps the outcome.
/// Never retries.
pub async fn deliver<C: SendGridApi + ?Sized>(client: &C, request: &EmailRequest) -> EmailResponse {
    let body = match Mail::from_request(request).to_json() {
        Ok(body) => body,
        Err(e) => {
            let e = SendGridError::from(e);
            error!("Failed to build SendGrid payload: {}", e);
            return EmailResponse::error(e.to_string());
        }
    };

    let api_request = ApiRequest {
        method: Method::POST,
        endpoint: MAIL_SEND_ENDPOINT.to_string(),
        body,
    };

    match client.api(api_request).await {
        Ok(response) if (200..300).contains(&response.status_code) => {
            let message_id = message_id_from_headers(&response.headers);
            debug!(
                "Email sent successfully via SendGrid. Message ID: {:?}",
                message_id
            );
            EmailResponse::success(message_id)
        }
        Ok(response) => {
            error!(
                "SendGrid rejected email with status {}: {}",
                response.status_code, response.body
            );
            EmailResponse::error(format!("SendGrid error: {}", response.body))
        }
        Err(e) => {
            error!("Failed to send email via SendGrid: {}", e);
            EmailResponse::error(e.to_string())
        }
    }
}

pub fn message_id_from_headers(headers: &HashMap<String, String>) -> Option<String> {
    MESSAGE_ID_HEADERS
        .iter()
        .find_map(|name| headers.get(*name))
        .or_else(|| {
            headers
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(MESSAGE_ID_HEADERS[0]))
                .map(|(_, value)| value)
        })
        .cloned()
}

#[async_trait]
impl<C: SendGridApi + 'static> EmailProvider for SendGridProvider<C> {
    async fn send_email(&self, request: EmailRequest) -> EmailResponse {
        debug!("Sending email via SendGrid to: {}", request.to);

        let client = Arc::clone(&self.client);
        let task = tokio::spawn(async move { deliver(client.as_ref(), &request).await });

        match task.await {
            Ok(response) => response,
            Err(e) => {
                error!("SendGrid send task did not complete: {}", e);
                EmailResponse::error(format!("SendGrid send task failed: {}", e))
            }
        }
    }

    fn name(&self) -> &str {
        "SendGrid"
    }
}

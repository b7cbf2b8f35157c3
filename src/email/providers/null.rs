use crate::email::{EmailProvider, EmailRequest, EmailResponse, has_text};
use async_trait::async_trait;
use tracing::info;

pub struct NullProvider;

impl NullProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NullProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn body_of(request: &EmailRequest) -> &str {
    request
        .html
        .as_deref()
        .filter(|html| has_text(html))
        .or(request.text.as_deref())
        .unwrap_or_default()
}

#[async_trait]
impl EmailProvider for NullProvider {
    async fn send_email(&self, request: EmailRequest) -> EmailResponse {
        let body = body_of(&request);
        let body_preview = body.chars().take(200).collect::<String>();
        let attachments = request
            .attachments
            .iter()
            .filter(|attachment| !attachment.is_empty())
            .map(|attachment| attachment.filename.as_str())
            .collect::<Vec<_>>();

        // Log the email that would have been sent
        info!(
            "NULL EMAIL PROVIDER - Would send email:\n\
             From: {}\n\
             To: {}\n\
             Cc: {}\n\
             Subject: {}\n\
             Attachments: {}\n\
             Body (first 200 chars): {}{}",
            request.from,
            request.to,
            request.cc.join(", "),
            request.subject,
            attachments.join(", "),
            body_preview,
            if body.chars().count() > 200 { "..." } else { "" }
        );

        tracing::debug!(
            "NULL EMAIL PROVIDER - Full email message:\n\
             From: {}\n\
             To: {}\n\
             Cc: {:?}\n\
             Bcc: {:?}\n\
             Subject: {}\n\
             Body:\n{}",
            request.from,
            request.to,
            request.cc,
            request.bcc,
            request.subject,
            body
        );

        EmailResponse::success(None)
    }

    fn name(&self) -> &str {
        "Null Email Provider (Logging Only)"
    }
}

use serde::{Deserialize, Serialize};

/// Provider-agnostic outgoing email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailRequest {
    pub from: String,
    pub to: String,
    pub subject: String,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub cc: Vec<String>,
    #[serde(default)]
    pub bcc: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<EmailAttachment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAttachment {
    pub content: Vec<u8>,
    pub content_type: String,
    pub filename: String,
}

/// Outcome of a single send. There is no pending or queued state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum EmailResponse {
    Success { message_id: Option<String> },
    Error { message: String },
}

impl EmailRequest {
    pub fn new(from: impl Into<String>, to: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            subject: subject.into(),
            html: None,
            text: None,
            cc: Vec::new(),
            bcc: Vec::new(),
            attachments: Vec::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    pub fn with_cc(mut self, cc: impl Into<String>) -> Self {
        self.cc.push(cc.into());
        self
    }

    pub fn with_bcc(mut self, bcc: impl Into<String>) -> Self {
        self.bcc.push(bcc.into());
        self
    }

    pub fn with_attachment(mut self, attachment: EmailAttachment) -> Self {
        self.attachments.push(attachment);
        self
    }
}

impl EmailAttachment {
    pub fn new(
        content: impl Into<Vec<u8>>,
        content_type: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            content_type: content_type.into(),
            filename: filename.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

impl EmailResponse {
    pub fn success(message_id: Option<String>) -> Self {
        EmailResponse::Success { message_id }
    }

    pub fn error(message: impl Into<String>) -> Self {
        EmailResponse::Error {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, EmailResponse::Success { .. })
    }

    pub fn message_id(&self) -> Option<&str> {
        match self {
            EmailResponse::Success { message_id } => message_id.as_deref(),
            EmailResponse::Error { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            EmailResponse::Success { .. } => None,
            EmailResponse::Error { message } => Some(message),
        }
    }
}

/// True when the value contains at least one non-whitespace character.
pub fn has_text(value: &str) -> bool {
    !value.trim().is_empty()
}

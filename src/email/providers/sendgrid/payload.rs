//! SendGrid v3 `mail/send` request body.
//!
//! The whole payload is assembled in a single pass from an [`EmailRequest`]
//! and never mutated afterwards.

use base64::{Engine, engine::general_purpose};
use serde::Serialize;

use crate::email::{EmailAttachment, EmailRequest, has_text};

pub const TEXT_HTML: &str = "text/html";
pub const TEXT_PLAIN: &str = "text/plain";
pub const DISPOSITION_ATTACHMENT: &str = "attachment";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mail {
    pub from: Address,
    pub subject: String,
    pub personalizations: Vec<Personalization>,
    pub content: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

/// One envelope of recipients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Personalization {
    pub to: Vec<Address>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cc: Vec<Address>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bcc: Vec<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Address {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Content {
    #[serde(rename = "type")]
    pub content_type: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    /// Base64 of the raw attachment bytes.
    pub content: String,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub content_type: String,
    pub filename: String,
    pub disposition: String,
}

impl Mail {
    pub fn from_request(request: &EmailRequest) -> Self {
        Self {
            from: Address::new(&request.from),
            subject: request.subject.clone(),
            personalizations: vec![Personalization {
                to: vec![Address::new(&request.to)],
                cc: addresses(&request.cc),
                bcc: addresses(&request.bcc),
            }],
            content: vec![Content::for_request(request)],
            attachments: request
                .attachments
                .iter()
                .filter(|attachment| !attachment.is_empty())
                .map(Attachment::encode)
                .collect(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Address {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }
}

impl Content {
    /// HTML wins whenever it has text; otherwise plain text, possibly empty.
    fn for_request(request: &EmailRequest) -> Self {
        match request.html.as_deref().filter(|html| has_text(html)) {
            Some(html) => Self {
                content_type: TEXT_HTML.to_string(),
                value: html.to_string(),
            },
            None => Self {
                content_type: TEXT_PLAIN.to_string(),
                value: request
                    .text
                    .as_deref()
                    .filter(|text| has_text(text))
                    .unwrap_or_default()
                    .to_string(),
            },
        }
    }
}

impl Attachment {
    fn encode(attachment: &EmailAttachment) -> Self {
        Self {
            content: general_purpose::STANDARD.encode(&attachment.content),
            content_type: attachment.content_type.clone(),
            filename: attachment.filename.clone(),
            disposition: DISPOSITION_ATTACHMENT.to_string(),
        }
    }
}

fn addresses(list: &[String]) -> Vec<Address> {
    list.iter()
        .filter(|address| has_text(address))
        .map(|address| Address::new(address.as_str()))
        .collect()
}

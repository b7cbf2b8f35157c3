use thiserror::Error;

use crate::email::providers::sendgrid::SendGridError;

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("Unknown email provider: {0}")]
    UnknownProvider(String),

    #[error("SendGrid client error: {0}")]
    SendGrid(#[from] SendGridError),
}

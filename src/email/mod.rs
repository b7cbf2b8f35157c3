pub mod config;
pub mod error;
pub mod providers;
pub mod registry;
pub mod types;

pub use config::*;
pub use error::*;
pub use registry::*;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Sends one email and reports the outcome.
///
/// Implementations never fail across the async boundary: every failure is
/// returned as [`EmailResponse::Error`].
#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send_email(&self, request: EmailRequest) -> EmailResponse;
    fn name(&self) -> &str;
}

pub type DynEmailProvider = Arc<dyn EmailProvider>;

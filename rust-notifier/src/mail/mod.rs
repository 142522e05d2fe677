//! Outbound mail delivery.
//!
//! Handlers only see the [`MailSender`] trait; production wiring uses
//! [`SesMailer`], which talks to the SES v2 REST API directly.

pub mod credentials;
pub mod ses;
pub mod sigv4;

use async_trait::async_trait;
use thiserror::Error;

use crate::format::EmailContent;

pub use ses::SesMailer;

/// Failure to hand an email over to the mail provider.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("AWS credentials are not configured")]
    MissingCredentials,

    #[error("could not resolve AWS credentials: {0}")]
    Credentials(String),

    #[error("invalid SES endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("request signing failed: {0}")]
    Signing(String),

    #[error("failed to encode SES request: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("SES request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("SES rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("unexpected SES response: {0}")]
    InvalidResponse(String),
}

/// Something that can deliver a rendered alert email.
#[async_trait]
pub trait MailSender: Send + Sync {
    /// Send `email` and return the provider's message id.
    async fn send(&self, email: &EmailContent) -> Result<String, DeliveryError>;
}

//! AWS SES v2 `SendEmail` client.
//!
//! Sends a single simple (subject + text + HTML) message per call and returns
//! the SES message id. No retries: a failure goes straight back to the caller.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use chrono::Utc;
use reqwest::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    Client,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};
use url::Url;

use super::credentials;
use super::sigv4::{self, SigningRequest};
use super::{DeliveryError, MailSender};
use crate::config::Config;
use crate::format::EmailContent;

const SEND_EMAIL_PATH: &str = "/v2/email/outbound-emails";
const SERVICE: &str = "ses";
const CHARSET: &str = "UTF-8";
const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from_email_address: &'a str,
    destination: Destination<'a>,
    content: Content<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Destination<'a> {
    to_addresses: [&'a str; 1],
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Content<'a> {
    simple: SimpleMessage<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SimpleMessage<'a> {
    subject: TextPart<'a>,
    body: Body<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Body<'a> {
    text: TextPart<'a>,
    html: TextPart<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct TextPart<'a> {
    data: &'a str,
    charset: &'static str,
}

impl<'a> TextPart<'a> {
    fn utf8(data: &'a str) -> Self {
        Self {
            data,
            charset: CHARSET,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailResponse {
    message_id: String,
}

/// SES-backed [`MailSender`].
#[derive(Clone)]
pub struct SesMailer {
    client: Client,
    endpoint: String,
    region: String,
    sender: String,
    recipient: String,
    credentials: Option<SharedCredentialsProvider>,
}

impl SesMailer {
    /// Build a mailer from the application configuration.
    ///
    /// Only explicitly configured keys are picked up here; call
    /// [`SesMailer::with_credentials_provider`] to sign with another source.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint: config.ses_base_url(),
            region: config.aws_region.clone(),
            sender: config.email_sender.clone(),
            recipient: config.email_recipient.clone(),
            credentials: config.aws_credentials.as_ref().map(credentials::static_provider),
        })
    }

    /// Sign requests with credentials from `provider`.
    pub fn with_credentials_provider(mut self, provider: impl ProvideCredentials + 'static) -> Self {
        self.credentials = Some(SharedCredentialsProvider::new(provider));
        self
    }

    /// Whether some credential source is attached.
    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    fn request_body(&self, email: &EmailContent) -> Result<Vec<u8>, DeliveryError> {
        let request = SendEmailRequest {
            from_email_address: &self.sender,
            destination: Destination {
                to_addresses: [&self.recipient],
            },
            content: Content {
                simple: SimpleMessage {
                    subject: TextPart::utf8(&email.subject),
                    body: Body {
                        text: TextPart::utf8(&email.text),
                        html: TextPart::utf8(&email.html),
                    },
                },
            },
        };
        Ok(serde_json::to_vec(&request)?)
    }
}

#[async_trait]
impl MailSender for SesMailer {
    async fn send(&self, email: &EmailContent) -> Result<String, DeliveryError> {
        let provider = self
            .credentials
            .as_ref()
            .ok_or(DeliveryError::MissingCredentials)?;
        let credentials = credentials::resolve(provider).await?;

        let url = Url::parse(&format!("{}{}", self.endpoint, SEND_EMAIL_PATH))
            .map_err(|e| DeliveryError::InvalidEndpoint(e.to_string()))?;
        let body = self.request_body(email)?;

        let signed = sigv4::sign(
            &credentials,
            &self.region,
            SERVICE,
            &SigningRequest {
                method: "POST",
                url: &url,
                content_type: JSON_CONTENT_TYPE,
                payload: &body,
            },
            Utc::now(),
        )
        .map_err(DeliveryError::Signing)?;

        let mut request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .header("x-amz-date", &signed.amz_date)
            .header(AUTHORIZATION, &signed.authorization);
        if let Some(token) = &signed.security_token {
            request = request.header("x-amz-security-token", token);
        }

        let response = request.body(body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = error_message(&text);
            error!(
                status = status.as_u16(),
                message = %message,
                subject = %email.subject,
                "ses_send_rejected"
            );
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: SendEmailResponse = serde_json::from_str(&text)
            .map_err(|e| DeliveryError::InvalidResponse(e.to_string()))?;

        info!(
            message_id = %parsed.message_id,
            recipient = %self.recipient,
            "ses_email_sent"
        );

        Ok(parsed.message_id)
    }
}

/// Pull the human-readable message out of an SES error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("Message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

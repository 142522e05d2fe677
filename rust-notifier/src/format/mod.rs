//! Webhook formatting module.
//!
//! Turns a Freqtrade webhook body into the subject, plain-text body and HTML
//! body of an alert email.
//!
//! ## Formatting Flow
//!
//! ```text
//! JSON body → validate → details_for(type) → render_text / render_html → EmailContent
//! ```

pub mod fields;
pub mod message;
pub mod render;

use chrono::{DateTime, TimeZone};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

pub use message::StrategyMessage;
pub use render::{details_for, escape_html, Detail, Tone};

/// Prefix of every alert subject.
pub const SUBJECT_PREFIX: &str = "Freqtrade Alert - ";

/// Timestamp layout used in email headers.
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A fully rendered alert email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailContent {
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Reasons a webhook body cannot be formatted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("Invalid webhook data format")]
    NotAnObject,

    #[error("Missing 'type' field in webhook data")]
    MissingType,

    #[error("Invalid 'type' field in webhook data: expected a string")]
    InvalidType,
}

/// Extract the webhook type, validating the body shape on the way.
pub fn event_type(event: &Value) -> Result<&str, FormatError> {
    let map = event.as_object().ok_or(FormatError::NotAnObject)?;

    match map.get("type") {
        None | Some(Value::Null) => Err(FormatError::MissingType),
        Some(Value::String(kind)) if kind.is_empty() => Err(FormatError::MissingType),
        Some(Value::String(kind)) => Ok(kind),
        Some(_) => Err(FormatError::InvalidType),
    }
}

/// Format a webhook event as of the instant `at`.
///
/// Output depends only on `event` and `at`.
pub fn format_event<Tz>(event: &Value, at: &DateTime<Tz>) -> Result<EmailContent, FormatError>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let kind = event_type(event)?;
    let map = event.as_object().ok_or(FormatError::NotAnObject)?;

    let timestamp = at.format(TIME_FORMAT).to_string();
    let details = details_for(kind, map);
    let dump = serde_json::to_string_pretty(event).unwrap_or_else(|_| event.to_string());

    debug!(event_type = %kind, detail_count = details.len(), "webhook_formatted");

    Ok(EmailContent {
        subject: format!("{SUBJECT_PREFIX}{kind}"),
        text: render::render_text(&timestamp, kind, &details, &dump),
        html: render::render_html(&timestamp, kind, &details, &dump),
    })
}

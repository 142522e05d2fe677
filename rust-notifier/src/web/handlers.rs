//! Webhook endpoint handlers.
//!
//! Every delivering handler does the same four things:
//! 1. Authenticate (query token or path key)
//! 2. Parse and validate the JSON body
//! 3. Format the alert email
//! 4. Hand it to the mail sender and report the message id
//!
//! The log-only handlers stop after step 2 and just log the payload.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    Json,
};
use chrono::{Local, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

use crate::format::{self, FormatError};
use crate::mail::MailSender;
use crate::web::auth::{authorize_path, authorize_query};
use crate::web::error::AppError;
use crate::Config;

/// Service name reported by the index route.
pub const SERVICE_NAME: &str = "Freqtrade Webhook Email Notifier";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub mailer: Arc<dyn MailSender>,
}

impl AppState {
    pub fn new(config: Config, mailer: Arc<dyn MailSender>) -> Self {
        Self {
            config: Arc::new(config),
            mailer,
        }
    }
}

// =============================================================================
// Index
// =============================================================================

/// Index / health check response.
#[derive(Serialize)]
pub struct ServiceInfo {
    pub status: &'static str,
    pub service: &'static str,
}

/// Index route, doubles as a health check.
pub async fn index() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        status: "online",
        service: SERVICE_NAME,
    })
}

// =============================================================================
// Delivering Webhooks
// =============================================================================

/// Query string of the token-authenticated routes.
#[derive(Debug, Default, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

/// Successful delivery response.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub status: &'static str,
    pub message: &'static str,
    #[serde(rename = "messageId")]
    pub message_id: String,
}

/// `POST /webhook?token=<secret>`
pub async fn webhook(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
    body: Bytes,
) -> Result<Json<WebhookResponse>, AppError> {
    authorize_query(state.config.secret(), query.token.as_deref())?;
    let event = parse_body(&body)?;
    deliver(&state, &event).await
}

/// `POST /webhook/{path_key}`
pub async fn webhook_path(
    State(state): State<AppState>,
    Path(path_key): Path<String>,
    body: Bytes,
) -> Result<Json<WebhookResponse>, AppError> {
    authorize_path(state.config.secret(), &path_key)?;
    let event = parse_body(&body)?;
    deliver(&state, &event).await
}

async fn deliver(state: &AppState, event: &Value) -> Result<Json<WebhookResponse>, AppError> {
    let event_type = format::event_type(event)?;
    info!(event_type = %event_type, payload = %event, "webhook_received");

    let email = format::format_event(event, &Local::now())?;

    let message_id = state.mailer.send(&email).await.map_err(|e| {
        error!(error = %e, error_debug = ?e, subject = %email.subject, "email_send_failed");
        AppError::from(e)
    })?;

    info!(message_id = %message_id, subject = %email.subject, "email_sent");

    Ok(Json(WebhookResponse {
        status: "success",
        message: "Webhook received and email sent",
        message_id,
    }))
}

// =============================================================================
// Log-only Webhooks
// =============================================================================

/// Log-only response.
#[derive(Debug, Serialize)]
pub struct LogOnlyResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: String,
}

/// `POST /webhook/log-only?token=<secret>`
pub async fn log_only(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
    body: Bytes,
) -> Result<Json<LogOnlyResponse>, AppError> {
    authorize_query(state.config.secret(), query.token.as_deref())?;
    record(&body)
}

/// `POST /webhook/log-only/{path_key}`
pub async fn log_only_path(
    State(state): State<AppState>,
    Path(path_key): Path<String>,
    body: Bytes,
) -> Result<Json<LogOnlyResponse>, AppError> {
    authorize_path(state.config.secret(), &path_key)?;
    record(&body)
}

fn record(body: &Bytes) -> Result<Json<LogOnlyResponse>, AppError> {
    let event = parse_body(body)?;
    if !event.is_object() {
        return Err(FormatError::NotAnObject.into());
    }

    let pretty = serde_json::to_string_pretty(&event).unwrap_or_else(|_| event.to_string());
    let event_type = event
        .get("type")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("unknown");
    info!(
        event_type = %event_type,
        payload = %pretty,
        "webhook_logged"
    );

    Ok(Json(LogOnlyResponse {
        status: "success",
        message: "Webhook received and logged (email sending skipped)",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}

/// Parse a request body as JSON.
fn parse_body(body: &Bytes) -> Result<Value, AppError> {
    serde_json::from_slice(body).map_err(|e| {
        info!(error = %e, body_length = body.len(), "webhook_body_invalid_json");
        AppError::BadRequest(format!("Invalid JSON body: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_body() {
        assert!(parse_body(&Bytes::from_static(br#"{"type":"entry"}"#)).is_ok());
        let err = parse_body(&Bytes::from_static(b"not json")).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(err.to_string().starts_with("Invalid JSON body"));
    }

    #[test]
    fn test_record_rejects_non_object() {
        let err = record(&Bytes::from_static(b"[1,2]")).unwrap_err();
        assert_eq!(err.to_string(), "Invalid webhook data format");
    }

    #[test]
    fn test_record_accepts_object_without_type() {
        let Json(response) = record(&Bytes::from_static(br#"{"anything": 1}"#)).unwrap();
        assert_eq!(response.status, "success");
        assert!(chrono::DateTime::parse_from_rfc3339(&response.timestamp).is_ok());
    }

    #[test]
    fn test_record_accepts_typed_event() {
        let body = Bytes::from_static(br#"{"type": "exit", "pair": "ETH/USDT"}"#);
        let Json(response) = record(&body).unwrap();
        assert_eq!(response.message, "Webhook received and logged (email sending skipped)");
    }

    #[test]
    fn test_webhook_response_shape() {
        let response = WebhookResponse {
            status: "success",
            message: "Webhook received and email sent",
            message_id: "abc".to_string(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["messageId"], "abc");
        assert!(json.get("message_id").is_none());
    }
}

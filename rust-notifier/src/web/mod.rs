//! Web server module for receiving Freqtrade webhooks.
//!
//! Routes:
//! - `GET /`: service status
//! - `POST /webhook?token=`: format and email an alert
//! - `POST /webhook/{key}`: same, with the secret in the path
//! - `POST /webhook/log-only[/{key}]`: log the payload, send nothing

pub mod auth;
pub mod error;
pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use auth::{authorize_path, authorize_query, LOG_ONLY_SEGMENT};
pub use error::{AppError, ErrorResponse};
pub use handlers::{
    index, log_only, log_only_path, webhook, webhook_path, AppState, LogOnlyResponse,
    ServiceInfo, TokenQuery, WebhookResponse, SERVICE_NAME,
};

/// Build the application router.
///
/// The static `/webhook/log-only` routes take precedence over `/webhook/:path_key`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/webhook", post(webhook))
        .route("/webhook/log-only", post(log_only))
        .route("/webhook/log-only/:path_key", post(log_only_path))
        .route("/webhook/:path_key", post(webhook_path))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

//! Shared-secret webhook authentication.
//!
//! Freqtrade cannot sign webhooks, so the secret travels either as a `token`
//! query parameter or as the last path segment of the webhook URL.

use tracing::warn;

use super::error::AppError;

/// Path segment reserved for the log-only endpoint.
pub const LOG_ONLY_SEGMENT: &str = "log-only";

/// Authenticate a request carrying `?token=`.
pub fn authorize_query(secret: Option<&str>, token: Option<&str>) -> Result<(), AppError> {
    let Some(secret) = secret else {
        return Ok(());
    };

    match token {
        Some(provided) if constant_time_compare(secret, provided) => Ok(()),
        Some(_) => {
            warn!("webhook_token_invalid");
            Err(AppError::Unauthorized("Invalid or missing API Key".to_string()))
        }
        None => {
            warn!("webhook_token_missing");
            Err(AppError::Unauthorized("Invalid or missing API Key".to_string()))
        }
    }
}

/// Authenticate a request carrying the secret as a path segment.
///
/// The reserved `log-only` segment is never accepted as a credential, even in
/// open mode or if someone configured it as the secret.
pub fn authorize_path(secret: Option<&str>, path_key: &str) -> Result<(), AppError> {
    if path_key == LOG_ONLY_SEGMENT {
        warn!("webhook_reserved_path_key");
        return Err(AppError::NotFound(
            "Use POST /webhook/log-only for log-only requests".to_string(),
        ));
    }

    let Some(secret) = secret else {
        return Ok(());
    };

    if constant_time_compare(secret, path_key) {
        Ok(())
    } else {
        warn!(path_key_length = path_key.len(), "webhook_path_key_invalid");
        Err(AppError::Unauthorized("Invalid API Key in path".to_string()))
    }
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

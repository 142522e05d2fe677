//! Request-boundary errors and their HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::format::FormatError;
use crate::mail::DeliveryError;

/// Errors surfaced to webhook callers.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("{0}")]
    NotFound(String),

    #[error("Failed to send email: {0}")]
    Delivery(#[from] DeliveryError),
}

/// Error body: `{"detail": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) | AppError::Format(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Delivery(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorResponse {
            detail: self.to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::Unauthorized("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Format(FormatError::MissingType).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Delivery(DeliveryError::MissingCredentials).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_delivery_detail_includes_cause() {
        let err = AppError::Delivery(DeliveryError::Rejected {
            status: 400,
            message: "Email address is not verified.".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Failed to send email: SES rejected the request (400): Email address is not verified."
        );
    }

    #[test]
    fn test_format_detail_is_transparent() {
        let err = AppError::from(FormatError::MissingType);
        assert_eq!(err.to_string(), "Missing 'type' field in webhook data");
    }
}

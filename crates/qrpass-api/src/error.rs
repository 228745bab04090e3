//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps validation, token, store, and rendering failures to HTTP status codes
//! with a JSON body carrying a machine-readable code and a message.
//! Internal details are logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use qrpass_core::ValidationError;
use qrpass_crypto::TokenError;
use qrpass_store::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::orchestration::ServiceError;
use crate::render::RenderError;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "VALIDATION_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing, invalid, or expired token (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// A backing store is unreachable (503).
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            Self::ServiceUnavailable(_) => "A backing store is unavailable".to_string(),
            other => other.to_string(),
        };

        match &self {
            Self::Internal(_) => tracing::error!(error = %self, "internal server error"),
            Self::ServiceUnavailable(_) => tracing::error!(error = %self, "store unavailable"),
            _ => {}
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::TtlOutOfRange => Self::Validation(err.to_string()),
            e if e.is_fatal() => Self::Internal(e.to_string()),
            TokenError::Expired => Self::Unauthorized("token expired".into()),
            _ => Self::Unauthorized("invalid token".into()),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(_) => Self::ServiceUnavailable(err.to_string()),
            StoreError::DuplicateDigest { .. } => Self::Internal(err.to_string()),
        }
    }
}

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::EmptyPayload | RenderError::PayloadTooLarge { .. } => {
                Self::Validation(err.to_string())
            }
            RenderError::ImageTooLarge { .. } | RenderError::Encode(_) | RenderError::Image(_) => {
                Self::Internal(err.to_string())
            }
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(e) => e.into(),
            ServiceError::InvalidTtl(msg) => Self::Validation(msg),
            ServiceError::Token(e) => e.into(),
            ServiceError::Store(e) => e.into(),
            ServiceError::Render(e) => e.into(),
            e @ (ServiceError::Canonicalization(_) | ServiceError::DanglingEntry { .. }) => {
                Self::Internal(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use qrpass_core::{ContentDigest, RecordId};

    async fn response_parts(err: AppError) -> (StatusCode, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[test]
    fn status_codes() {
        let cases = [
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (AppError::Validation("x".into()), StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            (AppError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            (
                AppError::ServiceUnavailable("x".into()),
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
            ),
            (AppError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        ];
        for (err, status, code) in cases {
            assert_eq!(err.status_and_code(), (status, code));
        }
    }

    #[test]
    fn token_errors_map_to_unauthorized() {
        for err in [TokenError::BadSignature, TokenError::Expired, TokenError::Malformed("x".into())] {
            assert!(matches!(AppError::from(err), AppError::Unauthorized(_)));
        }
        assert!(matches!(AppError::from(TokenError::InvalidKey), AppError::Internal(_)));
    }

    #[test]
    fn store_unavailable_maps_to_503() {
        let err = AppError::from(StoreError::Unavailable("connection refused".into()));
        assert!(matches!(err, AppError::ServiceUnavailable(_)));
    }

    #[test]
    fn dangling_registry_entry_is_internal() {
        let err = AppError::from(ServiceError::DanglingEntry {
            digest: ContentDigest::from_bytes([1; 32]),
            record_id: RecordId::new(),
        });
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[tokio::test]
    async fn internal_message_is_hidden() {
        let (status, body) = response_parts(AppError::Internal("db password wrong".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error.message, "An internal error occurred");
        assert!(body.error.details.is_none());
    }

    #[tokio::test]
    async fn store_detail_is_hidden() {
        let (status, body) =
            response_parts(AppError::ServiceUnavailable("10.0.0.3:5432 refused".into())).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(!body.error.message.contains("10.0.0.3"));
    }

    #[tokio::test]
    async fn client_errors_carry_message() {
        let (status, body) = response_parts(AppError::NotFound("unknown QR code".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error.code, "NOT_FOUND");
        assert!(body.error.message.contains("unknown QR code"));
    }
}

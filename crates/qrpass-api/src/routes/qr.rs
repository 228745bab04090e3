//! # QR Pass API
//!
//! Generation returns the PNG symbol directly; the signed token and the
//! record digest travel in response headers so clients that render their
//! own codes do not need to decode the image.

use std::time::Duration;

use axum::body::Bytes;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::header::{HeaderName, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use qrpass_core::{HistoryEntry, ScanContext, TripRequest};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::{extract_json, extract_validated_query, json_or_default, Validate};
use crate::orchestration::ScanOutcome;
use crate::state::AppState;

pub const X_QR_TOKEN: HeaderName = HeaderName::from_static("x-qr-token");
pub const X_QR_DIGEST: HeaderName = HeaderName::from_static("x-qr-digest");
pub const X_QR_RECORD_ID: HeaderName = HeaderName::from_static("x-qr-record-id");
pub const X_QR_EXPIRES_AT: HeaderName = HeaderName::from_static("x-qr-expires-at");

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuery {
    /// Token lifetime in milliseconds. Defaults to the configured TTL.
    pub expiration_millis: Option<u64>,
}

impl Validate for GenerateQuery {
    fn validate(&self) -> Result<(), String> {
        match self.expiration_millis {
            Some(0) => Err("expirationMillis must be greater than 0".to_string()),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct ScanQuery {
    /// The decoded QR payload.
    pub qr_code_data: Option<String>,
}

impl Validate for ScanQuery {
    fn validate(&self) -> Result<(), String> {
        match self.qr_code_data.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => Ok(()),
            _ => Err("qrCodeData is required".to_string()),
        }
    }
}

/// Successful scan response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ScanReceipt {
    pub status: String,
    pub message: String,
    #[schema(value_type = Object)]
    pub history: HistoryEntry,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/qr/generate", post(generate_qr))
        .route("/api/qr/scan", post(scan_qr))
}

/// POST /api/qr/generate — Register a trip and return its QR pass.
#[utoipa::path(
    post,
    path = "/api/qr/generate",
    params(GenerateQuery),
    request_body(content = Object, description = "Trip record", content_type = "application/json"),
    responses(
        (status = 200, description = "PNG QR code (image/png); token in x-qr-token, digest in x-qr-digest"),
        (status = 400, description = "Unparseable body or query", body = crate::error::ErrorBody),
        (status = 401, description = "Missing or invalid provider token", body = crate::error::ErrorBody),
        (status = 422, description = "Missing identifiers or invalid expiration", body = crate::error::ErrorBody),
    ),
    tag = "qr"
)]
async fn generate_qr(
    State(state): State<AppState>,
    caller: CallerIdentity,
    query: Result<Query<GenerateQuery>, QueryRejection>,
    body: Result<Json<TripRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let query = extract_validated_query(query)?;
    let ttl = query.expiration_millis.map(Duration::from_millis);
    if let Some(ttl) = ttl {
        if ttl > state.max_ttl {
            return Err(AppError::Validation(format!(
                "expirationMillis must not exceed {}",
                state.max_ttl.as_millis()
            )));
        }
    }
    let request = extract_json(body)?;

    let generated = state
        .service
        .generate(&caller.provider, request, ttl)
        .await?;

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("image/png"));
    headers.insert(X_QR_TOKEN, header_value(&generated.token)?);
    headers.insert(X_QR_DIGEST, header_value(&generated.digest.to_hex())?);
    headers.insert(X_QR_RECORD_ID, header_value(&generated.record_id.to_string())?);
    headers.insert(X_QR_EXPIRES_AT, header_value(&generated.expires_at.to_rfc3339())?);

    Ok((headers, generated.png).into_response())
}

/// POST /api/qr/scan — Verify a scanned QR payload and record the scan.
#[utoipa::path(
    post,
    path = "/api/qr/scan",
    params(ScanQuery),
    request_body(content = Object, description = "Scan location (place, date, hour, city, country); optional", content_type = "application/json"),
    responses(
        (status = 200, description = "Scan recorded", body = ScanReceipt),
        (status = 401, description = "Invalid or expired QR code, or invalid provider token", body = crate::error::ErrorBody),
        (status = 404, description = "Unknown QR code", body = crate::error::ErrorBody),
    ),
    tag = "qr"
)]
async fn scan_qr(
    State(state): State<AppState>,
    caller: CallerIdentity,
    query: Result<Query<ScanQuery>, QueryRejection>,
    body: Bytes,
) -> Result<Json<ScanReceipt>, AppError> {
    let query = extract_validated_query(query)?;
    let token = query.qr_code_data.as_deref().unwrap_or_default().trim();
    let context: ScanContext = json_or_default(&body)?;

    match state.service.scan(&caller.provider, token, context).await? {
        ScanOutcome::Recorded(history) => Ok(Json(ScanReceipt {
            status: "recorded".to_string(),
            message: "QR code valid, scan recorded".to_string(),
            history,
        })),
        ScanOutcome::Rejected(e) if e.is_expired() => {
            Err(AppError::Unauthorized("QR code expired".into()))
        }
        ScanOutcome::Rejected(_) => Err(AppError::Unauthorized("invalid QR code".into())),
        ScanOutcome::DigestMissing(_) => Err(AppError::NotFound("unknown QR code".into())),
    }
}

fn header_value(value: &str) -> Result<HeaderValue, AppError> {
    HeaderValue::from_str(value).map_err(|e| AppError::Internal(format!("header value: {e}")))
}

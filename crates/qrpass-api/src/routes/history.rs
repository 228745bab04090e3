//! # Scan History
//!
//! Lists the history entries that involve the authenticated provider,
//! either as owner of the scanned record or as the scanner.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use qrpass_core::HistoryEntry;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HistoryResponse {
    /// Newest first.
    #[schema(value_type = Vec<Object>)]
    pub entries: Vec<HistoryEntry>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/history", get(list_history))
}

/// GET /api/history — Scan history for the caller.
#[utoipa::path(
    get,
    path = "/api/history",
    responses(
        (status = 200, description = "History entries, newest first", body = HistoryResponse),
        (status = 401, description = "Missing or invalid provider token", body = crate::error::ErrorBody),
    ),
    tag = "history"
)]
async fn list_history(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<HistoryResponse>, AppError> {
    let entries = state.service.history(&caller.provider).await?;
    Ok(Json(HistoryResponse { entries }))
}

//! # Provider Reservation
//!
//! Issues the bearer token a provider uses on every other endpoint.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::post;
use axum::Router;
use qrpass_core::ProviderName;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::AppError;
use crate::extractors::{extract_validated_query, Validate};
use crate::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReserveQuery {
    /// Provider name. Also accepted as `fournisseur`.
    #[serde(alias = "fournisseur")]
    pub provider: Option<String>,
}

impl Validate for ReserveQuery {
    fn validate(&self) -> Result<(), String> {
        match self.provider.as_deref().map(str::trim) {
            Some(p) if !p.is_empty() => Ok(()),
            _ => Err("provider is required".to_string()),
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/reserve", post(reserve))
}

/// POST /api/reserve — Issue a provider token.
#[utoipa::path(
    post,
    path = "/api/reserve",
    params(ReserveQuery),
    responses(
        (status = 200, description = "Provider token", body = String, content_type = "text/plain"),
        (status = 422, description = "Missing or invalid provider", body = crate::error::ErrorBody),
    ),
    tag = "reserve"
)]
async fn reserve(
    State(state): State<AppState>,
    query: Result<Query<ReserveQuery>, QueryRejection>,
) -> Result<String, AppError> {
    let query = extract_validated_query(query)?;
    let provider = ProviderName::new(query.provider.as_deref().unwrap_or_default())?;
    Ok(state.service.reserve(&provider)?)
}

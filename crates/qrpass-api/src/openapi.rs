//! # OpenAPI Specification Assembly
//!
//! Assembles the utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "qrpass API",
        version = "0.1.0",
        description = "Provider reservation tokens, signed QR trip passes, scan verification and scan history.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        crate::routes::reserve::reserve,
        crate::routes::qr::generate_qr,
        crate::routes::qr::scan_qr,
        crate::routes::history::list_history,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::routes::qr::ScanReceipt,
        crate::routes::history::HistoryResponse,
    )),
    tags(
        (name = "reserve", description = "Provider reservation tokens"),
        (name = "qr", description = "QR pass generation and scanning"),
        (name = "history", description = "Scan history"),
    )
)]
pub struct ApiDoc;

pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

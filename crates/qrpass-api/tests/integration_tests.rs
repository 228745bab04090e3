//! # Integration Tests for qrpass-api
//!
//! Drives the full router: provider reservation, QR generation, scan
//! verification, history, authentication, and the OpenAPI document.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use qrpass_api::middleware::metrics::ApiMetrics;
use qrpass_api::orchestration::Stores;
use qrpass_api::state::AppState;
use qrpass_core::{ContentDigest, ProviderName, TripRequest};
use qrpass_crypto::{SigningSecret, TokenCodec};
use qrpass_store::{HashRegistry, MemoryHashRegistry, MemoryHistoryStore, MemoryRecordStore};

const SECRET_HEX: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

fn codec() -> TokenCodec {
    TokenCodec::new(SigningSecret::from_hex(SECRET_HEX).unwrap())
}

struct Harness {
    app: axum::Router,
    registry: MemoryHashRegistry,
    history: MemoryHistoryStore,
    records: MemoryRecordStore,
}

/// Helper: build the app over in-memory stores the test can inspect.
fn harness() -> Harness {
    harness_with_metrics(ApiMetrics::new())
}

fn harness_with_metrics(metrics: ApiMetrics) -> Harness {
    let records = MemoryRecordStore::new();
    let registry = MemoryHashRegistry::new();
    let history = MemoryHistoryStore::new();
    let stores = Stores {
        records: Arc::new(records.clone()),
        registry: Arc::new(registry.clone()),
        history: Arc::new(history.clone()),
    };
    let state = AppState::with_stores(codec(), stores);
    Harness {
        app: qrpass_api::app_with_metrics(state, metrics),
        registry,
        history,
        records,
    }
}

/// Helper: read response body as string.
async fn body_string(response: axum::http::Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: axum::http::Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn provider_token(name: &str) -> String {
    codec()
        .issue_provider_token(&ProviderName::new(name).unwrap())
        .unwrap()
}

fn trip_body() -> serde_json::Value {
    serde_json::json!({"clientId": 1, "driverId": 2, "tripId": 3, "place": "GareA"})
}

fn generate_request(token: &str, query: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/api/qr/generate{query}"))
        .header("Authorization", format!("Bearer {token}"))
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn scan_request(token: &str, qr: &str, body: Body) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/api/qr/scan?qrCodeData={qr}"))
        .header("Authorization", format!("Bearer {token}"))
        .header("Content-Type", "application/json")
        .body(body)
        .unwrap()
}

/// Generate a pass for the standard trip and return the QR token.
async fn generate(app: &axum::Router, bearer: &str, query: &str) -> String {
    let response = app
        .clone()
        .oneshot(generate_request(bearer, query, &trip_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    response
        .headers()
        .get("x-qr-token")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

// -- Health Probes ------------------------------------------------------------

#[tokio::test]
async fn test_liveness_probe() {
    let h = harness();
    let response = h
        .app
        .oneshot(Request::builder().uri("/health/liveness").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");
}

#[tokio::test]
async fn test_readiness_probe() {
    let h = harness();
    let response = h
        .app
        .oneshot(Request::builder().uri("/health/readiness").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ready");
}

// -- Reservation --------------------------------------------------------------

#[tokio::test]
async fn test_reserve_issues_provider_token() {
    let h = harness();
    let response = h
        .app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/reserve?provider=acme")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));

    let token = body_string(response).await;
    let verified = codec().verify_provider_token(&token).unwrap();
    assert_eq!(verified.provider.as_str(), "acme");
}

#[tokio::test]
async fn test_reserve_accepts_legacy_parameter_name() {
    let h = harness();
    let response = h
        .app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/reserve?fournisseur=acme")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_reserve_requires_provider() {
    let h = harness();
    let response = h
        .app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/reserve")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

// -- End-to-end ---------------------------------------------------------------

#[tokio::test]
async fn test_generate_then_scan_records_history() {
    let h = harness();
    let bearer = provider_token("acme");

    let response = h
        .app
        .clone()
        .oneshot(generate_request(&bearer, "?expirationMillis=60000", &trip_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/png");
    let qr = response.headers()["x-qr-token"].to_str().unwrap().to_string();
    let digest_hex = response.headers()["x-qr-digest"].to_str().unwrap().to_string();
    let png = response.into_body().collect().await.unwrap().to_bytes();
    assert!(png.starts_with(b"\x89PNG"));

    // Registry holds exactly one entry, keyed by the record digest.
    let record = serde_json::from_value::<TripRequest>(trip_body())
        .unwrap()
        .into_record(ProviderName::new("acme").unwrap())
        .unwrap();
    let digest = record.digest().unwrap();
    assert_eq!(digest_hex, digest.to_hex());
    assert_eq!(h.registry.len(), 1);
    assert!(h.registry.get(&digest).await.unwrap().is_some());

    let response = h
        .app
        .clone()
        .oneshot(scan_request(&bearer, &qr, Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let receipt = body_json(response).await;
    assert_eq!(receipt["status"], "recorded");
    assert_eq!(receipt["history"]["clientId"], 1);
    assert_eq!(receipt["history"]["driverId"], 2);
    assert_eq!(receipt["history"]["tripId"], 3);
    assert_eq!(receipt["history"]["place"], "GareA");
    assert_eq!(h.history.len(), 1);

    let response = h
        .app
        .oneshot(
            Request::builder()
                .uri("/api/history")
                .header("Authorization", format!("Bearer {bearer}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let history = body_json(response).await;
    assert_eq!(history["entries"].as_array().unwrap().len(), 1);
    assert_eq!(history["entries"][0]["tripId"], 3);
}

#[tokio::test]
async fn test_scan_takes_identifiers_from_record() {
    let h = harness();
    let bearer = provider_token("acme");
    let qr = generate(&h.app, &bearer, "").await;

    let body = serde_json::json!({
        "clientId": 999, "driverId": 999, "tripId": 999,
        "place": "Somewhere else", "city": "Lyon"
    });
    let response = h
        .app
        .oneshot(scan_request(&bearer, &qr, Body::from(body.to_string())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let receipt = body_json(response).await;
    assert_eq!(receipt["history"]["clientId"], 1);
    assert_eq!(receipt["history"]["tripId"], 3);
    assert_eq!(receipt["history"]["place"], "GareA");
    assert_eq!(receipt["history"]["city"], "Lyon");
}

#[tokio::test]
async fn test_generating_same_trip_twice_reuses_record() {
    let h = harness();
    let bearer = provider_token("acme");
    generate(&h.app, &bearer, "").await;
    generate(&h.app, &bearer, "").await;
    assert_eq!(h.registry.len(), 1);
    assert_eq!(h.records.len(), 1);
}

// -- Scan failures ------------------------------------------------------------

#[tokio::test]
async fn test_scan_with_foreign_secret_is_unauthorized() {
    let h = harness();
    let bearer = provider_token("acme");
    generate(&h.app, &bearer, "").await;

    let record = serde_json::from_value::<TripRequest>(trip_body())
        .unwrap()
        .into_record(ProviderName::new("acme").unwrap())
        .unwrap();
    let foreign = TokenCodec::new(SigningSecret::from_hex(&"ee".repeat(32)).unwrap());
    let forged = foreign
        .issue_digest_token(&record.digest().unwrap(), Duration::from_secs(60))
        .unwrap();

    let response = h
        .app
        .oneshot(scan_request(&bearer, &forged, Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    assert!(h.history.is_empty());
}

#[tokio::test]
async fn test_scan_of_unknown_digest_is_not_found() {
    let h = harness();
    let bearer = provider_token("acme");
    let qr = codec()
        .issue_digest_token(&ContentDigest::from_bytes([0x42; 32]), Duration::from_secs(60))
        .unwrap();

    let response = h
        .app
        .oneshot(scan_request(&bearer, &qr, Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(h.history.is_empty());
}

#[tokio::test]
async fn test_scan_of_expired_code_is_unauthorized() {
    let h = harness();
    let bearer = provider_token("acme");
    let qr = generate(&h.app, &bearer, "?expirationMillis=1").await;
    tokio::time::sleep(Duration::from_millis(20)).await;

    let response = h
        .app
        .oneshot(scan_request(&bearer, &qr, Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert!(body["error"]["message"].as_str().unwrap().contains("expired"));
    assert!(h.history.is_empty());
}

#[tokio::test]
async fn test_provider_token_is_not_a_qr_code() {
    let h = harness();
    let bearer = provider_token("acme");
    let response = h
        .app
        .oneshot(scan_request(&bearer, &bearer, Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(h.history.is_empty());
}

#[tokio::test]
async fn test_scan_requires_qr_code_data() {
    let h = harness();
    let bearer = provider_token("acme");
    let response = h
        .app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/qr/scan")
                .header("Authorization", format!("Bearer {bearer}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// -- Generation validation ----------------------------------------------------

#[tokio::test]
async fn test_generate_requires_identifiers() {
    let h = harness();
    let bearer = provider_token("acme");
    let body = serde_json::json!({"clientId": 1, "driverId": 2, "place": "GareA"});
    let response = h
        .app
        .oneshot(generate_request(&bearer, "", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert!(body["error"]["message"].as_str().unwrap().contains("tripId"));
    assert!(h.registry.is_empty());
    assert!(h.records.is_empty());
}

#[tokio::test]
async fn test_generate_rejects_zero_expiration() {
    let h = harness();
    let bearer = provider_token("acme");
    let response = h
        .app
        .oneshot(generate_request(&bearer, "?expirationMillis=0", &trip_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(h.registry.is_empty());
}

#[tokio::test]
async fn test_generate_rejects_expiration_above_maximum() {
    let h = harness();
    let bearer = provider_token("acme");
    let too_long = 31u64 * 24 * 60 * 60 * 1000;
    let response = h
        .app
        .oneshot(generate_request(
            &bearer,
            &format!("?expirationMillis={too_long}"),
            &trip_body(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_generate_rejects_malformed_json() {
    let h = harness();
    let bearer = provider_token("acme");
    let response = h
        .app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/qr/generate")
                .header("Authorization", format!("Bearer {bearer}"))
                .header("Content-Type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// -- Authentication -----------------------------------------------------------

#[tokio::test]
async fn test_generate_without_token_is_unauthorized() {
    let h = harness();
    let response = h
        .app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/qr/generate")
                .header("Content-Type", "application/json")
                .body(Body::from(trip_body().to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(h.registry.is_empty());
}

#[tokio::test]
async fn test_qr_token_is_not_a_bearer_credential() {
    let h = harness();
    let bearer = provider_token("acme");
    let qr = generate(&h.app, &bearer, "").await;

    let response = h
        .app
        .oneshot(
            Request::builder()
                .uri("/api/history")
                .header("Authorization", format!("Bearer {qr}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_openapi_requires_auth() {
    let h = harness();
    let response = h
        .app
        .clone()
        .oneshot(Request::builder().uri("/openapi.json").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = h
        .app
        .oneshot(
            Request::builder()
                .uri("/openapi.json")
                .header("Authorization", format!("Bearer {}", provider_token("acme")))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let spec = body_json(response).await;
    assert!(spec["paths"]["/api/qr/scan"].is_object());
}

// -- Metrics ------------------------------------------------------------------

#[tokio::test]
async fn test_metrics_count_rejections() {
    let metrics = ApiMetrics::new();
    let h = harness_with_metrics(metrics.clone());
    let bearer = provider_token("acme");
    generate(&h.app, &bearer, "").await;
    h.app
        .clone()
        .oneshot(scan_request(&bearer, "garbage", Body::empty()))
        .await
        .unwrap();

    assert_eq!(metrics.requests(), 2);
    assert_eq!(metrics.errors(), 1);
    assert_eq!(metrics.unauthorized(), 1);
}

//! # Authentication Middleware
//!
//! Every authenticated request carries a provider reservation token:
//!
//! ```text
//! Authorization: Bearer {provider token}
//! ```
//!
//! The token is verified with the service's [`TokenCodec`] as a provider
//! token, so a QR digest token presented as a bearer credential is
//! rejected. On success a [`CallerIdentity`] is injected into the request
//! extensions. Handlers extract it via the `FromRequestParts` impl.

use axum::extract::Request;
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use qrpass_core::ProviderName;
use qrpass_crypto::TokenCodec;

use crate::error::{AppError, ErrorBody, ErrorDetail};

/// The authenticated provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub provider: ProviderName,
}

/// Extracts the identity that the auth middleware injected into extensions.
/// Returns 401 if no identity is present.
#[axum::async_trait]
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("no caller identity in request context".into()))
    }
}

/// Token verifier handed to the middleware as a request extension.
#[derive(Clone)]
pub struct AuthConfig {
    pub codec: TokenCodec,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig").finish_non_exhaustive()
    }
}

/// Extract and verify the Bearer token from the Authorization header.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let Some(config) = request.extensions().get::<AuthConfig>().cloned() else {
        tracing::error!("auth middleware mounted without AuthConfig");
        return AppError::Internal("authentication not configured".into()).into_response();
    };

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match auth_header {
        Some(header_value) if header_value.starts_with("Bearer ") => {
            let provided = header_value["Bearer ".len()..].trim();
            match config.codec.verify_provider_token(provided) {
                Ok(token) => {
                    tracing::debug!(provider = %token.provider, "caller authenticated");
                    request.extensions_mut().insert(CallerIdentity {
                        provider: token.provider,
                    });
                    next.run(request).await
                }
                Err(e) => {
                    tracing::warn!(reason = %e, "authentication failed: invalid bearer token");
                    let message = if e.is_expired() {
                        "bearer token expired"
                    } else {
                        "invalid bearer token"
                    };
                    unauthorized_response(message)
                }
            }
        }
        Some(_) => {
            tracing::warn!("authentication failed: non-Bearer authorization scheme");
            unauthorized_response("authorization header must use Bearer scheme")
        }
        None => {
            tracing::warn!("authentication failed: missing authorization header");
            unauthorized_response("missing authorization header")
        }
    }
}

fn unauthorized_response(message: &str) -> Response {
    let body = ErrorBody {
        error: ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message: message.to_string(),
            details: None,
        },
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::middleware::from_fn;
    use axum::routing::get;
    use axum::Router;
    use http_body_util::BodyExt;
    use qrpass_core::ContentDigest;
    use qrpass_crypto::SigningSecret;
    use std::time::Duration;
    use tower::ServiceExt;

    fn codec() -> TokenCodec {
        TokenCodec::new(SigningSecret::from_hex(&"a1".repeat(32)).unwrap())
    }

    fn test_app(codec: TokenCodec) -> Router {
        Router::new()
            .route(
                "/whoami",
                get(|caller: CallerIdentity| async move { caller.provider.to_string() }),
            )
            .layer(from_fn(auth_middleware))
            .layer(axum::Extension(AuthConfig { codec }))
    }

    async fn call(app: Router, authorization: Option<&str>) -> (StatusCode, String) {
        let mut builder = Request::builder().uri("/whoami");
        if let Some(value) = authorization {
            builder = builder.header("Authorization", value);
        }
        let response = app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn provider_token_accepted() {
        let codec = codec();
        let token = codec
            .issue_provider_token(&ProviderName::new("acme").unwrap())
            .unwrap();
        let (status, body) = call(test_app(codec), Some(&format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "acme");
    }

    #[tokio::test]
    async fn missing_authorization_header_rejected() {
        let (status, body) = call(test_app(codec()), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("missing authorization header"));
    }

    #[tokio::test]
    async fn non_bearer_scheme_rejected() {
        let (status, body) = call(test_app(codec()), Some("Basic YWNtZTpwdw==")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("Bearer scheme"));
    }

    #[tokio::test]
    async fn token_from_other_secret_rejected() {
        let other = TokenCodec::new(SigningSecret::from_hex(&"b2".repeat(32)).unwrap());
        let token = other
            .issue_provider_token(&ProviderName::new("acme").unwrap())
            .unwrap();
        let (status, _) = call(test_app(codec()), Some(&format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn digest_token_is_not_a_bearer_credential() {
        let codec = codec();
        let token = codec
            .issue_digest_token(&ContentDigest::from_bytes([3; 32]), Duration::from_secs(60))
            .unwrap();
        let (status, body) = call(test_app(codec), Some(&format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("invalid bearer token"));
    }

    #[tokio::test]
    async fn handler_without_middleware_is_unauthorized() {
        let app = Router::new().route(
            "/whoami",
            get(|caller: CallerIdentity| async move { caller.provider.to_string() }),
        );
        let (status, _) = call(app, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}

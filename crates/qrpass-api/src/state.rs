//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor. Cloning is cheap: the service sits behind an
//! `Arc` and the codec shares its secret.

use std::sync::Arc;
use std::time::Duration;

use qrpass_crypto::TokenCodec;

use crate::config::{AppConfig, DEFAULT_MAX_TTL_MS, DEFAULT_TTL_MS};
use crate::orchestration::{QrService, Stores};
use crate::render::QrRenderer;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<QrService>,
    /// Upper bound on caller-supplied QR expirations.
    pub max_ttl: Duration,
}

impl AppState {
    /// In-memory stores with default TTLs and rendering.
    pub fn new(codec: TokenCodec) -> Self {
        Self::with_stores(codec, Stores::in_memory())
    }

    /// Default TTLs and rendering over the given stores.
    pub fn with_stores(codec: TokenCodec, stores: Stores) -> Self {
        let service = QrService::new(
            codec,
            stores,
            QrRenderer::new(),
            Duration::from_millis(DEFAULT_TTL_MS),
        );
        Self {
            service: Arc::new(service),
            max_ttl: Duration::from_millis(DEFAULT_MAX_TTL_MS),
        }
    }

    /// Build state from startup configuration. Consumes the config so the
    /// signing secret has exactly one owner.
    pub fn from_config(config: AppConfig) -> Self {
        let codec = TokenCodec::new(config.signing_secret);
        let renderer = QrRenderer::new().with_min_pixels(config.qr_min_pixels);
        let service = QrService::new(codec, Stores::in_memory(), renderer, config.default_ttl);
        Self {
            service: Arc::new(service),
            max_ttl: config.max_ttl,
        }
    }

    pub fn codec(&self) -> &TokenCodec {
        self.service.codec()
    }
}

//! # Generation and Scan Orchestration
//!
//! [`QrService`] ties the codec, the three stores, and the renderer
//! together. HTTP handlers are thin wrappers over its methods.
//!
//! ## Generate
//!
//! ```text
//! TripRequest → validate → TripRecord → digest → digest token → PNG
//!             → registry hit ? reuse record id : save record + put digest
//! ```
//!
//! Everything that can fail on caller input (validation, TTL, symbol
//! capacity) runs before the first store write, so a rejected request
//! leaves no partial state.
//!
//! A registry failure after the record is saved leaves that record
//! unregistered. No digest points at it, so it can never be scanned, and a
//! retry saves and registers a fresh copy.
//!
//! ## Scan
//!
//! ```text
//! Received → TokenChecked → DigestFound   → Recorded
//!                         ↘ DigestMissing
//!          ↘ Rejected
//! ```
//!
//! Rejected and DigestMissing are ordinary outcomes, returned as
//! [`ScanOutcome`] values. Exactly one history entry is written on
//! `Recorded` and none otherwise. Scanning never writes to the record store
//! or the registry.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use qrpass_core::{
    CanonicalizationError, ContentDigest, HistoryEntry, ProviderName, RecordId, ScanContext,
    TripRequest, ValidationError,
};
use qrpass_crypto::{TokenCodec, TokenError};
use qrpass_store::{
    HashRegistry, HistoryStore, MemoryHashRegistry, MemoryHistoryStore, MemoryRecordStore,
    RecordStore, RegistryEntry, StoreError,
};
use thiserror::Error;

use crate::render::{QrRenderer, RenderError};

/// Failures that abort a generate or scan call.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("invalid ttl: {0}")]
    InvalidTtl(String),

    #[error("record canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    #[error("token issuance failed: {0}")]
    Token(TokenError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("registry maps {digest} to missing record {record_id}")]
    DanglingEntry {
        digest: ContentDigest,
        record_id: RecordId,
    },
}

/// Handles onto the three stores.
#[derive(Clone)]
pub struct Stores {
    pub records: Arc<dyn RecordStore>,
    pub registry: Arc<dyn HashRegistry>,
    pub history: Arc<dyn HistoryStore>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            records: Arc::new(MemoryRecordStore::new()),
            registry: Arc::new(MemoryHashRegistry::new()),
            history: Arc::new(MemoryHistoryStore::new()),
        }
    }
}

/// A freshly generated QR pass.
#[derive(Debug, Clone)]
pub struct GeneratedQr {
    pub token: String,
    pub digest: ContentDigest,
    pub record_id: RecordId,
    pub png: Vec<u8>,
    pub qr_version: i16,
    pub expires_at: DateTime<Utc>,
}

/// Terminal state of a scan that did not hit an infrastructure failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The token was valid and the record resolved; a history entry was
    /// written.
    Recorded(HistoryEntry),
    /// The token was malformed, forged, expired, or of the wrong class.
    Rejected(TokenError),
    /// The token was valid but no record is registered under its digest.
    DigestMissing(ContentDigest),
}

pub struct QrService {
    codec: TokenCodec,
    stores: Stores,
    renderer: QrRenderer,
    default_ttl: Duration,
}

impl QrService {
    pub fn new(
        codec: TokenCodec,
        stores: Stores,
        renderer: QrRenderer,
        default_ttl: Duration,
    ) -> Self {
        Self {
            codec,
            stores,
            renderer,
            default_ttl,
        }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Issue a provider reservation token. It carries no digest and does
    /// not expire.
    pub fn reserve(&self, provider: &ProviderName) -> Result<String, ServiceError> {
        let token = self
            .codec
            .issue_provider_token(provider)
            .map_err(ServiceError::Token)?;
        tracing::info!(provider = %provider, "provider token issued");
        Ok(token)
    }

    /// Register a trip on behalf of `caller` and produce its QR pass.
    pub async fn generate(
        &self,
        caller: &ProviderName,
        request: TripRequest,
        ttl: Option<Duration>,
    ) -> Result<GeneratedQr, ServiceError> {
        let record = request.into_record(caller.clone())?;
        let digest = record.digest()?;

        let ttl = ttl.unwrap_or(self.default_ttl);
        if ttl.is_zero() {
            return Err(ServiceError::InvalidTtl("ttl must be greater than zero".into()));
        }
        let now = Utc::now();
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|d| now.checked_add_signed(d))
            .ok_or_else(|| ServiceError::InvalidTtl("ttl out of range".into()))?;

        let token = self
            .codec
            .issue_digest_token_at(&digest, ttl, now)
            .map_err(ServiceError::Token)?;
        let rendered = self.renderer.render(&token)?;

        let record_id = match self.stores.registry.get(&digest).await? {
            Some(existing) => {
                tracing::debug!(digest = %digest, record_id = %existing, "digest already registered");
                existing
            }
            None => {
                let id = self.stores.records.save(record).await?;
                match self
                    .stores
                    .registry
                    .put(RegistryEntry {
                        digest,
                        record_id: id,
                    })
                    .await
                {
                    Ok(()) => id,
                    Err(StoreError::DuplicateDigest { existing, .. }) => {
                        tracing::debug!(digest = %digest, record_id = %existing, "lost registration race");
                        existing
                    }
                    Err(e) => {
                        tracing::warn!(
                            digest = %digest,
                            record_id = %id,
                            error = %e,
                            "registry write failed, record left unregistered"
                        );
                        return Err(e.into());
                    }
                }
            }
        };

        tracing::info!(
            provider = %caller,
            digest = %digest,
            record_id = %record_id,
            qr_version = rendered.version,
            expires_at = %expires_at,
            "QR pass generated"
        );

        Ok(GeneratedQr {
            token,
            digest,
            record_id,
            png: rendered.png,
            qr_version: rendered.version,
            expires_at,
        })
    }

    /// Verify a scanned token and, on success, record the scan.
    pub async fn scan(
        &self,
        caller: &ProviderName,
        token: &str,
        context: ScanContext,
    ) -> Result<ScanOutcome, ServiceError> {
        let verified = match self.codec.verify_digest_token(token) {
            Ok(v) => v,
            Err(e) if e.is_fatal() => return Err(ServiceError::Token(e)),
            Err(e) => {
                tracing::warn!(scanned_by = %caller, reason = %e, "QR token rejected");
                return Ok(ScanOutcome::Rejected(e));
            }
        };
        let digest = verified.digest;

        let Some(record_id) = self.stores.registry.get(&digest).await? else {
            tracing::info!(scanned_by = %caller, digest = %digest, "QR digest not registered");
            return Ok(ScanOutcome::DigestMissing(digest));
        };

        let record = self
            .stores
            .records
            .find_by_id(&record_id)
            .await?
            .ok_or(ServiceError::DanglingEntry { digest, record_id })?;

        let entry = HistoryEntry::from_scan(&record, context, caller.clone(), Utc::now());
        self.stores.history.append(entry.clone()).await?;

        tracing::info!(
            scanned_by = %caller,
            provider = %entry.provider,
            trip_id = %entry.trip_id,
            history_id = %entry.id,
            "scan recorded"
        );
        Ok(ScanOutcome::Recorded(entry))
    }

    /// Scan history involving `provider`, newest first.
    pub async fn history(&self, provider: &ProviderName) -> Result<Vec<HistoryEntry>, ServiceError> {
        Ok(self.stores.history.list_by_provider(provider).await?)
    }
}

//! Store contracts.

use async_trait::async_trait;
use qrpass_core::{ContentDigest, HistoryEntry, ProviderName, RecordId, TripRecord};

use crate::error::StoreError;

/// Maps a record's content digest to the record's identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryEntry {
    pub digest: ContentDigest,
    pub record_id: RecordId,
}

/// Stored trip records. Records are immutable once saved.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist a record and return its new identifier.
    async fn save(&self, record: TripRecord) -> Result<RecordId, StoreError>;

    /// Look up a record by identifier.
    async fn find_by_id(&self, id: &RecordId) -> Result<Option<TripRecord>, StoreError>;
}

/// Digest to record id lookup.
///
/// `put` is atomic insert-if-absent. A `put` that has returned is visible to
/// every subsequent `get`.
#[async_trait]
pub trait HashRegistry: Send + Sync {
    /// Register a digest. Fails with [`StoreError::DuplicateDigest`] if the
    /// digest is already present.
    async fn put(&self, entry: RegistryEntry) -> Result<(), StoreError>;

    async fn get(&self, digest: &ContentDigest) -> Result<Option<RecordId>, StoreError>;
}

/// Append-only scan history. There is no update or delete path.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn append(&self, entry: HistoryEntry) -> Result<(), StoreError>;

    /// Entries involving `provider`, either as the owner of the scanned
    /// record or as the scanner. Newest first.
    async fn list_by_provider(
        &self,
        provider: &ProviderName,
    ) -> Result<Vec<HistoryEntry>, StoreError>;
}

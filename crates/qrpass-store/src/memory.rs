//! # In-Memory Stores
//!
//! All three stores share one building block, [`SharedMap`], a cloneable
//! handle onto an `Arc<RwLock<HashMap>>`. Every operation takes the lock once
//! and releases it before returning, so no guard ever crosses an `.await`.
//! `parking_lot::RwLock` does not poison: a panicking writer does not wedge
//! the store.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use qrpass_core::{ContentDigest, HistoryEntry, ProviderName, RecordId, TripRecord};

use crate::error::StoreError;
use crate::traits::{HashRegistry, HistoryStore, RecordStore, RegistryEntry};

/// Thread-safe, cloneable key-value map.
#[derive(Debug)]
struct SharedMap<K, V> {
    data: Arc<RwLock<HashMap<K, V>>>,
}

impl<K, V> Clone for SharedMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<K, V> Default for SharedMap<K, V> {
    fn default() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<K: Eq + Hash, V: Clone> SharedMap<K, V> {
    fn insert(&self, key: K, value: V) -> Option<V> {
        self.data.write().insert(key, value)
    }

    /// Insert under a single write lock unless the key exists; on conflict
    /// return the current value.
    fn insert_if_absent(&self, key: K, value: V) -> Result<(), V> {
        match self.data.write().entry(key) {
            Entry::Occupied(existing) => Err(existing.get().clone()),
            Entry::Vacant(slot) => {
                slot.insert(value);
                Ok(())
            }
        }
    }

    fn get(&self, key: &K) -> Option<V> {
        self.data.read().get(key).cloned()
    }

    fn len(&self) -> usize {
        self.data.read().len()
    }
}

// -- Records ------------------------------------------------------------------

/// In-memory [`RecordStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    records: SharedMap<RecordId, TripRecord>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn save(&self, record: TripRecord) -> Result<RecordId, StoreError> {
        let id = RecordId::new();
        self.records.insert(id, record);
        tracing::debug!(record_id = %id, "trip record saved");
        Ok(id)
    }

    async fn find_by_id(&self, id: &RecordId) -> Result<Option<TripRecord>, StoreError> {
        Ok(self.records.get(id))
    }
}

// -- Registry -----------------------------------------------------------------

/// In-memory [`HashRegistry`].
#[derive(Debug, Clone, Default)]
pub struct MemoryHashRegistry {
    entries: SharedMap<ContentDigest, RecordId>,
}

impl MemoryHashRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl HashRegistry for MemoryHashRegistry {
    async fn put(&self, entry: RegistryEntry) -> Result<(), StoreError> {
        self.entries
            .insert_if_absent(entry.digest, entry.record_id)
            .map_err(|existing| StoreError::DuplicateDigest {
                digest: entry.digest,
                existing,
            })?;
        tracing::debug!(digest = %entry.digest, record_id = %entry.record_id, "digest registered");
        Ok(())
    }

    async fn get(&self, digest: &ContentDigest) -> Result<Option<RecordId>, StoreError> {
        Ok(self.entries.get(digest))
    }
}

// -- History ------------------------------------------------------------------

/// In-memory [`HistoryStore`]. Entries are kept in append order.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistoryStore {
    entries: Arc<RwLock<Vec<HistoryEntry>>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn append(&self, entry: HistoryEntry) -> Result<(), StoreError> {
        self.entries.write().push(entry);
        Ok(())
    }

    async fn list_by_provider(
        &self,
        provider: &ProviderName,
    ) -> Result<Vec<HistoryEntry>, StoreError> {
        Ok(self
            .entries
            .read()
            .iter()
            .rev()
            .filter(|e| &e.provider == provider || &e.scanned_by == provider)
            .cloned()
            .collect())
    }
}

//! # qrpass-store — Record, Registry, and History Stores
//!
//! The service persists three kinds of data, each behind its own async
//! trait so that a database-backed implementation can replace the in-memory
//! one without touching the orchestration layer:
//!
//! - [`RecordStore`]: trip records by [`RecordId`](qrpass_core::RecordId).
//! - [`HashRegistry`]: content digest to record id. Exactly one entry per
//!   digest; the first writer wins.
//! - [`HistoryStore`]: append-only scan history.
//!
//! The `Memory*` types are cloneable handles onto shared maps guarded by a
//! `parking_lot::RwLock`. Locks are never held across `.await` points.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::StoreError;
pub use memory::{MemoryHashRegistry, MemoryHistoryStore, MemoryRecordStore};
pub use traits::{HashRegistry, HistoryStore, RecordStore, RegistryEntry};

//! # qrpass-core — Foundational Types for QR Trip Passes
//!
//! This crate is the leaf of the workspace. It defines the trip record that a
//! provider registers, the scan history entry written when a pass is verified,
//! and the content-digest pipeline that binds a QR payload to a stored record.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `ClientId`, `DriverId`, `TripId`,
//!    `RecordId`, `ProviderName` are distinct types. A driver id cannot be
//!    passed where a trip id is expected.
//!
//! 2. **`CanonicalBytes` newtype.** Every digest flows through
//!    `CanonicalBytes::new()` (RFC 8785 / JCS). The canonical form of a
//!    [`TripRecord`] is part of the compatibility surface: adding a field
//!    changes every future digest.
//!
//! 3. **`sha256_digest()` accepts only `&CanonicalBytes`.** Raw byte slices
//!    cannot be digested by accident.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `qrpass-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod record;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, ContentDigest};
pub use error::{CanonicalizationError, ValidationError};
pub use identity::{ClientId, DriverId, HistoryId, ProviderName, RecordId, TripId};
pub use record::{HistoryEntry, ScanContext, TripRecord, TripRequest};

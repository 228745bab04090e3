//! # Error Types
//!
//! Structured errors for domain validation and canonical serialization,
//! built with `thiserror`.

use thiserror::Error;

/// Errors during canonical serialization.
///
/// For well-formed [`TripRecord`](crate::TripRecord) values these can only
/// arise from a serialization bug; callers treat them as fatal.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed during canonicalization.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Domain primitive and request validation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was absent from the request.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The provider name failed validation.
    #[error("invalid provider name: {0}")]
    InvalidProvider(String),

    /// A content digest was not 64 hexadecimal characters.
    #[error("invalid digest: {0}")]
    InvalidDigest(String),
}

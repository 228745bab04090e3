use qrpass_core::{ContentDigest, RecordId};
use thiserror::Error;

/// Store failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store could not complete the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A registry entry already exists for this digest. The existing entry
    /// is left untouched.
    #[error("digest {digest} already registered to record {existing}")]
    DuplicateDigest {
        digest: ContentDigest,
        existing: RecordId,
    },
}

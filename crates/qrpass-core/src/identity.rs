//! # Identity Newtypes
//!
//! Each identifier is a distinct type: a [`DriverId`] cannot be passed where
//! a [`TripId`] is expected.
//!
//! Numeric identifiers ([`ClientId`], [`DriverId`], [`TripId`]) are assigned
//! by the provider's own systems and serialize as bare JSON integers.
//! UUID identifiers ([`RecordId`], [`HistoryId`]) are assigned by this
//! service. [`ProviderName`] is validated at construction.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

// ---------------------------------------------------------------------------
// Provider-assigned numeric identifiers
// ---------------------------------------------------------------------------

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw identifier value.
            pub fn new(value: i64) -> Self {
                Self(value)
            }

            /// The raw identifier value.
            pub fn value(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

numeric_id!(
    /// The passenger on whose behalf a trip was booked.
    ClientId
);
numeric_id!(
    /// The driver assigned to a trip.
    DriverId
);
numeric_id!(
    /// The provider's identifier for a single trip.
    TripId
);

// ---------------------------------------------------------------------------
// Service-assigned UUID identifiers
// ---------------------------------------------------------------------------

/// Identifier of a stored [`TripRecord`](crate::TripRecord).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Create a new random record identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a [`HistoryEntry`](crate::HistoryEntry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryId(Uuid);

impl HistoryId {
    /// Create a new random history identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for HistoryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for HistoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Provider name
// ---------------------------------------------------------------------------

/// Maximum length of a provider name in bytes.
pub const MAX_PROVIDER_NAME_LEN: usize = 128;

/// The transport operator on whose behalf tokens and passes are issued.
///
/// # Validation
///
/// - Leading and trailing whitespace is trimmed.
/// - Must be non-empty and at most [`MAX_PROVIDER_NAME_LEN`] bytes.
/// - Must not contain control characters.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProviderName(String);

impl ProviderName {
    /// Create a validated provider name.
    pub fn new(name: impl AsRef<str>) -> Result<Self, ValidationError> {
        let name = name.as_ref().trim();
        if name.is_empty() {
            return Err(ValidationError::InvalidProvider(
                "provider name must not be empty".into(),
            ));
        }
        if name.len() > MAX_PROVIDER_NAME_LEN {
            return Err(ValidationError::InvalidProvider(format!(
                "provider name exceeds {MAX_PROVIDER_NAME_LEN} bytes"
            )));
        }
        if name.chars().any(char::is_control) {
            return Err(ValidationError::InvalidProvider(
                "provider name must not contain control characters".into(),
            ));
        }
        Ok(Self(name.to_string()))
    }

    /// Access the provider name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ProviderName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProviderName> for String {
    fn from(value: ProviderName) -> Self {
        value.0
    }
}

impl std::fmt::Display for ProviderName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

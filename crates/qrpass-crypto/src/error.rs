//! # Cryptographic Error Types
//!
//! Token verification failures are ordinary results, not exceptional
//! conditions: callers branch on [`TokenError`] to produce an
//! unauthorized-class response. Only [`TokenError::InvalidKey`] and
//! [`TokenError::Encoding`] indicate a broken deployment.

use thiserror::Error;

use crate::token::TokenScope;

/// Errors from issuing or verifying a signed token.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The token is not three well-formed base64url segments carrying the
    /// expected header and a parseable claim set.
    #[error("malformed token: {0}")]
    Malformed(String),

    /// The authentication tag does not match the token contents.
    #[error("token signature mismatch")]
    BadSignature,

    /// The token was authentic but its expiry has passed.
    #[error("token expired")]
    Expired,

    /// The token was authentic but was issued for a different purpose.
    #[error("token scope mismatch: expected {expected}, found {found}")]
    WrongScope {
        expected: TokenScope,
        found: TokenScope,
    },

    /// The requested time-to-live cannot be represented.
    #[error("token ttl out of range")]
    TtlOutOfRange,

    /// The signing key could not be loaded into the MAC.
    #[error("signing key rejected by MAC")]
    InvalidKey,

    /// Claims could not be serialized.
    #[error("token encoding failed: {0}")]
    Encoding(String),
}

impl TokenError {
    /// Whether this is the expired variant, for callers that word the
    /// response differently.
    pub fn is_expired(&self) -> bool {
        matches!(self, Self::Expired)
    }

    /// Whether the error reflects a deployment fault rather than a bad token.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InvalidKey | Self::Encoding(_))
    }
}

/// Errors constructing a [`SigningSecret`](crate::SigningSecret).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SecretError {
    /// The secret was not valid hexadecimal.
    #[error("signing secret is not valid hex: {0}")]
    InvalidHex(String),

    /// The decoded secret is shorter than the HMAC-SHA-256 minimum.
    #[error("signing secret must be at least {min} bytes, got {actual}")]
    TooShort { min: usize, actual: usize },
}

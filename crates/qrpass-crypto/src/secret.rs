//! # Signing Secret
//!
//! The shared HMAC key. Built once from configuration and passed to
//! [`TokenCodec::new`](crate::TokenCodec::new); never read from ambient state.
//! Rotating it invalidates every outstanding token.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::SecretError;

/// Minimum key length in bytes (the HMAC-SHA-256 output size).
pub const MIN_SECRET_LEN: usize = 32;

/// Raw key material for token authentication.
///
/// Not `Clone` and not `Serialize`. Custom `Debug` redacts the bytes.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, SecretError> {
        if bytes.len() < MIN_SECRET_LEN {
            let actual = bytes.len();
            let mut bytes = bytes;
            bytes.zeroize();
            return Err(SecretError::TooShort {
                min: MIN_SECRET_LEN,
                actual,
            });
        }
        Ok(Self(bytes))
    }

    /// Decode a hex-encoded key. Surrounding whitespace is ignored.
    pub fn from_hex(hex: &str) -> Result<Self, SecretError> {
        let bytes = hex::decode(hex.trim()).map_err(|e| SecretError::InvalidHex(e.to_string()))?;
        Self::from_bytes(bytes)
    }

    pub(crate) fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningSecret([REDACTED])")
    }
}

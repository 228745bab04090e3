//! # qrpass-crypto — Signed Tokens for QR Trip Passes
//!
//! Provides the token codec that wraps a subject and an optional expiry in
//! a compact, tamper-evident string authenticated with HMAC-SHA-256:
//!
//! - [`SigningSecret`]: the shared key, hex-decoded once at startup,
//!   zeroized on drop and never printed.
//! - [`TokenCodec`]: issues and verifies tokens. Pure and reentrant; clones
//!   share one immutable secret.
//! - [`ScopedToken`]: the two token classes the service hands out. A
//!   provider reservation token can never be accepted where a digest token
//!   is expected, and vice versa, because the scope is part of the signed
//!   claims.
//!
//! ## Wire Format
//!
//! ```text
//! base64url(header) "." base64url(claims) "." base64url(HMAC-SHA-256(header "." claims))
//! ```
//!
//! Segments are unpadded base64url. Timestamps in the claims are Unix
//! milliseconds.

pub mod error;
pub mod scoped;
pub mod secret;
pub mod token;

pub use error::{SecretError, TokenError};
pub use scoped::{DigestToken, ProviderToken, ScopedToken};
pub use secret::SigningSecret;
pub use token::{TokenClaims, TokenCodec, TokenScope};

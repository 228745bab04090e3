//! # Token Codec
//!
//! Issues and verifies compact HMAC-SHA-256 tokens.
//!
//! ## Verification Order
//!
//! 1. Split into exactly three segments.
//! 2. The header segment must equal the one this codec emits, byte for byte.
//! 3. The tag is recomputed over `header.claims` and compared in constant
//!    time. Claims are only parsed after the tag matches.
//! 4. Expiry is checked last: a token is expired when `now > exp`.
//!
//! Base64url decoding is strict: padding and non-zero trailing bits are
//! rejected, so every accepted token has exactly one textual form.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::TokenError;
use crate::secret::SigningSecret;

type HmacSha256 = Hmac<Sha256>;

const HEADER_JSON: &str = r#"{"alg":"HS256","typ":"QRT"}"#;
const TAG_LEN: usize = 32;

/// What a token authorizes its bearer to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenScope {
    /// Authenticates a provider against the API.
    Provider,
    /// Encoded in a QR pass; identifies a trip record by digest.
    Digest,
}

impl std::fmt::Display for TokenScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Provider => f.write_str("provider"),
            Self::Digest => f.write_str("digest"),
        }
    }
}

/// The signed claim set.
///
/// `iat` and `exp` are Unix milliseconds. A token without `exp` never
/// expires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub scope: TokenScope,
    pub sub: String,
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub claims: BTreeMap<String, String>,
}

impl TokenClaims {
    /// Issue time as a timestamp, if representable.
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.iat)
    }

    /// Expiry as a timestamp. `None` when the token does not expire.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(DateTime::from_timestamp_millis)
    }
}

/// Issues and verifies signed tokens.
///
/// Cheap to clone; clones share one immutable secret and are safe to use
/// from any number of tasks.
#[derive(Clone)]
pub struct TokenCodec {
    secret: Arc<SigningSecret>,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec").finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(secret: SigningSecret) -> Self {
        Self {
            secret: Arc::new(secret),
        }
    }

    /// Issue a token for `subject`, valid for `ttl` from now.
    pub fn issue(
        &self,
        scope: TokenScope,
        subject: &str,
        claims: BTreeMap<String, String>,
        ttl: Option<Duration>,
    ) -> Result<String, TokenError> {
        self.issue_at(scope, subject, claims, ttl, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(
        &self,
        scope: TokenScope,
        subject: &str,
        claims: BTreeMap<String, String>,
        ttl: Option<Duration>,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let iat = now.timestamp_millis();
        let exp = match ttl {
            Some(ttl) => {
                let ttl_ms = i64::try_from(ttl.as_millis()).map_err(|_| TokenError::TtlOutOfRange)?;
                Some(iat.checked_add(ttl_ms).ok_or(TokenError::TtlOutOfRange)?)
            }
            None => None,
        };
        let body = TokenClaims {
            scope,
            sub: subject.to_string(),
            iat,
            exp,
            claims,
        };
        let payload =
            serde_json::to_vec(&body).map_err(|e| TokenError::Encoding(e.to_string()))?;

        let mut token = URL_SAFE_NO_PAD.encode(HEADER_JSON);
        token.push('.');
        token.push_str(&URL_SAFE_NO_PAD.encode(payload));
        let tag = self.tag(token.as_bytes())?;
        token.push('.');
        token.push_str(&URL_SAFE_NO_PAD.encode(tag));
        Ok(token)
    }

    /// Verify a token against the current time.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token as if the current time were `now`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
        let mut parts = token.split('.');
        let (header, payload, tag) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(h), Some(p), Some(t), None) => (h, p, t),
            _ => return Err(TokenError::Malformed("expected three segments".into())),
        };

        if header != URL_SAFE_NO_PAD.encode(HEADER_JSON) {
            return Err(TokenError::Malformed("unsupported header".into()));
        }

        let presented = URL_SAFE_NO_PAD
            .decode(tag)
            .map_err(|e| TokenError::Malformed(format!("tag: {e}")))?;
        if presented.len() != TAG_LEN {
            return Err(TokenError::Malformed("tag has wrong length".into()));
        }

        let signed_len = header.len() + 1 + payload.len();
        let expected = self.tag(&token.as_bytes()[..signed_len])?;
        if !bool::from(expected[..].ct_eq(&presented[..])) {
            return Err(TokenError::BadSignature);
        }

        let payload = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|e| TokenError::Malformed(format!("claims: {e}")))?;
        let claims: TokenClaims = serde_json::from_slice(&payload)
            .map_err(|e| TokenError::Malformed(format!("claims: {e}")))?;

        if let Some(exp) = claims.exp {
            if now.timestamp_millis() > exp {
                return Err(TokenError::Expired);
            }
        }
        Ok(claims)
    }

    fn tag(&self, signing_input: &[u8]) -> Result<[u8; TAG_LEN], TokenError> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(self.secret.expose())
            .map_err(|_| TokenError::InvalidKey)?;
        mac.update(signing_input);
        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&mac.finalize().into_bytes());
        Ok(tag)
    }
}

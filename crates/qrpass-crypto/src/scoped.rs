//! # Scoped Tokens
//!
//! The service hands out two classes of token from one codec:
//!
//! - **Provider tokens** authenticate API calls. Subject is the provider
//!   name; they carry a `provider` claim and do not expire.
//! - **Digest tokens** are what a QR pass encodes. Subject is the record's
//!   64-hex content digest; they always expire.
//!
//! The scope is a signed claim, so a caller holding one class can never
//! present it as the other.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use qrpass_core::{ContentDigest, ProviderName};

use crate::error::TokenError;
use crate::token::{TokenClaims, TokenCodec, TokenScope};

const PROVIDER_CLAIM: &str = "provider";

/// A verified provider reservation token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderToken {
    pub provider: ProviderName,
    pub issued_at: DateTime<Utc>,
}

/// A verified QR digest token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestToken {
    pub digest: ContentDigest,
    pub issued_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Either class of verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopedToken {
    Provider(ProviderToken),
    Digest(DigestToken),
}

impl ScopedToken {
    pub fn scope(&self) -> TokenScope {
        match self {
            Self::Provider(_) => TokenScope::Provider,
            Self::Digest(_) => TokenScope::Digest,
        }
    }
}

impl TokenCodec {
    /// Issue a non-expiring token that authenticates `provider`.
    pub fn issue_provider_token(&self, provider: &ProviderName) -> Result<String, TokenError> {
        let mut claims = BTreeMap::new();
        claims.insert(PROVIDER_CLAIM.to_string(), provider.as_str().to_string());
        self.issue(TokenScope::Provider, provider.as_str(), claims, None)
    }

    /// Issue a token that identifies the record with `digest`, valid for `ttl`.
    pub fn issue_digest_token(
        &self,
        digest: &ContentDigest,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        self.issue_digest_token_at(digest, ttl, Utc::now())
    }

    pub fn issue_digest_token_at(
        &self,
        digest: &ContentDigest,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        self.issue_at(
            TokenScope::Digest,
            &digest.to_hex(),
            BTreeMap::new(),
            Some(ttl),
            now,
        )
    }

    /// Verify a token of either class.
    pub fn verify_scoped(&self, token: &str) -> Result<ScopedToken, TokenError> {
        self.verify_scoped_at(token, Utc::now())
    }

    pub fn verify_scoped_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<ScopedToken, TokenError> {
        let claims = self.verify_at(token, now)?;
        match claims.scope {
            TokenScope::Provider => provider_token(claims).map(ScopedToken::Provider),
            TokenScope::Digest => digest_token(claims).map(ScopedToken::Digest),
        }
    }

    /// Verify a provider token. Digest tokens are rejected with
    /// [`TokenError::WrongScope`].
    pub fn verify_provider_token(&self, token: &str) -> Result<ProviderToken, TokenError> {
        match self.verify_scoped(token)? {
            ScopedToken::Provider(t) => Ok(t),
            other => Err(TokenError::WrongScope {
                expected: TokenScope::Provider,
                found: other.scope(),
            }),
        }
    }

    /// Verify a digest token. Provider tokens are rejected with
    /// [`TokenError::WrongScope`].
    pub fn verify_digest_token(&self, token: &str) -> Result<DigestToken, TokenError> {
        self.verify_digest_token_at(token, Utc::now())
    }

    pub fn verify_digest_token_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<DigestToken, TokenError> {
        match self.verify_scoped_at(token, now)? {
            ScopedToken::Digest(t) => Ok(t),
            other => Err(TokenError::WrongScope {
                expected: TokenScope::Digest,
                found: other.scope(),
            }),
        }
    }
}

fn issued_at(claims: &TokenClaims) -> Result<DateTime<Utc>, TokenError> {
    claims
        .issued_at()
        .ok_or_else(|| TokenError::Malformed("iat out of range".into()))
}

fn provider_token(claims: TokenClaims) -> Result<ProviderToken, TokenError> {
    let provider = ProviderName::new(&claims.sub)
        .map_err(|e| TokenError::Malformed(format!("subject: {e}")))?;
    if claims.claims.get(PROVIDER_CLAIM).map(String::as_str) != Some(provider.as_str()) {
        return Err(TokenError::Malformed("provider claim does not match subject".into()));
    }
    Ok(ProviderToken {
        issued_at: issued_at(&claims)?,
        provider,
    })
}

fn digest_token(claims: TokenClaims) -> Result<DigestToken, TokenError> {
    let digest = ContentDigest::from_hex(&claims.sub)
        .map_err(|e| TokenError::Malformed(format!("subject: {e}")))?;
    Ok(DigestToken {
        issued_at: issued_at(&claims)?,
        expires_at: claims.expires_at(),
        digest,
    })
}

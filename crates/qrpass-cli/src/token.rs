//! # Token Subcommand
//!
//! Mints provider and QR tokens and inspects existing ones. Tokens minted
//! here are accepted by any service configured with the same secret.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use qrpass_core::{ContentDigest, ProviderName};
use qrpass_crypto::{SigningSecret, TokenClaims, TokenCodec};

/// Arguments for `qrpass token`.
#[derive(Args, Debug)]
pub struct TokenArgs {
    /// Hex-encoded signing secret (at least 32 bytes).
    #[arg(long, env = "QRPASS_SIGNING_SECRET_HEX", hide_env_values = true)]
    pub secret_hex: String,

    #[command(subcommand)]
    pub command: TokenCommand,
}

/// Token subcommands.
#[derive(Subcommand, Debug)]
pub enum TokenCommand {
    /// Issue a provider reservation token.
    Reserve {
        /// Provider name.
        provider: String,
    },

    /// Issue a QR token for a record digest.
    Digest {
        /// Hex-encoded SHA-256 record digest.
        digest: String,
        /// Token lifetime in milliseconds.
        #[arg(long, default_value_t = 3_600_000)]
        ttl_ms: u64,
    },

    /// Verify a token and print its claims as JSON.
    Inspect {
        /// The token to verify.
        token: String,
    },
}

/// Execute the token subcommand.
pub fn run_token(args: &TokenArgs) -> Result<u8> {
    let secret = SigningSecret::from_hex(&args.secret_hex).context("invalid signing secret")?;
    let codec = TokenCodec::new(secret);

    match &args.command {
        TokenCommand::Reserve { provider } => {
            println!("{}", reserve(&codec, provider)?);
            Ok(0)
        }
        TokenCommand::Digest { digest, ttl_ms } => {
            println!("{}", digest_token(&codec, digest, *ttl_ms)?);
            Ok(0)
        }
        TokenCommand::Inspect { token } => match inspect(&codec, token) {
            Ok(claims) => {
                println!("{}", serde_json::to_string_pretty(&claims)?);
                Ok(0)
            }
            Err(e) => {
                println!("FAIL: {e}");
                Ok(1)
            }
        },
    }
}

pub fn reserve(codec: &TokenCodec, provider: &str) -> Result<String> {
    let provider = ProviderName::new(provider).context("invalid provider")?;
    Ok(codec.issue_provider_token(&provider)?)
}

pub fn digest_token(codec: &TokenCodec, digest_hex: &str, ttl_ms: u64) -> Result<String> {
    anyhow::ensure!(ttl_ms > 0, "--ttl-ms must be greater than 0");
    let digest = ContentDigest::from_hex(digest_hex.trim()).context("invalid digest")?;
    Ok(codec.issue_digest_token(&digest, Duration::from_millis(ttl_ms))?)
}

/// Verify signature and expiry; scope is reported, not enforced.
pub fn inspect(codec: &TokenCodec, token: &str) -> Result<TokenClaims, qrpass_crypto::TokenError> {
    codec.verify(token.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use qrpass_crypto::{TokenError, TokenScope};

    fn codec() -> TokenCodec {
        TokenCodec::new(SigningSecret::from_hex(&"5a".repeat(32)).unwrap())
    }

    #[test]
    fn reserve_then_inspect() {
        let codec = codec();
        let token = reserve(&codec, "acme").unwrap();
        let claims = inspect(&codec, &token).unwrap();
        assert_eq!(claims.scope, TokenScope::Provider);
        assert_eq!(claims.sub, "acme");
        assert!(claims.exp.is_none());
    }

    #[test]
    fn digest_token_carries_expiry() {
        let codec = codec();
        let hex = "ab".repeat(32);
        let token = digest_token(&codec, &hex, 60_000).unwrap();
        let claims = inspect(&codec, &token).unwrap();
        assert_eq!(claims.scope, TokenScope::Digest);
        assert_eq!(claims.sub, hex);
        assert_eq!(claims.exp, Some(claims.iat + 60_000));
    }

    #[test]
    fn zero_ttl_rejected() {
        assert!(digest_token(&codec(), &"ab".repeat(32), 0).is_err());
    }

    #[test]
    fn bad_digest_rejected() {
        assert!(digest_token(&codec(), "not-hex", 1000).is_err());
    }

    #[test]
    fn inspect_rejects_foreign_secret() {
        let other = TokenCodec::new(SigningSecret::from_hex(&"a5".repeat(32)).unwrap());
        let token = reserve(&other, "acme").unwrap();
        assert_eq!(inspect(&codec(), &token).unwrap_err(), TokenError::BadSignature);
    }
}

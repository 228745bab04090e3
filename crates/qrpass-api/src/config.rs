//! # Service Configuration
//!
//! Read once from the environment at startup. A missing or invalid value is
//! a [`ConfigError`] and the process refuses to start.
//!
//! | Variable                    | Default     |
//! |-----------------------------|-------------|
//! | `PORT`                      | `8080`      |
//! | `QRPASS_SIGNING_SECRET_HEX` | required    |
//! | `QRPASS_DEFAULT_TTL_MS`     | `3600000`   |
//! | `QRPASS_MAX_TTL_MS`         | 30 days     |
//! | `QRPASS_QR_MIN_PIXELS`      | `350`, at most `4096` |
//! | `QRPASS_LOG_JSON`           | off         |

use std::str::FromStr;
use std::time::Duration;

use qrpass_crypto::{SecretError, SigningSecret};
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_TTL_MS: u64 = 60 * 60 * 1000;
pub const DEFAULT_MAX_TTL_MS: u64 = 30 * 24 * 60 * 60 * 1000;
pub const DEFAULT_QR_MIN_PIXELS: u32 = 350;
/// Largest accepted minimum image edge.
pub const MAX_QR_PIXELS: u32 = 4096;

pub const ENV_PORT: &str = "PORT";
pub const ENV_SIGNING_SECRET: &str = "QRPASS_SIGNING_SECRET_HEX";
pub const ENV_DEFAULT_TTL: &str = "QRPASS_DEFAULT_TTL_MS";
pub const ENV_MAX_TTL: &str = "QRPASS_MAX_TTL_MS";
pub const ENV_QR_MIN_PIXELS: &str = "QRPASS_QR_MIN_PIXELS";
pub const ENV_LOG_JSON: &str = "QRPASS_LOG_JSON";

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("QRPASS_SIGNING_SECRET_HEX: {0}")]
    Secret(#[from] SecretError),
}

/// Application configuration.
pub struct AppConfig {
    pub port: u16,
    pub signing_secret: SigningSecret,
    /// TTL applied to QR tokens when the caller does not supply one.
    pub default_ttl: Duration,
    /// Upper bound on caller-supplied TTLs.
    pub max_ttl: Duration,
    pub qr_min_pixels: u32,
    pub log_json: bool,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("signing_secret", &"[REDACTED]")
            .field("default_ttl", &self.default_ttl)
            .field("max_ttl", &self.max_ttl)
            .field("qr_min_pixels", &self.qr_min_pixels)
            .field("log_json", &self.log_json)
            .finish()
    }
}

impl AppConfig {
    /// Build configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let secret_hex = lookup(ENV_SIGNING_SECRET).ok_or(ConfigError::Missing(ENV_SIGNING_SECRET))?;
        let signing_secret = SigningSecret::from_hex(&secret_hex)?;

        let port = parse_or(&lookup, ENV_PORT, DEFAULT_PORT)?;
        let default_ttl_ms = parse_or(&lookup, ENV_DEFAULT_TTL, DEFAULT_TTL_MS)?;
        let max_ttl_ms = parse_or(&lookup, ENV_MAX_TTL, DEFAULT_MAX_TTL_MS)?;
        let qr_min_pixels = parse_or(&lookup, ENV_QR_MIN_PIXELS, DEFAULT_QR_MIN_PIXELS)?;

        if default_ttl_ms == 0 {
            return Err(ConfigError::Invalid {
                var: ENV_DEFAULT_TTL,
                reason: "must be greater than zero".into(),
            });
        }
        if max_ttl_ms < default_ttl_ms {
            return Err(ConfigError::Invalid {
                var: ENV_MAX_TTL,
                reason: format!("must be at least {ENV_DEFAULT_TTL} ({default_ttl_ms})"),
            });
        }
        if qr_min_pixels == 0 {
            return Err(ConfigError::Invalid {
                var: ENV_QR_MIN_PIXELS,
                reason: "must be greater than zero".into(),
            });
        }
        if qr_min_pixels > MAX_QR_PIXELS {
            return Err(ConfigError::Invalid {
                var: ENV_QR_MIN_PIXELS,
                reason: format!("must not exceed {MAX_QR_PIXELS}"),
            });
        }

        let log_json = matches!(
            lookup(ENV_LOG_JSON).as_deref().map(str::trim),
            Some("1") | Some("true")
        );

        Ok(Self {
            port,
            signing_secret,
            default_ttl: Duration::from_millis(default_ttl_ms),
            max_ttl: Duration::from_millis(max_ttl_ms),
            qr_min_pixels,
            log_json,
        })
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
        }),
    }
}

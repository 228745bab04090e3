//! # qrpass-cli — Operator Tooling for QR Trip Passes
//!
//! Offline access to the same primitives the API service uses, for support
//! staff and integration testing:
//!
//! - `qrpass digest` — Content digest of a trip record.
//! - `qrpass token` — Mint provider or QR tokens, inspect any token.
//! - `qrpass render` — Render a payload as a PNG QR code.
//!
//! ```bash
//! qrpass digest --provider acme trip.json
//! qrpass token reserve acme
//! qrpass token inspect "$TOKEN"
//! qrpass render "$TOKEN" --output pass.png
//! ```
//!
//! Token commands read the signing secret from `--secret-hex` or
//! `QRPASS_SIGNING_SECRET_HEX`, the variable the API service uses.

pub mod digest;
pub mod render;
pub mod token;

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Read a file, or stdin when the path is absent or `-`.
pub fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) if p != Path::new("-") => std::fs::read_to_string(p)
            .with_context(|| format!("failed to read {}", p.display())),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

/// Default output file for `qrpass render`.
pub fn default_png_path() -> PathBuf {
    PathBuf::from("qrcode.png")
}

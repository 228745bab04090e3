//! # Digest Subcommand
//!
//! Prints the SHA-256 digest of a trip record exactly as the service
//! computes it at generation time: the request is validated, bound to the
//! provider, canonicalized, then hashed.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use qrpass_core::{ContentDigest, ProviderName, TripRequest};

/// Arguments for `qrpass digest`.
#[derive(Args, Debug)]
pub struct DigestArgs {
    /// Provider the record belongs to.
    #[arg(long)]
    pub provider: String,

    /// Trip request JSON. Reads stdin when omitted or `-`.
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,
}

/// Execute the digest subcommand.
pub fn run_digest(args: &DigestArgs) -> Result<u8> {
    let input = crate::read_input(args.file.as_deref())?;
    let digest = record_digest(&input, &args.provider)?;
    println!("{}", digest.to_hex());
    Ok(0)
}

/// Digest of the record described by `json` under `provider`.
pub fn record_digest(json: &str, provider: &str) -> Result<ContentDigest> {
    let request: TripRequest =
        serde_json::from_str(json).context("failed to parse trip request JSON")?;
    let provider = ProviderName::new(provider).context("invalid provider")?;
    let record = request.into_record(provider).context("invalid trip request")?;
    tracing::debug!(trip_id = record.trip_id.value(), "computing record digest");
    record.digest().context("failed to canonicalize record")
}

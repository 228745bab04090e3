//! # Render Subcommand
//!
//! Writes a payload as a PNG QR code using the service's renderer.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use qrpass_api::config::{DEFAULT_QR_MIN_PIXELS, MAX_QR_PIXELS};
use qrpass_api::render::QrRenderer;

/// Arguments for `qrpass render`.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Text to encode, typically a QR token.
    pub payload: String,

    /// Output PNG path.
    #[arg(long, short, default_value_os_t = crate::default_png_path())]
    pub output: PathBuf,

    /// Minimum image side length in pixels.
    #[arg(
        long,
        default_value_t = DEFAULT_QR_MIN_PIXELS,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_QR_PIXELS))
    )]
    pub min_pixels: u32,
}

/// Execute the render subcommand.
pub fn run_render(args: &RenderArgs) -> Result<u8> {
    let renderer = QrRenderer::new().with_min_pixels(args.min_pixels);
    let rendered = renderer
        .render(args.payload.trim())
        .context("failed to render QR code")?;

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(&args.output, &rendered.png)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    println!("OK: wrote {}", args.output.display());
    println!("  QR version: {}", rendered.version);
    println!("  Size:       {0}x{0} px", rendered.pixels);
    Ok(0)
}

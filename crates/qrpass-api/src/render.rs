//! # QR Rendering
//!
//! Turns an opaque token string into a PNG QR symbol. The server never
//! decodes images; scanning devices send back the decoded payload string.
//!
//! The symbol version is the smallest that holds the payload at the
//! configured error-correction level. The pixel size of a module is then
//! chosen so the whole image, quiet zone included, is at least
//! `min_pixels` wide. Requests above [`MAX_QR_PIXELS`] are refused before
//! any image is allocated.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Luma};
use qrcode::types::QrError;
use qrcode::{EcLevel, QrCode, Version};
use thiserror::Error;

use crate::config::{DEFAULT_QR_MIN_PIXELS, MAX_QR_PIXELS};

/// Pixels per module when the minimum edge does not demand more.
pub const DEFAULT_MODULE_PIXELS: u32 = 4;

/// Quiet zone width in modules on each side.
const QUIET_ZONE_MODULES: u32 = 4;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("payload is empty")]
    EmptyPayload,

    #[error("payload of {len} bytes exceeds QR capacity at this error-correction level")]
    PayloadTooLarge { len: usize },

    #[error("minimum image size of {requested} px exceeds the limit of {max} px")]
    ImageTooLarge { requested: u32, max: u32 },

    #[error("QR encoding failed: {0}")]
    Encode(String),

    #[error("PNG encoding failed: {0}")]
    Image(#[from] image::ImageError),
}

/// A rendered QR symbol.
#[derive(Debug, Clone)]
pub struct RenderedQr {
    pub png: Vec<u8>,
    /// QR symbol version (1 to 40).
    pub version: i16,
    /// Modules per side, excluding the quiet zone.
    pub modules: u32,
    /// Image edge in pixels.
    pub pixels: u32,
}

/// Renders payloads to PNG QR codes.
#[derive(Debug, Clone, Copy)]
pub struct QrRenderer {
    ec_level: EcLevel,
    min_pixels: u32,
    module_pixels: u32,
}

impl Default for QrRenderer {
    fn default() -> Self {
        Self {
            ec_level: EcLevel::M,
            min_pixels: DEFAULT_QR_MIN_PIXELS,
            module_pixels: DEFAULT_MODULE_PIXELS,
        }
    }
}

impl QrRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_pixels(mut self, min_pixels: u32) -> Self {
        self.min_pixels = min_pixels.max(1);
        self
    }

    pub fn with_error_correction(mut self, ec_level: EcLevel) -> Self {
        self.ec_level = ec_level;
        self
    }

    pub fn render(&self, payload: &str) -> Result<RenderedQr, RenderError> {
        if payload.is_empty() {
            return Err(RenderError::EmptyPayload);
        }
        if self.min_pixels > MAX_QR_PIXELS {
            return Err(RenderError::ImageTooLarge {
                requested: self.min_pixels,
                max: MAX_QR_PIXELS,
            });
        }
        let code = QrCode::with_error_correction_level(payload.as_bytes(), self.ec_level)
            .map_err(|e| match e {
                QrError::DataTooLong => RenderError::PayloadTooLarge { len: payload.len() },
                other => RenderError::Encode(other.to_string()),
            })?;

        let version = match code.version() {
            Version::Normal(v) | Version::Micro(v) => v,
        };
        let modules = u32::try_from(code.width())
            .map_err(|_| RenderError::Encode("symbol width out of range".into()))?;
        let span = modules + 2 * QUIET_ZONE_MODULES;
        let unit = self.module_pixels.max(self.min_pixels.div_ceil(span));

        let bitmap = code
            .render::<Luma<u8>>()
            .quiet_zone(true)
            .module_dimensions(unit, unit)
            .build();
        let pixels = bitmap.width();

        let mut png = Vec::new();
        DynamicImage::ImageLuma8(bitmap).write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        Ok(RenderedQr {
            png,
            version,
            modules,
            pixels,
        })
    }
}

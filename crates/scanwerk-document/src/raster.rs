// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Normalised raster — the binary, deskewed page handed to an OCR engine.

use std::path::Path;

use image::{GrayImage, ImageFormat};
use scanwerk_core::error::{Result, ScanwerkError};
use tracing::debug;

/// Pixel value of paper (above the Otsu threshold).
pub const PAPER: u8 = 255;
/// Pixel value of ink (at or below the Otsu threshold).
pub const INK: u8 = 0;

/// A single-channel black/white page produced by one normalisation call.
///
/// Never cached: every call to
/// [`ImageNormalizer::normalize`](crate::ImageNormalizer::normalize) builds a
/// fresh one, and it lives only as long as the recognition request that
/// needed it.
#[derive(Debug, Clone)]
pub struct NormalizedRaster {
    pixels: GrayImage,
    /// Otsu threshold computed for the source.
    threshold: u8,
    /// Rotation applied during deskew, degrees counter-clockwise (0 if skipped).
    skew_correction_degrees: f64,
}

impl NormalizedRaster {
    pub(crate) fn new(pixels: GrayImage, threshold: u8, skew_correction_degrees: f64) -> Self {
        Self {
            pixels,
            threshold,
            skew_correction_degrees,
        }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    pub fn skew_correction_degrees(&self) -> f64 {
        self.skew_correction_degrees
    }

    /// Borrow the pixel buffer.
    pub fn as_gray(&self) -> &GrayImage {
        &self.pixels
    }

    /// True when every pixel is either [`INK`] or [`PAPER`].
    pub fn is_binary(&self) -> bool {
        self.pixels.pixels().all(|p| p.0[0] == INK || p.0[0] == PAPER)
    }

    pub fn ink_pixel_count(&self) -> usize {
        self.pixels.pixels().filter(|p| p.0[0] == INK).count()
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the raster as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);
        self.pixels
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|err| ScanwerkError::InvalidImage(format!("PNG encoding failed: {}", err)))?;
        Ok(buffer)
    }

    /// Write the raster to `path` as PNG, whatever the extension says.
    pub fn write_png(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.to_png_bytes()?;
        std::fs::write(path.as_ref(), &bytes)?;
        debug!(
            path = %path.as_ref().display(),
            bytes = bytes.len(),
            "Normalised raster written"
        );
        Ok(())
    }
}

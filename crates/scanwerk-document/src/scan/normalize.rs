// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan normalisation pipeline — grayscale, noise suppression, Otsu
// binarization and deskew, producing the raster an OCR engine is fed.

use image::{DynamicImage, GrayImage};
use imageproc::filter::separable_filter_equal;
use scanwerk_core::error::Result;
use scanwerk_core::types::SourceImage;
use tracing::{debug, info, instrument};

use crate::pdf::rasterize::{DefaultRasterizer, PageRasterizer};
use crate::raster::{INK, NormalizedRaster, PAPER};
use crate::scan::deskew::rotate_about_center;
use crate::scan::skew::estimate_skew;
use crate::source::load_source;

/// Separable 3×3 Gaussian (binomial) kernel. Fixed, never configured.
const GAUSSIAN_3X3: [f32; 3] = [0.25, 0.5, 0.25];

/// Corrections smaller than this are not worth a resampling pass.
const MIN_CORRECTION_DEGREES: f64 = 0.01;

/// Midpoint used to snap the interpolated deskew output back to black/white.
const REBINARIZE_THRESHOLD: u8 = 127;

/// Turns a scanned page into a clean, axis-aligned binary raster.
///
/// The normaliser is stateless apart from the PDF rasteriser used for PDF
/// sources; it never writes to the source and keeps no pixels between calls.
///
/// ## Pipeline
///
/// 1. Reduce to single-channel luminance
/// 2. 3×3 Gaussian blur to suppress scan noise
/// 3. Otsu global threshold: above → 255 (paper), otherwise 0 (ink)
/// 4. Fit a minimum-area rectangle around the ink to estimate skew
/// 5. Rotate about the centre (bicubic, replicated borders) to level the text
///
/// A page without ink skips steps 4 and 5.
pub struct ImageNormalizer {
    rasterizer: Box<dyn PageRasterizer>,
}

impl ImageNormalizer {
    // -- Construction ---------------------------------------------------------

    /// Normaliser using the default PDF rasteriser (embedded scan, then Poppler).
    pub fn new() -> Self {
        Self::with_rasterizer(DefaultRasterizer::default())
    }

    /// Normaliser with a specific PDF rasteriser.
    pub fn with_rasterizer(rasterizer: impl PageRasterizer + 'static) -> Self {
        Self {
            rasterizer: Box::new(rasterizer),
        }
    }

    // -- Normalisation --------------------------------------------------------

    /// Decode `source` and normalise it.
    ///
    /// # Errors
    ///
    /// [`ScanwerkError::InvalidImage`](scanwerk_core::ScanwerkError::InvalidImage)
    /// if the file is not a decodable raster, or a PDF error if the first page
    /// of a PDF cannot be rasterised.
    #[instrument(skip_all, fields(path = %source.path().display()))]
    pub fn normalize(&self, source: &SourceImage) -> Result<NormalizedRaster> {
        let image = load_source(source, self.rasterizer.as_ref())?;
        Ok(self.normalize_image(&image))
    }

    /// Normalise an already-decoded image.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn normalize_image(&self, image: &DynamicImage) -> NormalizedRaster {
        info!(
            width = image.width(),
            height = image.height(),
            "Normalising page"
        );

        // Step 1: Grayscale conversion.
        let gray = image.to_luma8();

        // Step 2: Noise suppression.
        let smoothed = suppress_noise(&gray);

        // Step 3: Otsu binarization.
        let threshold = otsu_threshold(&smoothed);
        let binary = binarize(&smoothed, threshold);
        debug!(threshold, "Otsu threshold computed");

        // Steps 4+5: Skew estimation and deskew.
        let Some(estimate) = estimate_skew(&binary) else {
            info!("No ink found; skipping deskew");
            return NormalizedRaster::new(binary, threshold, 0.0);
        };

        let correction = estimate.correction_degrees;
        if correction.abs() < MIN_CORRECTION_DEGREES {
            debug!(correction, "Page already level");
            return NormalizedRaster::new(binary, threshold, 0.0);
        }

        let rotated = rotate_about_center(&binary, correction);
        let deskewed = binarize(&rotated, REBINARIZE_THRESHOLD);
        info!(correction_degrees = correction, "Page deskewed");

        NormalizedRaster::new(deskewed, threshold, correction)
    }
}

impl Default for ImageNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

// -- Pipeline steps -----------------------------------------------------------

/// Smooth with the fixed 3×3 Gaussian. Edges are clamped.
pub fn suppress_noise(gray: &GrayImage) -> GrayImage {
    separable_filter_equal(gray, &GAUSSIAN_3X3)
}

/// Map pixels above `threshold` to paper (255) and the rest to ink (0).
pub fn binarize(gray: &GrayImage, threshold: u8) -> GrayImage {
    let mut output = gray.clone();
    for pixel in output.pixels_mut() {
        pixel.0[0] = if pixel.0[0] > threshold { PAPER } else { INK };
    }
    output
}

/// Compute the Otsu threshold for a grayscale image.
///
/// Finds the value that maximises the between-class variance of the two
/// pixel groups `[0, t]` and `(t, 255]`. Ties keep the lowest `t`. A
/// single-valued image yields 0, so a blank white page stays white.
pub fn otsu_threshold(gray: &GrayImage) -> u8 {
    // Build histogram.
    let mut histogram = [0u64; 256];
    for pixel in gray.pixels() {
        histogram[pixel.0[0] as usize] += 1;
    }

    let total_pixels = gray.width() as u64 * gray.height() as u64;
    if total_pixels == 0 {
        return 0;
    }

    let sum_total: f64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &count)| i as f64 * count as f64)
        .sum();

    let mut sum_background: f64 = 0.0;
    let mut weight_background: u64 = 0;
    let mut max_variance: f64 = 0.0;
    let mut best_threshold: u8 = 0;

    for (t, &count) in histogram.iter().enumerate() {
        weight_background += count;
        if weight_background == 0 {
            continue;
        }
        let weight_foreground = total_pixels - weight_background;
        if weight_foreground == 0 {
            break;
        }

        sum_background += t as f64 * count as f64;
        let mean_background = sum_background / weight_background as f64;
        let mean_foreground = (sum_total - sum_background) / weight_foreground as f64;

        let between_variance = weight_background as f64
            * weight_foreground as f64
            * (mean_background - mean_foreground).powi(2);

        if between_variance > max_variance {
            max_variance = between_variance;
            best_threshold = t as u8;
        }
    }

    best_threshold
}

// -- Tests --------------------------------------------------------------------

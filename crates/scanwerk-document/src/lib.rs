// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanwerk-document — Page handling for the Scanwerk OCR front end.
//
// Loads scans (raster files, or the first page of a PDF), normalises them into
// a binary, deskewed raster ready for an OCR engine, and exports recognised
// text as plain text or PDF.

pub mod export;
pub mod pdf;
pub mod raster;
pub mod scan;
pub mod source;

#[cfg(test)]
mod test_support;

// Re-export the primary types so callers can use `scanwerk_document::ImageNormalizer` etc.
pub use export::{ExportFormat, export_text};
pub use pdf::rasterize::{DefaultRasterizer, PageRasterizer};
pub use pdf::writer::PdfWriter;
pub use raster::NormalizedRaster;
pub use scan::normalize::ImageNormalizer;
pub use scan::skew::{SkewEstimate, estimate_skew};

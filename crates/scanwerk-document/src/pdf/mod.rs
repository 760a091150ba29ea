// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — first-page rasterisation of PDF sources and text-PDF output.

pub mod rasterize;
pub mod writer;

pub use rasterize::{DefaultRasterizer, EmbeddedScanExtractor, PageRasterizer, PopplerRasterizer};
pub use writer::PdfWriter;

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Source loading — decode a scan from disk, rasterising PDFs on the way.

use image::DynamicImage;
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::types::{SourceImage, SourceKind};
use tracing::debug;

use crate::pdf::rasterize::PageRasterizer;

/// Decode `source` into pixels. The file is only ever read.
///
/// Raster formats are detected from the file contents, not the extension.
pub fn load_source(source: &SourceImage, rasterizer: &dyn PageRasterizer) -> Result<DynamicImage> {
    let path = source.path();
    match source.kind() {
        SourceKind::Pdf => {
            debug!(rasterizer = rasterizer.name(), "Rasterising PDF source");
            rasterizer.first_page(path)
        }
        SourceKind::Raster => {
            let bytes = std::fs::read(path)?;
            image::load_from_memory(&bytes).map_err(|err| {
                ScanwerkError::InvalidImage(format!("{}: {}", path.display(), err))
            })
        }
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text export — save recognised text as plain UTF-8 or as a text PDF.

use std::path::Path;

use scanwerk_core::error::{Result, ScanwerkError};
use tracing::{info, instrument};

use crate::pdf::writer::PdfWriter;

/// Output document format, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    PlainText,
    Pdf,
}

impl ExportFormat {
    /// `.pdf` (any case) is a PDF; everything else is plain text.
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("pdf") => ExportFormat::Pdf,
            _ => ExportFormat::PlainText,
        }
    }
}

/// Write `text` to `path` in the format its extension asks for.
#[instrument(skip(text), fields(path = %path.display(), text_len = text.len()))]
pub fn export_text(text: &str, path: &Path) -> Result<ExportFormat> {
    let format = ExportFormat::for_path(path);
    match format {
        ExportFormat::Pdf => {
            let title = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "Recognised text".into());
            PdfWriter::new()
                .with_title(title)
                .write_text_to_file(text, path)
                .map_err(|err| ScanwerkError::Export(err.to_string()))?;
        }
        ExportFormat::PlainText => {
            std::fs::write(path, text)
                .map_err(|err| ScanwerkError::Export(format!("{}: {}", path.display(), err)))?;
        }
    }
    info!(?format, "Text exported");
    Ok(format)
}

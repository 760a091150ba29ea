// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Scanwerk.

use std::time::Duration;

use thiserror::Error;

/// Top-level error type for all Scanwerk operations.
#[derive(Debug, Error)]
pub enum ScanwerkError {
    // -- Normalisation errors --
    #[error("invalid image: {0}")]
    InvalidImage(String),

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    // -- Engine dispatch errors --
    /// The executable is not on the search path, or vanished before launch.
    #[error("OCR engine '{engine}' not found: {reason}")]
    EngineNotFound { engine: String, reason: String },

    #[error("unsupported OCR engine: {0}")]
    UnsupportedEngine(String),

    #[error("OCR engine '{engine}' did not finish within {timeout:?}")]
    EngineTimeout { engine: String, timeout: Duration },

    // -- Output --
    #[error("export failed: {0}")]
    Export(String),

    // -- Configuration / persistence --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScanwerkError>;

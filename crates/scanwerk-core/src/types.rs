// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Scanwerk recognition pipeline.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ScanwerkError;

/// Language hint used when the caller leaves it blank.
pub const DEFAULT_LANGUAGE: &str = "eng";

/// Unique identifier for one recognition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First eight hex digits, used to tag temporary file names.
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// External recognition engines Scanwerk knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineId {
    /// GOCR: image path in, text on standard output.
    Gocr,
    /// Cuneiform: image path in, text written to an `-o` output file.
    Cuneiform,
}

impl EngineId {
    /// Every engine, in the order they are offered to the operator.
    pub const ALL: [EngineId; 2] = [EngineId::Gocr, EngineId::Cuneiform];

    /// Name of the executable looked up on the search path.
    pub fn executable(&self) -> &'static str {
        match self {
            Self::Gocr => "gocr",
            Self::Cuneiform => "cuneiform",
        }
    }

    /// Whether the engine makes any use of the language hint.
    pub fn uses_language_hint(&self) -> bool {
        matches!(self, Self::Cuneiform)
    }
}

impl std::fmt::Display for EngineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.executable())
    }
}

impl FromStr for EngineId {
    type Err = ScanwerkError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "gocr" => Ok(Self::Gocr),
            "cuneiform" => Ok(Self::Cuneiform),
            _ => Err(ScanwerkError::UnsupportedEngine(name.to_string())),
        }
    }
}

/// Which engine to run, and the language hint to give it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSpec {
    pub engine_id: EngineId,
    /// Only meaningful to Cuneiform; passed through verbatim.
    pub language_hint: String,
}

impl EngineSpec {
    /// Build a spec. A blank language hint falls back to [`DEFAULT_LANGUAGE`].
    pub fn new(engine_id: EngineId, language_hint: impl Into<String>) -> Self {
        let language_hint = language_hint.into();
        let language_hint = if language_hint.trim().is_empty() {
            DEFAULT_LANGUAGE.to_string()
        } else {
            language_hint.trim().to_string()
        };
        Self {
            engine_id,
            language_hint,
        }
    }

    pub fn gocr() -> Self {
        Self::new(EngineId::Gocr, DEFAULT_LANGUAGE)
    }

    pub fn cuneiform(language_hint: impl Into<String>) -> Self {
        Self::new(EngineId::Cuneiform, language_hint)
    }

    /// Build a spec from an operator-supplied engine name.
    ///
    /// Fails with [`ScanwerkError::UnsupportedEngine`] for unknown names.
    pub fn from_names(engine: &str, language_hint: &str) -> Result<Self, ScanwerkError> {
        Ok(Self::new(engine.parse()?, language_hint))
    }
}

impl Default for EngineSpec {
    fn default() -> Self {
        Self::gocr()
    }
}

/// How a [`SourceImage`] has to be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    /// Any raster format the `image` crate decodes (PNG, JPEG, BMP, TIFF…).
    Raster,
    /// A PDF; only the first page is rasterised.
    Pdf,
}

/// A document selected by the operator, referenced by path only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceImage {
    path: PathBuf,
}

impl SourceImage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Classify the source by its (case-insensitive) extension.
    pub fn kind(&self) -> SourceKind {
        let is_pdf = self
            .path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if is_pdf {
            SourceKind::Pdf
        } else {
            SourceKind::Raster
        }
    }
}

impl From<&Path> for SourceImage {
    fn from(path: &Path) -> Self {
        Self::new(path)
    }
}

impl From<PathBuf> for SourceImage {
    fn from(path: PathBuf) -> Self {
        Self::new(path)
    }
}

/// Text recognised from one source by one engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionResult {
    pub request_id: RequestId,
    /// Trimmed engine output. Empty means "no text found", not failure.
    pub text: String,
    pub engine_used: EngineSpec,
    pub completed_at: DateTime<Utc>,
}

impl RecognitionResult {
    pub fn new(request_id: RequestId, text: String, engine_used: EngineSpec) -> Self {
        Self {
            request_id,
            text,
            engine_used,
            completed_at: Utc::now(),
        }
    }

    /// Number of recognised characters (not bytes).
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

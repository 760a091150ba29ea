// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scoped temporary artifacts — per-request files that are deleted when they
// go out of scope, on success and on every error path alike.

use std::path::{Path, PathBuf};

use scanwerk_core::error::Result;
use scanwerk_core::types::RequestId;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Where one request puts its temporary files, and how they are named.
#[derive(Debug, Clone)]
pub struct ScratchSpace {
    /// System temp dir when `None`.
    dir: Option<PathBuf>,
    request_id: RequestId,
}

impl ScratchSpace {
    pub fn new(dir: Option<PathBuf>, request_id: RequestId) -> Self {
        Self { dir, request_id }
    }

    /// Create a new, empty, uniquely named file such as
    /// `scanwerk-1a2b3c4d-raster-XXXXXX.png`.
    pub fn artifact(&self, label: &str, suffix: &str) -> Result<ScopedArtifact> {
        let prefix = format!("scanwerk-{}-{}-", self.request_id.short(), label);
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix).suffix(suffix);
        let file = match &self.dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        let path = file.path().to_path_buf();
        debug!(path = %path.display(), "Temporary artifact created");
        Ok(ScopedArtifact {
            file: Some(file),
            path,
        })
    }
}

/// A temporary file removed on drop.
///
/// Removal failures are logged and swallowed; they never mask the outcome of
/// the request that owned the file.
#[derive(Debug)]
pub struct ScopedArtifact {
    file: Option<NamedTempFile>,
    path: PathBuf,
}

impl ScopedArtifact {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScopedArtifact {
    fn drop(&mut self) {
        let Some(file) = self.file.take() else {
            return;
        };
        match file.close() {
            Ok(()) => debug!(path = %self.path.display(), "Temporary artifact removed"),
            Err(err) => warn!(
                path = %self.path.display(),
                error = %err,
                "Failed to remove temporary artifact"
            ),
        }
    }
}

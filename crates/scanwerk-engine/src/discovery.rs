// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Engine discovery — resolve engine executables on the search path.

use std::path::PathBuf;

use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::types::EngineId;
use serde::Serialize;
use tracing::debug;

/// Availability of one engine, as reported to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineAvailability {
    pub engine: EngineId,
    /// Resolved executable, `None` if the engine is not installed.
    pub executable: Option<PathBuf>,
}

impl EngineAvailability {
    pub fn is_available(&self) -> bool {
        self.executable.is_some()
    }
}

/// Looks engine executables up on `PATH`, or on an explicit search path.
#[derive(Debug, Clone, Default)]
pub struct EngineLocator {
    search_path: Option<String>,
}

impl EngineLocator {
    /// `None` searches the process `PATH`.
    pub fn new(search_path: Option<String>) -> Self {
        Self { search_path }
    }

    /// Resolve the executable for `engine`.
    ///
    /// Fails with [`ScanwerkError::EngineNotFound`] if it is not installed.
    pub fn locate(&self, engine: EngineId) -> Result<PathBuf> {
        let name = engine.executable();
        let resolved = match &self.search_path {
            Some(paths) => {
                let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
                which::which_in(name, Some(paths), cwd)
            }
            None => which::which(name),
        };

        match resolved {
            Ok(path) => {
                debug!(engine = %engine, path = %path.display(), "Engine resolved");
                Ok(path)
            }
            Err(err) => Err(ScanwerkError::EngineNotFound {
                engine: name.to_string(),
                reason: err.to_string(),
            }),
        }
    }

    pub fn is_available(&self, engine: EngineId) -> bool {
        self.locate(engine).is_ok()
    }

    /// Report for every known engine.
    pub fn survey(&self) -> Vec<EngineAvailability> {
        EngineId::ALL
            .iter()
            .map(|&engine| EngineAvailability {
                engine,
                executable: self.locate(engine).ok(),
            })
            .collect()
    }
}

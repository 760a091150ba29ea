// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Invocation protocols — how each engine is called and where its text comes
// back.
//
//   gocr <raster>                                     text on stdout
//   cuneiform -l <lang> -f text -o <out> <raster>     text in <out>

use std::ffi::OsString;
use std::path::Path;

use scanwerk_core::error::Result;
use scanwerk_core::types::{EngineId, EngineSpec};
use tracing::{debug, warn};

use crate::artifact::{ScopedArtifact, ScratchSpace};
use crate::process::EngineOutput;

/// Where an engine leaves its recognised text.
#[derive(Debug)]
pub enum TextChannel {
    Stdout,
    /// A scoped output file, removed once the text has been read.
    OutputFile(ScopedArtifact),
}

/// Arguments for one engine run, plus where to collect the text afterwards.
#[derive(Debug)]
pub struct Invocation {
    pub args: Vec<OsString>,
    pub channel: TextChannel,
}

impl Invocation {
    /// Build the command line for `spec` on the normalised raster at `raster`.
    ///
    /// Cuneiform gets its own output artifact in `scratch`.
    pub fn for_engine(spec: &EngineSpec, raster: &Path, scratch: &ScratchSpace) -> Result<Self> {
        match spec.engine_id {
            EngineId::Gocr => Ok(Self {
                args: vec![raster.as_os_str().to_owned()],
                channel: TextChannel::Stdout,
            }),
            EngineId::Cuneiform => {
                let output = scratch.artifact("text", ".txt")?;
                let args = vec![
                    OsString::from("-l"),
                    OsString::from(&spec.language_hint),
                    OsString::from("-f"),
                    OsString::from("text"),
                    OsString::from("-o"),
                    output.path().as_os_str().to_owned(),
                    raster.as_os_str().to_owned(),
                ];
                Ok(Self {
                    args,
                    channel: TextChannel::OutputFile(output),
                })
            }
        }
    }

    /// Extract the recognised text, decoded permissively and trimmed.
    ///
    /// Consumes the invocation so any output file is deleted here. A missing
    /// or unreadable output file yields empty text.
    pub fn collect(self, engine: EngineId, output: &EngineOutput) -> String {
        if !output.stderr.is_empty() {
            debug!(
                engine = %engine,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "Engine diagnostics"
            );
        }

        match self.channel {
            TextChannel::Stdout => decode_text(&output.stdout),
            TextChannel::OutputFile(file) => match std::fs::read(file.path()) {
                Ok(bytes) => decode_text(&bytes),
                Err(err) => {
                    warn!(
                        engine = %engine,
                        path = %file.path().display(),
                        error = %err,
                        "Engine output file unreadable"
                    );
                    String::new()
                }
            },
        }
    }
}

/// Lossy UTF-8 decode (invalid sequences become U+FFFD), then trim.
pub fn decode_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim().to_string()
}

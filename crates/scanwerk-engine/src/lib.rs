// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanwerk-engine — Dispatch of normalised scans to external OCR engines.
//
// Engines are separate executables (gocr, cuneiform) resolved on the search
// path and run once per request. Each request owns uniquely named temporary
// files that are removed before the call returns.

pub mod artifact;
pub mod discovery;
pub mod dispatcher;
pub mod process;
pub mod protocol;

#[cfg(all(test, unix))]
mod test_support;

pub use discovery::{EngineAvailability, EngineLocator};
pub use dispatcher::{DispatcherConfig, EngineDispatcher};

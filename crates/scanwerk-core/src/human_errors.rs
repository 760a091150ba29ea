// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the operator.
//
// Every technical error is mapped to plain English with a clear suggestion.
// The severity drives how the caller presents it.

use crate::error::ScanwerkError;

/// Severity of an error from the operator's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Worth trying again as-is (engine hung, disk hiccup).
    Transient,
    /// The operator must change something first (install engine, pick file).
    ActionRequired,
    /// Retrying will not help: wrong input or a programming error.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the operator should try (shown as body text).
    pub suggestion: String,
    /// Whether the same request may succeed if repeated.
    pub retriable: bool,
    pub severity: Severity,
}

impl std::fmt::Display for HumanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\n{}", self.message, self.suggestion)
    }
}

/// Convert a `ScanwerkError` into a `HumanError` an operator can act on.
pub fn humanize_error(err: &ScanwerkError) -> HumanError {
    match err {
        ScanwerkError::InvalidImage(_) => HumanError {
            message: "This file doesn't look like an image we can read.".into(),
            suggestion: "Choose a PNG, JPEG or BMP scan, or a PDF. If it is one, it may be damaged; try exporting it again.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        ScanwerkError::PdfError(_) => HumanError {
            message: "We couldn't get a page image out of this PDF.".into(),
            suggestion: "Install poppler-utils (pdftoppm) for PDFs that aren't plain scans, or export the first page as an image.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanwerkError::EngineNotFound { engine, .. } => HumanError {
            message: format!("The '{engine}' OCR engine isn't installed."),
            suggestion: format!(
                "Install it (for example `sudo apt install {engine}`) or choose another engine."
            ),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanwerkError::UnsupportedEngine(name) => HumanError {
            message: format!("'{name}' isn't an OCR engine we support."),
            suggestion: "Choose gocr or cuneiform.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        ScanwerkError::EngineTimeout { engine, timeout } => HumanError {
            message: format!("The '{engine}' engine took too long and was stopped."),
            suggestion: format!(
                "It ran for more than {} seconds. Try a smaller or cleaner scan, another engine, or raise the timeout.",
                timeout.as_secs()
            ),
            retriable: true,
            severity: Severity::Transient,
        },

        ScanwerkError::Export(detail) => HumanError {
            message: "The recognised text couldn't be saved.".into(),
            suggestion: format!("Try saving as a .txt file instead. ({detail})"),
            retriable: true,
            severity: Severity::Transient,
        },

        ScanwerkError::Config(detail) => HumanError {
            message: "The settings file has a mistake in it.".into(),
            suggestion: format!("Fix the setting and try again. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanwerkError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError {
                message: "The file couldn't be found.".into(),
                suggestion: "It may have been moved or deleted. Try choosing the file again.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "We don't have permission to use that file or folder.".into(),
                suggestion: "Check the permissions, or copy the file somewhere you own first.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            _ => HumanError {
                message: "There was a problem reading or writing a file.".into(),
                suggestion: "Try again. If this keeps happening, the disk may be full.".into(),
                retriable: true,
                severity: Severity::Transient,
            },
        },

        ScanwerkError::Serialization(_) => HumanError {
            message: "Some data couldn't be read or written.".into(),
            suggestion: "If this came from the settings file, check it is valid JSON.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn missing_engine_asks_for_install() {
        let err = ScanwerkError::EngineNotFound {
            engine: "cuneiform".into(),
            reason: "not on PATH".into(),
        };
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(human.suggestion.contains("apt install cuneiform"));
        assert!(!human.retriable);
    }

    #[test]
    fn timeout_is_transient() {
        let err = ScanwerkError::EngineTimeout {
            engine: "gocr".into(),
            timeout: Duration::from_secs(300),
        };
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::Transient);
        assert!(human.retriable);
        assert!(human.suggestion.contains("300"));
    }

    #[test]
    fn bad_image_is_permanent() {
        let human = humanize_error(&ScanwerkError::InvalidImage("not a PNG".into()));
        assert_eq!(human.severity, Severity::Permanent);
    }

    #[test]
    fn unsupported_engine_is_permanent() {
        let human = humanize_error(&ScanwerkError::UnsupportedEngine("ocrad".into()));
        assert_eq!(human.severity, Severity::Permanent);
        assert!(human.message.contains("ocrad"));
    }

    #[test]
    fn missing_file_is_action_required() {
        let err = ScanwerkError::Io(std::io::Error::from(std::io::ErrorKind::NotFound));
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::ActionRequired);
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanwerkError};
use crate::types::{DEFAULT_LANGUAGE, EngineId, EngineSpec};

/// Default bound on how long an engine process may run.
pub const DEFAULT_ENGINE_TIMEOUT_SECS: u64 = 300;

/// Default location of the JSON configuration file.
///
/// Follows the XDG Base Directory specification: `$XDG_CONFIG_HOME/scanwerk`,
/// falling back to `~/.config/scanwerk` when `XDG_CONFIG_HOME` is unset.
pub fn default_config_path() -> PathBuf {
    let base = if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg)
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config")
    } else {
        PathBuf::from(".")
    };
    base.join("scanwerk").join("config.json")
}

/// User settings. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Engine used when the operator does not pick one.
    pub default_engine: EngineId,
    /// Language hint handed to Cuneiform.
    pub default_language: String,
    /// Upper bound on engine run time; `null` waits forever.
    pub engine_timeout_secs: Option<u64>,
    /// Where per-call temporary artifacts go (system temp dir if unset).
    pub temp_dir: Option<PathBuf>,
    /// Search path for engine executables (process `PATH` if unset).
    pub search_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_engine: EngineId::Gocr,
            default_language: DEFAULT_LANGUAGE.to_string(),
            engine_timeout_secs: Some(DEFAULT_ENGINE_TIMEOUT_SECS),
            temp_dir: None,
            search_path: None,
        }
    }
}

impl AppConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }

    /// Load `path` if it exists, otherwise return the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Reject values that cannot work.
    pub fn validate(&self) -> Result<()> {
        if self.engine_timeout_secs == Some(0) {
            return Err(ScanwerkError::Config(
                "engine_timeout_secs must be positive (use null to disable the limit)".into(),
            ));
        }
        if let Some(dir) = &self.temp_dir {
            if dir.as_os_str().is_empty() {
                return Err(ScanwerkError::Config("temp_dir must not be empty".into()));
            }
        }
        Ok(())
    }

    /// The engine spec selected before the operator chooses anything.
    pub fn default_spec(&self) -> EngineSpec {
        EngineSpec::new(self.default_engine, self.default_language.clone())
    }

    pub fn engine_timeout(&self) -> Option<Duration> {
        self.engine_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_stock_engine() {
        let config = AppConfig::default();
        assert_eq!(config.default_spec(), EngineSpec::gocr());
        assert_eq!(config.engine_timeout(), Some(Duration::from_secs(300)));
        assert!(config.temp_dir.is_none());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = AppConfig::from_json(r#"{ "default_engine": "cuneiform" }"#).unwrap();
        assert_eq!(config.default_engine, EngineId::Cuneiform);
        assert_eq!(config.default_language, "eng");
        assert_eq!(config.engine_timeout_secs, Some(DEFAULT_ENGINE_TIMEOUT_SECS));
    }

    #[test]
    fn null_timeout_disables_the_limit() {
        let config = AppConfig::from_json(r#"{ "engine_timeout_secs": null }"#).unwrap();
        assert_eq!(config.engine_timeout(), None);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = AppConfig::from_json(r#"{ "engine_timeout_secs": 0 }"#).unwrap_err();
        assert!(matches!(err, ScanwerkError::Config(_)), "got {err:?}");
    }

    #[test]
    fn unknown_engine_in_file_is_a_serialization_error() {
        let err = AppConfig::from_json(r#"{ "default_engine": "tesseract" }"#).unwrap_err();
        assert!(matches!(err, ScanwerkError::Serialization(_)), "got {err:?}");
    }

    #[test]
    fn load_or_default_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_or_default(dir.path().join("missing.json")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "default_language": "rus", "temp_dir": "/var/tmp" }"#).unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.default_language, "rus");
        assert_eq!(config.temp_dir, Some(PathBuf::from("/var/tmp")));
    }

    #[test]
    fn default_path_ends_with_config_json() {
        assert!(default_config_path().ends_with("scanwerk/config.json"));
    }
}

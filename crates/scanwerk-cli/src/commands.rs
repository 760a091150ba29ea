// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Subcommand implementations.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use scanwerk_core::AppConfig;
use scanwerk_core::config::default_config_path;
use scanwerk_core::error::ScanwerkError;
use scanwerk_core::types::{EngineSpec, SourceImage};
use scanwerk_document::{DefaultRasterizer, ImageNormalizer, export_text};
use scanwerk_engine::EngineDispatcher;
use tracing::{info, warn};

/// Load the configuration: an explicit file must exist, the default one may not.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    match explicit {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("Failed to load configuration {}", path.display())),
        None => {
            let path = default_config_path();
            AppConfig::load_or_default(&path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))
        }
    }
}

/// What the command line says about the engine time limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutOverride {
    /// Keep the configured limit.
    Configured,
    Seconds(u64),
    Unbounded,
}

impl TimeoutOverride {
    pub fn from_flags(timeout_secs: Option<u64>, no_timeout: bool) -> Self {
        match (timeout_secs, no_timeout) {
            (_, true) => Self::Unbounded,
            (Some(secs), false) => Self::Seconds(secs),
            (None, false) => Self::Configured,
        }
    }

    fn apply(self, config: &mut AppConfig) {
        match self {
            Self::Configured => {}
            Self::Seconds(secs) => config.engine_timeout_secs = Some(secs),
            Self::Unbounded => config.engine_timeout_secs = None,
        }
    }
}

#[derive(Debug)]
pub struct RecognizeArgs {
    pub input: PathBuf,
    pub engine: Option<String>,
    pub language: Option<String>,
    pub output: Option<PathBuf>,
    pub timeout: TimeoutOverride,
    pub json: bool,
}

/// Engine spec from command-line choices, falling back to the configuration.
pub fn resolve_spec(
    config: &AppConfig,
    engine: Option<&str>,
    language: Option<&str>,
) -> std::result::Result<EngineSpec, ScanwerkError> {
    let language = language.unwrap_or(config.default_language.as_str());
    match engine {
        Some(name) => EngineSpec::from_names(name, language),
        None => Ok(EngineSpec::new(config.default_engine, language)),
    }
}

pub fn recognize(mut config: AppConfig, args: RecognizeArgs) -> Result<()> {
    args.timeout.apply(&mut config);
    config.validate()?;

    let spec = resolve_spec(&config, args.engine.as_deref(), args.language.as_deref())?;
    if args.language.is_some() && !spec.engine_id.uses_language_hint() {
        warn!(engine = %spec.engine_id, "Language hint ignored by this engine");
    }
    let mut dispatcher = EngineDispatcher::from_app_config(&config);
    dispatcher.select(spec);

    let source = SourceImage::new(&args.input);
    let result = dispatcher
        .recognize_selected(&source)
        .with_context(|| format!("Failed to recognise {}", args.input.display()))?;

    if let Some(output) = &args.output {
        let format = export_text(&result.text, output)?;
        info!(path = %output.display(), ?format, "Text saved");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if args.output.is_none() {
        println!("{}", result.text);
    }
    Ok(())
}

pub fn normalize(config: &AppConfig, input: &Path, output: &Path) -> Result<()> {
    let normalizer = ImageNormalizer::with_rasterizer(DefaultRasterizer::configured(
        config.temp_dir.as_deref(),
        config.search_path.as_deref(),
    ));

    let raster = normalizer
        .normalize(&SourceImage::new(input))
        .with_context(|| format!("Failed to normalise {}", input.display()))?;
    raster.write_png(output)?;

    println!(
        "{} -> {} ({}x{}, threshold {}, deskewed {:.2}°)",
        input.display(),
        output.display(),
        raster.width(),
        raster.height(),
        raster.threshold(),
        raster.skew_correction_degrees()
    );
    Ok(())
}

pub fn engines(config: &AppConfig, json: bool) -> Result<()> {
    let dispatcher = EngineDispatcher::from_app_config(config);
    let report = dispatcher.available_engines();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for entry in &report {
        match &entry.executable {
            Some(path) => println!("{:<10} installed  {}", entry.engine, path.display()),
            None => println!("{:<10} missing", entry.engine),
        }
    }
    Ok(())
}

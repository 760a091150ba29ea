// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanwerk — scanned-document OCR front end.
//
// Entry point. Initialises logging, loads the configuration, and runs the
// requested subcommand. Failures are reported in plain language.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use scanwerk_core::ScanwerkError;
use scanwerk_core::human_errors::humanize_error;

#[derive(Parser, Debug)]
#[command(name = "scanwerk")]
#[command(version, about = "Clean up scanned pages and recognise their text with gocr or cuneiform", long_about = None)]
struct Cli {
    /// Configuration file (default: $XDG_CONFIG_HOME/scanwerk/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Recognise the text on a scanned page (image, or first page of a PDF)
    Recognize {
        /// Scanned page to read
        input: PathBuf,

        /// OCR engine: gocr or cuneiform
        #[arg(short, long)]
        engine: Option<String>,

        /// Language hint for cuneiform (e.g. eng, ger, rus)
        #[arg(short, long)]
        language: Option<String>,

        /// Save the text here (.pdf for a PDF, anything else for plain text)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Stop the engine after this many seconds
        #[arg(long, conflicts_with = "no_timeout")]
        timeout_secs: Option<u64>,

        /// Let the engine run as long as it needs
        #[arg(long)]
        no_timeout: bool,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write the normalised (binary, deskewed) page as PNG without running OCR
    Normalize {
        /// Scanned page to clean up
        input: PathBuf,

        /// Destination PNG
        output: PathBuf,
    },

    /// Show which OCR engines are installed
    Engines {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = commands::load_config(cli.config.as_deref())?;
    tracing::debug!(?config, "Configuration loaded");

    match cli.command {
        Commands::Recognize {
            input,
            engine,
            language,
            output,
            timeout_secs,
            no_timeout,
            json,
        } => commands::recognize(
            config,
            commands::RecognizeArgs {
                input,
                engine,
                language,
                output,
                timeout: commands::TimeoutOverride::from_flags(timeout_secs, no_timeout),
                json,
            },
        ),
        Commands::Normalize { input, output } => commands::normalize(&config, &input, &output),
        Commands::Engines { json } => commands::engines(&config, json),
    }
}

/// Print an error for the operator: plain language for known failures, the
/// context chain for everything else.
fn report(err: &anyhow::Error) {
    match err.downcast_ref::<ScanwerkError>() {
        Some(scanwerk_err) => {
            let human = humanize_error(scanwerk_err);
            eprintln!("error: {}", human.message);
            eprintln!("  {}", human.suggestion);
            eprintln!("  ({scanwerk_err})");
        }
        None => eprintln!("error: {err:#}"),
    }
}

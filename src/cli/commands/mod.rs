//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod check;
mod inspect;
mod organize;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use super::helpers::{load_settings, SettingsOverrides};

#[derive(Parser)]
#[command(name = "certsort")]
#[command(about = "Sort certificates and diplomas into year/name folders")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Copy every certificate in SOURCE into DEST/<year>/<name>/
    Organize {
        /// Folder to scan (default: "Docs")
        #[arg(env = "CERTSORT_SOURCE")]
        source: Option<PathBuf>,
        /// Root of the organized tree (default: "Docs organizados")
        #[arg(env = "CERTSORT_DEST")]
        dest: Option<PathBuf>,
        /// Number of documents processed at once (default: 1)
        #[arg(short, long, env = "CERTSORT_WORKERS")]
        workers: Option<usize>,
    },

    /// Show the name and year detected in one file, without copying it
    Inspect {
        /// Document to analyze
        file: PathBuf,
        /// Print the extracted text
        #[arg(long)]
        text: bool,
    },

    /// Check that the external OCR tools and language models are installed
    Check,
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let overrides = match &cli.command {
        Commands::Organize {
            source,
            dest,
            workers,
        } => SettingsOverrides {
            source: source.clone(),
            dest: dest.clone(),
            workers: *workers,
        },
        _ => SettingsOverrides::default(),
    };
    let settings = load_settings(cli.config.as_deref(), overrides).await?;

    match cli.command {
        Commands::Organize { .. } => organize::cmd_organize(&settings).await,
        Commands::Inspect { file, text } => inspect::cmd_inspect(&settings, &file, text).await,
        Commands::Check => check::cmd_check(&settings).await,
    }
}

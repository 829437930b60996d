//! Shared helper functions for CLI commands.

use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{Config, Settings};

/// Values given on the command line or through `CERTSORT_*` variables.
#[derive(Debug, Default)]
pub struct SettingsOverrides {
    pub source: Option<PathBuf>,
    pub dest: Option<PathBuf>,
    pub workers: Option<usize>,
}

/// Resolve settings: CLI/env over config file over defaults.
pub async fn load_settings(
    config_path: Option<&Path>,
    overrides: SettingsOverrides,
) -> anyhow::Result<Settings> {
    let config = Config::load(config_path).await?;
    let mut settings = config.settings();

    if let Some(source) = overrides.source {
        settings.source_dir = source;
    }
    if let Some(dest) = overrides.dest {
        settings.dest_dir = dest;
    }
    if let Some(workers) = overrides.workers {
        settings.workers = workers.max(1);
    }
    Ok(settings)
}

/// Progress bar in the house style.
pub fn progress_bar(total: u64) -> ProgressBar {
    let progress = ProgressBar::new(total);
    // Template is a constant; fall back to the default style rather than fail.
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")
        .map(|s| s.progress_chars("█▓░"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress.set_style(style);
    progress
}

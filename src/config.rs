//! Configuration management for certsort.
//!
//! A config file is optional. When present it is read from, in order:
//! `--config <path>`, `./certsort.toml`, then
//! `<user config dir>/certsort/config.toml`. TOML, YAML and JSON are
//! accepted based on the file extension.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ocr::{TextExtractor, ToolPaths, DEFAULT_LANGUAGES, DEFAULT_MIN_TEXT_CHARS};

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "certsort.toml";

/// Default folder scanned for documents.
pub const DEFAULT_SOURCE_DIR: &str = "Docs";

/// Default folder the organized tree is written to.
pub const DEFAULT_DEST_DIR: &str = "Docs organizados";

/// Default rasterization resolution for scanned PDFs.
pub const DEFAULT_DPI: u32 = 300;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} config {path}: {message}")]
    Parse {
        path: PathBuf,
        format: &'static str,
        message: String,
    },
}

/// OCR section of the config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Tesseract language models, tried in order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,
    /// Embedded PDF text shorter than this triggers OCR.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_text_chars: Option<usize>,
    /// Rasterization resolution for scanned PDFs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dpi: Option<u32>,
    /// Tesseract binary name or path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tesseract_cmd: Option<String>,
    /// Directory holding `pdftotext` and `pdftoppm`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poppler_dir: Option<String>,
}

/// Contents of a config file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
    #[serde(default)]
    pub ocr: OcrConfig,

    /// File this config was loaded from.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Locate the config file to use, if any.
    pub fn discover(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.is_file() {
            return Some(local);
        }

        dirs::config_dir()
            .map(|dir| dir.join("certsort").join("config.toml"))
            .filter(|path| path.is_file())
    }

    /// Load the discovered config, or defaults when there is none.
    ///
    /// An explicitly requested file must exist.
    pub async fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match Self::discover(explicit) {
            Some(path) => {
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path));
                }
                tracing::debug!("Loading config from {}", path.display());
                Self::load_from_path(&path).await
            }
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file path.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let mut config = Self::parse(path, &contents)?;
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    fn parse(path: &Path, contents: &str) -> Result<Self, ConfigError> {
        let parse_error = |format: &'static str, message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            format,
            message,
        };

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");
        match ext {
            "json" => {
                serde_json::from_str(contents).map_err(|e| parse_error("JSON", e.to_string()))
            }
            "yaml" | "yml" => {
                serde_yaml::from_str(contents).map_err(|e| parse_error("YAML", e.to_string()))
            }
            _ => toml::from_str(contents).map_err(|e| parse_error("TOML", e.to_string())),
        }
    }

    /// Directory relative paths are resolved against.
    pub fn base_dir(&self) -> PathBuf {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent())
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Resolve a path that may be relative to the config file.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are resolved relative to `base_dir`
    pub fn resolve_path(path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings) {
        let base_dir = self.base_dir();

        if let Some(ref source_dir) = self.source_dir {
            settings.source_dir = Self::resolve_path(source_dir, &base_dir);
        }
        if let Some(ref dest_dir) = self.dest_dir {
            settings.dest_dir = Self::resolve_path(dest_dir, &base_dir);
        }
        if let Some(workers) = self.workers {
            settings.workers = workers.max(1);
        }

        let ocr = &mut settings.ocr;
        if let Some(ref languages) = self.ocr.languages {
            if !languages.is_empty() {
                ocr.languages = languages.clone();
            }
        }
        if let Some(min_chars) = self.ocr.min_text_chars {
            ocr.min_text_chars = min_chars;
        }
        if let Some(dpi) = self.ocr.dpi {
            ocr.dpi = dpi;
        }
        if let Some(ref cmd) = self.ocr.tesseract_cmd {
            // Bare names stay bare so they are looked up in PATH
            ocr.tools.tesseract = if cmd.contains(['/', '\\']) || cmd.starts_with('~') {
                Self::resolve_path(cmd, &base_dir)
            } else {
                PathBuf::from(cmd)
            };
        }
        if let Some(ref dir) = self.ocr.poppler_dir {
            ocr.tools.poppler_dir = Some(Self::resolve_path(dir, &base_dir));
        }
    }

    /// Settings from defaults overlaid with this config.
    pub fn settings(&self) -> Settings {
        let mut settings = Settings::default();
        self.apply_to_settings(&mut settings);
        settings
    }
}

/// Resolved OCR settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrSettings {
    pub languages: Vec<String>,
    pub min_text_chars: usize,
    pub dpi: u32,
    pub tools: ToolPaths,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            languages: DEFAULT_LANGUAGES.iter().map(|l| l.to_string()).collect(),
            min_text_chars: DEFAULT_MIN_TEXT_CHARS,
            dpi: DEFAULT_DPI,
            tools: ToolPaths::default(),
        }
    }
}

/// Resolved application settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Folder scanned for documents.
    pub source_dir: PathBuf,
    /// Root of the organized tree.
    pub dest_dir: PathBuf,
    /// Documents processed at once.
    pub workers: usize,
    pub ocr: OcrSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            dest_dir: PathBuf::from(DEFAULT_DEST_DIR),
            workers: 1,
            ocr: OcrSettings::default(),
        }
    }
}

impl Settings {
    /// Build the text extractor backed by the configured tools.
    pub fn extractor(&self) -> TextExtractor {
        TextExtractor::with_tools(&self.ocr.tools, self.ocr.dpi)
            .with_languages(self.ocr.languages.clone())
            .with_min_chars(self.ocr.min_text_chars)
    }
}

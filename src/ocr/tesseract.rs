//! Tesseract OCR backend implementation.
//!
//! Uses Tesseract OCR via command-line for text extraction.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

use super::backend::{OcrBackend, OcrError};
use super::tools::{check_binary, spawn_error, stderr_of};

/// Tesseract OCR backend.
pub struct TesseractBackend {
    binary: PathBuf,
}

impl TesseractBackend {
    /// Create a backend that looks `tesseract` up in `PATH`.
    pub fn new() -> Self {
        Self::with_binary("tesseract")
    }

    /// Create a backend for a specific tesseract binary.
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// List the installed language models (`tesseract --list-langs`).
    pub fn list_languages(&self) -> Result<Vec<String>, OcrError> {
        let output = Command::new(&self.binary)
            .arg("--list-langs")
            .output()
            .map_err(|e| spawn_error(e, &self.binary, "tesseract-ocr"))?;

        if !output.status.success() {
            return Err(OcrError::OcrFailed(format!(
                "tesseract --list-langs failed: {}",
                stderr_of(&output)
            )));
        }

        // Older versions print the list on stderr.
        let stdout = String::from_utf8_lossy(&output.stdout);
        let listing = if stdout.trim().is_empty() {
            String::from_utf8_lossy(&output.stderr).into_owned()
        } else {
            stdout.into_owned()
        };
        Ok(parse_language_list(&listing))
    }
}

impl Default for TesseractBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Tesseract reports a missing `.traineddata` file this way.
fn is_missing_language(stderr: &str) -> bool {
    stderr.contains("Failed loading language") || stderr.contains("couldn't load any languages")
}

/// Parse `--list-langs` output, skipping the header line.
fn parse_language_list(listing: &str) -> Vec<String> {
    listing
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with("List of available languages"))
        .map(str::to_string)
        .collect()
}

impl OcrBackend for TesseractBackend {
    fn is_available(&self) -> bool {
        check_binary(&self.binary)
    }

    fn availability_hint(&self) -> String {
        if self.is_available() {
            "Tesseract is available".to_string()
        } else {
            format!(
                "{} not found. Install with: apt install tesseract-ocr tesseract-ocr-spa",
                self.binary.display()
            )
        }
    }

    fn recognize_text(&self, image_path: &Path, language: &str) -> Result<String, OcrError> {
        let start = Instant::now();
        let output = Command::new(&self.binary)
            .arg(image_path)
            .arg("stdout")
            .args(["-l", language])
            .output()
            .map_err(|e| spawn_error(e, &self.binary, "tesseract-ocr"))?;

        if !output.status.success() {
            let stderr = stderr_of(&output);
            if is_missing_language(&stderr) {
                return Err(OcrError::UnsupportedLanguage(language.to_string()));
            }
            return Err(OcrError::OcrFailed(format!("tesseract failed: {}", stderr)));
        }

        tracing::debug!(
            "tesseract ({}) finished {} in {}ms",
            language,
            image_path.display(),
            start.elapsed().as_millis()
        );
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

//! Embedded text-layer extraction from PDFs.

use std::path::{Path, PathBuf};
use std::process::Command;

use super::extractor::ExtractionError;
use super::tools::{check_binary, stderr_of};

/// Reads the text layer of a PDF, one string per page.
pub trait EmbeddedTextSource: Send + Sync {
    /// Extract the text of every page. A PDF that cannot be parsed must
    /// surface as [`ExtractionError::Unreadable`].
    fn extract_pages(&self, pdf_path: &Path) -> Result<Vec<String>, ExtractionError>;
}

/// Text source backed by Poppler's `pdftotext`.
pub struct PdfToText {
    binary: PathBuf,
}

impl PdfToText {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn is_available(&self) -> bool {
        check_binary(&self.binary)
    }
}

impl Default for PdfToText {
    fn default() -> Self {
        Self::new("pdftotext")
    }
}

/// Split `pdftotext` output into pages; pages end with a form feed.
fn split_pages(output: &str) -> Vec<String> {
    let mut pages: Vec<String> = output.split('\x0c').map(str::to_string).collect();
    // Trailing form feed leaves an empty tail that is not a page
    if pages.len() > 1 && pages.last().is_some_and(|p| p.trim().is_empty()) {
        pages.pop();
    }
    pages
}

impl EmbeddedTextSource for PdfToText {
    fn extract_pages(&self, pdf_path: &Path) -> Result<Vec<String>, ExtractionError> {
        let output = Command::new(&self.binary)
            .args(["-enc", "UTF-8"])
            .arg(pdf_path)
            .arg("-") // Output to stdout
            .output();

        match output {
            Ok(output) if output.status.success() => {
                Ok(split_pages(&String::from_utf8_lossy(&output.stdout)))
            }
            Ok(output) => Err(ExtractionError::Unreadable(format!(
                "pdftotext could not read {}: {}",
                pdf_path.display(),
                stderr_of(&output)
            ))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ExtractionError::DependencyMissing(format!(
                    "{} not found (install poppler-utils)",
                    self.binary.display()
                )))
            }
            Err(e) => Err(ExtractionError::Io(e)),
        }
    }
}

//! OCR backend abstraction.
//!
//! The acquisition engine only needs `recognize_text(image, language)`;
//! keeping it behind a trait lets tests and alternative engines stand in
//! for the Tesseract command-line tool.

use std::path::Path;
use thiserror::Error;

/// Errors from OCR backends and page rasterizers.
#[derive(Debug, Error)]
pub enum OcrError {
    /// The engine or a helper tool is not installed or misconfigured.
    #[error("Backend not available: {0}")]
    BackendNotAvailable(String),

    /// The requested language model is not installed.
    #[error("Language model not installed: {0}")]
    UnsupportedLanguage(String),

    #[error("OCR failed: {0}")]
    OcrFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for OCR engines.
pub trait OcrBackend: Send + Sync {
    /// Check if the engine can run (binary installed).
    fn is_available(&self) -> bool;

    /// Describe what is needed to make this backend available.
    fn availability_hint(&self) -> String;

    /// Recognize text in an image using the given language model.
    ///
    /// Must return [`OcrError::UnsupportedLanguage`] when the model is
    /// missing so the caller can fall back to another language.
    fn recognize_text(&self, image_path: &Path, language: &str) -> Result<String, OcrError>;
}

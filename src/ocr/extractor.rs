//! Text acquisition: embedded PDF text with OCR fallback.
//!
//! - PDFs: read the text layer of every page. When the trimmed result is
//!   shorter than `min_text_chars` (typical of scanned PDFs) it is discarded
//!   and page 1 is rasterized and OCR'd instead.
//! - Images: OCR directly.
//!
//! OCR tries each configured language in order, moving to the next one only
//! when the engine reports the model as not installed.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use super::backend::{OcrBackend, OcrError};
use super::pdf_text::{EmbeddedTextSource, PdfToText};
use super::rasterize::{PageRasterizer, PdftoppmRasterizer};
use super::tesseract::TesseractBackend;
use super::tools::ToolPaths;
use crate::models::{Document, DocumentKind, TranscribedText};
use crate::progress::ProgressSink;

/// Default OCR language cascade: Spanish first, English fallback.
pub const DEFAULT_LANGUAGES: &[&str] = &["spa", "eng"];

/// Below this many characters the embedded text layer is treated as absent.
pub const DEFAULT_MIN_TEXT_CHARS: usize = 50;

/// Errors that can occur during text acquisition.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// The document cannot be opened or parsed.
    #[error("Unreadable document: {0}")]
    Unreadable(String),

    /// A required tool or language model is missing; the message says what
    /// to install.
    #[error("Missing dependency: {0}")]
    DependencyMissing(String),

    #[error(transparent)]
    Ocr(OcrError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractionError {
    /// Whether this error comes from a missing or misconfigured backend.
    pub fn is_dependency(&self) -> bool {
        matches!(self, ExtractionError::DependencyMissing(_))
    }
}

impl From<OcrError> for ExtractionError {
    fn from(err: OcrError) -> Self {
        match err {
            OcrError::BackendNotAvailable(hint) => ExtractionError::DependencyMissing(hint),
            OcrError::Io(e) => ExtractionError::Io(e),
            other => ExtractionError::Ocr(other),
        }
    }
}

/// Method used to obtain the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionMethod {
    /// Text layer of a PDF.
    EmbeddedText,
    /// OCR with the given language model.
    Ocr { language: String },
}

impl std::fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionMethod::EmbeddedText => write!(f, "embedded text"),
            ExtractionMethod::Ocr { language } => write!(f, "OCR ({})", language),
        }
    }
}

/// Outcome of acquisition for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acquisition {
    Text {
        text: TranscribedText,
        method: ExtractionMethod,
    },
    /// Every strategy ran but none produced text. Not an error.
    NoText,
}

impl Acquisition {
    fn from_raw(raw: &str, method: ExtractionMethod) -> Self {
        match TranscribedText::new(raw) {
            Some(text) => Acquisition::Text { text, method },
            None => Acquisition::NoText,
        }
    }
}

/// Text acquisition engine.
pub struct TextExtractor {
    embedded: Arc<dyn EmbeddedTextSource>,
    rasterizer: Arc<dyn PageRasterizer>,
    ocr: Arc<dyn OcrBackend>,
    languages: Vec<String>,
    min_text_chars: usize,
}

impl TextExtractor {
    /// Create an extractor from its three collaborators.
    pub fn new(
        embedded: Arc<dyn EmbeddedTextSource>,
        rasterizer: Arc<dyn PageRasterizer>,
        ocr: Arc<dyn OcrBackend>,
    ) -> Self {
        Self {
            embedded,
            rasterizer,
            ocr,
            languages: DEFAULT_LANGUAGES.iter().map(|l| l.to_string()).collect(),
            min_text_chars: DEFAULT_MIN_TEXT_CHARS,
        }
    }

    /// Extractor backed by `pdftotext`, `pdftoppm` and `tesseract`.
    pub fn with_tools(tools: &ToolPaths, dpi: u32) -> Self {
        Self::new(
            Arc::new(PdfToText::new(tools.poppler("pdftotext"))),
            Arc::new(PdftoppmRasterizer::new(tools.poppler("pdftoppm")).with_dpi(dpi)),
            Arc::new(TesseractBackend::with_binary(tools.tesseract.clone())),
        )
    }

    /// Set the OCR language cascade. An empty list keeps the current one.
    pub fn with_languages(mut self, languages: Vec<String>) -> Self {
        if !languages.is_empty() {
            self.languages = languages;
        }
        self
    }

    /// Set the minimum embedded-text length.
    pub fn with_min_chars(mut self, min_chars: usize) -> Self {
        self.min_text_chars = min_chars;
        self
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    /// Acquire the best-effort transcription of a document.
    pub fn acquire(
        &self,
        document: &Document,
        log: &dyn ProgressSink,
    ) -> Result<Acquisition, ExtractionError> {
        match document.kind {
            DocumentKind::Pdf => self.acquire_pdf(&document.path, log),
            DocumentKind::Image => {
                log.line("  Image detected, running OCR...");
                self.ocr_image(&document.path, log)
            }
        }
    }

    fn acquire_pdf(
        &self,
        path: &Path,
        log: &dyn ProgressSink,
    ) -> Result<Acquisition, ExtractionError> {
        log.line("  Reading embedded PDF text...");
        let text = self.embedded.extract_pages(path)?.join("\n");
        let chars = text.trim().chars().count();

        if chars >= self.min_text_chars {
            return Ok(Acquisition::from_raw(&text, ExtractionMethod::EmbeddedText));
        }

        tracing::debug!(
            "{}: embedded text has {} chars (< {}), falling back to OCR",
            path.display(),
            chars,
            self.min_text_chars
        );
        log.line("  Not enough text in PDF, running OCR on first page...");
        let page = self.rasterizer.rasterize_first_page(path)?;
        self.ocr_image(page.path(), log)
    }

    /// OCR an image, walking the language cascade.
    fn ocr_image(
        &self,
        image_path: &Path,
        log: &dyn ProgressSink,
    ) -> Result<Acquisition, ExtractionError> {
        let mut languages = self.languages.iter().peekable();

        while let Some(language) = languages.next() {
            log.line(&format!("  Running OCR ({})...", language));
            match self.ocr.recognize_text(image_path, language) {
                Ok(raw) => {
                    let method = ExtractionMethod::Ocr {
                        language: language.clone(),
                    };
                    return Ok(Acquisition::from_raw(&raw, method));
                }
                Err(OcrError::UnsupportedLanguage(_)) => match languages.peek() {
                    Some(next) => {
                        log.line(&format!(
                            "  [!] Language model '{}' not installed, retrying with '{}'",
                            language, next
                        ));
                    }
                    None => {
                        return Err(ExtractionError::DependencyMissing(format!(
                            "no OCR language model installed (tried {}); install tesseract language packs",
                            self.languages.join(", ")
                        )));
                    }
                },
                Err(e) => return Err(e.into()),
            }
        }

        Ok(Acquisition::NoText)
    }
}

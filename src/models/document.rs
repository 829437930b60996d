//! Source documents and the text acquired from them.

use std::path::{Path, PathBuf};

/// Raster formats accepted for direct OCR.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff"];

/// Kind of document, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Image,
}

impl DocumentKind {
    /// Classify a path by its (case-insensitive) extension.
    ///
    /// Returns `None` for anything outside the allow-list.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        if ext == "pdf" {
            Some(Self::Pdf)
        } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Image)
        } else {
            None
        }
    }
}

/// A file picked up from the source directory.
///
/// Never mutated and never deleted; filing always copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: PathBuf,
    pub kind: DocumentKind,
}

impl Document {
    /// Build a document from a path, or `None` if the extension is not eligible.
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let kind = DocumentKind::from_path(&path)?;
        Some(Self { path, kind })
    }

    /// Base file name, lossily converted for display and filename heuristics.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// File name without its extension.
    pub fn file_stem(&self) -> String {
        self.path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Whitespace-normalized transcription of a document.
///
/// Always non-empty; an empty acquisition is represented by
/// [`Acquisition::NoText`](crate::ocr::Acquisition::NoText) instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscribedText(String);

impl TranscribedText {
    /// Collapse every whitespace run to a single space and trim.
    ///
    /// Returns `None` when nothing but whitespace remains.
    pub fn new(raw: &str) -> Option<Self> {
        let normalized = crate::services::text::collapse_whitespace(raw);
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TranscribedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

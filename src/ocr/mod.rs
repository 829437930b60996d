//! OCR and text extraction module.
//!
//! Extracts text from documents using:
//! - pdftotext (Poppler) for the embedded text layer of PDFs
//! - pdftoppm (Poppler) to rasterize scanned PDFs
//! - Tesseract OCR for scanned PDFs and image files
//!
//! Each external tool sits behind a trait ([`EmbeddedTextSource`],
//! [`PageRasterizer`], [`OcrBackend`]) so the acquisition logic in
//! [`TextExtractor`] can run against fakes.

mod backend;
mod extractor;
mod pdf_text;
mod rasterize;
mod tesseract;
mod tools;

pub use backend::{OcrBackend, OcrError};
pub use extractor::{
    Acquisition, ExtractionError, ExtractionMethod, TextExtractor, DEFAULT_LANGUAGES,
    DEFAULT_MIN_TEXT_CHARS,
};
pub use pdf_text::{EmbeddedTextSource, PdfToText};
pub use rasterize::{PageRasterizer, PdftoppmRasterizer, RasterizedPage};
pub use tesseract::TesseractBackend;
pub use tools::{check_binary, ToolPaths};

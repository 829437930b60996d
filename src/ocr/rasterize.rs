//! PDF page rasterization for OCR.

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

use super::backend::OcrError;
use super::tools::{check_binary, spawn_error, stderr_of};

/// An image of one PDF page.
///
/// Holds the temporary directory the image lives in, if any; the file is
/// removed when this value is dropped.
#[derive(Debug)]
pub struct RasterizedPage {
    path: PathBuf,
    _dir: Option<TempDir>,
}

impl RasterizedPage {
    /// A page image inside a temporary directory owned by this value.
    pub fn in_temp_dir(dir: TempDir, path: PathBuf) -> Self {
        Self {
            path,
            _dir: Some(dir),
        }
    }

    /// A page image at a path managed by the caller.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _dir: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Converts the first page of a PDF into an image.
pub trait PageRasterizer: Send + Sync {
    /// Rasterize page 1. A missing helper binary must surface as
    /// [`OcrError::BackendNotAvailable`].
    fn rasterize_first_page(&self, pdf_path: &Path) -> Result<RasterizedPage, OcrError>;
}

/// Rasterizer backed by Poppler's `pdftoppm`.
pub struct PdftoppmRasterizer {
    binary: PathBuf,
    dpi: u32,
}

impl PdftoppmRasterizer {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            dpi: 300,
        }
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    pub fn is_available(&self) -> bool {
        check_binary(&self.binary)
    }
}

impl Default for PdftoppmRasterizer {
    fn default() -> Self {
        Self::new("pdftoppm")
    }
}

impl PageRasterizer for PdftoppmRasterizer {
    fn rasterize_first_page(&self, pdf_path: &Path) -> Result<RasterizedPage, OcrError> {
        let temp_dir = TempDir::new()?;
        let prefix = temp_dir.path().join("page");
        let dpi = self.dpi.to_string();

        // -singlefile writes <prefix>.png without a page-number suffix
        let output = Command::new(&self.binary)
            .args(["-png", "-r", &dpi, "-f", "1", "-l", "1", "-singlefile"])
            .arg(pdf_path)
            .arg(&prefix)
            .output()
            .map_err(|e| spawn_error(e, &self.binary, "poppler-utils"))?;

        if !output.status.success() {
            return Err(OcrError::OcrFailed(format!(
                "pdftoppm failed to convert first page: {}",
                stderr_of(&output)
            )));
        }

        let image_path = prefix.with_extension("png");
        if !image_path.exists() {
            return Err(OcrError::OcrFailed(
                "No image generated for page 1".to_string(),
            ));
        }

        Ok(RasterizedPage::in_temp_dir(temp_dir, image_path))
    }
}

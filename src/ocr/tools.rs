//! Locating and running the external command-line tools.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Output;

use super::backend::OcrError;

/// Check if a binary resolves, either as a path or through `PATH`.
pub fn check_binary(name: impl AsRef<OsStr>) -> bool {
    which::which(name).is_ok()
}

/// Where the external tools live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    /// Tesseract binary (name looked up in `PATH`, or a full path).
    pub tesseract: PathBuf,
    /// Directory holding the Poppler binaries; `None` means `PATH`.
    pub poppler_dir: Option<PathBuf>,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            tesseract: PathBuf::from("tesseract"),
            poppler_dir: None,
        }
    }
}

impl ToolPaths {
    /// Resolve a Poppler tool such as `pdftotext` or `pdftoppm`.
    pub fn poppler(&self, tool: &str) -> PathBuf {
        match &self.poppler_dir {
            Some(dir) => dir.join(tool),
            None => PathBuf::from(tool),
        }
    }

    /// Availability of every tool the pipeline may call.
    pub fn check(&self) -> Vec<(String, bool)> {
        let mut tools: Vec<(String, bool)> = ["pdftotext", "pdftoppm"]
            .iter()
            .map(|tool| (tool.to_string(), check_binary(self.poppler(tool))))
            .collect();
        tools.push(("tesseract".to_string(), check_binary(&self.tesseract)));
        tools
    }
}

/// Turn a spawn failure into a "not installed" error with install guidance,
/// passing through any other IO error.
pub(crate) fn spawn_error(err: std::io::Error, binary: &Path, package: &str) -> OcrError {
    if err.kind() == std::io::ErrorKind::NotFound {
        OcrError::BackendNotAvailable(format!(
            "{} not found (install {})",
            binary.display(),
            package
        ))
    } else {
        OcrError::Io(err)
    }
}

/// Stderr of a finished command, trimmed for messages.
pub(crate) fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_string()
}

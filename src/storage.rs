//! Filing documents into the `<year>/<name>/` destination tree.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::models::{DocumentInfo, FilingOutcome};

/// Directory used when a name sanitizes to nothing.
pub const NO_NAME_DIR: &str = "SinNombre";

/// Errors raised while filing a copy.
#[derive(Debug, Error)]
pub enum FilingError {
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Source has no file name: {0}")]
    InvalidSource(PathBuf),
}

/// Make a name safe to use as a directory.
///
/// Keeps letters, spaces, hyphens and underscores. Idempotent.
pub fn sanitize_name(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_alphabetic() || matches!(c, ' ' | '-' | '_'))
        .collect();

    let trimmed = kept.trim();
    if trimmed.is_empty() {
        NO_NAME_DIR.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Candidate file name for the n-th collision (`0` is the original name).
fn candidate_name(stem: &str, extension: Option<&str>, n: usize) -> String {
    let base = if n == 0 {
        stem.to_string()
    } else {
        format!("{}_{}", stem, n)
    };
    match extension {
        Some(ext) => format!("{}.{}", base, ext),
        None => base,
    }
}

/// Copies documents into a destination root without ever overwriting.
pub struct Filer {
    root: PathBuf,
    dir_locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl Filer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            dir_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<year>/<sanitized name>` for the given detection result.
    pub fn bucket_for(info: &DocumentInfo) -> PathBuf {
        PathBuf::from(info.year_label()).join(sanitize_name(&info.name_label()))
    }

    fn lock_for(&self, dir: &Path) -> Arc<Mutex<()>> {
        let mut locks = self
            .dir_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks
            .entry(dir.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Copy `source` into its bucket, renaming on collision.
    pub fn file(&self, source: &Path, info: &DocumentInfo) -> Result<FilingOutcome, FilingError> {
        let file_name = source
            .file_name()
            .ok_or_else(|| FilingError::InvalidSource(source.to_path_buf()))?;
        let name_path = Path::new(file_name);
        let stem = name_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = name_path
            .extension()
            .map(|e| e.to_string_lossy().into_owned());

        let bucket = Self::bucket_for(info);
        let dir = self.root.join(&bucket);
        fs::create_dir_all(&dir).map_err(|source| FilingError::CreateDir {
            path: dir.clone(),
            source,
        })?;

        let lock = self.lock_for(&dir);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let (destination, target) = claim(source, &dir, &stem, extension.as_deref())?;
        if let Err(source_err) = copy_into(source, target) {
            // Never leave a truncated copy behind
            let _ = fs::remove_file(&destination);
            return Err(FilingError::Copy {
                from: source.to_path_buf(),
                to: destination,
                source: source_err,
            });
        }

        tracing::debug!("Filed {} as {}", source.display(), destination.display());
        Ok(FilingOutcome {
            destination,
            bucket,
        })
    }
}

/// Create the first free candidate path. `create_new` makes the claim
/// atomic, so no two callers can get the same file.
fn claim(
    source: &Path,
    dir: &Path,
    stem: &str,
    extension: Option<&str>,
) -> Result<(PathBuf, File), FilingError> {
    let mut n = 0;
    loop {
        let path = dir.join(candidate_name(stem, extension, n));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => n += 1,
            Err(err) => {
                return Err(FilingError::Copy {
                    from: source.to_path_buf(),
                    to: path,
                    source: err,
                })
            }
        }
    }
}

/// Stream `source` into an already-open target, then mirror its permissions.
fn copy_into(source: &Path, mut target: File) -> io::Result<()> {
    let mut input = File::open(source)?;
    io::copy(&mut input, &mut target)?;
    target.sync_all()?;
    let permissions = input.metadata()?.permissions();
    target.set_permissions(permissions)?;
    Ok(())
}

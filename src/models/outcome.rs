//! Filing results and batch counters.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Where a document was copied to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilingOutcome {
    /// Full path of the copy, after collision renaming.
    pub destination: PathBuf,
    /// `<year>/<name>` relative to the destination root.
    pub bucket: PathBuf,
}

/// Running totals for one batch.
///
/// Reset by constructing a new value per run; only ever incremented.
#[derive(Debug, Default)]
pub struct BatchCounters {
    processed: AtomicUsize,
    errors: AtomicUsize,
}

impl BatchCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_processed(&self) {
        self.processed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> BatchSummary {
        BatchSummary {
            processed: self.processed.load(Ordering::SeqCst),
            errors: self.errors.load(Ordering::SeqCst),
        }
    }
}

/// Final counts reported to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Documents copied into the destination tree.
    pub processed: usize,
    /// Documents that failed or yielded no text.
    pub errors: usize,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.processed + self.errors
    }
}

//! Data models for certsort.

mod detection;
mod document;
mod outcome;

pub use detection::{
    DocumentInfo, NameSource, PersonName, Year, MAX_YEAR, MIN_YEAR, UNKNOWN_NAME, UNKNOWN_YEAR,
};
pub use document::{Document, DocumentKind, TranscribedText, IMAGE_EXTENSIONS};
pub use outcome::{BatchCounters, BatchSummary, FilingOutcome};

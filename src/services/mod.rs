//! Detection services: pure functions over acquired text.
//!
//! Separated from acquisition and filing so they can be tested without
//! external tools.

pub mod date_detection;
pub mod filename_fallback;
pub mod name_detection;
pub mod text;

pub use date_detection::{detect_year, detect_year_with_strategy, YearStrategy};
pub use filename_fallback::name_from_file_stem;
pub use name_detection::detect_name;

use crate::models::{DocumentInfo, TranscribedText};

/// Run both detectors over a transcription.
pub fn detect_info(text: &TranscribedText) -> DocumentInfo {
    DocumentInfo::new(detect_name(text.as_str()), detect_year(text.as_str()))
}

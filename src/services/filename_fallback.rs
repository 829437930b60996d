//! Derive a person name from a file name when the text has none.
//!
//! Scans are often saved as `Vicente Esparza Villalpando.pdf` or
//! `Juan_Perez (2).jpg`; stripping digits, underscores and parenthesised
//! groups usually leaves the name.

use std::sync::LazyLock;

use regex::Regex;

use super::name_detection::MIN_NAME_TOKENS;
use super::text::{collapse_whitespace, title_case};
use crate::models::PersonName;

static PAREN_GROUP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\([^)]*\)").unwrap());

static NOISE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\d_()]+").unwrap());

/// Name derived from a file stem (the file name without extension).
pub fn name_from_file_stem(stem: &str) -> Option<PersonName> {
    let without_groups = PAREN_GROUP.replace_all(stem, " ");
    let cleaned = NOISE.replace_all(&without_groups, " ");
    let cleaned = collapse_whitespace(&cleaned);

    if cleaned.split_whitespace().count() < MIN_NAME_TOKENS {
        return None;
    }
    Some(PersonName::new(title_case(&cleaned)))
}

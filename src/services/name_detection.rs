//! Recipient-name detection for certificate text.
//!
//! Certificates introduce the recipient with formulaic phrases such as
//! "certifica a" or "awarded to". The detector finds the first phrase (in
//! list order) that appears in the text and walks the following tokens,
//! keeping capitalised words and name particles until a stop word or a
//! lower-case word ends the span.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::text::{collapse_whitespace, title_case};
use crate::models::PersonName;

/// Lead-in phrases, tried in this order. The first phrase that yields a
/// valid name wins.
pub const KEYWORDS: &[&str] = &[
    "otorga a",
    "otorga el presente",
    "certifica a",
    "certifica que",
    "reconocimiento a",
    "presente a",
    "favor de",
    "constancia a",
    "presente diploma a",
    "se hace constar que",
    "certificamos a",
    "certifies that",
    "presented to",
    "awarded to",
    "reviewer certificate",
    "thank you",
    "recognition of",
];

/// Words that end a name span.
static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "por", "en", "con", "el", "la", "los", "las", "se", "ha", "haber",
        "asistencia", "participación", "participacion", "curso", "taller",
        "fecha", "dado", "expide", "aguascalientes",
        "enero", "febrero", "marzo", "abril", "mayo", "junio", "julio",
        "agosto", "septiembre", "octubre", "noviembre", "diciembre",
        "for", "of", "and", "in", "to", "date", "given",
    ]
    .into_iter()
    .collect()
});

/// Lower-case particles allowed inside a name ("Juan de la Cruz").
const CONNECTORS: &[&str] = &["de", "del", "y", "la", "los"];

/// Token count a name may reach before the walk stops; the token that
/// crosses it is kept.
pub const MAX_NAME_TOKENS: usize = 6;

/// Minimum number of tokens in a name.
pub const MIN_NAME_TOKENS: usize = 2;

/// Case-insensitive pattern per keyword, requiring at least one non-word
/// character after it so "certifica a" does not match "certifica al".
static KEYWORD_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    KEYWORDS
        .iter()
        .map(|kw| Regex::new(&format!(r"(?i){}\W+", regex::escape(kw))).unwrap())
        .collect()
});

fn is_connector(word: &str) -> bool {
    CONNECTORS.contains(&word.to_lowercase().as_str())
}

/// Detect the recipient name, or `None` when no keyword yields a valid span.
pub fn detect_name(text: &str) -> Option<PersonName> {
    let text = collapse_whitespace(text);

    KEYWORD_PATTERNS.iter().find_map(|pattern| {
        let m = pattern.find(&text)?;
        let parts = name_span(&text[m.end()..]);
        validate(&parts)
    })
}

/// Collect the candidate tokens that follow a keyword.
fn name_span(rest: &str) -> Vec<&str> {
    let mut parts = Vec::new();

    for word in rest.split_whitespace() {
        let word = word.trim_end_matches([',', '.', ';', ':']);
        if word.is_empty() {
            continue;
        }

        if STOP_WORDS.contains(word.to_lowercase().as_str()) {
            break;
        }

        let capitalised = word.chars().next().is_some_and(char::is_uppercase);
        if !capitalised && !is_connector(word) {
            break;
        }

        parts.push(word);
        if parts.len() > MAX_NAME_TOKENS {
            break;
        }
    }

    parts
}

/// A span is a name when it has two or more tokens and at least one of
/// them is not a connector.
fn validate(parts: &[&str]) -> Option<PersonName> {
    if parts.len() < MIN_NAME_TOKENS {
        return None;
    }
    if parts.iter().all(|p| is_connector(p)) {
        return None;
    }
    Some(PersonName::new(title_case(&parts.join(" "))))
}

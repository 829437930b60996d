//! Attributes detected in a document and their folder labels.

use std::fmt;

/// Folder label used when no name could be detected.
pub const UNKNOWN_NAME: &str = "Desconocido";

/// Folder label used when no year could be detected.
pub const UNKNOWN_YEAR: &str = "SinFecha";

/// Earliest year accepted as an issuance year.
pub const MIN_YEAR: u16 = 2000;

/// Latest year accepted as an issuance year.
pub const MAX_YEAR: u16 = 2039;

/// A four-digit issuance year inside [`MIN_YEAR`]..=[`MAX_YEAR`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Year(u16);

impl Year {
    /// Accept a year only inside the plausible issuance window.
    pub fn new(year: u16) -> Option<Self> {
        (MIN_YEAR..=MAX_YEAR).contains(&year).then_some(Self(year))
    }

    /// Parse a four-digit token.
    pub fn parse(token: &str) -> Option<Self> {
        if token.len() != 4 || !token.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        token.parse().ok().and_then(Self::new)
    }

    pub fn get(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A person name rendered in title case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PersonName(String);

impl PersonName {
    /// Wrap an already title-cased name. Callers guarantee at least two tokens.
    pub(crate) fn new(name: String) -> Self {
        Self(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a detected name came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameSource {
    /// Keyword-anchored match in the document text.
    Content,
    /// Derived from the source file name.
    Filename,
}

/// Name and year detected for one document.
///
/// Missing values stay `None` until [`name_label`](Self::name_label) and
/// [`year_label`](Self::year_label) turn them into folder names.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentInfo {
    pub name: Option<PersonName>,
    pub name_source: Option<NameSource>,
    pub year: Option<Year>,
}

impl DocumentInfo {
    pub fn new(name: Option<PersonName>, year: Option<Year>) -> Self {
        let name_source = name.as_ref().map(|_| NameSource::Content);
        Self {
            name,
            name_source,
            year,
        }
    }

    /// Fill a missing name, recording that it came from the file name.
    pub fn with_filename_name(mut self, name: Option<PersonName>) -> Self {
        if self.name.is_none() {
            if let Some(name) = name {
                self.name = Some(name);
                self.name_source = Some(NameSource::Filename);
            }
        }
        self
    }

    pub fn name_label(&self) -> String {
        self.name
            .as_ref()
            .map(|n| n.as_str().to_string())
            .unwrap_or_else(|| UNKNOWN_NAME.to_string())
    }

    pub fn year_label(&self) -> String {
        self.year
            .map(|y| y.to_string())
            .unwrap_or_else(|| UNKNOWN_YEAR.to_string())
    }
}

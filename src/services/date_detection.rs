//! Issuance-year detection for certificate text.
//!
//! Strategies are tried in order, returning on the first hit:
//! 1. Full Spanish date phrase: `15 de enero de 2024`, `3 de marzo del 2023`
//! 2. Month and year: `marzo 2023`, `enero de 2024`
//! 3. Bare year: the *last* standalone year in the text
//!
//! Only years in 2000-2039 are accepted, which filters out serial numbers
//! and other OCR noise. The last-occurrence rule favours the signature
//! block but picks the end of a range on documents like "2019-2021".

use std::sync::LazyLock;

use regex::Regex;

use crate::models::Year;

const MONTHS: &str =
    "enero|febrero|marzo|abril|mayo|junio|julio|agosto|septiembre|octubre|noviembre|diciembre";

/// `<day> de <month> de|del <year>`, matched against lower-cased text.
static FULL_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b\d{{1,2}}\s+de\s+(?:{MONTHS})\s+del?\s+(?P<year>20[0-3][0-9])\b"
    ))
    .unwrap()
});

/// `<month> [de|del] <year>`, matched against lower-cased text.
static MONTH_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?:{MONTHS})\s+(?:del?\s+)?(?P<year>20[0-3][0-9])\b"
    ))
    .unwrap()
});

/// Any standalone year in range.
static BARE_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?P<year>20[0-3][0-9])\b").unwrap());

/// Which strategy produced a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearStrategy {
    FullDate,
    MonthYear,
    BareYear,
}

impl YearStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            YearStrategy::FullDate => "full_date",
            YearStrategy::MonthYear => "month_year",
            YearStrategy::BareYear => "bare_year",
        }
    }
}

/// Detect the issuance year of a document.
pub fn detect_year(text: &str) -> Option<Year> {
    detect_year_with_strategy(text).map(|(year, _)| year)
}

/// Detect the issuance year and report which strategy matched.
pub fn detect_year_with_strategy(text: &str) -> Option<(Year, YearStrategy)> {
    let lower = text.to_lowercase();

    if let Some(year) = first_year(&FULL_DATE, &lower) {
        return Some((year, YearStrategy::FullDate));
    }

    if let Some(year) = first_year(&MONTH_YEAR, &lower) {
        return Some((year, YearStrategy::MonthYear));
    }

    BARE_YEAR
        .captures_iter(text)
        .filter_map(|caps| Year::parse(caps.name("year")?.as_str()))
        .last()
        .map(|year| (year, YearStrategy::BareYear))
}

fn first_year(pattern: &Regex, text: &str) -> Option<Year> {
    let caps = pattern.captures(text)?;
    Year::parse(caps.name("year")?.as_str())
}

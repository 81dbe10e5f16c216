//! Canonical comparison text and content-addressed surrogate keys.
//!
//! Every deduplication and every foreign-key lookup in the compiler compares
//! canonical text, never display text. Surrogate keys are a pure function of
//! canonical content: same inputs, same key, on every run.

use crate::table::Cell;
use chrono::NaiveDate;
use sha2::{Digest, Sha256};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

pub const DEFAULT_KEY_LENGTH: usize = 16;
pub const MIN_KEY_LENGTH: usize = 8;
pub const MAX_KEY_LENGTH: usize = 64;

/// Separator between key components. Never survives canonicalization of
/// user data as a component boundary because components are hashed, not parsed.
const KEY_SEPARATOR: &str = "|";

/// Accent-insensitive, case-folded, whitespace-collapsed comparison text.
///
/// NFKD decomposition followed by removal of combining marks folds accents
/// (`Diálogo` == `Dialogo`); compatibility forms fold as well (NBSP, full-width
/// letters). Applying it twice yields the same string.
pub fn canonical_str(value: &str) -> String {
    let folded: String = value
        .nfkd()
        .flat_map(char::to_lowercase)
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect();
    let collapsed = folded.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed == "nan" {
        String::new()
    } else {
        collapsed
    }
}

/// Canonical text of a cell; blank cells canonicalize to the empty string.
pub fn canonical_text(cell: &Cell) -> String {
    match cell.as_text() {
        Some(s) => canonical_str(&s),
        None => String::new(),
    }
}

/// Anything that can take part in a surrogate key.
pub trait Canonical {
    fn canonical(&self) -> String;
}

impl Canonical for str {
    fn canonical(&self) -> String {
        canonical_str(self)
    }
}

impl Canonical for String {
    fn canonical(&self) -> String {
        canonical_str(self)
    }
}

impl Canonical for Cell {
    fn canonical(&self) -> String {
        canonical_text(self)
    }
}

impl<T: Canonical> Canonical for Option<T> {
    fn canonical(&self) -> String {
        self.as_ref().map(Canonical::canonical).unwrap_or_default()
    }
}

impl<T: Canonical + ?Sized> Canonical for &T {
    fn canonical(&self) -> String {
        (**self).canonical()
    }
}

/// Surrogate key generator with a fixed hex length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyGen {
    len: usize,
}

impl Default for KeyGen {
    fn default() -> Self {
        Self {
            len: DEFAULT_KEY_LENGTH,
        }
    }
}

impl KeyGen {
    /// Length is clamped to `MIN_KEY_LENGTH..=MAX_KEY_LENGTH` hex characters.
    pub fn new(len: usize) -> Self {
        Self {
            len: len.clamp(MIN_KEY_LENGTH, MAX_KEY_LENGTH),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Hex digest of `tag|part1|part2|...` over canonical text.
    ///
    /// The tag keeps identical text in two different dimensions from sharing
    /// a key.
    pub fn key(&self, tag: &str, parts: &[&dyn Canonical]) -> String {
        let mut joined = canonical_str(tag);
        for part in parts {
            joined.push_str(KEY_SEPARATOR);
            joined.push_str(&part.canonical());
        }
        let mut hasher = Sha256::new();
        hasher.update(joined.as_bytes());
        let mut hex = format!("{:x}", hasher.finalize());
        hex.truncate(self.len);
        hex
    }
}

/// Text formats tried, in order, when a date arrives as text.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y", "%d-%m-%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// ISO-8601 date for a `fecha` cell.
///
/// Spreadsheet dates and date-looking text become `YYYY-MM-DD`; anything
/// else falls back to its canonical text so it still groups consistently.
pub fn coerce_date_iso(cell: &Cell) -> String {
    if let Some(dt) = cell.as_date() {
        return dt.date().format("%Y-%m-%d").to_string();
    }
    let Some(text) = cell.as_text() else {
        return String::new();
    };
    if let Cell::Text(_) = cell {
        if let Some(date) = parse_date_text(&text) {
            return date.format("%Y-%m-%d").to_string();
        }
    }
    canonical_str(&text)
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt.date());
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // CANONICALIZATION
    // -------------------------------------------------------------------------

    #[test]
    fn test_canonical_trims_collapses_and_lowercases() {
        assert_eq!(canonical_str("  Medio   de\tVida \n"), "medio de vida");
    }

    #[test]
    fn test_canonical_folds_accents() {
        assert_eq!(canonical_str("Diálogo"), canonical_str("dialogo"));
        assert_eq!(canonical_str("PANAMÁ"), "panama");
    }

    #[test]
    fn test_canonical_is_idempotent() {
        for s in ["Ñandú  Grande", "ＡＢＣ", "Evolución_conflict", "İstanbul", "a\u{00A0}b"] {
            let once = canonical_str(s);
            assert_eq!(canonical_str(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn test_canonical_nan_like_is_empty() {
        assert_eq!(canonical_text(&Cell::Empty), "");
        assert_eq!(canonical_text(&Cell::Number(f64::NAN)), "");
        assert_eq!(canonical_text(&Cell::from(" NaN ")), "");
    }

    #[test]
    fn test_canonical_numbers() {
        assert_eq!(canonical_text(&Cell::Number(12.0)), "12");
        assert_eq!(canonical_text(&Cell::from("12")), "12");
    }

    // -------------------------------------------------------------------------
    // SURROGATE KEYS
    // -------------------------------------------------------------------------

    #[test]
    fn test_key_is_deterministic_and_sized() {
        let keys = KeyGen::default();
        let a = keys.key("mdv", &[&"Café"]);
        let b = keys.key("mdv", &[&"  cafe "]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_key_tag_separates_dimensions() {
        let keys = KeyGen::default();
        assert_ne!(keys.key("mdv", &[&"Café"]), keys.key("actor", &[&"Café"]));
    }

    #[test]
    fn test_key_null_parts_hash_as_empty() {
        let keys = KeyGen::default();
        let none: Option<String> = None;
        assert_eq!(
            keys.key("prio", &[&none, &Cell::Empty]),
            keys.key("prio", &[&"", &""])
        );
    }

    #[test]
    fn test_key_length_is_clamped() {
        assert_eq!(KeyGen::new(2).len(), MIN_KEY_LENGTH);
        assert_eq!(KeyGen::new(500).len(), MAX_KEY_LENGTH);
        assert_eq!(KeyGen::new(24).key("x", &[&"y"]).len(), 24);
    }

    // -------------------------------------------------------------------------
    // DATES
    // -------------------------------------------------------------------------

    #[test]
    fn test_coerce_date_from_cell_date() {
        let d = NaiveDate::from_ymd_opt(2023, 7, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(coerce_date_iso(&Cell::Date(d)), "2023-07-01");
    }

    #[test]
    fn test_coerce_date_from_text() {
        assert_eq!(coerce_date_iso(&Cell::from("2023-07-01")), "2023-07-01");
        assert_eq!(coerce_date_iso(&Cell::from("2023-07-01 00:00:00")), "2023-07-01");
        assert_eq!(coerce_date_iso(&Cell::from("25/07/2023")), "2023-07-25");
    }

    #[test]
    fn test_coerce_date_fallback_is_canonical_text() {
        assert_eq!(coerce_date_iso(&Cell::from(" Julio 2023 ")), "julio 2023");
        assert_eq!(coerce_date_iso(&Cell::Empty), "");
    }
}

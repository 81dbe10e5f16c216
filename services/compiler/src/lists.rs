//! Multi-valued cell explosion.
//!
//! Survey cells often pack several related values into one field
//! (`"Pesca, Agricultura; Turismo"`). These helpers turn such a cell into an
//! ordered list of distinct tokens. Order is first-seen, and the first casing
//! of a token wins, because bridge-row identifiers depend on it.

use crate::canonical::canonical_str;
use crate::table::Cell;
use std::collections::HashSet;

/// Default list delimiters: comma, semicolon, newline.
pub const LIST_DELIMITERS: &[char] = &[',', ';', '\n'];

pub fn is_list_delimiter(c: char) -> bool {
    LIST_DELIMITERS.contains(&c)
}

/// Conflict-map cells use underscores and spaces between codes as well.
pub fn is_code_delimiter(c: char) -> bool {
    c == '_' || c == ',' || c == ';' || c.is_whitespace()
}

/// Splits on any character accepted by `is_delimiter`; trims tokens, drops
/// empty ones and canonical duplicates.
pub fn split_tokens(value: &Cell, is_delimiter: impl Fn(char) -> bool) -> Vec<String> {
    let Some(text) = value.as_text() else {
        return Vec::new();
    };
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for token in text.split(|c: char| is_delimiter(c)) {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let key = canonical_str(token);
        if key.is_empty() || !seen.insert(key) {
            continue;
        }
        out.push(token.to_string());
    }
    out
}

/// Splits on the default comma/semicolon/newline delimiters.
pub fn split_list(value: &Cell) -> Vec<String> {
    split_tokens(value, is_list_delimiter)
}

pub fn split_codes(value: &Cell) -> Vec<String> {
    split_tokens(value, is_code_delimiter)
}

/// Spanish month names and abbreviations.
const MONTHS: &[(&str, u32)] = &[
    ("ene", 1),
    ("enero", 1),
    ("feb", 2),
    ("febrero", 2),
    ("mar", 3),
    ("marzo", 3),
    ("abr", 4),
    ("abril", 4),
    ("may", 5),
    ("mayo", 5),
    ("jun", 6),
    ("junio", 6),
    ("jul", 7),
    ("julio", 7),
    ("ago", 8),
    ("agosto", 8),
    ("sep", 9),
    ("sept", 9),
    ("septiembre", 9),
    ("oct", 10),
    ("octubre", 10),
    ("nov", 11),
    ("noviembre", 11),
    ("dic", 12),
    ("diciembre", 12),
];

pub fn month_number(label: &str) -> Option<u32> {
    let key = canonical_str(label).replace('.', "");
    MONTHS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, n)| *n)
}

/// List tokens paired with their month number; unknown labels keep `None`.
pub fn parse_month_tokens(value: &Cell) -> Vec<(String, Option<u32>)> {
    split_list(value)
        .into_iter()
        .map(|label| {
            let num = month_number(&label);
            (label, num)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list_dedupes_preserving_first_casing() {
        let tokens = split_list(&Cell::from("A, b; A\nC"));
        assert_eq!(tokens, vec!["A", "b", "C"]);
    }

    #[test]
    fn test_split_list_case_and_accent_duplicates() {
        let tokens = split_list(&Cell::from("Pesca; pesca ,Agricultura,agricultúra"));
        assert_eq!(tokens, vec!["Pesca", "Agricultura"]);
    }

    #[test]
    fn test_split_list_empty_inputs() {
        assert!(split_list(&Cell::Empty).is_empty());
        assert!(split_list(&Cell::from("  ")).is_empty());
        assert!(split_list(&Cell::from("nan")).is_empty());
        assert!(split_list(&Cell::from(",;\n")).is_empty());
    }

    #[test]
    fn test_split_list_numbers() {
        assert_eq!(split_list(&Cell::Number(3.0)), vec!["3"]);
    }

    #[test]
    fn test_split_codes_uses_underscores_and_spaces() {
        let codes = split_codes(&Cell::from("C1_C2 C3;c1"));
        assert_eq!(codes, vec!["C1", "C2", "C3"]);
    }

    #[test]
    fn test_month_tokens() {
        let months = parse_month_tokens(&Cell::from("Ene., marzo; Sept\nLluvias"));
        assert_eq!(
            months,
            vec![
                ("Ene.".to_string(), Some(1)),
                ("marzo".to_string(), Some(3)),
                ("Sept".to_string(), Some(9)),
                ("Lluvias".to_string(), None),
            ]
        );
    }
}

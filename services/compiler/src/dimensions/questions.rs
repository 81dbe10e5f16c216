use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::canonical::KeyGen;
use crate::registry::{sheets, SURVEY_FIXED_COLUMNS};
use crate::table::{Cell, Table, TableMap};

const QUESTION_COLUMNS: &[&str] = &["question_id", "question_order", "question_text", "column_name"];

fn question_header() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^\s*(\d+)\s*[.)]?\s*(.*)$").ok())
        .as_ref()
}

/// Splits a survey header like `"12) ¿Participa?"` into its order and text.
/// Headers without a leading number have no order; an empty remainder keeps
/// the whole header as text.
pub fn parse_question_header(header: &str) -> (Option<u32>, String) {
    let text = header.trim();
    let Some(caps) = question_header().and_then(|re| re.captures(text)) else {
        return (None, text.to_string());
    };
    let order = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok());
    let rest = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();
    let question = if rest.is_empty() { text } else { rest };
    (order, question.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: String,
    pub order: Option<u32>,
}

/// Survey column name (trimmed) to its question.
#[derive(Debug, Clone, Default)]
pub struct QuestionMap {
    by_column: HashMap<String, Question>,
}

impl QuestionMap {
    pub fn get(&self, column: &str) -> Option<&Question> {
        self.by_column.get(column.trim())
    }

    pub fn len(&self) -> usize {
        self.by_column.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_column.is_empty()
    }
}

/// LOOKUP_CA_QUESTIONS: one row per non-fixed survey column, ordered by
/// question number (unnumbered last) then text.
pub fn build_questions(raw: &TableMap, keys: KeyGen) -> (Table, QuestionMap) {
    let mut table = Table::new(QUESTION_COLUMNS);
    let mut map = QuestionMap::default();
    let Some(survey) = raw.get(sheets::SURVEY) else {
        return (table, map);
    };

    let mut questions: Vec<(Option<u32>, String, String, String)> = survey
        .columns()
        .iter()
        .filter(|c| !SURVEY_FIXED_COLUMNS.contains(&c.as_str()))
        .map(|column| {
            let (order, text) = parse_question_header(column);
            let order_part = order.map(|o| o.to_string()).unwrap_or_default();
            let column = column.trim().to_string();
            // "1. Agua" and "1) Agua" parse alike; the header keeps them apart.
            let id = keys.key("ca_q", &[&order_part, &text, &column]);
            (order, text, column, id)
        })
        .collect();
    questions.sort_by(|a, b| match (a.0, b.0) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.1.cmp(&b.1)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.1.cmp(&b.1),
    });

    for (order, text, column, id) in questions {
        table.push(vec![
            Cell::from(&id),
            Cell::from(order.map(|o| o as f64)),
            Cell::from(text),
            Cell::from(&column),
        ]);
        map.by_column
            .entry(column)
            .or_insert(Question { id, order });
    }
    (table, map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_question_header() {
        assert_eq!(parse_question_header("12) ¿Participa?"), (Some(12), "¿Participa?".to_string()));
        assert_eq!(parse_question_header(" 3. Agua "), (Some(3), "Agua".to_string()));
        assert_eq!(parse_question_header("7"), (Some(7), "7".to_string()));
        assert_eq!(parse_question_header("Comentarios"), (None, "Comentarios".to_string()));
    }

    #[test]
    fn test_questions_sorted_numbered_first() {
        let mut raw = TableMap::new();
        raw.insert(
            sheets::SURVEY,
            Table::new(&["País", "Grupo", "Medio de vida", "Tamaño de propiedad", "10. B", "Zeta", "2) A", "Alfa"]),
        );
        let (table, map) = build_questions(&raw, KeyGen::default());
        let texts: Vec<String> = table.column("question_text").map(|c| c.text()).collect();
        assert_eq!(texts, vec!["A", "B", "Alfa", "Zeta"]);
        let orders: Vec<Cell> = table.column("question_order").cloned().collect();
        assert_eq!(orders, vec![Cell::Number(2.0), Cell::Number(10.0), Cell::Empty, Cell::Empty]);
        assert_eq!(map.len(), 4);
        assert_eq!(map.get("2) A").map(|q| q.order), Some(Some(2)));
    }

    #[test]
    fn test_questions_with_same_parse_get_distinct_ids() {
        let mut raw = TableMap::new();
        raw.insert(
            sheets::SURVEY,
            Table::new(&["País", "Grupo", "1. Agua", "1) Agua"]),
        );
        let (table, map) = build_questions(&raw, KeyGen::default());
        let ids: Vec<String> = table.column("question_id").map(|c| c.text()).collect();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
        assert_eq!(map.len(), 2);
        assert_ne!(map.get("1. Agua"), map.get("1) Agua"));
    }

    #[test]
    fn test_questions_absent_survey() {
        let (table, map) = build_questions(&TableMap::new(), KeyGen::default());
        assert_eq!(table.columns(), QUESTION_COLUMNS);
        assert!(map.is_empty());
    }
}

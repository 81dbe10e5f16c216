//! In-memory tabular container shared by every stage of the compiler.
//!
//! A [`Table`] is a list of named columns plus rows of [`Cell`]s. Tables are
//! built once and handed downstream read-only; builders always produce a new
//! table instead of mutating their inputs.

use chrono::{NaiveDateTime, Timelike};
use std::fmt;

/// A single spreadsheet value after it left the workbook container.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDateTime),
}

static EMPTY: Cell = Cell::Empty;

impl Cell {
    /// Missing, whitespace-only, NaN, or the literal text `nan`.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => {
                let t = s.trim();
                t.is_empty() || t.eq_ignore_ascii_case("nan")
            }
            Cell::Number(n) => n.is_nan(),
            Cell::Bool(_) | Cell::Date(_) => false,
        }
    }

    /// Trimmed display text, `None` when blank.
    pub fn as_text(&self) -> Option<String> {
        if self.is_blank() {
            None
        } else {
            Some(self.to_string().trim().to_string())
        }
    }

    /// Trimmed display text, empty string when blank.
    pub fn text(&self) -> String {
        self.as_text().unwrap_or_default()
    }

    /// Parse-or-null numeric coercion. Invalid numeric text becomes `None`.
    pub fn to_number(&self) -> Option<f64> {
        let value = match self {
            Cell::Number(n) => *n,
            Cell::Bool(b) => f64::from(u8::from(*b)),
            Cell::Text(s) => s.trim().parse::<f64>().ok()?,
            Cell::Empty | Cell::Date(_) => return None,
        };
        value.is_finite().then_some(value)
    }

    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            Cell::Date(d) => Some(*d),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => f.write_str(s),
            Cell::Number(n) => write!(f, "{}", format_number(*n)),
            Cell::Bool(b) => write!(f, "{}", b),
            Cell::Date(d) => {
                if d.hour() == 0 && d.minute() == 0 && d.second() == 0 {
                    write!(f, "{}", d.format("%Y-%m-%d"))
                } else {
                    write!(f, "{}", d.format("%Y-%m-%d %H:%M:%S"))
                }
            }
        }
    }
}

/// Integral floats print without a fractional part so `2023.0` and `2023`
/// hash to the same key.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<&String> for Cell {
    fn from(value: &String) -> Self {
        Cell::Text(value.clone())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<usize> for Cell {
    fn from(value: usize) -> Self {
        Cell::Number(value as f64)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map_or(Cell::Empty, Into::into)
    }
}

/// Named columns plus rows; every row has exactly one cell per column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: &[&str]) -> Self {
        Self::from_columns(columns.iter().map(|c| c.to_string()).collect())
    }

    pub fn from_columns(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn has_columns(&self, names: &[&str]) -> bool {
        names.iter().all(|n| self.has_column(n))
    }

    /// Appends a row, padding or truncating it to the table width.
    pub fn push(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Empty);
        self.rows.push(row);
    }

    /// Appends a row by asking `fill` for the value of each column in order.
    pub fn push_with(&mut self, mut fill: impl FnMut(&str) -> Cell) {
        let row: Vec<Cell> = self.columns.iter().map(|c| fill(c)).collect();
        self.rows.push(row);
    }

    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.rows.iter().map(move |row| Record { table: self, row })
    }

    /// Every cell of `name`, or nothing when the column does not exist.
    pub fn column<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Cell> + 'a {
        let idx = self.column_index(name);
        idx.into_iter()
            .flat_map(move |i| self.rows.iter().map(move |row| &row[i]))
    }

    pub(crate) fn rename_column(&mut self, idx: usize, name: String) {
        self.columns[idx] = name;
    }

    /// Keeps only the columns whose index is in `keep`, preserving order.
    pub(crate) fn retain_columns(&mut self, keep: &[usize]) {
        self.columns = keep.iter().map(|&i| self.columns[i].clone()).collect();
        for row in &mut self.rows {
            *row = keep.iter().map(|&i| row[i].clone()).collect();
        }
    }
}

/// Borrowed view of one table row, addressed by column name.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    table: &'a Table,
    row: &'a [Cell],
}

impl<'a> Record<'a> {
    /// The cell under `column`; missing columns read as [`Cell::Empty`].
    pub fn get(&self, column: &str) -> &'a Cell {
        self.table
            .column_index(column)
            .and_then(|i| self.row.get(i))
            .unwrap_or(&EMPTY)
    }

    pub fn text(&self, column: &str) -> String {
        self.get(column).text()
    }

    pub fn cells(&self) -> &'a [Cell] {
        self.row
    }
}

/// Insertion-ordered map of table name to table.
#[derive(Debug, Clone, Default)]
pub struct TableMap {
    entries: Vec<(String, Table)>,
}

impl TableMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a table; replacing keeps the original position.
    pub fn insert(&mut self, name: impl Into<String>, table: Table) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = table,
            None => self.entries.push((name, table)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, t)| t)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Table)> {
        self.entries.iter().map(|(n, t)| (n.as_str(), t))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for TableMap {
    type Item = (String, Table);
    type IntoIter = std::vec::IntoIter<(String, Table)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_blank_detection() {
        assert!(Cell::Empty.is_blank());
        assert!(Cell::from("   ").is_blank());
        assert!(Cell::from("NaN").is_blank());
        assert!(Cell::Number(f64::NAN).is_blank());
        assert!(!Cell::Number(0.0).is_blank());
        assert!(!Cell::from("nano").is_blank());
    }

    #[test]
    fn test_number_display_drops_integral_fraction() {
        assert_eq!(Cell::Number(2023.0).to_string(), "2023");
        assert_eq!(Cell::Number(2.5).to_string(), "2.5");
    }

    #[test]
    fn test_date_display() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(Cell::Date(d).to_string(), "2024-03-05");
    }

    #[test]
    fn test_to_number_parse_or_null() {
        assert_eq!(Cell::from(" 4.5 ").to_number(), Some(4.5));
        assert_eq!(Cell::from("alto").to_number(), None);
        assert_eq!(Cell::from("nan").to_number(), None);
        assert_eq!(Cell::Number(3.0).to_number(), Some(3.0));
        assert_eq!(Cell::Empty.to_number(), None);
    }

    #[test]
    fn test_record_missing_column_reads_empty() {
        let mut t = Table::new(&["a"]);
        t.push(vec![Cell::from("x")]);
        let rec = t.records().next().unwrap();
        assert_eq!(rec.get("a"), &Cell::from("x"));
        assert_eq!(rec.get("b"), &Cell::Empty);
    }

    #[test]
    fn test_push_with_fills_in_column_order() {
        let mut t = Table::new(&["id", "name"]);
        t.push_with(|col| match col {
            "id" => Cell::from("k1"),
            _ => Cell::from("Ana"),
        });
        assert_eq!(t.rows()[0], vec![Cell::from("k1"), Cell::from("Ana")]);
    }

    #[test]
    fn test_table_map_replace_keeps_position() {
        let mut m = TableMap::new();
        m.insert("A", Table::new(&["x"]));
        m.insert("B", Table::new(&["y"]));
        m.insert("A", Table::new(&["z"]));
        let names: Vec<&str> = m.names().collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(m.get("A").unwrap().columns(), &["z".to_string()]);
    }
}

//! Quality-assurance tables computed over the assembled output.
//!
//! Each check is a pure function of the table map and the registry. Counts
//! that cannot be computed (missing table or column) are null and carry a
//! note instead of failing the run.

use std::collections::{HashMap, HashSet};

use crate::registry::ForeignKey;
use crate::table::{Cell, Table, TableMap};

pub const NOTE_MISSING_TABLE: &str = "missing_table";
pub const NOTE_MISSING_PK_COLUMNS: &str = "missing_pk_columns";
pub const NOTE_COL_MISSING: &str = "col_missing";
pub const NOTE_MISSING_COLUMNS: &str = "missing_columns";

// =============================================================================
// CHECKS
// =============================================================================

/// QA_TABLE_SUMMARY: row and column counts per table, sorted by table name.
pub fn table_summary(tables: &TableMap) -> Table {
    let mut entries: Vec<(&str, &Table)> = tables.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    let mut out = Table::new(&["table", "rows", "cols"]);
    for (name, table) in entries {
        out.push(vec![
            Cell::from(name),
            Cell::from(table.len()),
            Cell::from(table.width()),
        ]);
    }
    out
}

/// QA_PK_DUPLICATES: number of rows whose primary key value is shared with
/// at least one other row.
pub fn pk_duplicates(tables: &TableMap, primary_keys: &[(&str, &[&str])]) -> Table {
    let mut rows: Vec<(String, Vec<Cell>)> = Vec::new();
    for (name, pk) in primary_keys {
        let pk_label = pk.join(",");
        let (count, note) = match tables.get(name) {
            None => (Cell::Empty, NOTE_MISSING_TABLE),
            Some(table) if !table.has_columns(pk) => (Cell::Empty, NOTE_MISSING_PK_COLUMNS),
            Some(table) => (Cell::from(duplicate_rows(table, pk)), ""),
        };
        rows.push((
            name.to_string(),
            vec![Cell::from(*name), Cell::from(pk_label), count, Cell::from(note)],
        ));
    }
    sorted_table(&["table", "pk", "duplicate_rows", "note"], rows)
}

fn duplicate_rows(table: &Table, pk: &[&str]) -> usize {
    let mut counts: HashMap<Vec<String>, usize> = HashMap::new();
    for record in table.records() {
        let key: Vec<String> = pk.iter().map(|c| record.text(c)).collect();
        *counts.entry(key).or_default() += 1;
    }
    counts.values().filter(|n| **n > 1).sum()
}

/// QA_MISSING_IDS: null or blank values per identifier column.
pub fn missing_ids(tables: &TableMap, identifier_columns: &[(&str, &[&str])]) -> Table {
    let mut rows: Vec<(String, Vec<Cell>)> = Vec::new();
    for (name, columns) in identifier_columns {
        let table = tables.get(name);
        for column in columns.iter() {
            let (count, note) = match table {
                None => (Cell::Empty, NOTE_MISSING_TABLE),
                Some(t) if !t.has_column(column) => (Cell::Empty, NOTE_COL_MISSING),
                Some(t) => (Cell::from(t.column(column).filter(|c| c.is_blank()).count()), ""),
            };
            rows.push((
                format!("{name}\u{0}{column}"),
                vec![Cell::from(*name), Cell::from(*column), count, Cell::from(note)],
            ));
        }
    }
    sorted_table(&["table", "col", "missing", "note"], rows)
}

/// QA_FOREIGN_KEYS: non-blank foreign key values with no matching key in
/// the target table.
pub fn foreign_keys(tables: &TableMap, specs: &[ForeignKey]) -> Table {
    let mut rows: Vec<(String, Vec<Cell>)> = Vec::new();
    for spec in specs {
        let (count, note) = match (tables.get(spec.table), tables.get(spec.target)) {
            (Some(table), Some(target)) => {
                if table.has_column(spec.column) && target.has_column(spec.target_key) {
                    let valid: HashSet<String> = target
                        .column(spec.target_key)
                        .filter_map(Cell::as_text)
                        .collect();
                    let missing = table
                        .column(spec.column)
                        .filter_map(Cell::as_text)
                        .filter(|v| !valid.contains(v))
                        .count();
                    (Cell::from(missing), "")
                } else {
                    (Cell::Empty, NOTE_MISSING_COLUMNS)
                }
            }
            _ => (Cell::Empty, NOTE_MISSING_TABLE),
        };
        rows.push((
            format!("{}\u{0}{}", spec.table, spec.column),
            vec![
                Cell::from(spec.table),
                Cell::from(spec.column),
                Cell::from(spec.target),
                count,
                Cell::from(note),
            ],
        ));
    }
    sorted_table(&["table", "fk", "lookup", "missing_fk", "note"], rows)
}

/// Stable sort on the precomputed key, then into a table.
fn sorted_table(columns: &[&str], mut rows: Vec<(String, Vec<Cell>)>) -> Table {
    rows.sort_by(|a, b| a.0.cmp(&b.0));
    let mut table = Table::new(columns);
    for (_, row) in rows {
        table.push(row);
    }
    table
}

// =============================================================================
// TOTALS
// =============================================================================

/// Sum of a numeric QA column, nulls ignored.
pub fn column_total(table: &Table, column: &str) -> usize {
    table
        .column(column)
        .filter_map(Cell::to_number)
        .map(|n| n as usize)
        .sum()
}

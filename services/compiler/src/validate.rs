//! Input schema validation.
//!
//! One status row per configured sheet. In strict mode any non-ok sheet
//! aborts the run with a [`ValidationError`]; in permissive mode the report
//! is logged and carried into the output as `QA_INPUT_SCHEMA`.

use serde::Serialize;
use std::fmt;
use tracing::warn;

use crate::error::ValidationError;
use crate::registry::Registry;
use crate::table::{Cell, Table, TableMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetState {
    Ok,
    MissingSheet,
    MissingColumns,
}

impl SheetState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SheetState::Ok => "ok",
            SheetState::MissingSheet => "missing_sheet",
            SheetState::MissingColumns => "missing_columns",
        }
    }
}

impl fmt::Display for SheetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetStatus {
    pub sheet: String,
    pub status: SheetState,
    /// For a missing sheet this lists every required column.
    pub missing_cols: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaReport {
    pub sheets: Vec<SheetStatus>,
}

impl SchemaReport {
    pub fn is_ok(&self) -> bool {
        self.sheets.iter().all(|s| s.status == SheetState::Ok)
    }

    pub fn failures(&self) -> impl Iterator<Item = &SheetStatus> {
        self.sheets.iter().filter(|s| s.status != SheetState::Ok)
    }

    /// `QA_INPUT_SCHEMA` rendering: sheet, status, comma-joined missing columns.
    pub fn to_table(&self) -> Table {
        let mut table = Table::new(&["sheet", "status", "missing_cols"]);
        for s in &self.sheets {
            table.push(vec![
                Cell::from(&s.sheet),
                Cell::from(s.status.as_str()),
                Cell::from(s.missing_cols.join(",")),
            ]);
        }
        table
    }

    /// Aligned plain-text table of the non-ok sheets.
    pub fn failures_table(&self) -> String {
        let rows: Vec<[String; 3]> = self
            .failures()
            .map(|s| [s.sheet.clone(), s.status.to_string(), s.missing_cols.join(",")])
            .collect();
        let header = ["sheet".to_string(), "status".to_string(), "missing_cols".to_string()];
        let mut widths = [0usize; 3];
        for row in std::iter::once(&header).chain(rows.iter()) {
            for (w, v) in widths.iter_mut().zip(row.iter()) {
                *w = (*w).max(v.chars().count());
            }
        }
        let mut out = String::new();
        for row in std::iter::once(&header).chain(rows.iter()) {
            let line = row
                .iter()
                .zip(widths.iter())
                .map(|(v, w)| format!("{:<width$}", v, width = *w))
                .collect::<Vec<_>>()
                .join("  ");
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }
}

/// Checks every configured sheet for presence and required columns.
pub fn check_schema(raw: &TableMap, registry: &Registry) -> SchemaReport {
    let sheets = registry
        .required_columns
        .iter()
        .map(|(sheet, required)| match raw.get(sheet) {
            None => SheetStatus {
                sheet: sheet.to_string(),
                status: SheetState::MissingSheet,
                missing_cols: required.iter().map(|c| c.to_string()).collect(),
            },
            Some(table) => {
                let missing: Vec<String> = required
                    .iter()
                    .filter(|c| !table.has_column(c))
                    .map(|c| c.to_string())
                    .collect();
                SheetStatus {
                    sheet: sheet.to_string(),
                    status: if missing.is_empty() {
                        SheetState::Ok
                    } else {
                        SheetState::MissingColumns
                    },
                    missing_cols: missing,
                }
            }
        })
        .collect();
    SchemaReport { sheets }
}

/// Validates the raw sheets; strict mode turns any problem into an error.
pub fn validate_input(
    raw: &TableMap,
    registry: &Registry,
    strict: bool,
) -> Result<SchemaReport, ValidationError> {
    let report = check_schema(raw, registry);
    if report.is_ok() {
        return Ok(report);
    }
    if strict {
        return Err(ValidationError::new(report));
    }
    for s in report.failures() {
        warn!(
            sheet = %s.sheet,
            status = %s.status,
            missing = %s.missing_cols.join(","),
            "input schema problem"
        );
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::sheets;

    fn raw_with_variables() -> TableMap {
        let mut raw = TableMap::new();
        raw.insert(sheets::VARIABLES, Table::new(&["Herramienta/variable"]));
        raw.insert(sheets::SURVEY, Table::new(&["País", "Grupo"]));
        raw
    }

    #[test]
    fn test_report_has_one_row_per_sheet() {
        let report = check_schema(&TableMap::new(), &Registry::default());
        assert_eq!(report.sheets.len(), 17);
        assert!(report
            .sheets
            .iter()
            .all(|s| s.status == SheetState::MissingSheet));
    }

    #[test]
    fn test_missing_columns_are_listed() {
        let report = check_schema(&raw_with_variables(), &Registry::default());
        let variables = &report.sheets[0];
        assert_eq!(variables.status, SheetState::Ok);
        let survey = report.sheets.iter().find(|s| s.sheet == sheets::SURVEY).unwrap();
        assert_eq!(survey.status, SheetState::MissingColumns);
        assert_eq!(survey.missing_cols, vec!["Medio de vida", "Tamaño de propiedad"]);
    }

    #[test]
    fn test_strict_mode_returns_error_with_report() {
        let err = validate_input(&raw_with_variables(), &Registry::default(), true).unwrap_err();
        assert_eq!(err.report.sheets.len(), 17);
        let message = err.to_string();
        assert!(message.starts_with("Input validation failed:\n"));
        assert!(message.contains("missing_sheet"));
        assert!(!message.contains("variables "));
    }

    #[test]
    fn test_permissive_mode_returns_report() {
        let report = validate_input(&raw_with_variables(), &Registry::default(), false).unwrap();
        assert!(!report.is_ok());
        let table = report.to_table();
        assert_eq!(table.columns(), &["sheet", "status", "missing_cols"]);
        assert_eq!(table.len(), 17);
        assert_eq!(table.rows()[0][1], Cell::from("ok"));
    }
}

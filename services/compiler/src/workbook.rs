//! Workbook I/O: reading the source sheets and writing compiled tables.
//!
//! Reading goes through calamine, which auto-detects xlsx, xls, xlsb and ods.
//! Only the sheets the [`Registry`] names are loaded, by exact name.
//! Writing produces a single xlsx workbook (rust_xlsxwriter) or a directory
//! with one CSV per table.

use std::collections::HashSet;
use std::io::{Cursor, Read, Seek};
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Reader, Sheets};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rust_xlsxwriter::{Format, Workbook};
use tracing::{debug, info, warn};

use crate::error::{CompileError, Result};
use crate::registry::Registry;
use crate::table::{Cell, Table, TableMap};

/// Excel limits worksheet names to 31 characters.
pub const MAX_SHEET_NAME: usize = 31;
const TRUNCATED_PREFIX: usize = 27;
const TRUNCATION_MARK: &str = "...";

// =============================================================================
// READING
// =============================================================================

/// Loads every configured sheet present in the workbook at `path`.
pub fn read_workbook(path: &Path, registry: &Registry) -> Result<TableMap> {
    info!(path = %path.display(), "opening workbook");
    let workbook = open_workbook_auto(path)?;
    read_sheets(workbook, registry)
}

/// Same as [`read_workbook`] for an in-memory workbook.
pub fn read_workbook_from_bytes(bytes: &[u8], registry: &Registry) -> Result<TableMap> {
    info!(size_bytes = bytes.len(), "opening in-memory workbook");
    let workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    read_sheets(workbook, registry)
}

fn read_sheets<RS: Read + Seek>(mut workbook: Sheets<RS>, registry: &Registry) -> Result<TableMap> {
    let available: HashSet<String> = workbook.sheet_names().into_iter().collect();
    let mut raw = TableMap::new();

    for sheet in registry.sheet_names() {
        if !available.contains(sheet) {
            debug!(sheet, "sheet not present in workbook");
            continue;
        }
        let range = workbook
            .worksheet_range(sheet)
            .map_err(|e| CompileError::Sheet {
                sheet: sheet.to_string(),
                reason: e.to_string(),
            })?;
        let grid: Vec<Vec<Cell>> = range
            .rows()
            .map(|row| row.iter().map(data_to_cell).collect())
            .collect();
        let table = normalize_columns(sheet, sheet_table(sheet, grid), registry);
        debug!(sheet, rows = table.len(), cols = table.width(), "sheet loaded");
        raw.insert(sheet, table);
    }

    info!(sheets = raw.len(), "workbook read");
    Ok(raw)
}

/// Builds a table from a raw cell grid whose first row is the header.
///
/// Header text is kept verbatim (trailing spaces are significant), blank
/// headers become `Unnamed: <index>`, repeated headers keep their first
/// occurrence and fully blank data rows are dropped.
pub fn sheet_table(sheet: &str, grid: Vec<Vec<Cell>>) -> Table {
    let mut rows = grid.into_iter();
    let Some(header) = rows.next() else {
        return Table::default();
    };

    let names: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(idx, cell)| match cell {
            Cell::Text(s) if !s.trim().is_empty() => s.clone(),
            Cell::Empty | Cell::Text(_) => format!("Unnamed: {}", idx),
            other => other.to_string(),
        })
        .collect();

    let mut seen = HashSet::new();
    let mut keep = Vec::with_capacity(names.len());
    for (idx, name) in names.iter().enumerate() {
        if seen.insert(name.as_str()) {
            keep.push(idx);
        } else {
            warn!(sheet, column = %name, "dropping repeated header");
        }
    }

    let mut table = Table::from_columns(names.clone());
    for row in rows {
        if row.iter().all(Cell::is_blank) {
            continue;
        }
        table.push(row);
    }
    if keep.len() != names.len() {
        table.retain_columns(&keep);
    }
    table
}

/// Renames historical column names to their canonical form.
///
/// Sheet-specific aliases win over global ones. A rename only happens when
/// the target is not already a column of the sheet and no earlier column has
/// claimed it, so an existing canonical column is never overwritten.
pub fn normalize_columns(sheet: &str, mut table: Table, registry: &Registry) -> Table {
    let mut taken: HashSet<String> = table.columns().iter().cloned().collect();
    let renames: Vec<(usize, &'static str)> = table
        .columns()
        .iter()
        .enumerate()
        .filter_map(|(idx, col)| registry.alias_for(sheet, col).map(|to| (idx, to)))
        .collect();

    for (idx, target) in renames {
        let from = table.columns()[idx].clone();
        if from == target {
            continue;
        }
        if taken.contains(target) {
            warn!(sheet, from = %from, to = target, "alias target already present; keeping original column");
            continue;
        }
        taken.insert(target.to_string());
        debug!(sheet, from = %from, to = target, "column alias applied");
        table.rename_column(idx, target.to_string());
    }
    table
}

fn data_to_cell(value: &Data) -> Cell {
    match value {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => excel_serial_to_datetime(dt.as_f64())
            .map(Cell::Date)
            .unwrap_or(Cell::Number(dt.as_f64())),
        Data::DateTimeIso(s) => parse_iso_datetime(s)
            .map(Cell::Date)
            .unwrap_or_else(|| Cell::Text(s.clone())),
        Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

/// Days since 1899-12-30, the 1900 date system epoch as spreadsheets count it.
fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}

fn parse_iso_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

// =============================================================================
// WRITING
// =============================================================================

/// Worksheet names for `names`, in order.
///
/// Names longer than 31 characters are cut to 27 characters plus `...`. When
/// a name (truncated or not) would repeat an earlier one, a `~N` suffix is
/// added, shortening the prefix so the result still fits.
pub fn sheet_names_for<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    for name in names {
        let chars: Vec<char> = name.chars().collect();
        let truncated = chars.len() > MAX_SHEET_NAME;
        let mut candidate = if truncated {
            let prefix: String = chars[..TRUNCATED_PREFIX].iter().collect();
            format!("{}{}", prefix, TRUNCATION_MARK)
        } else {
            name.to_string()
        };

        let mut n = 2;
        while used.contains(&candidate.to_lowercase()) {
            let suffix = format!("~{}", n);
            let mark = if truncated { TRUNCATION_MARK } else { "" };
            let room = MAX_SHEET_NAME - suffix.len() - mark.len();
            let prefix: String = chars.iter().take(room).collect();
            candidate = format!("{}{}{}", prefix, mark, suffix);
            n += 1;
        }

        used.insert(candidate.to_lowercase());
        out.push(candidate);
    }
    out
}

fn build_workbook(tables: &TableMap) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let datetime_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");
    let names = sheet_names_for(tables.names());

    for ((_, table), sheet_name) in tables.iter().zip(names) {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet_name)?;

        for (col, name) in table.columns().iter().enumerate() {
            worksheet.write_string(0, col as u16, name)?;
        }
        for (r, row) in table.rows().iter().enumerate() {
            let r = (r + 1) as u32;
            for (col, cell) in row.iter().enumerate() {
                let col = col as u16;
                match cell {
                    Cell::Empty => {}
                    Cell::Text(s) => {
                        worksheet.write_string(r, col, s)?;
                    }
                    Cell::Number(n) if n.is_finite() => {
                        worksheet.write_number(r, col, *n)?;
                    }
                    Cell::Number(_) => {}
                    Cell::Bool(b) => {
                        worksheet.write_boolean(r, col, *b)?;
                    }
                    Cell::Date(d) => {
                        let format = if d.time() == chrono::NaiveTime::MIN {
                            &date_format
                        } else {
                            &datetime_format
                        };
                        worksheet.write_datetime_with_format(r, col, d, format)?;
                    }
                }
            }
        }
    }
    Ok(workbook)
}

/// Writes every table as one worksheet of an xlsx file at `path`.
pub fn write_workbook(tables: &TableMap, path: &Path) -> Result<()> {
    let mut workbook = build_workbook(tables)?;
    workbook.save(path)?;
    info!(path = %path.display(), sheets = tables.len(), "workbook written");
    Ok(())
}

/// Same as [`write_workbook`], returning the xlsx bytes.
pub fn write_workbook_to_buffer(tables: &TableMap) -> Result<Vec<u8>> {
    let mut workbook = build_workbook(tables)?;
    Ok(workbook.save_to_buffer()?)
}

/// Writes one `<table>.csv` per table into `dir`, creating it if needed.
pub fn write_csv_dir(tables: &TableMap, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(tables.len());
    for (name, table) in tables.iter() {
        let path = dir.join(format!("{}.csv", file_stem(name)));
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(table.columns())?;
        for row in table.rows() {
            writer.write_record(row.iter().map(|c| c.to_string()))?;
        }
        writer.flush()?;
        written.push(path);
    }
    info!(dir = %dir.display(), files = written.len(), "csv tables written");
    Ok(written)
}

fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::sheets;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<Cell>> {
        rows.iter()
            .map(|r| {
                r.iter()
                    .map(|v| if v.is_empty() { Cell::Empty } else { Cell::from(*v) })
                    .collect()
            })
            .collect()
    }

    // -------------------------------------------------------------------------
    // SHEET NORMALIZATION
    // -------------------------------------------------------------------------

    #[test]
    fn test_sheet_table_keeps_header_verbatim() {
        let t = sheet_table("s", grid(&[&["mdv ", "", "x"], &["a", "b", "c"]]));
        assert_eq!(t.columns(), &["mdv ", "Unnamed: 1", "x"]);
    }

    #[test]
    fn test_sheet_table_drops_repeated_headers_and_blank_rows() {
        let t = sheet_table(
            "s",
            grid(&[&["a", "b", "a"], &["1", "2", "3"], &["", " ", ""], &["4", "5", "6"]]),
        );
        assert_eq!(t.columns(), &["a", "b"]);
        assert_eq!(t.len(), 2);
        assert_eq!(t.rows()[1], vec![Cell::from("4"), Cell::from("5")]);
    }

    #[test]
    fn test_sheet_table_empty_grid() {
        let t = sheet_table("s", Vec::new());
        assert_eq!(t.width(), 0);
        assert!(t.is_empty());
    }

    #[test]
    fn test_alias_renames_when_target_absent() {
        let registry = Registry::default();
        let t = sheet_table(sheets::PRIORITIZATION, grid(&[&["medio_de_vida", "indice_total"]]));
        let t = normalize_columns(sheets::PRIORITIZATION, t, &registry);
        assert_eq!(t.columns(), &["mdv ", "i_total"]);
    }

    #[test]
    fn test_alias_never_overwrites_existing_column() {
        let registry = Registry::default();
        let t = sheet_table(
            sheets::CAR_A,
            grid(&[&["mdv", "medio_de_vida"], &["Pesca", "Agricultura"]]),
        );
        let t = normalize_columns(sheets::CAR_A, t, &registry);
        assert_eq!(t.columns(), &["mdv", "medio_de_vida"]);
        assert_eq!(t.rows()[0][0], Cell::from("Pesca"));
    }

    #[test]
    fn test_alias_first_claim_wins() {
        let registry = Registry::default();
        let t = sheet_table(
            sheets::PRIORITIZATION,
            grid(&[&["imdice_area", "indice_area"], &["1", "2"]]),
        );
        let t = normalize_columns(sheets::PRIORITIZATION, t, &registry);
        assert_eq!(t.columns(), &["i_area", "indice_area"]);
    }

    // -------------------------------------------------------------------------
    // CELL CONVERSION
    // -------------------------------------------------------------------------

    #[test]
    fn test_excel_serial_dates() {
        let d = excel_serial_to_datetime(45108.0).unwrap();
        assert_eq!(d.format("%Y-%m-%d").to_string(), "2023-07-01");
        let d = excel_serial_to_datetime(45108.5).unwrap();
        assert_eq!(d.format("%H:%M").to_string(), "12:00");
    }

    #[test]
    fn test_data_to_cell() {
        assert_eq!(data_to_cell(&Data::Int(3)), Cell::Number(3.0));
        assert_eq!(data_to_cell(&Data::Empty), Cell::Empty);
        assert_eq!(
            data_to_cell(&Data::String("x".to_string())),
            Cell::from("x")
        );
        assert!(matches!(
            data_to_cell(&Data::DateTimeIso("2023-07-01".to_string())),
            Cell::Date(_)
        ));
    }

    // -------------------------------------------------------------------------
    // SHEET NAMES
    // -------------------------------------------------------------------------

    #[test]
    fn test_sheet_names_short_names_unchanged() {
        assert_eq!(sheet_names_for(["LOOKUP_MDV"]), vec!["LOOKUP_MDV"]);
    }

    #[test]
    fn test_sheet_names_truncate_and_disambiguate() {
        let a = "TIDY_4_2_1_MAPEO_CONFLICTO_EXTENDED_A";
        let b = "TIDY_4_2_1_MAPEO_CONFLICTO_EXTENDED_B";
        let names = sheet_names_for([a, b]);
        assert_eq!(names[0], "TIDY_4_2_1_MAPEO_CONFLICTO_...");
        assert_eq!(names[1], "TIDY_4_2_1_MAPEO_CONFLICTO...~2");
        assert!(names.iter().all(|n| n.chars().count() <= MAX_SHEET_NAME));
    }

    #[test]
    fn test_sheet_names_case_insensitive_collision() {
        let names = sheet_names_for(["Data", "DATA"]);
        assert_eq!(names, vec!["Data", "DATA~2"]);
    }

    // -------------------------------------------------------------------------
    // ROUND TRIP THROUGH XLSX
    // -------------------------------------------------------------------------

    #[test]
    fn test_written_workbook_reads_back() {
        let mut sheet = Table::new(&["Herramienta/variable", "n"]);
        sheet.push(vec![Cell::from("Mapa"), Cell::Number(2.0)]);
        let mut tables = TableMap::new();
        tables.insert(sheets::VARIABLES, sheet);
        tables.insert("NOT_CONFIGURED", Table::new(&["x"]));

        let bytes = write_workbook_to_buffer(&tables).unwrap();
        let raw = read_workbook_from_bytes(&bytes, &Registry::default()).unwrap();

        assert_eq!(raw.len(), 1);
        let back = raw.get(sheets::VARIABLES).unwrap();
        assert_eq!(back.columns(), &["Herramienta/variable", "n"]);
        assert_eq!(back.rows()[0], vec![Cell::from("Mapa"), Cell::Number(2.0)]);
    }

    #[test]
    fn test_csv_dir_writes_one_file_per_table() {
        let dir = tempfile::tempdir().unwrap();
        let mut t = Table::new(&["a"]);
        t.push(vec![Cell::from("x")]);
        let mut tables = TableMap::new();
        tables.insert("LOOKUP_A", t);
        tables.insert("LOOKUP_B", Table::new(&["b"]));

        let files = write_csv_dir(&tables, dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        let content = std::fs::read_to_string(&files[0]).unwrap();
        assert_eq!(content, "a\nx\n");
    }
}

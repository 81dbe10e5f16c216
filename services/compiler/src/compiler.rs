//! The compilation pipeline.
//!
//! `read -> validate -> dimensions -> facts -> QA -> assemble`, single pass,
//! no shared state between runs. The same input and options always produce
//! the same tables in the same order with the same keys.

use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::config::CompileOptions;
use crate::dimensions::Dimensions;
use crate::error::Result;
use crate::facts::build_facts;
use crate::qa;
use crate::registry::{tables, Registry};
use crate::table::{Table, TableMap};
use crate::validate::{validate_input, SchemaReport, SheetStatus};
use crate::workbook::{read_workbook, read_workbook_from_bytes};

/// Output of a successful run.
#[derive(Debug, Clone)]
pub struct Compiled {
    /// Every output table in write order.
    pub tables: TableMap,
    pub schema: SchemaReport,
}

impl Compiled {
    pub fn summary(&self) -> RunSummary {
        RunSummary::new(&self.tables, &self.schema)
    }
}

/// Compiles the workbook at `path` with the default registry.
pub fn compile_workbook(path: &Path, options: CompileOptions) -> Result<Compiled> {
    let registry = Registry::default();
    let raw = read_workbook(path, &registry)?;
    compile_raw(raw, &registry, options)
}

/// Compiles an in-memory workbook with the default registry.
pub fn compile_bytes(bytes: &[u8], options: CompileOptions) -> Result<Compiled> {
    let registry = Registry::default();
    let raw = read_workbook_from_bytes(bytes, &registry)?;
    compile_raw(raw, &registry, options)
}

/// Compiles raw sheets as the workbook reader produces them: configured
/// sheet names, aliases already applied.
pub fn compile_raw(raw: TableMap, registry: &Registry, options: CompileOptions) -> Result<Compiled> {
    info!(sheets = raw.len(), strict = options.strict, "validating input");
    let schema = validate_input(&raw, registry, options.strict)?;

    info!("building dimensions");
    let dims = Dimensions::build(&raw, options.keys);

    info!("building fact tables");
    let facts = build_facts(&raw, &dims, options.keys);

    let mut out = TableMap::new();
    if options.copy_raw {
        for sheet in registry.sheet_names() {
            if let Some(table) = raw.get(sheet) {
                out.insert(sheet, table.clone());
            }
        }
    }
    for (name, table) in dims.tables() {
        out.insert(name, table.clone());
    }
    for (name, table) in facts {
        out.insert(name, table);
    }

    info!(tables = out.len(), "running quality checks");
    out.insert(tables::QA_INPUT_SCHEMA, schema.to_table());
    let summary = qa::table_summary(&out);
    out.insert(tables::QA_TABLE_SUMMARY, summary);
    let pk = qa::pk_duplicates(&out, registry.primary_keys);
    let ids = qa::missing_ids(&out, registry.identifier_columns);
    let fks = qa::foreign_keys(&out, registry.foreign_keys);
    out.insert(tables::QA_PK_DUPLICATES, pk);
    out.insert(tables::QA_MISSING_IDS, ids);
    out.insert(tables::QA_FOREIGN_KEYS, fks);

    info!(tables = out.len(), schema_ok = schema.is_ok(), "compilation finished");
    Ok(Compiled {
        tables: out,
        schema,
    })
}

// =============================================================================
// RUN SUMMARY
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableCount {
    pub table: String,
    pub rows: usize,
    pub cols: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QaTotals {
    pub pk_duplicate_rows: usize,
    pub missing_ids: usize,
    pub missing_fk: usize,
}

/// Machine-readable digest of a run, written as JSON by the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub tables: Vec<TableCount>,
    pub schema_ok: bool,
    pub schema: Vec<SheetStatus>,
    pub qa: QaTotals,
}

impl RunSummary {
    pub fn new(tables: &TableMap, schema: &SchemaReport) -> Self {
        let total = |name: &str, column: &str| {
            tables
                .get(name)
                .map(|t: &Table| qa::column_total(t, column))
                .unwrap_or_default()
        };
        Self {
            tables: tables
                .iter()
                .map(|(name, t)| TableCount {
                    table: name.to_string(),
                    rows: t.len(),
                    cols: t.width(),
                })
                .collect(),
            schema_ok: schema.is_ok(),
            schema: schema.sheets.clone(),
            qa: QaTotals {
                pk_duplicate_rows: total(tables::QA_PK_DUPLICATES, "duplicate_rows"),
                missing_ids: total(tables::QA_MISSING_IDS, "missing"),
                missing_fk: total(tables::QA_FOREIGN_KEYS, "missing_fk"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompileError;
    use crate::registry::sheets;
    use crate::table::Cell;

    fn names(tables: &TableMap) -> Vec<&str> {
        tables.names().collect()
    }

    // -------------------------------------------------------------------------
    // EMPTY INPUT
    // -------------------------------------------------------------------------

    #[test]
    fn test_empty_input_strict_fails_with_full_report() {
        let err = compile_raw(TableMap::new(), &Registry::default(), CompileOptions::default())
            .unwrap_err();
        match err {
            CompileError::Validation(v) => {
                assert_eq!(v.report.sheets.len(), 17);
                assert!(v.to_string().starts_with("Input validation failed:"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_input_permissive_emits_every_table() {
        let compiled =
            compile_raw(TableMap::new(), &Registry::default(), CompileOptions::permissive()).unwrap();
        let out = names(&compiled.tables);
        assert_eq!(out.len(), 12 + 28 + 5);
        assert_eq!(out[0], tables::LOOKUP_GEO);
        assert_eq!(out[12], tables::TIDY_3_1_BRAINSTORM);
        assert_eq!(
            &out[40..],
            &[
                tables::QA_INPUT_SCHEMA,
                tables::QA_TABLE_SUMMARY,
                tables::QA_PK_DUPLICATES,
                tables::QA_MISSING_IDS,
                tables::QA_FOREIGN_KEYS,
            ]
        );
        for (name, table) in compiled.tables.iter() {
            if name.starts_with("LOOKUP_") || name.starts_with("TIDY_") {
                assert!(table.is_empty(), "{name}");
            }
        }
        assert!(!compiled.schema.is_ok());
    }

    // -------------------------------------------------------------------------
    // ASSEMBLY
    // -------------------------------------------------------------------------

    fn small_raw() -> TableMap {
        let mut brainstorm = Table::new(&["fecha", "admin0", "paisaje", "grupo", "elemento_SES", "nombre", "uso_fin_mdv"]);
        for admin0 in ["Panama ", "panama"] {
            brainstorm.push(vec![
                Cell::from("2023-07-01"),
                Cell::from(admin0),
                Cell::from("Darién"),
                Cell::from("G1"),
                Cell::from("Medio de vida"),
                Cell::from("Pesca"),
                Cell::from("Venta"),
            ]);
        }
        let mut raw = TableMap::new();
        raw.insert(sheets::BRAINSTORM, brainstorm);
        raw
    }

    #[test]
    fn test_raw_sheets_copied_first_unless_disabled() {
        let registry = Registry::default();
        let with_raw = compile_raw(small_raw(), &registry, CompileOptions::permissive()).unwrap();
        assert_eq!(names(&with_raw.tables)[0], sheets::BRAINSTORM);

        let options = CompileOptions::permissive().with_copy_raw(false);
        let without = compile_raw(small_raw(), &registry, options).unwrap();
        assert!(!without.tables.contains(sheets::BRAINSTORM));
        assert_eq!(names(&without.tables)[0], tables::LOOKUP_GEO);
    }

    #[test]
    fn test_canonical_duplicates_share_one_context() {
        let compiled =
            compile_raw(small_raw(), &Registry::default(), CompileOptions::permissive()).unwrap();
        let geo = compiled.tables.get(tables::LOOKUP_GEO).unwrap();
        let context = compiled.tables.get(tables::LOOKUP_CONTEXT).unwrap();
        assert_eq!(geo.len(), 1);
        assert_eq!(context.len(), 1);
        let facts = compiled.tables.get(tables::TIDY_3_1_BRAINSTORM).unwrap();
        let ids: Vec<&Cell> = facts.column("context_id").collect();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0], ids[1]);
        assert_eq!(ids[0], &context.rows()[0][0]);
    }

    #[test]
    fn test_summary_counts_tables_and_qa() {
        let compiled =
            compile_raw(small_raw(), &Registry::default(), CompileOptions::permissive()).unwrap();
        let summary = compiled.summary();
        assert_eq!(summary.tables.len(), compiled.tables.len());
        assert!(!summary.schema_ok);
        assert_eq!(summary.qa.missing_fk, 0);
        // The two canonical duplicates hash to the same brainstorm id.
        assert_eq!(summary.qa.pk_duplicate_rows, 2);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["schema"][0]["status"], "missing_sheet");
    }

    #[test]
    fn test_compilation_is_deterministic() {
        let registry = Registry::default();
        let a = compile_raw(small_raw(), &registry, CompileOptions::permissive()).unwrap();
        let b = compile_raw(small_raw(), &registry, CompileOptions::permissive()).unwrap();
        let a: Vec<(&str, &Table)> = a.tables.iter().collect();
        let b: Vec<(&str, &Table)> = b.tables.iter().collect();
        assert_eq!(a, b);
    }
}

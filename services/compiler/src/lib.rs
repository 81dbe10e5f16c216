//! Workbook compiler - turns a field-survey workbook into analysis-ready
//! lookup, fact and QA tables.
//!
//! CRITICAL: compilation must be DETERMINISTIC.
//! Same workbook + same options = same tables, same order, same keys.

pub mod canonical;
pub mod compiler;
pub mod config;
pub mod dimensions;
pub mod error;
pub mod facts;
pub mod lists;
pub mod qa;
pub mod registry;
pub mod table;
pub mod validate;
pub mod workbook;

pub use compiler::{compile_bytes, compile_raw, compile_workbook, Compiled, RunSummary};
pub use config::{CompileOptions, Config};
pub use error::{CompileError, Result, ValidationError};
pub use registry::Registry;
pub use table::{Cell, Table, TableMap};
pub use workbook::{read_workbook, write_csv_dir, write_workbook, write_workbook_to_buffer};

use std::fmt;
use std::io;

use thiserror::Error;

use crate::validate::SchemaReport;

/// Error type for reading, validating and writing compiled workbooks.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("failed to open workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("failed to read sheet '{sheet}': {reason}")]
    Sheet { sheet: String, reason: String },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("failed to write xlsx output: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("failed to write csv output: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Strict-mode failure carrying the full per-sheet status report.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub report: SchemaReport,
}

impl ValidationError {
    pub fn new(report: SchemaReport) -> Self {
        Self { report }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Input validation failed:")?;
        write!(f, "{}", self.report.failures_table())
    }
}

impl std::error::Error for ValidationError {}

pub type Result<T> = std::result::Result<T, CompileError>;

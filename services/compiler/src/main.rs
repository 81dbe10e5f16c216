//! Compiler CLI - reads a survey workbook and writes the compiled tables.
//!
//! Exit status is non-zero when strict validation rejects the input; the
//! per-sheet status table is printed to stderr in that case. On success the
//! output path is the only thing written to stdout.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use compiler::{compile_workbook, write_csv_dir, write_workbook, CompileError, Config};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// One workbook, one worksheet per table
    Xlsx,
    /// A directory with one CSV file per table
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "compiler", about = "Compiles a survey workbook into analysis-ready tables")]
struct Args {
    /// Source workbook (.xlsx, .xls, .xlsb, .ods)
    #[arg(long)]
    input: PathBuf,

    /// Output workbook path, or directory with --format csv
    #[arg(long)]
    output: PathBuf,

    /// Report schema problems as warnings instead of failing
    #[arg(long, default_value = "false")]
    no_strict: bool,

    /// Do not copy the source sheets into the output
    #[arg(long, default_value = "false")]
    no_raw: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Xlsx)]
    format: OutputFormat,

    /// Surrogate key length in hex characters (8-64)
    #[arg(long)]
    key_length: Option<usize>,

    /// Write a JSON run summary to this path
    #[arg(long)]
    summary: Option<PathBuf>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> Result<ExitCode> {
    let config = Config::from_env();
    let mut options = config.options();
    if args.no_strict {
        options = options.with_strict(false);
    }
    if args.no_raw {
        options = options.with_copy_raw(false);
    }
    if let Some(len) = args.key_length {
        options = options.with_key_length(len);
    }

    let compiled = match compile_workbook(&args.input, options) {
        Ok(compiled) => compiled,
        Err(CompileError::Validation(err)) => {
            eprintln!("{err}");
            return Ok(ExitCode::FAILURE);
        }
        Err(err) => {
            return Err(err).with_context(|| format!("Failed to compile {}", args.input.display()))
        }
    };

    match args.format {
        OutputFormat::Xlsx => write_workbook(&compiled.tables, &args.output)
            .with_context(|| format!("Failed to write {}", args.output.display()))?,
        OutputFormat::Csv => {
            write_csv_dir(&compiled.tables, &args.output)
                .with_context(|| format!("Failed to write {}", args.output.display()))?;
        }
    }

    if let Some(path) = &args.summary {
        let json = serde_json::to_string_pretty(&compiled.summary())?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write summary {}", path.display()))?;
    }

    println!("{}", args.output.display());
    Ok(ExitCode::SUCCESS)
}

fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    init_tracing();
    let args = Args::parse();
    run(args)
}

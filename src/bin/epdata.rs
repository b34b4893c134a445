//! Epdata CLI - Consolidate per-trial accelerometer recordings
//!
//! Takes one positional argument, the root directory of the recordings, and
//! builds (or re-reads) the consolidated feature table at
//! `<root>/consolidated_ep_data.csv`. A missing argument terminates with
//! usage on stderr; a nonexistent root is reported without invoking the
//! pipeline.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use epdata::{consolidate, ConsolidateError, ConsolidatedRow, CACHE_FILE_NAME, EPDATA_VERSION};

/// Rows shown in the preview after a successful run
const PREVIEW_ROWS: usize = 5;

/// Epdata - consolidate epicardial accelerometer recordings into one CSV
#[derive(Parser)]
#[command(name = "epdata")]
#[command(version = EPDATA_VERSION)]
#[command(about = "Derive features from per-trial recordings and merge them into one table", long_about = None)]
struct Cli {
    /// Root directory containing the per-trial JSON record files
    root: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), ConsolidateError> {
    if !cli.root.exists() {
        return Err(ConsolidateError::PathNotFound(cli.root));
    }

    let cache_path = cli.root.join(CACHE_FILE_NAME);
    let table = consolidate(&cache_path, &cli.root)?;

    let (rows, cols) = table.shape();
    println!("Consolidated table: {} rows x {} columns", rows, cols);
    println!("Cache artifact: {}", cache_path.display());

    if !table.is_empty() {
        println!();
        print_preview(table.head(PREVIEW_ROWS));
    }

    Ok(())
}

fn print_preview(rows: &[ConsolidatedRow]) {
    println!(
        "{:>10} {:>10} {:>10} {:>10} {:>10} {:>12} {:>9} {:>14}",
        "acc_x", "acc_y", "acc_z", "lvp", "magnitude", "velocity", "timesecs", "contractility"
    );
    for row in rows {
        println!(
            "{:>10.4} {:>10.4} {:>10.4} {:>10.4} {:>10.4} {:>12.6} {:>9.3} {:>14.6}",
            row.acc_x,
            row.acc_y,
            row.acc_z,
            row.lvp,
            row.magnitude,
            row.velocity,
            row.timesecs,
            row.contractility
        );
    }
}

// Error output

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<ConsolidateError> for CliError {
    fn from(e: ConsolidateError) -> Self {
        match e {
            ConsolidateError::PathNotFound(path) => CliError {
                code: "PATH_NOT_FOUND".to_string(),
                message: format!("Provided directory {} doesn't exist", path.display()),
                hint: Some("Check the root directory path".to_string()),
            },
            ConsolidateError::NotADirectory(path) => CliError {
                code: "NOT_A_DIRECTORY".to_string(),
                message: format!("{} is not a directory", path.display()),
                hint: Some("Pass the recordings directory, not a file".to_string()),
            },
            e @ ConsolidateError::Load { .. } => CliError {
                code: "LOAD_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Record files must carry acc_x, acc_y, acc_z, and lvp channels".to_string()),
            },
            e @ ConsolidateError::ColumnLength { .. } => CliError {
                code: "LOAD_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Column-oriented record files must have equal-length channels".to_string()),
            },
            e @ ConsolidateError::DegenerateWindow(_) => CliError {
                code: "DEGENERATE_WINDOW".to_string(),
                message: e.to_string(),
                hint: None,
            },
            ConsolidateError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            ConsolidateError::Csv(e) => CliError {
                code: "CSV_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("The cache file may be corrupt; delete it to recompute".to_string()),
            },
            ConsolidateError::Walk(e) => CliError {
                code: "WALK_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check directory permissions under the root".to_string()),
            },
        }
    }
}

//! Error types for Epdata

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during consolidation
#[derive(Debug, Error)]
pub enum ConsolidateError {
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Failed to parse record file {path}: {source}")]
    Load {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Record file {path} has columns of unequal length ({expected} vs {found})")]
    ColumnLength {
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    #[error("Windowed integration requires at least 2 samples, got {0}")]
    DegenerateWindow(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Directory traversal error: {0}")]
    Walk(#[from] walkdir::Error),
}

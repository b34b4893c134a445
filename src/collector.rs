//! Record file discovery and loading
//!
//! This module walks a root directory for per-trial JSON record files, loads
//! each into a [`FileTable`], and runs the feature deriver over it. Discovery
//! is recursive with a case-insensitive extension match and a sorted
//! traversal order, so repeated runs see the same file sequence.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use walkdir::WalkDir;

use crate::error::ConsolidateError;
use crate::features::FeatureDeriver;
use crate::types::{FileTable, SampleRecord};

/// Extension of per-trial record files, matched case-insensitively
const RECORD_EXTENSION: &str = "json";

/// Channel arrays of a column-oriented record file. Files on disk are either
/// an array of row objects or a map of channel name to value array; both
/// shapes occur in exported trial data.
#[derive(Deserialize)]
struct RawColumns {
    acc_x: Vec<f64>,
    acc_y: Vec<f64>,
    acc_z: Vec<f64>,
    lvp: Vec<f64>,
}

/// Collector for discovering and loading per-trial record files
pub struct Collector {
    deriver: FeatureDeriver,
}

impl Default for Collector {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector {
    /// Create a collector with the standard 500 Hz feature deriver
    pub fn new() -> Self {
        Self {
            deriver: FeatureDeriver::new(),
        }
    }

    /// Create a collector with a specific feature deriver
    pub fn with_deriver(deriver: FeatureDeriver) -> Self {
        Self { deriver }
    }

    /// Discover every record file under `root`, load it, and derive its
    /// feature columns.
    ///
    /// A file that fails to parse aborts the whole run; there is no
    /// partial-skip recovery. The returned tables are in discovery order.
    pub fn collect(&self, root: &Path) -> Result<Vec<FileTable>, ConsolidateError> {
        if !root.exists() {
            return Err(ConsolidateError::PathNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(ConsolidateError::NotADirectory(root.to_path_buf()));
        }

        let files = self.discover(root)?;
        tracing::info!("Discovered {} record files under {}", files.len(), root.display());

        let mut tables = Vec::with_capacity(files.len());
        for path in files {
            let table = self.load(&path)?;
            tracing::debug!("Loaded {} ({} samples)", path.display(), table.len());
            tables.push(table);
        }

        Ok(tables)
    }

    /// Recursively list record files under `root` in sorted traversal order
    fn discover(&self, root: &Path) -> Result<Vec<PathBuf>, ConsolidateError> {
        let mut files = Vec::new();

        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_file() && is_record_file(entry.path()) {
                files.push(entry.path().to_path_buf());
            }
        }

        Ok(files)
    }

    /// Load one record file and attach its derived columns
    fn load(&self, path: &Path) -> Result<FileTable, ConsolidateError> {
        let contents = std::fs::read_to_string(path)?;
        let records = parse_records(&contents, path)?;
        let derived = self.deriver.derive(&records)?;

        Ok(FileTable {
            path: path.to_path_buf(),
            records,
            derived,
        })
    }
}

/// Parse a record file, dispatching on its JSON shape. The shapes are parsed
/// separately rather than through an untagged enum so a malformed file
/// reports which channel is missing or mistyped.
fn parse_records(contents: &str, path: &Path) -> Result<Vec<SampleRecord>, ConsolidateError> {
    let load_error = |source: serde_json::Error| ConsolidateError::Load {
        path: path.to_path_buf(),
        source,
    };

    let value: serde_json::Value = serde_json::from_str(contents).map_err(load_error)?;

    if value.is_array() {
        serde_json::from_value::<Vec<SampleRecord>>(value).map_err(load_error)
    } else {
        let columns: RawColumns = serde_json::from_value(value).map_err(load_error)?;
        columns.into_records(path)
    }
}

impl RawColumns {
    /// Flatten the channel arrays into row records, checking alignment
    fn into_records(self, path: &Path) -> Result<Vec<SampleRecord>, ConsolidateError> {
        let Self {
            acc_x,
            acc_y,
            acc_z,
            lvp,
        } = self;

        let expected = acc_x.len();
        for found in [acc_y.len(), acc_z.len(), lvp.len()] {
            if found != expected {
                return Err(ConsolidateError::ColumnLength {
                    path: path.to_path_buf(),
                    expected,
                    found,
                });
            }
        }

        Ok((0..expected)
            .map(|i| SampleRecord {
                acc_x: acc_x[i],
                acc_y: acc_y[i],
                acc_z: acc_z[i],
                lvp: lvp[i],
            })
            .collect())
    }
}

/// True when the path has the record extension, compared case-insensitively
fn is_record_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(RECORD_EXTENSION))
        .unwrap_or(false)
}

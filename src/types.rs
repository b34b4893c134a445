//! Core types for the Epdata pipeline
//!
//! This module defines the data structures that flow through each stage of
//! the pipeline: raw samples, per-file tables with derived columns, and the
//! consolidated output table.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One row of a per-trial time series.
///
/// Samples are ordered by acquisition index, spaced 2 ms apart (500 Hz).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    /// Acceleration along the x axis
    pub acc_x: f64,
    /// Acceleration along the y axis
    pub acc_y: f64,
    /// Acceleration along the z axis
    pub acc_z: f64,
    /// Left-ventricular pressure channel
    pub lvp: f64,
}

/// The four derived feature columns, each aligned to the source row index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedColumns {
    /// Euclidean norm of the three-axis acceleration vector
    pub magnitude: Vec<f64>,
    /// Windowed-integral velocity estimate
    pub velocity: Vec<f64>,
    /// Elapsed time since recording start, in seconds
    pub timesecs: Vec<f64>,
    /// Windowed integral of the pressure channel
    pub contractility: Vec<f64>,
}

impl DerivedColumns {
    /// True when every column has the given length
    pub fn is_aligned_to(&self, rows: usize) -> bool {
        self.magnitude.len() == rows
            && self.velocity.len() == rows
            && self.timesecs.len() == rows
            && self.contractility.len() == rows
    }
}

/// Samples from one source file, augmented with the derived columns
#[derive(Debug, Clone)]
pub struct FileTable {
    /// Path of the source record file
    pub path: PathBuf,
    /// Samples in acquisition order
    pub records: Vec<SampleRecord>,
    /// Derived columns, same length as `records`
    pub derived: DerivedColumns,
}

impl FileTable {
    /// Number of samples in this table
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the table holds no samples
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// One flattened row of the consolidated output: the four source channels
/// plus the four derived columns
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedRow {
    pub acc_x: f64,
    pub acc_y: f64,
    pub acc_z: f64,
    pub lvp: f64,
    pub magnitude: f64,
    pub velocity: f64,
    pub timesecs: f64,
    pub contractility: f64,
}

/// Number of columns in the consolidated output schema
pub const CONSOLIDATED_COLUMNS: usize = 8;

/// Column headers of the consolidated output, in persisted order
pub const CONSOLIDATED_HEADER: [&str; CONSOLIDATED_COLUMNS] = [
    "acc_x",
    "acc_y",
    "acc_z",
    "lvp",
    "magnitude",
    "velocity",
    "timesecs",
    "contractility",
];

/// Row-wise concatenation of all file tables, grouped by source file in
/// discovery order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsolidatedTable {
    rows: Vec<ConsolidatedRow>,
}

impl ConsolidatedTable {
    /// Build a table from already-flattened rows
    pub fn from_rows(rows: Vec<ConsolidatedRow>) -> Self {
        Self { rows }
    }

    /// Flatten the file tables into one consolidated table, preserving input
    /// ordering. The column set is fixed; no row is dropped or reordered
    /// within a file.
    pub fn from_file_tables(tables: Vec<FileTable>) -> Self {
        let total: usize = tables.iter().map(|t| t.len()).sum();
        let mut rows = Vec::with_capacity(total);

        for table in tables {
            debug_assert!(
                table.derived.is_aligned_to(table.len()),
                "derived columns of {} not aligned to its {} rows",
                table.path.display(),
                table.len()
            );
            let derived = table.derived;
            for (i, record) in table.records.into_iter().enumerate() {
                rows.push(ConsolidatedRow {
                    acc_x: record.acc_x,
                    acc_y: record.acc_y,
                    acc_z: record.acc_z,
                    lvp: record.lvp,
                    magnitude: derived.magnitude[i],
                    velocity: derived.velocity[i],
                    timesecs: derived.timesecs[i],
                    contractility: derived.contractility[i],
                });
            }
        }

        Self { rows }
    }

    /// All rows, in persisted order
    pub fn rows(&self) -> &[ConsolidatedRow] {
        &self.rows
    }

    /// Table shape as `(rows, columns)`; the column count is fixed
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), CONSOLIDATED_COLUMNS)
    }

    /// First `n` rows, for CLI preview
    pub fn head(&self, n: usize) -> &[ConsolidatedRow] {
        &self.rows[..self.rows.len().min(n)]
    }

    /// True when the table holds no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample(v: f64) -> SampleRecord {
        SampleRecord {
            acc_x: v,
            acc_y: v,
            acc_z: v,
            lvp: v,
        }
    }

    fn table_of(path: &str, values: &[f64]) -> FileTable {
        let records: Vec<SampleRecord> = values.iter().map(|&v| sample(v)).collect();
        let n = records.len();
        FileTable {
            path: PathBuf::from(path),
            records,
            derived: DerivedColumns {
                magnitude: vec![0.0; n],
                velocity: vec![0.0; n],
                timesecs: vec![0.0; n],
                contractility: vec![0.0; n],
            },
        }
    }

    #[test]
    fn test_concatenation_preserves_order() {
        let tables = vec![table_of("a.json", &[1.0, 2.0]), table_of("b.json", &[3.0])];
        let total = ConsolidatedTable::from_file_tables(tables);

        assert_eq!(total.shape(), (3, 8));
        let xs: Vec<f64> = total.rows().iter().map(|r| r.acc_x).collect();
        assert_eq!(xs, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_head_is_bounded() {
        let total = ConsolidatedTable::from_file_tables(vec![table_of("a.json", &[1.0, 2.0])]);
        assert_eq!(total.head(5).len(), 2);
        assert_eq!(total.head(1).len(), 1);
    }

    #[test]
    fn test_empty_table_shape() {
        let total = ConsolidatedTable::default();
        assert!(total.is_empty());
        assert_eq!(total.shape(), (0, 8));
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "not aligned")]
    fn test_misaligned_derived_columns_are_rejected() {
        let mut table = table_of("a.json", &[1.0, 2.0, 3.0]);
        table.derived.velocity.pop();
        ConsolidatedTable::from_file_tables(vec![table]);
    }

    #[test]
    fn test_derived_alignment_check() {
        let table = table_of("a.json", &[1.0, 2.0, 3.0]);
        assert!(table.derived.is_aligned_to(3));
        assert!(!table.derived.is_aligned_to(2));
    }
}

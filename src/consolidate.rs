//! Consolidation and cache management
//!
//! This module provides the public API for Epdata. It merges every per-trial
//! table under a root directory into one consolidated table and persists it
//! as a CSV cache artifact.
//!
//! Cache policy is existence-gated: if the cache file is already present it
//! is read back and returned verbatim, with no validation against the root
//! directory. Content staleness is the caller's responsibility; delete the
//! file to force recomputation.

use std::path::Path;

use crate::collector::Collector;
use crate::error::ConsolidateError;
use crate::features::FeatureDeriver;
use crate::types::{ConsolidatedRow, ConsolidatedTable};

/// Consolidate every record file under `root` into the cache at
/// `cache_path`, using the standard 500 Hz configuration.
///
/// # Example
/// ```ignore
/// let table = consolidate(
///     Path::new("recordings/consolidated_ep_data.csv"),
///     Path::new("recordings"),
/// )?;
/// println!("{:?}", table.shape());
/// ```
pub fn consolidate(cache_path: &Path, root: &Path) -> Result<ConsolidatedTable, ConsolidateError> {
    Consolidator::new().consolidate(cache_path, root)
}

/// Consolidator owning the pipeline configuration.
///
/// Runs a two-state cache machine per cache path: cold (no file) transitions
/// to warm (file written) exactly once; there is no transition back.
pub struct Consolidator {
    collector: Collector,
}

impl Default for Consolidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Consolidator {
    /// Create a consolidator with the standard 500 Hz configuration
    pub fn new() -> Self {
        Self {
            collector: Collector::new(),
        }
    }

    /// Create a consolidator for a non-standard acquisition rate
    pub fn with_sampling_rate(sampling_rate_hz: f64) -> Self {
        Self {
            collector: Collector::with_deriver(FeatureDeriver::with_sampling_rate(
                sampling_rate_hz,
            )),
        }
    }

    /// Return the consolidated table for `root`, reading the cache at
    /// `cache_path` when it exists and computing and persisting it otherwise.
    ///
    /// Nothing is persisted if any stage fails.
    pub fn consolidate(
        &self,
        cache_path: &Path,
        root: &Path,
    ) -> Result<ConsolidatedTable, ConsolidateError> {
        if cache_path.exists() {
            tracing::info!("Cache hit, reading {}", cache_path.display());
            return read_cache(cache_path);
        }

        tracing::info!("Cache miss, consolidating {}", root.display());
        let tables = self.collector.collect(root)?;
        let file_count = tables.len();

        let total = ConsolidatedTable::from_file_tables(tables);
        write_cache(cache_path, &total)?;

        let (rows, cols) = total.shape();
        tracing::info!(
            "Consolidated {} files into {} rows x {} columns at {}",
            file_count,
            rows,
            cols,
            cache_path.display()
        );

        Ok(total)
    }
}

/// Read a previously persisted cache artifact
fn read_cache(cache_path: &Path) -> Result<ConsolidatedTable, ConsolidateError> {
    let mut reader = csv::Reader::from_path(cache_path)?;
    let mut rows = Vec::new();

    for result in reader.deserialize::<ConsolidatedRow>() {
        rows.push(result?);
    }

    Ok(ConsolidatedTable::from_rows(rows))
}

/// Persist the consolidated table. An empty table still writes the fixed
/// column header, so the artifact round-trips to a zero-row table.
///
/// The artifact is staged through a sibling temporary file and renamed into
/// place only once fully written: a failure mid-write must not leave a
/// truncated cache that the existence check would trust forever.
fn write_cache(cache_path: &Path, table: &ConsolidatedTable) -> Result<(), ConsolidateError> {
    let mut bytes = Vec::new();
    {
        let mut writer = csv::Writer::from_writer(&mut bytes);

        if table.is_empty() {
            writer.write_record(crate::types::CONSOLIDATED_HEADER)?;
        } else {
            for row in table.rows() {
                writer.serialize(row)?;
            }
        }

        writer.flush()?;
    }

    // Staged next to the final path so the rename stays on one filesystem
    let staging_path = cache_path.with_extension("csv.tmp");
    if let Err(e) = std::fs::write(&staging_path, &bytes)
        .and_then(|()| std::fs::rename(&staging_path, cache_path))
    {
        let _ = std::fs::remove_file(&staging_path);
        return Err(e.into());
    }

    Ok(())
}

//! Epdata - Feature derivation and consolidation engine for epicardial
//! accelerometer recordings
//!
//! Epdata walks a directory tree of per-trial sensor recordings (JSON files
//! carrying `acc_x`/`acc_y`/`acc_z`/`lvp` channels) and turns them into one
//! tabular dataset through a deterministic pipeline: file discovery → record
//! loading → feature derivation → concatenation → cache write.
//!
//! ## Modules
//!
//! - **Collector**: Discover and load per-trial record files
//! - **Feature Deriver**: Compute magnitude, velocity, elapsed time, and a
//!   contractility proxy for every sample
//! - **Consolidator**: Merge all trials into one table, cached to disk

pub mod collector;
pub mod consolidate;
pub mod error;
pub mod features;
pub mod integrate;
pub mod types;

pub use collector::Collector;
pub use consolidate::{consolidate, Consolidator};
pub use error::ConsolidateError;
pub use features::FeatureDeriver;
pub use types::{ConsolidatedRow, ConsolidatedTable, DerivedColumns, FileTable, SampleRecord};

/// Epdata version embedded in CLI reports
pub const EPDATA_VERSION: &str = env!("CARGO_PKG_VERSION");

/// File name of the consolidated cache artifact, created under the scan root
pub const CACHE_FILE_NAME: &str = "consolidated_ep_data.csv";

/// Acquisition rate the recordings were resampled to (samples per second)
pub const DEFAULT_SAMPLING_RATE_HZ: f64 = 500.0;

//! End-to-end tests for the consolidation pipeline

use std::fs;
use std::path::Path;

use epdata::{consolidate, Collector, ConsolidateError, Consolidator, CACHE_FILE_NAME};
use pretty_assertions::assert_eq;

fn write_trial(dir: &Path, name: &str, rows: &[(f64, f64, f64, f64)]) {
    let records: Vec<serde_json::Value> = rows
        .iter()
        .map(|&(x, y, z, lvp)| {
            serde_json::json!({ "acc_x": x, "acc_y": y, "acc_z": z, "lvp": lvp })
        })
        .collect();
    fs::write(dir.join(name), serde_json::to_string(&records).unwrap()).unwrap();
}

fn three_sample_trial() -> Vec<(f64, f64, f64, f64)> {
    vec![
        (3.0, 4.0, 0.0, 100.0),
        (1.0, 2.0, 2.0, 110.0),
        (0.0, 0.0, 1.0, 120.0),
    ]
}

fn five_sample_trial() -> Vec<(f64, f64, f64, f64)> {
    (0..5)
        .map(|i| (i as f64, 0.5, -0.5, 90.0 + i as f64))
        .collect()
}

#[test]
fn two_trials_consolidate_into_eight_rows() {
    let dir = tempfile::tempdir().unwrap();
    write_trial(dir.path(), "a_trial.json", &three_sample_trial());
    write_trial(dir.path(), "b_trial.json", &five_sample_trial());
    let cache = dir.path().join(CACHE_FILE_NAME);

    let total = consolidate(&cache, dir.path()).unwrap();

    assert_eq!(total.shape(), (8, 8));

    // Rows are grouped by source file in discovery (sorted) order
    let xs: Vec<f64> = total.rows().iter().map(|r| r.acc_x).collect();
    assert_eq!(xs, vec![3.0, 1.0, 0.0, 0.0, 1.0, 2.0, 3.0, 4.0]);

    // Elapsed time restarts per trial: first file spans 2 ms steps from 0.002
    let times: Vec<f64> = total.rows().iter().take(3).map(|r| r.timesecs).collect();
    for (actual, want) in times.iter().zip(&[0.002, 0.004, 0.006]) {
        assert!((actual - want).abs() < 1e-9);
    }
    assert!((total.rows()[3].timesecs - 0.002).abs() < 1e-9);

    // Magnitude of the first sample is exactly 5
    assert!((total.rows()[0].magnitude - 5.0).abs() < 1e-9);
}

#[test]
fn derived_columns_match_row_counts_per_trial() {
    let dir = tempfile::tempdir().unwrap();
    write_trial(dir.path(), "a_trial.json", &three_sample_trial());
    write_trial(dir.path(), "b_trial.json", &five_sample_trial());

    let tables = Collector::new().collect(dir.path()).unwrap();

    for table in &tables {
        assert!(table.derived.is_aligned_to(table.len()));
    }
    let total_rows: usize = tables.iter().map(|t| t.len()).sum();
    assert_eq!(total_rows, 8);
}

#[test]
fn warm_cache_is_returned_without_rescanning() {
    let dir = tempfile::tempdir().unwrap();
    write_trial(dir.path(), "trial.json", &five_sample_trial());
    let cache = dir.path().join(CACHE_FILE_NAME);

    let first = consolidate(&cache, dir.path()).unwrap();
    let cached_bytes = fs::read(&cache).unwrap();

    // A sentinel record file added after the cold run must not be touched:
    // the warm run reads the cache instead of re-scanning the directory
    write_trial(dir.path(), "zz_sentinel.json", &three_sample_trial());

    let second = consolidate(&cache, dir.path()).unwrap();

    assert_eq!(first.shape(), second.shape());
    assert_eq!(cached_bytes, fs::read(&cache).unwrap());
}

#[test]
fn empty_root_writes_header_only_cache() {
    let dir = tempfile::tempdir().unwrap();
    let cache = dir.path().join(CACHE_FILE_NAME);

    let total = consolidate(&cache, dir.path()).unwrap();

    assert_eq!(total.shape(), (0, 8));
    let contents = fs::read_to_string(&cache).unwrap();
    assert_eq!(
        contents.lines().next().unwrap(),
        "acc_x,acc_y,acc_z,lvp,magnitude,velocity,timesecs,contractility"
    );
}

#[test]
fn unparseable_trial_aborts_without_output() {
    let dir = tempfile::tempdir().unwrap();
    write_trial(dir.path(), "a_trial.json", &three_sample_trial());
    fs::write(dir.path().join("broken.json"), "[{\"acc_x\": }]").unwrap();
    let cache = dir.path().join(CACHE_FILE_NAME);

    let result = consolidate(&cache, dir.path());

    assert!(matches!(result, Err(ConsolidateError::Load { .. })));
    assert!(!cache.exists());
}

#[test]
fn nonexistent_root_reports_path_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let cache = dir.path().join(CACHE_FILE_NAME);

    let result = consolidate(&cache, &dir.path().join("missing"));
    assert!(matches!(result, Err(ConsolidateError::PathNotFound(_))));
}

#[test]
fn custom_sampling_rate_flows_through_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    write_trial(
        dir.path(),
        "trial.json",
        &[(1.0, 0.0, 0.0, 50.0), (1.0, 0.0, 0.0, 50.0)],
    );
    let cache = dir.path().join(CACHE_FILE_NAME);

    let total = Consolidator::with_sampling_rate(1000.0)
        .consolidate(&cache, dir.path())
        .unwrap();

    // At 1000 Hz the sample period is 1 ms
    assert!((total.rows()[0].timesecs - 0.001).abs() < 1e-9);
    assert!((total.rows()[0].velocity - 0.001).abs() < 1e-12);
    assert!((total.rows()[0].contractility - 0.05).abs() < 1e-12);
}

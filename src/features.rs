//! Feature derivation
//!
//! This module derives the four per-sample feature columns from a loaded
//! trial:
//! - Magnitude of the three-axis acceleration vector
//! - Velocity from windowed integration of the acceleration channels
//! - Elapsed time from the acquisition index
//! - Contractility proxy from windowed integration of the pressure channel
//!
//! Derivation never mutates its input; the collector attaches the output as
//! new columns.

use crate::error::ConsolidateError;
use crate::integrate::integrate;
use crate::types::{DerivedColumns, SampleRecord};
use crate::DEFAULT_SAMPLING_RATE_HZ;

/// Width of the integration window, in samples
const WINDOW: usize = 2;

/// Feature deriver for computing the derived columns of one trial
pub struct FeatureDeriver {
    sampling_rate_hz: f64,
}

impl Default for FeatureDeriver {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureDeriver {
    /// Create a deriver at the standard 500 Hz acquisition rate
    pub fn new() -> Self {
        Self {
            sampling_rate_hz: DEFAULT_SAMPLING_RATE_HZ,
        }
    }

    /// Create a deriver for a non-standard acquisition rate
    pub fn with_sampling_rate(sampling_rate_hz: f64) -> Self {
        Self { sampling_rate_hz }
    }

    /// Derive all four feature columns for one trial.
    ///
    /// Every output column has the same length as `records`; the value at
    /// index `i` depends only on samples at index `i + 1` or earlier.
    pub fn derive(&self, records: &[SampleRecord]) -> Result<DerivedColumns, ConsolidateError> {
        Ok(DerivedColumns {
            magnitude: magnitude(records),
            velocity: self.velocity(records)?,
            timesecs: self.timesecs(records.len()),
            contractility: self.contractility(records)?,
        })
    }

    /// Sampling interval in seconds
    fn dt(&self) -> f64 {
        1.0 / self.sampling_rate_hz
    }

    /// Velocity estimate per sample: integrate each acceleration axis over
    /// the two-sample window starting at the sample, then take the Euclidean
    /// norm. Trailing samples without a full window repeat the last computed
    /// value (0.0 when no window ever fit).
    fn velocity(&self, records: &[SampleRecord]) -> Result<Vec<f64>, ConsolidateError> {
        let dt = self.dt();
        let mut velocity = Vec::with_capacity(records.len());
        let mut carry = 0.0;

        for start in 0..records.len() {
            let end = start + WINDOW;
            if end <= records.len() {
                let window = &records[start..end];
                let xs: Vec<f64> = window.iter().map(|r| r.acc_x).collect();
                let ys: Vec<f64> = window.iter().map(|r| r.acc_y).collect();
                let zs: Vec<f64> = window.iter().map(|r| r.acc_z).collect();

                let vx = integrate(&xs, dt)?;
                let vy = integrate(&ys, dt)?;
                let vz = integrate(&zs, dt)?;
                carry = (vx * vx + vy * vy + vz * vz).sqrt();
            }
            velocity.push(carry);
        }

        Ok(velocity)
    }

    /// Contractility proxy per sample: the raw windowed integral of the
    /// pressure channel, with the same tail-fill policy as velocity.
    fn contractility(&self, records: &[SampleRecord]) -> Result<Vec<f64>, ConsolidateError> {
        let dt = self.dt();
        let mut contractility = Vec::with_capacity(records.len());
        let mut carry = 0.0;

        for start in 0..records.len() {
            let end = start + WINDOW;
            if end <= records.len() {
                let lvps: Vec<f64> = records[start..end].iter().map(|r| r.lvp).collect();
                carry = integrate(&lvps, dt)?;
            }
            contractility.push(carry);
        }

        Ok(contractility)
    }

    /// Elapsed time per sample: the acquisition index converted to seconds
    /// with fractional milliseconds (2 ms per sample at 500 Hz).
    fn timesecs(&self, rows: usize) -> Vec<f64> {
        let period_ms = 1000.0 / self.sampling_rate_hz;
        (0..rows)
            .map(|i| {
                let elapsed_ms = (i + 1) as f64 * period_ms;
                let seconds = (elapsed_ms / 1000.0).floor();
                let milliseconds = elapsed_ms - seconds * 1000.0;
                seconds + milliseconds / 1000.0
            })
            .collect()
    }
}

/// Magnitude of the acceleration vector at every sample.
///
/// Using the magnitude makes the downstream analysis insensitive to the
/// orientation of the sensor axes.
fn magnitude(records: &[SampleRecord]) -> Vec<f64> {
    records
        .iter()
        .map(|r| (r.acc_x * r.acc_x + r.acc_y * r.acc_y + r.acc_z * r.acc_z).sqrt())
        .collect()
}

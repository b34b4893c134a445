//! Windowed numerical integration
//!
//! Definite integral of a uniformly sampled signal via composite Simpson's
//! rule. The feature pipeline only ever integrates two-point windows, where
//! the rule degenerates to the trapezoidal estimate, but the implementation
//! accepts any window of at least two samples.

use crate::error::ConsolidateError;

/// Integrate `values` sampled at uniform spacing `dt`.
///
/// Simpson's rule needs an even number of intervals; when the interval count
/// is odd the final interval is handled with a trapezoidal correction. A
/// window of fewer than two samples has no definite integral and is signaled
/// as [`ConsolidateError::DegenerateWindow`] rather than silently
/// approximated.
pub fn integrate(values: &[f64], dt: f64) -> Result<f64, ConsolidateError> {
    let n = values.len();
    if n < 2 {
        return Err(ConsolidateError::DegenerateWindow(n));
    }

    if n == 2 {
        return Ok(dt * (values[0] + values[1]) / 2.0);
    }

    let intervals = n - 1;
    let odd_tail = intervals % 2 == 1;
    let simpson_end = if odd_tail { n - 1 } else { n };

    let mut total = 0.0;
    let mut i = 0;
    while i + 2 < simpson_end {
        total += dt / 3.0 * (values[i] + 4.0 * values[i + 1] + values[i + 2]);
        i += 2;
    }

    if odd_tail {
        total += dt * (values[n - 2] + values[n - 1]) / 2.0;
    }

    Ok(total)
}

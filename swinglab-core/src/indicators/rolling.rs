//! Rolling helpers for return-based statistics.

use crate::error::{check_window, CoreError};

/// Fractional change from the previous point. The first point is undefined.
pub fn pct_change(values: &[f64]) -> Vec<f64> {
    let mut result = vec![f64::NAN; values.len()];
    for i in 1..values.len() {
        result[i] = values[i] / values[i - 1] - 1.0;
    }
    result
}

/// Rolling sample standard deviation (n - 1 denominator).
///
/// Undefined for the first `window - 1` points, for windows containing NaN,
/// and everywhere when `window == 1`.
pub fn rolling_std(values: &[f64], window: usize) -> Result<Vec<f64>, CoreError> {
    check_window(window)?;

    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if window < 2 {
        return Ok(result);
    }

    for end in (window - 1)..n {
        let slice = &values[end + 1 - window..=end];
        if slice.iter().any(|v| v.is_nan()) {
            continue;
        }
        let mean = slice.iter().sum::<f64>() / window as f64;
        let var = slice.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (window - 1) as f64;
        result[end] = var.sqrt();
    }

    Ok(result)
}

//! Exponential Moving Average (EMA).
//!
//! EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1], alpha = 2 / (window + 1).
//! Seeded from the first defined observation, so there is no warm-up gap.
//!
//! Undefined inputs after the seed hold the previous value. The held value
//! keeps decaying across the gap: the next observation is blended against a
//! weight of `(1 - alpha)^k` for a gap of `k - 1` missing points.

use crate::error::{check_window, CoreError};

pub fn ema(values: &[f64], window: usize) -> Result<Vec<f64>, CoreError> {
    check_window(window)?;
    let alpha = 2.0 / (window as f64 + 1.0);
    Ok(ewm(values, alpha))
}

/// Exponentially weighted mean with smoothing factor `alpha` in (0, 1].
///
/// Shared by `ema`, `rsi` and `atr`.
pub fn ewm(values: &[f64], alpha: f64) -> Vec<f64> {
    let mut result = Vec::with_capacity(values.len());
    let mut weighted = f64::NAN;
    let mut old_weight = 1.0;

    for &x in values {
        if weighted.is_nan() {
            weighted = x;
            old_weight = 1.0;
        } else {
            old_weight *= 1.0 - alpha;
            if !x.is_nan() {
                // Constant series stay exact
                if weighted != x {
                    weighted = (old_weight * weighted + alpha * x) / (old_weight + alpha);
                }
                old_weight = 1.0;
            }
        }
        result.push(weighted);
    }

    result
}

//! Relative Strength Index (RSI).
//!
//! Gains and losses are smoothed with the same exponential weighting as `ema`
//! (alpha = 2 / (window + 1)).
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//!
//! The first point has no price change and is undefined. When `avg_loss == 0`
//! the ratio is undefined and so is the RSI at that point.

use super::ema::ewm;
use crate::error::{check_window, CoreError};

pub fn rsi(values: &[f64], window: usize) -> Result<Vec<f64>, CoreError> {
    check_window(window)?;

    let n = values.len();
    let mut gains = vec![f64::NAN; n];
    let mut losses = vec![f64::NAN; n];
    for i in 1..n {
        let delta = values[i] - values[i - 1];
        if delta.is_nan() {
            continue;
        }
        gains[i] = delta.max(0.0);
        losses[i] = (-delta).max(0.0);
    }

    let alpha = 2.0 / (window as f64 + 1.0);
    let avg_gain = ewm(&gains, alpha);
    let avg_loss = ewm(&losses, alpha);

    Ok(avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(&gain, &loss)| compute_rsi(gain, loss))
        .collect())
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_gain.is_nan() || avg_loss.is_nan() || avg_loss == 0.0 {
        return f64::NAN;
    }
    100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
}

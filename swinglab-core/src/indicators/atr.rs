//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|)
//! The first bar has no previous close, so its true range is high-low.
//! ATR is the exponential smoothing of true range (alpha = 2 / (window + 1)),
//! defined from the first bar.

use super::ema::ewm;
use crate::error::{check_window, CoreError, ShapeError};

/// Compute the True Range series.
///
/// Undefined components are skipped; the range is undefined only when every
/// component is.
pub fn true_range(high: &[f64], low: &[f64], close: &[f64]) -> Result<Vec<f64>, CoreError> {
    ShapeError::check_len("high", high.len(), "low", low.len())?;
    ShapeError::check_len("high", high.len(), "close", close.len())?;

    let tr = (0..high.len())
        .map(|i| {
            let (h, l) = (high[i], low[i]);
            let high_low = h - l;
            if i == 0 {
                return high_low;
            }
            let pc = close[i - 1];
            // f64::max ignores a NaN operand
            f64::NAN
                .max(high_low)
                .max((h - pc).abs())
                .max((l - pc).abs())
        })
        .collect();

    Ok(tr)
}

pub fn atr(high: &[f64], low: &[f64], close: &[f64], window: usize) -> Result<Vec<f64>, CoreError> {
    check_window(window)?;
    let tr = true_range(high, low, close)?;
    let alpha = 2.0 / (window as f64 + 1.0);
    Ok(ewm(&tr, alpha))
}

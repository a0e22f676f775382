//! Simple Moving Average (SMA).
//!
//! Rolling mean over a lookback window.
//! Undefined for the first `window - 1` points and for any window containing NaN.

use crate::error::{check_window, CoreError};

pub fn sma(values: &[f64], window: usize) -> Result<Vec<f64>, CoreError> {
    check_window(window)?;

    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if n < window {
        return Ok(result);
    }

    let mut sum = 0.0;
    let mut nan_count = 0usize;
    for (i, &entering) in values.iter().enumerate() {
        if entering.is_nan() {
            nan_count += 1;
        } else {
            sum += entering;
        }

        if i >= window {
            let leaving = values[i - window];
            if leaving.is_nan() {
                nan_count -= 1;
            } else {
                sum -= leaving;
            }
        }

        if i + 1 >= window && nan_count == 0 {
            result[i] = sum / window as f64;
        }
    }

    Ok(result)
}

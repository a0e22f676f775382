//! Mean-reversion signal on RSI extremes.
//!
//! Long when RSI < `low`, Short when RSI > `high`, Flat otherwise or while
//! RSI is undefined.

use crate::domain::Signal;
use crate::error::{ConfigError, CoreError};
use crate::indicators::rsi;

pub fn mean_reversion(
    closes: &[f64],
    rsi_window: usize,
    low: f64,
    high: f64,
) -> Result<Vec<Signal>, CoreError> {
    if low > high {
        return Err(ConfigError::InvalidStrategy(format!(
            "mean_reversion low ({low}) must not exceed high ({high})"
        ))
        .into());
    }

    let rsi_line = rsi(closes, rsi_window)?;
    Ok(rsi_line
        .iter()
        .map(|&v| {
            if v < low {
                Signal::Long
            } else if v > high {
                Signal::Short
            } else {
                Signal::Flat
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversold_goes_long() {
        // Straight decline: RSI = 0 after the first bar
        let closes = [100.0, 99.0, 98.0, 97.0];
        let signals = mean_reversion(&closes, 14, 30.0, 70.0).unwrap();
        assert_eq!(signals[0], Signal::Flat);
        assert!(signals[1..].iter().all(|&s| s == Signal::Long));
    }

    #[test]
    fn overbought_goes_short() {
        // One small loss, then strong gains push RSI high
        let closes = [100.0, 99.9, 105.0, 110.0, 115.0];
        let signals = mean_reversion(&closes, 3, 30.0, 70.0).unwrap();
        assert_eq!(*signals.last().unwrap(), Signal::Short);
    }

    #[test]
    fn inverted_thresholds_rejected() {
        assert!(mean_reversion(&[1.0, 2.0], 14, 70.0, 30.0).is_err());
    }
}

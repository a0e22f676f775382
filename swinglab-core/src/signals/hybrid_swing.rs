//! Hybrid swing signal: SMA crossover with smoothing.
//!
//! Raw signal: +1 when SMA(fast) > SMA(slow), -1 when below, 0 when equal or
//! either average is still warming up.
//! Final signal: the rolling mean of the raw signal over `smooth` bars,
//! rounded half-to-even. With `smooth = 2` a direction only survives when two
//! consecutive raw signals agree. Flat until the smoothing window fills.

use crate::domain::Signal;
use crate::error::{check_window, ConfigError, CoreError};
use crate::indicators::sma;

pub fn hybrid_swing(
    closes: &[f64],
    fast: usize,
    slow: usize,
    smooth: usize,
) -> Result<Vec<Signal>, CoreError> {
    check_window(smooth)?;
    if fast >= slow {
        return Err(ConfigError::InvalidStrategy(format!(
            "hybrid_swing fast window ({fast}) must be shorter than slow window ({slow})"
        ))
        .into());
    }

    let fast_ma = sma(closes, fast)?;
    let slow_ma = sma(closes, slow)?;

    let raw: Vec<f64> = fast_ma
        .iter()
        .zip(&slow_ma)
        .map(|(&f, &s)| {
            if f > s {
                1.0
            } else if f < s {
                -1.0
            } else {
                0.0
            }
        })
        .collect();

    let signals = (0..raw.len())
        .map(|t| {
            if t + 1 < smooth {
                return Signal::Flat;
            }
            let window = &raw[t + 1 - smooth..=t];
            let mean = window.iter().sum::<f64>() / smooth as f64;
            Signal::from_value(mean.round_ties_even())
        })
        .collect();

    Ok(signals)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(signals: &[Signal]) -> Vec<i8> {
        signals.iter().map(|s| s.value()).collect()
    }

    #[test]
    fn warmup_is_flat() {
        let closes = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let signals = hybrid_swing(&closes, 3, 5, 2).unwrap();
        // SMA(5) first defined at index 4; raw = +1 from index 4;
        // smoothing needs two agreeing raw values → first Long at index 5
        assert_eq!(values(&signals), vec![0, 0, 0, 0, 0, 1, 1]);
    }

    #[test]
    fn disagreement_rounds_to_flat() {
        // Rising then sharply falling: the raw signal flips
        let closes = [10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0, 5.0, 4.0, 3.0];
        let signals = hybrid_swing(&closes, 3, 5, 2).unwrap();
        let v = values(&signals);
        assert_eq!(v[6], 1);
        // Index 7: raw flips to -1, mean(+1, -1) = 0
        assert_eq!(v[7], 0);
        assert_eq!(v[8], -1);
    }

    #[test]
    fn fast_must_be_shorter_than_slow() {
        assert!(hybrid_swing(&[1.0; 10], 5, 5, 2).is_err());
    }

    #[test]
    fn zero_smoothing_rejected() {
        assert!(hybrid_swing(&[1.0; 10], 3, 5, 0).is_err());
    }
}

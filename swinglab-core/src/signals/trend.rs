//! Trend filter and trend-pullback signal.

use crate::domain::Signal;
use crate::error::{ConfigError, CoreError, ShapeError};
use crate::indicators::{ema, rsi};

/// +1 when EMA(fast) is above EMA(slow), -1 when below, 0 when equal.
pub fn trend_filter(closes: &[f64], slow: usize, fast: usize) -> Result<Vec<Signal>, CoreError> {
    let slow_ema = ema(closes, slow)?;
    let fast_ema = ema(closes, fast)?;

    Ok(fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(&f, &s)| {
            if f > s {
                Signal::Long
            } else if f < s {
                Signal::Short
            } else {
                Signal::Flat
            }
        })
        .collect())
}

/// Enter with the trend on a pullback.
///
/// - Long: uptrend, close at or below EMA, RSI below `rsi_buy`
/// - Short: downtrend, close at or above EMA, RSI above `rsi_sell`
///
/// An undefined RSI never fires.
pub fn trend_pullback(
    closes: &[f64],
    trend: &[Signal],
    ema_window: usize,
    rsi_window: usize,
    rsi_buy: f64,
    rsi_sell: f64,
) -> Result<Vec<Signal>, CoreError> {
    ShapeError::check_len("closes", closes.len(), "trend", trend.len())?;
    if rsi_buy > rsi_sell {
        return Err(ConfigError::InvalidStrategy(format!(
            "trend_pullback rsi_buy ({rsi_buy}) must not exceed rsi_sell ({rsi_sell})"
        ))
        .into());
    }

    let ema_line = ema(closes, ema_window)?;
    let rsi_line = rsi(closes, rsi_window)?;

    let signals = (0..closes.len())
        .map(|t| {
            let (close, mid, strength) = (closes[t], ema_line[t], rsi_line[t]);
            match trend[t] {
                Signal::Long if close <= mid && strength < rsi_buy => Signal::Long,
                Signal::Short if close >= mid && strength > rsi_sell => Signal::Short,
                _ => Signal::Flat,
            }
        })
        .collect();

    Ok(signals)
}

//! Descriptive per-bar statistics of the underlying price series.
//!
//! These columns describe the instrument, not the strategy: they are
//! computed from closes alone and never feed back into the backtest.

use serde::{Deserialize, Serialize};
use swinglab_core::domain::undefined::deserialize_vec;
use swinglab_core::indicators::{pct_change, rolling_std, sma};
use swinglab_core::CoreError;

/// Window of the short rolling statistics.
pub const SHORT_WINDOW: usize = 20;
/// Window of the long moving average.
pub const LONG_WINDOW: usize = 50;

/// Per-bar stock statistics, each aligned with the input closes. NaN = undefined.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockIndices {
    /// Simple return from the previous close.
    #[serde(deserialize_with = "deserialize_vec")]
    pub returns: Vec<f64>,
    /// Growth of one unit invested at the first close.
    #[serde(deserialize_with = "deserialize_vec")]
    pub cum_returns: Vec<f64>,
    #[serde(deserialize_with = "deserialize_vec")]
    pub ma20: Vec<f64>,
    #[serde(deserialize_with = "deserialize_vec")]
    pub ma50: Vec<f64>,
    /// Rolling sample standard deviation of `returns`.
    #[serde(deserialize_with = "deserialize_vec")]
    pub volatility20: Vec<f64>,
    /// Rolling mean of `returns` over their rolling standard deviation.
    #[serde(deserialize_with = "deserialize_vec")]
    pub sharpe20: Vec<f64>,
}

impl StockIndices {
    pub fn compute(closes: &[f64]) -> Result<Self, CoreError> {
        let returns = pct_change(closes);
        let cum_returns = cumulative_product(&returns);
        let ma20 = sma(closes, SHORT_WINDOW)?;
        let ma50 = sma(closes, LONG_WINDOW)?;
        let volatility20 = rolling_std(&returns, SHORT_WINDOW)?;
        let mean20 = sma(&returns, SHORT_WINDOW)?;

        let sharpe20 = mean20
            .iter()
            .zip(&volatility20)
            .map(|(&m, &s)| if s > 0.0 { m / s } else { f64::NAN })
            .collect();

        Ok(Self {
            returns,
            cum_returns,
            ma20,
            ma50,
            volatility20,
            sharpe20,
        })
    }

    pub fn len(&self) -> usize {
        self.returns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }
}

/// Running product of `1 + r`. Undefined returns stay undefined in the
/// output and leave the running product untouched.
fn cumulative_product(returns: &[f64]) -> Vec<f64> {
    let mut product = 1.0;
    returns
        .iter()
        .map(|&r| {
            if r.is_nan() {
                f64::NAN
            } else {
                product *= 1.0 + r;
                product
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cum_returns_track_price_growth() {
        let closes = [100.0, 110.0, 121.0, 108.9];
        let stats = StockIndices::compute(&closes).unwrap();
        assert!(stats.returns[0].is_nan());
        assert!(stats.cum_returns[0].is_nan());
        for (i, &c) in closes.iter().enumerate().skip(1) {
            assert!((stats.cum_returns[i] - c / 100.0).abs() < 1e-12);
        }
    }

    #[test]
    fn short_history_leaves_windows_undefined() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let stats = StockIndices::compute(&closes).unwrap();
        assert_eq!(stats.len(), 30);
        assert!(stats.ma20[18].is_nan());
        assert!(!stats.ma20[19].is_nan());
        assert!(stats.ma50.iter().all(|v| v.is_nan()));
        // First return is undefined, so the first full window of returns ends at 20
        assert!(stats.volatility20[19].is_nan());
        assert!(!stats.volatility20[20].is_nan());
        assert!(!stats.sharpe20[20].is_nan());
    }

    #[test]
    fn flat_prices_have_undefined_sharpe() {
        let stats = StockIndices::compute(&[50.0; 25]).unwrap();
        assert_eq!(stats.volatility20[24], 0.0);
        assert!(stats.sharpe20[24].is_nan());
    }
}

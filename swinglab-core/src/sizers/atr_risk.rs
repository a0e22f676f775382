//! ATR risk sizing.
//!
//! Risk a fixed fraction of equity per trade, with the stop `atr_multiplier`
//! ATRs from entry.
//!
//! ```text
//! risk_amount   = equity * risk_per_trade
//! stop_distance = atr_multiplier * atr
//! shares        = risk_amount / stop_distance
//! ```
//!
//! Example: equity 100,000, risk 1% (1,000), ATR 1.0, multiplier 2 →
//! stop distance 2.0 → 500 shares.

/// Returns `0.0` when ATR is undefined or the stop distance is not positive.
pub fn atr_risk_size(equity: f64, atr_value: f64, risk_per_trade: f64, atr_multiplier: f64) -> f64 {
    if atr_value.is_nan() {
        return 0.0;
    }
    let stop_distance = atr_multiplier * atr_value;
    if stop_distance <= 0.0 {
        return 0.0;
    }
    let risk_amount = equity * risk_per_trade;
    risk_amount / stop_distance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atr_risk_basic() {
        assert_eq!(atr_risk_size(100_000.0, 1.0, 0.01, 2.0), 500.0);
    }

    #[test]
    fn atr_risk_scales_inversely_with_volatility() {
        let calm = atr_risk_size(100_000.0, 1.0, 0.01, 2.0);
        let wild = atr_risk_size(100_000.0, 4.0, 0.01, 2.0);
        assert_eq!(calm, 4.0 * wild);
    }

    #[test]
    fn undefined_atr_returns_zero() {
        assert_eq!(atr_risk_size(100_000.0, f64::NAN, 0.01, 2.0), 0.0);
    }

    #[test]
    fn non_positive_stop_distance_returns_zero() {
        assert_eq!(atr_risk_size(100_000.0, 0.0, 0.01, 2.0), 0.0);
        assert_eq!(atr_risk_size(100_000.0, -1.0, 0.01, 2.0), 0.0);
    }
}

//! Volatility-target sizing.
//!
//! `shares = (equity * vol_target) / (price * assumed_volatility)`
//!
//! `assumed_volatility` is a per-unit daily volatility assumption standing in
//! for a measured estimate (0.02 by default).

pub fn vol_target_size(equity: f64, price: f64, vol_target: f64, assumed_volatility: f64) -> f64 {
    let unit_risk = price * assumed_volatility;
    if unit_risk.is_nan() || unit_risk <= 0.0 {
        return 0.0;
    }
    (equity * vol_target) / unit_risk
}

//! Equity-fraction sizing, shared by the fixed-fraction and Kelly modes.
//!
//! `shares = (equity * fraction) / price`

pub fn fraction_size(equity: f64, price: f64, fraction: f64) -> f64 {
    if price.is_nan() || price <= 0.0 {
        return 0.0;
    }
    (equity * fraction) / price
}

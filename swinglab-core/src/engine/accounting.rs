//! Post-pass accounting over the finished equity series.

/// `r[t] = e[t] / e[t-1] - 1`, with `r[0] = 0`.
///
/// A zero previous value yields 0 rather than an infinite return.
pub fn simple_returns(equity: &[f64]) -> Vec<f64> {
    let mut returns = Vec::with_capacity(equity.len());
    for (t, &e) in equity.iter().enumerate() {
        let r = match t.checked_sub(1).map(|p| equity[p]) {
            Some(prev) if prev != 0.0 => e / prev - 1.0,
            _ => 0.0,
        };
        returns.push(r);
    }
    returns
}

/// Running maximum, including the current point.
pub fn running_peak(equity: &[f64]) -> Vec<f64> {
    let mut peak = f64::NEG_INFINITY;
    equity
        .iter()
        .map(|&e| {
            peak = peak.max(e);
            peak
        })
        .collect()
}

/// `(e - peak) / peak` per point.
pub fn drawdowns(equity: &[f64], peak: &[f64]) -> Vec<f64> {
    equity
        .iter()
        .zip(peak)
        .map(|(&e, &p)| if p > 0.0 { (e - p) / p } else { 0.0 })
        .collect()
}

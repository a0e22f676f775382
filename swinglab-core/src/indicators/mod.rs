//! Indicator library.
//!
//! Every indicator is a pure function from one or more numeric series to a
//! time-aligned output series of the same length. `f64::NAN` marks an
//! undefined value: the warm-up window of a rolling statistic, a point whose
//! inputs were undefined, or a ratio with a zero denominator.
//!
//! | indicator | leading undefined points |
//! |-----------|--------------------------|
//! | `sma`     | `window - 1`             |
//! | `ema`     | 0                        |
//! | `rsi`     | 1                        |
//! | `atr`     | 0                        |

pub mod atr;
pub mod ema;
pub mod rolling;
pub mod rsi;
pub mod sma;

pub use atr::{atr, true_range};
pub use ema::{ema, ewm};
pub use rolling::{pct_change, rolling_std};
pub use rsi::rsi;
pub use sma::sma;

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

//! Error taxonomy for the core crate.
//!
//! Only structural problems are errors: bad configuration and misaligned
//! inputs. Both are detected before the first bar is processed. Per-bar
//! numeric anomalies (undefined ATR, zero stop distance) are not errors at
//! all; the engine absorbs them as "no trade".

use thiserror::Error;

/// Invalid or unknown configuration. Fatal at construction time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("window must be >= 1, got {0}")]
    InvalidWindow(usize),

    #[error("initial_capital must be > 0, got {0}")]
    NonPositiveCapital(f64),

    #[error("{field} must be > 0, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("commission_per_trade must be >= 0, got {0}")]
    NegativeCommission(f64),

    #[error("unknown sizing mode '{0}' (expected one of: atr, vol, fixed_fraction, kelly_fraction)")]
    UnknownSizingMode(String),

    #[error("invalid strategy parameters: {0}")]
    InvalidStrategy(String),
}

/// Input series that do not line up with each other.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("shape mismatch: {left} has {left_len} values but {right} has {right_len}")]
    LengthMismatch {
        left: &'static str,
        left_len: usize,
        right: &'static str,
        right_len: usize,
    },

    #[error("bars are not strictly increasing in timestamp at index {index}")]
    UnorderedTimestamps { index: usize },
}

impl ShapeError {
    /// Check that two series have the same length.
    pub fn check_len(
        left: &'static str,
        left_len: usize,
        right: &'static str,
        right_len: usize,
    ) -> Result<(), ShapeError> {
        if left_len == right_len {
            Ok(())
        } else {
            Err(ShapeError::LengthMismatch {
                left,
                left_len,
                right,
                right_len,
            })
        }
    }
}

/// Any failure surfaced by the core crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Shape(#[from] ShapeError),
}

/// Reject windows smaller than one bar.
pub(crate) fn check_window(window: usize) -> Result<(), ConfigError> {
    if window == 0 {
        Err(ConfigError::InvalidWindow(window))
    } else {
        Ok(())
    }
}

/// Reject non-finite or non-positive parameters.
pub(crate) fn check_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NonFinite { field, value });
    }
    if value <= 0.0 {
        return Err(ConfigError::NonPositive { field, value });
    }
    Ok(())
}

//! Position sizing: converts equity and volatility into a share magnitude.
//!
//! Sizing is a pure function. It never decides direction (the signal does)
//! and never decides whether to enter (the engine does). A result of `0.0`
//! means "abstain": the engine treats the bar as an ordinary flat bar.

pub mod atr_risk;
pub mod fraction;
pub mod vol_target;

pub use atr_risk::atr_risk_size;
pub use fraction::fraction_size;
pub use vol_target::vol_target_size;

use serde::{Deserialize, Serialize};

use crate::error::{check_positive, ConfigError};

/// The active sizing rule. Exactly one per run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SizingMode {
    /// Risk a fraction of equity against a stop placed `atr_multiplier` ATRs away.
    Atr {
        risk_per_trade: f64,
        atr_multiplier: f64,
    },
    /// Target a volatility budget against an assumed per-unit volatility.
    Vol {
        vol_target: f64,
        assumed_volatility: f64,
    },
    /// Allocate a fixed fraction of equity.
    FixedFraction { fraction: f64 },
    /// Allocate a (fractional) Kelly share of equity.
    KellyFraction { fraction: f64 },
}

impl SizingMode {
    /// Mode name as used in configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            SizingMode::Atr { .. } => "atr",
            SizingMode::Vol { .. } => "vol",
            SizingMode::FixedFraction { .. } => "fixed_fraction",
            SizingMode::KellyFraction { .. } => "kelly_fraction",
        }
    }

    /// Check every parameter of the mode is finite and positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            SizingMode::Atr {
                risk_per_trade,
                atr_multiplier,
            } => {
                check_positive("risk_per_trade", risk_per_trade)?;
                check_positive("atr_multiplier", atr_multiplier)
            }
            SizingMode::Vol {
                vol_target,
                assumed_volatility,
            } => {
                check_positive("vol_target", vol_target)?;
                check_positive("assumed_volatility", assumed_volatility)
            }
            SizingMode::FixedFraction { fraction } => check_positive("fixed_fraction", fraction),
            SizingMode::KellyFraction { fraction } => check_positive("kelly_fraction", fraction),
        }
    }
}

/// Desired share magnitude (always >= 0) for a new position.
///
/// `atr_value` is only consulted by `Atr` mode; NaN means undefined.
/// Any non-finite intermediate result collapses to `0.0`.
pub fn position_size(equity: f64, atr_value: f64, price: f64, mode: &SizingMode) -> f64 {
    let size = match *mode {
        SizingMode::Atr {
            risk_per_trade,
            atr_multiplier,
        } => atr_risk_size(equity, atr_value, risk_per_trade, atr_multiplier),
        SizingMode::Vol {
            vol_target,
            assumed_volatility,
        } => vol_target_size(equity, price, vol_target, assumed_volatility),
        SizingMode::FixedFraction { fraction } | SizingMode::KellyFraction { fraction } => {
            fraction_size(equity, price, fraction)
        }
    };

    if size.is_finite() && size > 0.0 {
        size
    } else {
        0.0
    }
}

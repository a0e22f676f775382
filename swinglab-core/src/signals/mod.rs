//! Signal generators: turn a close series into directional signals.
//!
//! Signals are computed on bar close and carry no execution lag; the engine
//! applies each one on the following bar. Generators never see equity or
//! positions.

pub mod hybrid_swing;
pub mod mean_reversion;
pub mod trend;

pub use hybrid_swing::hybrid_swing;
pub use mean_reversion::mean_reversion;
pub use trend::{trend_filter, trend_pullback};

use serde::{Deserialize, Serialize};

use crate::domain::bar::closes;
use crate::domain::{Bar, Signal};
use crate::error::CoreError;

/// A strategy and its parameters, as selected in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrategyKind {
    /// Fast/slow SMA crossover smoothed by a short rolling mean.
    HybridSwing {
        #[serde(default = "default_fast")]
        fast: usize,
        #[serde(default = "default_slow")]
        slow: usize,
        #[serde(default = "default_smooth")]
        smooth: usize,
    },
    /// Buy dips in an uptrend, sell rallies in a downtrend.
    TrendPullback {
        #[serde(default = "default_slow_trend")]
        slow_trend: usize,
        #[serde(default = "default_fast_trend")]
        fast_trend: usize,
        #[serde(default = "default_ema_window")]
        ema_window: usize,
        #[serde(default = "default_rsi_window")]
        rsi_window: usize,
        #[serde(default = "default_rsi_buy")]
        rsi_buy: f64,
        #[serde(default = "default_rsi_sell")]
        rsi_sell: f64,
    },
    /// Fade RSI extremes.
    MeanReversion {
        #[serde(default = "default_rsi_window")]
        rsi_window: usize,
        #[serde(default = "default_rsi_low")]
        low: f64,
        #[serde(default = "default_rsi_high")]
        high: f64,
    },
}

impl Default for StrategyKind {
    fn default() -> Self {
        StrategyKind::HybridSwing {
            fast: default_fast(),
            slow: default_slow(),
            smooth: default_smooth(),
        }
    }
}

impl StrategyKind {
    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::HybridSwing { .. } => "hybrid_swing",
            StrategyKind::TrendPullback { .. } => "trend_pullback",
            StrategyKind::MeanReversion { .. } => "mean_reversion",
        }
    }

    /// Generate one signal per bar from the bars' closes.
    pub fn generate(&self, bars: &[Bar]) -> Result<Vec<Signal>, CoreError> {
        let closes = closes(bars);
        match *self {
            StrategyKind::HybridSwing { fast, slow, smooth } => {
                hybrid_swing(&closes, fast, slow, smooth)
            }
            StrategyKind::TrendPullback {
                slow_trend,
                fast_trend,
                ema_window,
                rsi_window,
                rsi_buy,
                rsi_sell,
            } => {
                let trend = trend_filter(&closes, slow_trend, fast_trend)?;
                trend_pullback(&closes, &trend, ema_window, rsi_window, rsi_buy, rsi_sell)
            }
            StrategyKind::MeanReversion {
                rsi_window,
                low,
                high,
            } => mean_reversion(&closes, rsi_window, low, high),
        }
    }
}

fn default_fast() -> usize {
    3
}
fn default_slow() -> usize {
    5
}
fn default_smooth() -> usize {
    2
}
fn default_slow_trend() -> usize {
    50
}
fn default_fast_trend() -> usize {
    20
}
fn default_ema_window() -> usize {
    20
}
fn default_rsi_window() -> usize {
    14
}
fn default_rsi_buy() -> f64 {
    40.0
}
fn default_rsi_sell() -> f64 {
    60.0
}
fn default_rsi_low() -> f64 {
    30.0
}
fn default_rsi_high() -> f64 {
    70.0
}

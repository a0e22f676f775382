//! Backtest configuration.
//!
//! Two layers:
//! - [`BacktestSettings`]: the flat, serializable form found in config files.
//!   Every sizing mode's parameters live side by side and `sizing_mode` names
//!   the active one.
//! - [`BacktestConfig`]: the validated, immutable form the engine runs on.
//!   Only the active mode's parameters survive, inside [`SizingMode`].
//!
//! Conversion is the only place configuration can fail, so a bad config is
//! always rejected before the first bar is processed.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sizers::SizingMode;

/// Flat configuration as written in TOML/JSON. Missing keys take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestSettings {
    pub initial_capital: f64,
    pub risk_per_trade: f64,
    pub atr_window: usize,
    pub atr_multiplier: f64,
    pub commission_per_trade: f64,
    /// One of `atr`, `vol`, `fixed_fraction`, `kelly_fraction`.
    pub sizing_mode: String,
    pub vol_target: f64,
    /// Per-unit volatility assumed by `vol` sizing.
    pub assumed_volatility: f64,
    pub fixed_fraction: f64,
    pub kelly_fraction: f64,
}

impl Default for BacktestSettings {
    fn default() -> Self {
        Self {
            initial_capital: 100_000.0,
            risk_per_trade: 0.01,
            atr_window: 14,
            atr_multiplier: 2.0,
            commission_per_trade: 0.0,
            sizing_mode: "atr".to_string(),
            vol_target: 0.02,
            assumed_volatility: 0.02,
            fixed_fraction: 0.5,
            kelly_fraction: 0.25,
        }
    }
}

impl BacktestSettings {
    /// Parse settings from a TOML document.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Resolve the `sizing_mode` string into its typed mode.
    pub fn sizing(&self) -> Result<SizingMode, ConfigError> {
        let mode = match self.sizing_mode.trim().to_ascii_lowercase().as_str() {
            "atr" => SizingMode::Atr {
                risk_per_trade: self.risk_per_trade,
                atr_multiplier: self.atr_multiplier,
            },
            "vol" => SizingMode::Vol {
                vol_target: self.vol_target,
                assumed_volatility: self.assumed_volatility,
            },
            "fixed_fraction" => SizingMode::FixedFraction {
                fraction: self.fixed_fraction,
            },
            "kelly_fraction" => SizingMode::KellyFraction {
                fraction: self.kelly_fraction,
            },
            _ => return Err(ConfigError::UnknownSizingMode(self.sizing_mode.clone())),
        };
        Ok(mode)
    }

    pub fn into_config(self) -> Result<BacktestConfig, ConfigError> {
        BacktestConfig::try_from(self)
    }
}

/// Validated, immutable configuration for one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BacktestConfig {
    initial_capital: f64,
    atr_window: usize,
    commission_per_trade: f64,
    sizing: SizingMode,
}

impl BacktestConfig {
    pub fn new(
        initial_capital: f64,
        atr_window: usize,
        commission_per_trade: f64,
        sizing: SizingMode,
    ) -> Result<Self, ConfigError> {
        if !initial_capital.is_finite() {
            return Err(ConfigError::NonFinite {
                field: "initial_capital",
                value: initial_capital,
            });
        }
        if initial_capital <= 0.0 {
            return Err(ConfigError::NonPositiveCapital(initial_capital));
        }
        if atr_window == 0 {
            return Err(ConfigError::InvalidWindow(atr_window));
        }
        if !commission_per_trade.is_finite() {
            return Err(ConfigError::NonFinite {
                field: "commission_per_trade",
                value: commission_per_trade,
            });
        }
        if commission_per_trade < 0.0 {
            return Err(ConfigError::NegativeCommission(commission_per_trade));
        }
        sizing.validate()?;

        Ok(Self {
            initial_capital,
            atr_window,
            commission_per_trade,
            sizing,
        })
    }

    pub fn initial_capital(&self) -> f64 {
        self.initial_capital
    }

    pub fn atr_window(&self) -> usize {
        self.atr_window
    }

    pub fn commission_per_trade(&self) -> f64 {
        self.commission_per_trade
    }

    pub fn sizing(&self) -> &SizingMode {
        &self.sizing
    }
}

impl TryFrom<BacktestSettings> for BacktestConfig {
    type Error = ConfigError;

    fn try_from(settings: BacktestSettings) -> Result<Self, Self::Error> {
        let sizing = settings.sizing()?;
        BacktestConfig::new(
            settings.initial_capital,
            settings.atr_window,
            settings.commission_per_trade,
            sizing,
        )
    }
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_capital: 100_000.0,
            atr_window: 14,
            commission_per_trade: 0.0,
            sizing: SizingMode::Atr {
                risk_per_trade: 0.01,
                atr_multiplier: 2.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_resolve_to_atr_mode() {
        let config = BacktestSettings::default().into_config().unwrap();
        assert_eq!(config, BacktestConfig::default());
        assert_eq!(config.sizing().name(), "atr");
    }

    #[test]
    fn unknown_mode_rejected() {
        let settings = BacktestSettings {
            sizing_mode: "martingale".into(),
            ..Default::default()
        };
        assert_eq!(
            settings.into_config(),
            Err(ConfigError::UnknownSizingMode("martingale".into()))
        );
    }

    #[test]
    fn mode_string_is_case_insensitive() {
        let settings = BacktestSettings {
            sizing_mode: " Fixed_Fraction ".into(),
            fixed_fraction: 0.3,
            ..Default::default()
        };
        let config = settings.into_config().unwrap();
        assert_eq!(*config.sizing(), SizingMode::FixedFraction { fraction: 0.3 });
    }

    #[test]
    fn only_active_mode_parameters_are_validated() {
        // A nonsense kelly_fraction does not matter while atr is active
        let settings = BacktestSettings {
            kelly_fraction: -1.0,
            ..Default::default()
        };
        assert!(settings.into_config().is_ok());
    }

    #[test]
    fn non_positive_capital_rejected() {
        let settings = BacktestSettings {
            initial_capital: 0.0,
            ..Default::default()
        };
        assert_eq!(
            settings.into_config(),
            Err(ConfigError::NonPositiveCapital(0.0))
        );
    }

    #[test]
    fn zero_atr_window_rejected() {
        let settings = BacktestSettings {
            atr_window: 0,
            ..Default::default()
        };
        assert_eq!(settings.into_config(), Err(ConfigError::InvalidWindow(0)));
    }

    #[test]
    fn negative_commission_rejected() {
        let settings = BacktestSettings {
            commission_per_trade: -1.0,
            ..Default::default()
        };
        assert_eq!(
            settings.into_config(),
            Err(ConfigError::NegativeCommission(-1.0))
        );
    }

    #[test]
    fn parses_partial_toml() {
        let settings = BacktestSettings::from_toml(
            r#"
            initial_capital = 50000.0
            sizing_mode = "vol"
            vol_target = 0.03
            "#,
        )
        .unwrap();
        assert_eq!(settings.atr_window, 14);
        let config = settings.into_config().unwrap();
        assert_eq!(config.initial_capital(), 50_000.0);
        assert_eq!(
            *config.sizing(),
            SizingMode::Vol {
                vol_target: 0.03,
                assumed_volatility: 0.02
            }
        );
    }
}

//! Parameter sweeps over sizing settings.
//!
//! Signals depend only on bars and their source, so they are resolved once
//! and shared by every combination. Each combination then runs its own
//! backtest on a rayon worker; results come back in grid order.

use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use swinglab_core::{
    run_backtest, BacktestConfig, BacktestSettings, Bar, ConfigError, CoreError, Signal,
};

use crate::metrics::PerformanceMetrics;
use crate::runner::{RunError, SignalSource};

/// Values to try for each swept setting. An empty axis keeps the base value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepGrid {
    pub risk_per_trade: Vec<f64>,
    pub atr_multiplier: Vec<f64>,
    pub sizing_modes: Vec<String>,
}

impl SweepGrid {
    /// Number of combinations in this grid.
    pub fn size(&self) -> usize {
        self.risk_per_trade.len().max(1)
            * self.atr_multiplier.len().max(1)
            * self.sizing_modes.len().max(1)
    }

    /// Every combination applied on top of `base`.
    ///
    /// Order is fixed: sizing mode varies slowest, risk per trade fastest.
    pub fn combinations(&self, base: &BacktestSettings) -> Vec<BacktestSettings> {
        let modes = axis(&self.sizing_modes, &base.sizing_mode);
        let multipliers = axis(&self.atr_multiplier, &base.atr_multiplier);
        let risks = axis(&self.risk_per_trade, &base.risk_per_trade);

        let mut out = Vec::with_capacity(self.size());
        for mode in &modes {
            for &atr_multiplier in &multipliers {
                for &risk_per_trade in &risks {
                    out.push(BacktestSettings {
                        sizing_mode: mode.clone(),
                        atr_multiplier,
                        risk_per_trade,
                        ..base.clone()
                    });
                }
            }
        }
        out
    }
}

fn axis<T: Clone>(values: &[T], base: &T) -> Vec<T> {
    if values.is_empty() {
        vec![base.clone()]
    } else {
        values.to_vec()
    }
}

/// One combination and how it went.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepEntry {
    pub settings: BacktestSettings,
    #[serde(serialize_with = "serialize_outcome")]
    pub result: Result<PerformanceMetrics, CoreError>,
}

fn serialize_outcome<S>(
    result: &Result<PerformanceMetrics, CoreError>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match result {
        Ok(metrics) => metrics.serialize(serializer),
        Err(e) => serializer.serialize_str(&e.to_string()),
    }
}

/// Run every combination of `grid` over the same bars and signal source.
///
/// Only signal generation can fail the whole sweep. A combination whose
/// settings do not validate is reported in its own entry and the rest still run.
pub fn run_sweep(
    bars: &[Bar],
    source: &SignalSource,
    base: &BacktestSettings,
    grid: &SweepGrid,
) -> Result<Vec<SweepEntry>, RunError> {
    let signals = source.signals(bars)?;
    let combos = grid.combinations(base);

    info!(
        signals = source.name(),
        combinations = combos.len(),
        bars = bars.len(),
        "starting sweep"
    );

    let entries = combos
        .into_par_iter()
        .map(|settings| {
            let result = run_one(bars, &signals, &settings);
            SweepEntry { settings, result }
        })
        .collect();

    Ok(entries)
}

fn run_one(
    bars: &[Bar],
    signals: &[Signal],
    settings: &BacktestSettings,
) -> Result<PerformanceMetrics, CoreError> {
    let config = BacktestConfig::try_from(settings.clone()).map_err(|e: ConfigError| {
        warn!(sizing_mode = %settings.sizing_mode, error = %e, "skipping combination");
        CoreError::from(e)
    })?;
    let run = run_backtest(bars, signals, &config, true)?;
    Ok(PerformanceMetrics::compute(&run.output, &run.trades, &config))
}

//! Backtest runner: wires together loading, resampling, signals, engine and metrics.
//!
//! Entry points:
//! - `run_from_config()`: loads the data file named by a `RunConfig`, then runs. Used by the CLI.
//! - `prepare_inputs()`: the loading half of `run_from_config()`, shared with sweeps.
//! - `run_on_bars()`: takes pre-loaded bars and a strategy. No I/O.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use swinglab_core::{
    run_backtest, BacktestConfig, BacktestSettings, Bar, ConfigError, CoreError, OutputSeries,
    Signal, StrategyKind, TradeEvent,
};

use crate::analytics::StockIndices;
use crate::config::{fingerprint, RunConfig, RunId};
use crate::data_loader::{compute_dataset_hash, load_csv, LoadError};
use crate::metrics::PerformanceMetrics;
use crate::resample::{resample_bars, resample_with_signals, ResampleError, Timeframe};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("resample error: {0}")]
    Resample(#[from] ResampleError),
    #[error("backtest error: {0}")]
    Core(#[from] CoreError),
    #[error("failed to fingerprint run: {0}")]
    Fingerprint(#[from] serde_json::Error),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Label recorded when signals come from the data file.
pub const FILE_SIGNALS: &str = "file_signals";

/// Complete result of a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    pub dataset_hash: String,
    /// Strategy name, or `file_signals` for precomputed signals.
    pub strategy: String,
    pub timeframe: Option<String>,
    pub settings: BacktestSettings,
    pub bar_count: usize,
    pub metrics: PerformanceMetrics,
    pub output: OutputSeries,
    /// Trade log; empty when the run was asked not to emit one. Metrics
    /// are computed from the full log either way.
    pub trades: Vec<TradeEvent>,
    pub stock: StockIndices,
}

/// Default schema version for serde deserialization of older JSON without the field.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Where a run's signals come from.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalSource {
    Strategy(StrategyKind),
    /// Precomputed signals, aligned with the bars.
    File(Vec<Signal>),
}

impl SignalSource {
    /// Label recorded in results: the strategy name or `file_signals`.
    pub fn name(&self) -> &'static str {
        match self {
            SignalSource::Strategy(kind) => kind.name(),
            SignalSource::File(_) => FILE_SIGNALS,
        }
    }

    /// Signals for `bars`, generated or taken as loaded.
    pub fn signals(&self, bars: &[Bar]) -> Result<Vec<Signal>, CoreError> {
        match self {
            SignalSource::Strategy(kind) => kind.generate(bars),
            SignalSource::File(signals) => Ok(signals.clone()),
        }
    }
}

/// Bars and signal source resolved from a `RunConfig`, ready to backtest.
#[derive(Debug, Clone)]
pub struct RunInputs {
    pub bars: Vec<Bar>,
    pub source: SignalSource,
    pub timeframe: Option<Timeframe>,
    pub dataset_hash: String,
}

/// Load and resample the data file named by `config` and pick the signal source.
///
/// A configured strategy wins; otherwise a `signal` column in the file is
/// used, and failing that the default strategy. File signals are resampled
/// together with their bars.
pub fn prepare_inputs(config: &RunConfig) -> Result<RunInputs, RunError> {
    let timeframe = config
        .timeframe
        .as_deref()
        .map(str::parse::<Timeframe>)
        .transpose()?;

    let loaded = load_csv(&config.data_file)?;
    let (bars, source) = match (&config.strategy, loaded.signals) {
        (None, Some(signals)) => match &timeframe {
            Some(tf) => {
                let (bars, signals) = resample_with_signals(&loaded.bars, &signals, tf)?;
                (bars, SignalSource::File(signals))
            }
            None => (loaded.bars, SignalSource::File(signals)),
        },
        (strategy, _) => {
            let bars = match &timeframe {
                Some(tf) => resample_bars(&loaded.bars, tf),
                None => loaded.bars,
            };
            (bars, SignalSource::Strategy(strategy.clone().unwrap_or_default()))
        }
    };

    let dataset_hash = compute_dataset_hash(&bars);
    Ok(RunInputs {
        bars,
        source,
        timeframe,
        dataset_hash,
    })
}

/// Run a backtest described by a `RunConfig` (loads and resamples data).
pub fn run_from_config(config: &RunConfig) -> Result<RunResult, RunError> {
    // Fail fast on a bad config before touching the data file
    let backtest = BacktestConfig::try_from(config.backtest.clone())?;

    info!(
        data_file = %config.data_file.display(),
        timeframe = config.timeframe.as_deref().unwrap_or("native"),
        sizing_mode = backtest.sizing().name(),
        "starting run"
    );

    let inputs = prepare_inputs(config)?;
    let mut result = execute(
        &inputs.bars,
        &inputs.source,
        &config.backtest,
        backtest,
        config.teaching_log,
    )?;
    result.timeframe = inputs.timeframe.map(|tf| tf.to_string());
    result.run_id = fingerprint(&(config.run_id()?, &result.dataset_hash))?;
    Ok(result)
}

/// Run a backtest on pre-loaded bars. No I/O.
pub fn run_on_bars(
    bars: &[Bar],
    strategy: &StrategyKind,
    settings: &BacktestSettings,
    emit_log: bool,
) -> Result<RunResult, RunError> {
    let config = BacktestConfig::try_from(settings.clone())?;
    execute(
        bars,
        &SignalSource::Strategy(strategy.clone()),
        settings,
        config,
        emit_log,
    )
}

/// Run a backtest on pre-loaded bars with precomputed signals.
pub fn run_with_signals(
    bars: &[Bar],
    signals: &[Signal],
    settings: &BacktestSettings,
    emit_log: bool,
) -> Result<RunResult, RunError> {
    let config = BacktestConfig::try_from(settings.clone())?;
    execute(
        bars,
        &SignalSource::File(signals.to_vec()),
        settings,
        config,
        emit_log,
    )
}

/// The trade log is always collected so trade statistics are complete;
/// `emit_log` only decides whether it is kept in the result.
fn execute(
    bars: &[Bar],
    source: &SignalSource,
    settings: &BacktestSettings,
    config: BacktestConfig,
    emit_log: bool,
) -> Result<RunResult, RunError> {
    let strategy = source.name().to_string();
    let signals = source.signals(bars)?;

    let run = run_backtest(bars, &signals, &config, true)?;
    let metrics = PerformanceMetrics::compute(&run.output, &run.trades, &config);
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let stock = StockIndices::compute(&closes)?;
    let dataset_hash = compute_dataset_hash(bars);
    let run_id = fingerprint(&(&strategy, settings, &dataset_hash))?;

    info!(
        %strategy,
        bars = bars.len(),
        trades = metrics.trade_count,
        final_equity = metrics.final_equity,
        sharpe = metrics.sharpe,
        max_drawdown = metrics.max_drawdown,
        "run complete"
    );

    let trades = if emit_log { run.trades } else { Vec::new() };

    Ok(RunResult {
        schema_version: SCHEMA_VERSION,
        run_id,
        dataset_hash,
        strategy,
        timeframe: None,
        settings: settings.clone(),
        bar_count: bars.len(),
        metrics,
        output: run.output,
        trades,
        stock,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
        let base = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                Bar::new(
                    base + chrono::Duration::days(i as i64),
                    c,
                    c + 0.5,
                    c - 0.5,
                    c,
                    1_000.0,
                )
            })
            .collect()
    }

    #[test]
    fn file_signals_drive_the_engine() {
        let bars = bars_from_closes(&[10.0, 10.0, 12.0, 12.0, 12.0]);
        let signals = [Signal::Long, Signal::Long, Signal::Flat, Signal::Flat, Signal::Flat];
        let result =
            run_with_signals(&bars, &signals, &BacktestSettings::default(), true).unwrap();

        assert_eq!(result.strategy, FILE_SIGNALS);
        assert_eq!(result.metrics.final_equity, 101_000.0);
        assert_eq!(result.metrics.trade_count, 1);
        assert_eq!(result.metrics.win_rate, 1.0);
        assert_eq!(result.bar_count, 5);
    }

    #[test]
    fn metrics_count_trades_without_log() {
        let bars = bars_from_closes(&[10.0, 10.0, 12.0, 12.0, 12.0]);
        let signals = [Signal::Long, Signal::Long, Signal::Flat, Signal::Flat, Signal::Flat];
        let settings = BacktestSettings {
            commission_per_trade: 5.0,
            ..Default::default()
        };
        let silent = run_with_signals(&bars, &signals, &settings, false).unwrap();
        let logged = run_with_signals(&bars, &signals, &settings, true).unwrap();

        assert!(silent.trades.is_empty());
        assert_eq!(silent.metrics.trade_count, 1);
        assert_eq!(silent.metrics.total_commission, 5.0);
        assert_eq!(silent.metrics, logged.metrics);
        assert_eq!(silent.output, logged.output);
    }

    #[test]
    fn invalid_settings_fail_before_running() {
        let settings = BacktestSettings {
            sizing_mode: "martingale".into(),
            ..Default::default()
        };
        let err = run_on_bars(&[], &StrategyKind::default(), &settings, true).unwrap_err();
        assert!(matches!(
            err,
            RunError::Config(ConfigError::UnknownSizingMode(_))
        ));
    }

    #[test]
    fn run_id_tracks_settings() {
        let bars = bars_from_closes(&[10.0, 11.0, 12.0, 11.0, 10.0, 11.0, 12.0]);
        let strategy = StrategyKind::default();
        let a = run_on_bars(&bars, &strategy, &BacktestSettings::default(), false).unwrap();
        let b = run_on_bars(&bars, &strategy, &BacktestSettings::default(), false).unwrap();
        let c = run_on_bars(
            &bars,
            &strategy,
            &BacktestSettings {
                risk_per_trade: 0.02,
                ..Default::default()
            },
            false,
        )
        .unwrap();
        assert_eq!(a.run_id, b.run_id);
        assert_ne!(a.run_id, c.run_id);
    }
}

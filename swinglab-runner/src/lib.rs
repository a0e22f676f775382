//! swinglab runner: everything around a single backtest.
//!
//! This crate builds on `swinglab-core` to provide:
//! - CSV ingestion with header aliases, timestamp parsing and de-duplication
//! - Bar resampling to coarser timeframes
//! - TOML run configuration and content-addressed run ids
//! - Performance metrics and per-bar stock analytics
//! - The teaching log table
//! - CSV/JSON export of run artifacts
//! - Parallel parameter sweeps

pub mod analytics;
pub mod config;
pub mod data_loader;
pub mod export;
pub mod metrics;
pub mod resample;
pub mod runner;
pub mod sweep;
pub mod teaching;

pub use analytics::StockIndices;
pub use config::{ConfigFileError, RunConfig, RunId};
pub use data_loader::{load_csv, parse_csv, LoadError, LoadedData};
pub use export::{load_artifacts, save_artifacts, ExportError};
pub use metrics::PerformanceMetrics;
pub use resample::{resample_bars, ResampleError, Timeframe};
pub use runner::{
    prepare_inputs, run_from_config, run_on_bars, run_with_signals, RunError, RunInputs, RunResult,
    SignalSource,
};
pub use sweep::{run_sweep, SweepEntry, SweepGrid};
pub use teaching::format_teaching_log;

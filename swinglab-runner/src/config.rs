//! Serializable run configuration.
//!
//! A run is described by one TOML file:
//!
//! ```toml
//! data_file = "data/spy_daily.csv"
//! timeframe = "1d"          # optional resample rule
//! teaching_log = true
//! teaching_rows = 20
//! output_dir = "runs"       # optional
//!
//! [strategy]                # optional; defaults to hybrid_swing
//! type = "hybrid_swing"
//! fast = 3
//! slow = 5
//!
//! [backtest]
//! initial_capital = 100000.0
//! sizing_mode = "atr"
//! risk_per_trade = 0.01
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use swinglab_core::{BacktestSettings, StrategyKind};
use thiserror::Error;

use crate::teaching::DEFAULT_TEACHING_ROWS;

/// Unique identifier for a backtest run (content-addressable hash).
pub type RunId = String;

/// Errors reading a run configuration file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Everything needed to reproduce one backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// CSV file with OHLC bars.
    pub data_file: PathBuf,

    /// Resample rule applied after loading (`15min`, `4h`, `1d`, `1w`).
    #[serde(default)]
    pub timeframe: Option<String>,

    /// Signal generator. When absent, a `signal` column in the data file is
    /// used if there is one, otherwise the default hybrid swing strategy.
    #[serde(default)]
    pub strategy: Option<StrategyKind>,

    #[serde(default)]
    pub backtest: BacktestSettings,

    /// Collect the trade log.
    #[serde(default = "default_teaching_log")]
    pub teaching_log: bool,

    /// Events rendered by the teaching log table.
    #[serde(default = "default_teaching_rows")]
    pub teaching_rows: usize,

    /// Directory for CSV/JSON artifacts.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

fn default_teaching_log() -> bool {
    true
}

fn default_teaching_rows() -> usize {
    DEFAULT_TEACHING_ROWS
}

impl RunConfig {
    /// Config for a data file with every other setting at its default.
    pub fn for_data_file(data_file: impl Into<PathBuf>) -> Self {
        Self {
            data_file: data_file.into(),
            timeframe: None,
            strategy: None,
            backtest: BacktestSettings::default(),
            teaching_log: default_teaching_log(),
            teaching_rows: default_teaching_rows(),
            output_dir: None,
        }
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigFileError> {
        Ok(toml::from_str(text)?)
    }

    /// Read a config file. Relative paths inside it are resolved against the
    /// file's own directory.
    pub fn load(path: &Path) -> Result<Self, ConfigFileError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&text)?;

        if let Some(base) = path.parent() {
            if config.data_file.is_relative() {
                config.data_file = base.join(&config.data_file);
            }
            if let Some(dir) = config.output_dir.as_mut() {
                if dir.is_relative() {
                    *dir = base.join(&*dir);
                }
            }
        }
        Ok(config)
    }

    /// Computes a deterministic hash ID for this configuration.
    ///
    /// Two runs with identical configs have the same RunId.
    pub fn run_id(&self) -> Result<RunId, serde_json::Error> {
        fingerprint(self)
    }
}

/// BLAKE3 hash of a value's JSON form.
pub fn fingerprint<T: Serialize>(value: &T) -> Result<RunId, serde_json::Error> {
    let json = serde_json::to_vec(value)?;
    Ok(blake3::hash(&json).to_hex().to_string())
}

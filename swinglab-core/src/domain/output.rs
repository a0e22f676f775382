//! Per-bar output of a backtest run.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::signal::Signal;
use super::trade::TradeEvent;
use super::undefined::deserialize_f64;

/// One row per input bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRow {
    pub timestamp: NaiveDateTime,
    /// NaN on a void bar.
    #[serde(deserialize_with = "deserialize_f64")]
    pub close: f64,
    /// ATR at this bar; NaN when undefined.
    #[serde(deserialize_with = "deserialize_f64")]
    pub atr: f64,
    /// Signal applied on this bar (the previous bar's raw signal).
    pub signal: Signal,
    /// Signed shares held at the end of the bar.
    pub position: f64,
    /// Mark-to-market account value.
    pub equity: f64,
    pub returns: f64,
    /// Sign of `position`: -1, 0 or +1.
    pub exposure: i8,
    /// Realized account equity, only present on bars that end flat.
    pub trade_equity: Option<f64>,
    pub peak_equity: f64,
    /// `(equity - peak_equity) / peak_equity`, always <= 0.
    pub drawdown: f64,
}

/// Time-ordered output rows of a run. Downstream consumers treat it as read-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputSeries {
    pub rows: Vec<OutputRow>,
}

impl OutputSeries {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn timestamps(&self) -> Vec<NaiveDateTime> {
        self.rows.iter().map(|r| r.timestamp).collect()
    }

    pub fn equity(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.equity).collect()
    }

    pub fn returns(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.returns).collect()
    }

    pub fn positions(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.position).collect()
    }

    pub fn exposures(&self) -> Vec<i8> {
        self.rows.iter().map(|r| r.exposure).collect()
    }

    pub fn drawdowns(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.drawdown).collect()
    }

    pub fn final_equity(&self) -> Option<f64> {
        self.rows.last().map(|r| r.equity)
    }

    /// Deepest drawdown and the bar it occurred on (first occurrence on ties).
    pub fn max_drawdown(&self) -> Option<(NaiveDateTime, f64)> {
        let mut worst: Option<(NaiveDateTime, f64)> = None;
        for row in &self.rows {
            match worst {
                Some((_, dd)) if row.drawdown >= dd => {}
                _ => worst = Some((row.timestamp, row.drawdown)),
            }
        }
        worst
    }
}

/// Everything a single run produces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BacktestRun {
    pub output: OutputSeries,
    /// Trade log; empty when the run was asked not to emit one.
    pub trades: Vec<TradeEvent>,
}

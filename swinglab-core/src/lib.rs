//! swinglab core: position-sizing backtest engine for a single instrument.
//!
//! This crate contains:
//! - Domain types (bars, signals, trade events, output rows)
//! - Indicator library (SMA, EMA, RSI, ATR)
//! - Signal generators (hybrid swing, trend pullback, mean reversion)
//! - Position sizing policy (ATR risk, volatility target, fixed and Kelly fractions)
//! - The single-pass backtest loop with mark-to-market equity and drawdown

pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod indicators;
pub mod signals;
pub mod sizers;

pub use config::{BacktestConfig, BacktestSettings};
pub use domain::{BacktestRun, Bar, OutputRow, OutputSeries, Signal, TradeAction, TradeEvent};
pub use engine::run_backtest;
pub use error::{ConfigError, CoreError, ShapeError};
pub use signals::StrategyKind;
pub use sizers::{position_size, SizingMode};

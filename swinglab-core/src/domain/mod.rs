//! Domain types for swinglab.

pub mod bar;
pub mod output;
pub mod signal;
pub mod trade;
pub mod undefined;

pub use bar::{closes, Bar};
pub use output::{BacktestRun, OutputRow, OutputSeries};
pub use signal::Signal;
pub use trade::{TradeAction, TradeEvent};

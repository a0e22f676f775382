//! Backtesting engine: single-pass, bar-by-bar simulation.
//!
//! The engine consumes time-ordered bars and a pre-computed signal series and
//! folds them into an output series plus a trade log:
//!
//! 1. Validate shapes (bars vs. signals, timestamp ordering)
//! 2. Precompute ATR over the whole series
//! 3. Run the bar loop: apply the previous bar's signal, enter/exit, mark to market
//! 4. Post-pass accounting: returns, running peak, drawdown
//!
//! All mutable state lives in one `EngineState` owned by the run, so
//! independent runs can execute on separate threads without coordination.

pub mod accounting;
pub mod loop_runner;
pub mod state;

pub use accounting::{drawdowns, running_peak, simple_returns};
pub use loop_runner::run_backtest;
pub use state::{EngineState, PositionState};

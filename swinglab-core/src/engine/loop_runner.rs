//! Bar-by-bar loop: the heart of the backtesting engine.
//!
//! Per bar, with `signal` = the previous bar's signal (one-bar execution lag):
//! 1. FLAT and signal != 0 → size and enter at the close
//! 2. In a position and signal is 0 or opposes it → exit at the close
//! 3. Otherwise hold unchanged (no pyramiding, no trimming)
//! 4. Mark to market and record the row
//!
//! A reversal only exits on the bar it appears; re-entry on the other side
//! waits for the next bar.

use tracing::debug;

use crate::config::BacktestConfig;
use crate::domain::{BacktestRun, Bar, OutputRow, OutputSeries, Signal, TradeAction};
use crate::error::{CoreError, ShapeError};
use crate::indicators::atr;
use crate::sizers::position_size;

use super::accounting::{drawdowns, running_peak, simple_returns};
use super::state::EngineState;

/// Run a backtest over `bars` driven by `signals`.
///
/// `signals[t]` is the decision taken at the close of bar `t`; it is executed
/// on bar `t + 1`. The last signal is never executed.
///
/// When `emit_log` is false the returned trade log is empty; the output
/// series is identical either way.
///
/// Fails only on structural problems, before any bar is processed:
/// mismatched lengths, unordered timestamps, or an invalid ATR window.
pub fn run_backtest(
    bars: &[Bar],
    signals: &[Signal],
    config: &BacktestConfig,
    emit_log: bool,
) -> Result<BacktestRun, CoreError> {
    ShapeError::check_len("bars", bars.len(), "signals", signals.len())?;
    check_ordering(bars)?;

    let high: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let low: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let close: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let atr_series = atr(&high, &low, &close, config.atr_window())?;

    let mut state = EngineState::new(config.initial_capital(), emit_log);
    let mut rows = Vec::with_capacity(bars.len());

    for (t, bar) in bars.iter().enumerate() {
        let signal = t
            .checked_sub(1)
            .map(|prev| signals[prev])
            .unwrap_or(Signal::Flat);
        let atr_value = atr_series[t];

        // Void bars take no transitions and are marked at the last valid close
        if !bar.close.is_nan() {
            process_bar(&mut state, bar, signal, atr_value, config);
            state.last_valid_close = Some(bar.close);
        }

        let mark = state.last_valid_close.unwrap_or(bar.close);
        let equity = state.marked_equity(mark);
        let flat = state.position.is_flat();

        rows.push(OutputRow {
            timestamp: bar.timestamp,
            close: bar.close,
            atr: atr_value,
            signal,
            position: state.position.shares_held,
            equity,
            returns: 0.0,
            exposure: state.position.exposure(),
            trade_equity: flat.then_some(state.equity),
            peak_equity: equity,
            drawdown: 0.0,
        });
    }

    finalize(&mut rows);

    let final_equity = rows
        .last()
        .map(|r| r.equity)
        .unwrap_or(config.initial_capital());
    debug!(bars = rows.len(), final_equity, "backtest complete");

    Ok(BacktestRun {
        output: OutputSeries { rows },
        trades: state.into_trades(),
    })
}

/// Apply one bar's transition to the state.
fn process_bar(
    state: &mut EngineState,
    bar: &Bar,
    signal: Signal,
    atr_value: f64,
    config: &BacktestConfig,
) {
    let price = bar.close;

    if state.position.is_flat() {
        if signal.is_flat() {
            return;
        }
        let size = position_size(state.equity, atr_value, price, config.sizing());
        if size <= 0.0 {
            // Abstain: sizing could not produce a position this bar
            return;
        }
        let shares = signal.direction() * size;
        state.position.enter(shares, price);
        debug!(timestamp = %bar.timestamp, shares, price, equity = state.equity, "entry");
        state.record(bar.timestamp, TradeAction::Entry, signal, shares, price, None);
    } else if signal.is_flat() || signal.opposes(state.position.shares_held) {
        let shares = state.position.shares_held;
        let pnl = state.position.exit(price);
        state.equity += pnl - config.commission_per_trade();
        debug!(timestamp = %bar.timestamp, shares, price, pnl, equity = state.equity, "exit");
        state.record(bar.timestamp, TradeAction::Exit, signal, shares, price, Some(pnl));
    }
}

/// Fill in returns, running peak and drawdown once the loop is done.
fn finalize(rows: &mut [OutputRow]) {
    let equity: Vec<f64> = rows.iter().map(|r| r.equity).collect();
    let returns = simple_returns(&equity);
    let peak = running_peak(&equity);
    let drawdown = drawdowns(&equity, &peak);

    for (i, row) in rows.iter_mut().enumerate() {
        row.returns = returns[i];
        row.peak_equity = peak[i];
        row.drawdown = drawdown[i];
    }
}

fn check_ordering(bars: &[Bar]) -> Result<(), ShapeError> {
    match bars
        .windows(2)
        .position(|pair| pair[1].timestamp <= pair[0].timestamp)
    {
        Some(i) => Err(ShapeError::UnorderedTimestamps { index: i + 1 }),
        None => Ok(()),
    }
}

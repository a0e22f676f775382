//! Position state and the mutable per-run accumulator.

use chrono::NaiveDateTime;

use crate::domain::{Signal, TradeAction, TradeEvent};

/// Shares held and the price they were entered at.
///
/// `shares_held == 0.0` is FLAT; otherwise the sign encodes long/short.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PositionState {
    pub shares_held: f64,
    pub entry_price: f64,
}

impl PositionState {
    pub fn is_flat(&self) -> bool {
        self.shares_held == 0.0
    }

    /// -1, 0 or +1.
    pub fn exposure(&self) -> i8 {
        if self.shares_held > 0.0 {
            1
        } else if self.shares_held < 0.0 {
            -1
        } else {
            0
        }
    }

    /// PnL of the open position if it were closed at `price`.
    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        if self.is_flat() {
            0.0
        } else {
            self.shares_held * (price - self.entry_price)
        }
    }

    pub fn enter(&mut self, shares: f64, price: f64) {
        self.shares_held = shares;
        self.entry_price = price;
    }

    /// Close the position at `price`, returning the realized PnL.
    pub fn exit(&mut self, price: f64) -> f64 {
        let pnl = self.unrealized_pnl(price);
        *self = PositionState::default();
        pnl
    }
}

/// Mutable state threaded through the bar loop.
///
/// `equity` is the realized account value: it only moves on exits.
/// The mark-to-market value reported per bar is derived from it.
#[derive(Debug)]
pub struct EngineState {
    pub position: PositionState,
    pub equity: f64,
    /// Last defined close, used to mark void bars.
    pub last_valid_close: Option<f64>,
    trades: Option<Vec<TradeEvent>>,
}

impl EngineState {
    pub fn new(initial_capital: f64, emit_log: bool) -> Self {
        Self {
            position: PositionState::default(),
            equity: initial_capital,
            last_valid_close: None,
            trades: emit_log.then(Vec::new),
        }
    }

    /// Mark-to-market equity at `price`.
    pub fn marked_equity(&self, price: f64) -> f64 {
        self.equity + self.position.unrealized_pnl(price)
    }

    pub(crate) fn record(
        &mut self,
        timestamp: NaiveDateTime,
        action: TradeAction,
        signal: Signal,
        shares: f64,
        price: f64,
        pnl: Option<f64>,
    ) {
        if let Some(trades) = self.trades.as_mut() {
            trades.push(TradeEvent {
                timestamp,
                action,
                signal,
                shares,
                price,
                equity: self.equity,
                pnl,
            });
        }
    }

    pub fn into_trades(self) -> Vec<TradeEvent> {
        self.trades.unwrap_or_default()
    }
}

//! TradeEvent: one line of the trade log.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::signal::Signal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeAction {
    Entry,
    Exit,
}

impl TradeAction {
    pub fn label(self) -> &'static str {
        match self {
            TradeAction::Entry => "ENTRY",
            TradeAction::Exit => "EXIT",
        }
    }
}

/// A position transition, emitted at entry and at exit.
///
/// `equity` is the account equity before the trade for an entry and after
/// the realized PnL and commission for an exit. `pnl` is only set on exits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeEvent {
    pub timestamp: NaiveDateTime,
    pub action: TradeAction,
    pub signal: Signal,
    /// Signed share count (negative = short).
    pub shares: f64,
    pub price: f64,
    pub equity: f64,
    pub pnl: Option<f64>,
}

impl TradeEvent {
    pub fn is_entry(&self) -> bool {
        self.action == TradeAction::Entry
    }

    pub fn is_exit(&self) -> bool {
        self.action == TradeAction::Exit
    }

    /// Realized PnL for exits; entries count as zero.
    pub fn realized_pnl(&self) -> f64 {
        self.pnl.unwrap_or(0.0)
    }
}

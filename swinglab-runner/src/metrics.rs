//! Performance metrics: pure functions that compute strategy statistics.
//!
//! Every metric is a pure function: a return series, an equity curve or a
//! trade log in, scalar out. No dependencies on the data pipeline or runner.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use swinglab_core::{BacktestConfig, OutputSeries, TradeEvent};

/// Trading periods per year assumed for annualization.
pub const PERIODS_PER_YEAR: u32 = 252;

/// Aggregate performance metrics for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub final_equity: f64,
    pub total_return: f64,
    pub cagr: f64,
    pub sharpe: f64,
    /// Deepest drawdown, a fraction <= 0.
    pub max_drawdown: f64,
    /// Bar on which the deepest drawdown occurred.
    pub max_drawdown_at: Option<NaiveDateTime>,
    /// Completed round trips.
    pub trade_count: usize,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub total_commission: f64,
}

impl PerformanceMetrics {
    /// Compute all metrics from a run's output and trade log.
    ///
    /// Trade statistics are zero when the run did not emit a trade log.
    pub fn compute(output: &OutputSeries, trades: &[TradeEvent], config: &BacktestConfig) -> Self {
        let equity = output.equity();
        let (max_drawdown_at, max_drawdown) = match output.max_drawdown() {
            Some((ts, dd)) => (Some(ts), dd.min(0.0)),
            None => (None, 0.0),
        };
        let trade_count = trades.iter().filter(|t| t.is_exit()).count();

        Self {
            final_equity: output
                .final_equity()
                .unwrap_or_else(|| config.initial_capital()),
            total_return: total_return(&equity),
            cagr: cagr(&equity, PERIODS_PER_YEAR),
            sharpe: sharpe_ratio(&output.returns(), 0.0, PERIODS_PER_YEAR),
            max_drawdown,
            max_drawdown_at,
            trade_count,
            win_rate: win_rate(trades),
            profit_factor: profit_factor(trades),
            total_commission: trade_count as f64 * config.commission_per_trade(),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Annualized Sharpe ratio of a per-period return series.
///
/// Sharpe = mean(r - rf / periods) / std(r - rf / periods) * sqrt(periods),
/// with the sample standard deviation. Undefined returns are skipped.
/// Returns 0.0 when the returns do not vary or there are fewer than 2.
pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64, periods_per_year: u32) -> f64 {
    let periods = f64::from(periods_per_year);
    let per_period_rf = risk_free_rate / periods;
    let excess: Vec<f64> = returns
        .iter()
        .filter(|r| !r.is_nan())
        .map(|r| r - per_period_rf)
        .collect();

    let std = std_dev(&excess);
    if excess.len() < 2 || std < 1e-15 {
        return 0.0;
    }
    periods.sqrt() * mean_f64(&excess) / std
}

/// Maximum drawdown as a negative fraction (e.g., -0.15 = 15% drawdown).
///
/// Returns 0.0 if equity is constant or monotonically increasing.
pub fn max_drawdown(equity_curve: &[f64]) -> f64 {
    let Some(&first) = equity_curve.first() else {
        return 0.0;
    };
    let mut peak = first;
    let mut max_dd = 0.0_f64;

    for &eq in equity_curve {
        if eq > peak {
            peak = eq;
        }
        if peak > 0.0 {
            let dd = (eq - peak) / peak;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

/// Compound annual growth rate, one equity point per period.
///
/// Returns 0.0 for fewer than 2 points or a non-positive start or end value.
pub fn cagr(equity_curve: &[f64], periods_per_year: u32) -> f64 {
    let (Some(&initial), Some(&final_eq)) = (equity_curve.first(), equity_curve.last()) else {
        return 0.0;
    };
    if equity_curve.len() < 2 || initial <= 0.0 || final_eq <= 0.0 {
        return 0.0;
    }
    let years = equity_curve.len() as f64 / f64::from(periods_per_year);
    (final_eq / initial).powf(1.0 / years) - 1.0
}

/// Total return as a fraction: (final - initial) / initial.
pub fn total_return(equity_curve: &[f64]) -> f64 {
    match (equity_curve.first(), equity_curve.last()) {
        (Some(&initial), Some(&final_eq)) if initial > 0.0 => (final_eq - initial) / initial,
        _ => 0.0,
    }
}

/// Fraction of completed trades whose realized PnL was positive.
pub fn win_rate(trades: &[TradeEvent]) -> f64 {
    let exits: Vec<&TradeEvent> = trades.iter().filter(|t| t.is_exit()).collect();
    if exits.is_empty() {
        return 0.0;
    }
    let winners = exits.iter().filter(|t| t.realized_pnl() > 0.0).count();
    winners as f64 / exits.len() as f64
}

/// Profit factor: gross profits / gross losses over completed trades.
///
/// Capped at 100.0 for edge cases (all winners, zero losses).
pub fn profit_factor(trades: &[TradeEvent]) -> f64 {
    let pnls: Vec<f64> = trades
        .iter()
        .filter(|t| t.is_exit())
        .map(TradeEvent::realized_pnl)
        .collect();
    if pnls.is_empty() {
        return 0.0;
    }
    let gross_profit: f64 = pnls.iter().filter(|&&p| p > 0.0).sum();
    let gross_loss: f64 = pnls.iter().filter(|&&p| p < 0.0).map(|p| p.abs()).sum();

    if gross_loss < 1e-10 {
        return if gross_profit > 0.0 { 100.0 } else { 0.0 };
    }
    (gross_profit / gross_loss).min(100.0)
}

// ─── Helpers ────────────────────────────────────────────────────────

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

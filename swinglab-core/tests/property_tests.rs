//! Property tests for engine invariants.
//!
//! Uses proptest to verify:
//! 1. Flat invariant: exposure 0 exactly when no shares are held
//! 2. Trade log alternation: ENTRY and EXIT strictly alternate, starting with ENTRY
//! 3. Drawdown bounds: drawdown <= 0 and peak equity never decreases
//! 4. Sizing non-negativity: every mode returns a finite size >= 0
//! 5. Determinism: identical inputs give identical runs

use chrono::NaiveDate;
use proptest::prelude::*;
use swinglab_core::{
    position_size, run_backtest, BacktestConfig, Bar, Signal, SizingMode, TradeAction,
};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_closes() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(5.0..500.0_f64, 1..120)
}

fn arb_signal() -> impl Strategy<Value = Signal> {
    prop_oneof![Just(Signal::Short), Just(Signal::Flat), Just(Signal::Long)]
}

fn arb_sizing() -> impl Strategy<Value = SizingMode> {
    prop_oneof![
        (0.001..0.1_f64, 0.5..5.0_f64).prop_map(|(risk_per_trade, atr_multiplier)| {
            SizingMode::Atr {
                risk_per_trade,
                atr_multiplier,
            }
        }),
        (0.005..0.1_f64, 0.005..0.1_f64).prop_map(|(vol_target, assumed_volatility)| {
            SizingMode::Vol {
                vol_target,
                assumed_volatility,
            }
        }),
        (0.05..1.0_f64).prop_map(|fraction| SizingMode::FixedFraction { fraction }),
        (0.05..1.0_f64).prop_map(|fraction| SizingMode::KellyFraction { fraction }),
    ]
}

/// Closes paired with a signal per bar.
fn arb_scenario() -> impl Strategy<Value = (Vec<f64>, Vec<Signal>)> {
    arb_closes().prop_flat_map(|closes| {
        let n = closes.len();
        (Just(closes), prop::collection::vec(arb_signal(), n))
    })
}

fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let base = NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            Bar::new(
                base + chrono::Duration::days(i as i64),
                c,
                c * 1.01,
                c * 0.99,
                c,
                1_000.0,
            )
        })
        .collect()
}

fn make_config(sizing: SizingMode, commission: f64) -> BacktestConfig {
    BacktestConfig::new(100_000.0, 14, commission, sizing).unwrap()
}

// ── 1. Flat invariant ────────────────────────────────────────────────

proptest! {
    /// Exposure is the sign of the position; realized equity is reported
    /// exactly on flat bars.
    #[test]
    fn exposure_matches_position(
        (closes, signals) in arb_scenario(),
        sizing in arb_sizing(),
    ) {
        let bars = make_bars(&closes);
        let run = run_backtest(&bars, &signals, &make_config(sizing, 0.0), false).unwrap();

        prop_assert_eq!(run.output.len(), bars.len());
        prop_assert_eq!(run.output.rows[0].exposure, 0);
        for row in &run.output.rows {
            let expected: i8 = if row.position > 0.0 {
                1
            } else if row.position < 0.0 {
                -1
            } else {
                0
            };
            prop_assert_eq!(row.exposure, expected);
            prop_assert_eq!(row.trade_equity.is_some(), row.exposure == 0);
            if let Some(realized) = row.trade_equity {
                prop_assert_eq!(realized, row.equity);
            }
        }
    }
}

// ── 2. Trade log alternation ─────────────────────────────────────────

proptest! {
    /// ENTRY and EXIT alternate; every EXIT carries PnL and no ENTRY does.
    #[test]
    fn entries_and_exits_alternate(
        (closes, signals) in arb_scenario(),
        sizing in arb_sizing(),
        commission in 0.0..10.0_f64,
    ) {
        let bars = make_bars(&closes);
        let run = run_backtest(&bars, &signals, &make_config(sizing, commission), true).unwrap();

        for (i, event) in run.trades.iter().enumerate() {
            let expected = if i % 2 == 0 { TradeAction::Entry } else { TradeAction::Exit };
            prop_assert_eq!(event.action, expected);
            prop_assert_eq!(event.pnl.is_some(), event.is_exit());
            prop_assert!(event.shares != 0.0);
        }

        // Exits close exactly the shares the matching entry opened
        for pair in run.trades.chunks(2) {
            if let [entry, exit] = pair {
                prop_assert_eq!(entry.shares, exit.shares);
                prop_assert!(exit.timestamp > entry.timestamp);
            }
        }
    }
}

// ── 3. Drawdown bounds ───────────────────────────────────────────────

proptest! {
    #[test]
    fn drawdown_never_positive(
        (closes, signals) in arb_scenario(),
        sizing in arb_sizing(),
    ) {
        let bars = make_bars(&closes);
        let run = run_backtest(&bars, &signals, &make_config(sizing, 0.0), false).unwrap();

        let mut prev_peak = f64::NEG_INFINITY;
        for row in &run.output.rows {
            prop_assert!(row.drawdown <= 0.0, "drawdown {} > 0", row.drawdown);
            prop_assert!(row.peak_equity >= row.equity);
            prop_assert!(row.peak_equity >= prev_peak);
            prev_peak = row.peak_equity;
        }
        prop_assert_eq!(run.output.rows[0].returns, 0.0);
    }
}

// ── 4. Sizing non-negativity ─────────────────────────────────────────

proptest! {
    #[test]
    fn sizing_is_finite_and_non_negative(
        sizing in arb_sizing(),
        equity in prop_oneof![Just(0.0), -1_000.0..1_000_000.0_f64],
        atr_value in prop_oneof![Just(f64::NAN), Just(0.0), 0.0..50.0_f64],
        price in prop_oneof![Just(f64::NAN), Just(0.0), 0.0..1_000.0_f64],
    ) {
        let size = position_size(equity, atr_value, price, &sizing);
        prop_assert!(size.is_finite());
        prop_assert!(size >= 0.0);
    }
}

// ── 5. Determinism ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn runs_are_deterministic(
        (closes, signals) in arb_scenario(),
        sizing in arb_sizing(),
    ) {
        let bars = make_bars(&closes);
        let config = make_config(sizing, 1.0);
        let a = run_backtest(&bars, &signals, &config, true).unwrap();
        let b = run_backtest(&bars, &signals, &config, true).unwrap();
        prop_assert_eq!(a, b);
    }
}

//! Criterion benchmarks for swinglab hot paths.
//!
//! Benchmarks:
//! 1. Bar loop (full backtest with trade log on and off)
//! 2. Indicator series (SMA, EMA, RSI, ATR)
//! 3. Signal generation (hybrid swing, trend pullback)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use swinglab_core::domain::closes;
use swinglab_core::indicators::{atr, ema, rsi, sma};
use swinglab_core::{run_backtest, Bar, BacktestConfig, StrategyKind};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_bars(n: usize) -> Vec<Bar> {
    let base = chrono::NaiveDate::from_ymd_opt(2020, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0;
            Bar::new(
                base + chrono::Duration::days(i as i64),
                close - 0.3,
                close + 1.5,
                close - 1.5,
                close,
                1_000_000.0 + (i % 500_000) as f64,
            )
        })
        .collect()
}

// ── 1. Bar Loop ──────────────────────────────────────────────────────

fn bench_bar_loop(c: &mut Criterion) {
    let mut group = c.benchmark_group("bar_loop");
    let config = BacktestConfig::default();

    for &bar_count in &[252, 1260, 2520] {
        let bars = make_bars(bar_count);
        let signals = StrategyKind::default().generate(&bars).unwrap();

        group.bench_with_input(
            BenchmarkId::new("hybrid_swing_logged", bar_count),
            &bar_count,
            |b, _| {
                b.iter(|| {
                    run_backtest(
                        black_box(&bars),
                        black_box(&signals),
                        black_box(&config),
                        true,
                    )
                });
            },
        );
        group.bench_with_input(
            BenchmarkId::new("hybrid_swing_silent", bar_count),
            &bar_count,
            |b, _| {
                b.iter(|| {
                    run_backtest(
                        black_box(&bars),
                        black_box(&signals),
                        black_box(&config),
                        false,
                    )
                });
            },
        );
    }

    group.finish();
}

// ── 2. Indicator Series ──────────────────────────────────────────────

fn bench_indicators(c: &mut Criterion) {
    let mut group = c.benchmark_group("indicators");

    for &bar_count in &[252, 1260, 2520] {
        let bars = make_bars(bar_count);
        let close = closes(&bars);
        let high: Vec<f64> = bars.iter().map(|b| b.high).collect();
        let low: Vec<f64> = bars.iter().map(|b| b.low).collect();

        group.bench_with_input(BenchmarkId::new("sma_20", bar_count), &bar_count, |b, _| {
            b.iter(|| sma(black_box(&close), 20))
        });
        group.bench_with_input(BenchmarkId::new("ema_20", bar_count), &bar_count, |b, _| {
            b.iter(|| ema(black_box(&close), 20))
        });
        group.bench_with_input(BenchmarkId::new("rsi_14", bar_count), &bar_count, |b, _| {
            b.iter(|| rsi(black_box(&close), 14))
        });
        group.bench_with_input(BenchmarkId::new("atr_14", bar_count), &bar_count, |b, _| {
            b.iter(|| atr(black_box(&high), black_box(&low), black_box(&close), 14))
        });
    }

    group.finish();
}

// ── 3. Signal Generation ─────────────────────────────────────────────

fn bench_signals(c: &mut Criterion) {
    let mut group = c.benchmark_group("signals");
    let bars = make_bars(2520);

    let strategies = [
        StrategyKind::default(),
        StrategyKind::TrendPullback {
            slow_trend: 50,
            fast_trend: 20,
            ema_window: 20,
            rsi_window: 14,
            rsi_buy: 40.0,
            rsi_sell: 60.0,
        },
    ];
    for strategy in strategies {
        group.bench_function(strategy.name(), |b| {
            b.iter(|| strategy.generate(black_box(&bars)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_bar_loop, bench_indicators, bench_signals);
criterion_main!(benches);

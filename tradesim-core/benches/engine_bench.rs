//! Criterion benchmarks for the engine loop.
//!
//! Benchmarks:
//! 1. Engine loop with a null signal (accounting overhead only)
//! 2. Engine loop with the dual-SMA crossover
//! 3. Engine loop with the MACD crossover

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use tradesim_core::domain::{PriceSeries, RiskProfile};
use tradesim_core::engine::{Engine, NoopStopLoss};
use tradesim_core::signal::{MacdCrossover, NullSignal, SignalProvider, SmaCrossover};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_series(n: usize) -> PriceSeries {
    let base = Utc.with_ymd_and_hms(2000, 1, 3, 0, 0, 0).unwrap();
    let timestamps = (0..n).map(|i| base + Duration::days(i as i64)).collect();
    let prices = (0..n)
        .map(|i| 100.0 + (i as f64 * 0.05).sin() * 10.0 + (i as f64 * 0.013).cos() * 4.0)
        .collect();
    PriceSeries::from_parallel(timestamps, prices).unwrap()
}

fn run_once(series: &PriceSeries, signal: &mut dyn SignalProvider) -> usize {
    let risk = RiskProfile::new(100_000.0, 0.5, 1.0).unwrap();
    Engine::new(series, risk)
        .unwrap()
        .run(signal, &mut NoopStopLoss)
        .unwrap()
        .ledger
        .len()
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_engine_loop(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_loop");

    for &n in &[1_000usize, 10_000, 100_000] {
        let series = make_series(n);

        group.bench_with_input(BenchmarkId::new("null", n), &series, |b, s| {
            b.iter(|| run_once(black_box(s), &mut NullSignal))
        });
        group.bench_with_input(BenchmarkId::new("sma_crossover", n), &series, |b, s| {
            b.iter(|| run_once(black_box(s), &mut SmaCrossover::default_params()))
        });
        group.bench_with_input(BenchmarkId::new("macd", n), &series, |b, s| {
            b.iter(|| run_once(black_box(s), &mut MacdCrossover::default_params()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_engine_loop);
criterion_main!(benches);

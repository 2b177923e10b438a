//! Criterion benchmarks for the evaluation hot path.
//!
//! Benchmarks:
//! 1. Indicator snapshot over the default 200-bar window
//! 2. Full evaluation cycle (cooldown reset between iterations)
//! 3. Cooldown short-circuit versus full pipeline
//! 4. Individual indicators across window sizes

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use pullback_core::indicators::{Atr, Ema, Indicator, Rsi, SwingLow, Vwap};
use pullback_core::{Bar, BarSeries, EngineConfig, IndicatorSnapshot, Quote, SignalEngine};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_bars(n: usize) -> Vec<Bar> {
    let start = Utc.with_ymd_and_hms(2024, 3, 4, 17, 0, 0).unwrap();
    let mut prev = 1.10;
    (0..n)
        .map(|i| {
            let angle = 2.0 * std::f64::consts::PI * (i as f64 + 5.0) / 12.0;
            let close = 1.10 + 0.00004 * i as f64 + 0.0006 * angle.sin();
            let open = (prev + close) / 2.0;
            prev = close;
            Bar {
                timestamp: start + Duration::minutes(5 * i as i64),
                open,
                high: open.max(close) + 0.0002,
                low: open.min(close) - 0.0002,
                close,
                volume: 1000.0 + (i % 50) as f64 * 10.0,
            }
        })
        .collect()
}

// ── 1. Snapshot ──────────────────────────────────────────────────────

fn bench_snapshot(c: &mut Criterion) {
    let config = EngineConfig::default();
    let bars = make_bars(200);
    c.bench_function("snapshot_200", |b| {
        b.iter(|| IndicatorSnapshot::compute(black_box(&bars), &config))
    });
}

// ── 2. Full cycle ────────────────────────────────────────────────────

fn bench_evaluate(c: &mut Criterion) {
    let series = BarSeries::new(make_bars(200)).unwrap();
    let quote = Quote::with_spread(0.4);
    let now = series.last().timestamp + Duration::minutes(5);
    let mut engine = SignalEngine::new(EngineConfig::default()).unwrap();

    c.bench_function("evaluate_200", |b| {
        b.iter(|| {
            engine.reset_cooldown();
            engine.evaluate(black_box(&series), &quote, now)
        })
    });
}

// ── 3. Short-circuit ─────────────────────────────────────────────────

fn bench_short_circuit(c: &mut Criterion) {
    let series = BarSeries::new(make_bars(200)).unwrap();
    let quote = Quote::with_spread(0.4);
    let now = series.last().timestamp + Duration::minutes(5);
    let mut group = c.benchmark_group("cooldown_active");

    for short_circuit in [true, false] {
        let config = EngineConfig {
            cooldown_short_circuit: short_circuit,
            ..EngineConfig::default()
        };
        let mut engine = SignalEngine::new(config).unwrap();
        let _ = engine.evaluate(&series, &quote, now);
        let later = now + Duration::minutes(1);
        group.bench_with_input(
            BenchmarkId::from_parameter(short_circuit),
            &short_circuit,
            |b, _| b.iter(|| engine.evaluate(black_box(&series), &quote, later)),
        );
    }
    group.finish();
}

// ── 4. Indicators ────────────────────────────────────────────────────

fn bench_indicators(c: &mut Criterion) {
    let mut group = c.benchmark_group("indicators");
    for n in [200usize, 1000] {
        let bars = make_bars(n);
        let batch: Vec<Box<dyn Indicator>> = vec![
            Box::new(Ema::new(20).unwrap()),
            Box::new(Ema::new(50).unwrap()),
            Box::new(Rsi::new(14).unwrap()),
            Box::new(Atr::new(14).unwrap()),
            Box::new(Vwap::new(100).unwrap()),
        ];
        group.bench_with_input(BenchmarkId::new("batch", n), &bars, |b, bars| {
            b.iter(|| {
                for ind in &batch {
                    black_box(ind.compute(bars));
                }
            })
        });
        let swing = SwingLow::new(20, 2).unwrap();
        group.bench_with_input(BenchmarkId::new("swing_low", n), &bars, |b, bars| {
            b.iter(|| swing.find(black_box(bars)))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_snapshot,
    bench_evaluate,
    bench_short_circuit,
    bench_indicators
);
criterion_main!(benches);

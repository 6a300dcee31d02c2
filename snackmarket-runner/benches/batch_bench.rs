//! Criterion benchmarks for batch Monte Carlo and path statistics.
//!
//! Run with: `cargo bench -p snackmarket-runner`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use snackmarket_core::PriceSimulator;
use snackmarket_runner::batch::percentile_sorted;
use snackmarket_runner::{run_batch, BatchConfig, PathStats};

fn bench_batch(c: &mut Criterion) {
    let sim = PriceSimulator::default();
    let mut group = c.benchmark_group("batch");
    for runs in [10usize, 100, 1000] {
        group.bench_with_input(BenchmarkId::from_parameter(runs), &runs, |b, &runs| {
            b.iter(|| run_batch(&sim, black_box(&BatchConfig { runs, seed: 42 })))
        });
    }
    group.finish();
}

fn bench_path_stats(c: &mut Criterion) {
    let sim = PriceSimulator::default();
    let table = sim.run_with_seed(7);
    let floor = sim.config().price_floor;
    c.bench_function("path_stats_for_table", |b| {
        b.iter(|| PathStats::for_table(black_box(&table), sim.events(), floor))
    });
}

fn bench_percentile(c: &mut Criterion) {
    let mut sorted: Vec<f64> = (0..10_000).map(|i| 500.0 + (i % 1000) as f64 * 0.5).collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    c.bench_function("percentile_sorted_10k", |b| {
        b.iter(|| percentile_sorted(black_box(&sorted), 90.0))
    });
}

criterion_group!(benches, bench_batch, bench_path_stats, bench_percentile);
criterion_main!(benches);

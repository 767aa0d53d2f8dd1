//! Benchmarks for the Monte Carlo engine.
//!
//! Run with: cargo bench -p marketbot-analytics

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

use marketbot_analytics::prelude::*;

fn bench_simulation(c: &mut Criterion) {
    let mut group = c.benchmark_group("monte_carlo");

    for paths in [1_000u32, 10_000, 50_000] {
        let request = SimulationRequest::new(71.5, 0.25)
            .with_days(30)
            .with_path_count(paths);
        group.throughput(Throughput::Elements(u64::from(paths)));

        group.bench_with_input(BenchmarkId::new("sequential", paths), &request, |b, req| {
            b.iter(|| simulate_seeded(black_box(req), 42).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("parallel", paths), &request, |b, req| {
            b.iter(|| simulate_par(black_box(req), 42).unwrap())
        });
    }

    group.finish();
}

fn bench_statistics(c: &mut Criterion) {
    let values: Vec<f64> = (0..10_000).map(|i| 60.0 + (i % 97) as f64 * 0.25).collect();

    c.bench_function("compute_statistics_10k", |b| {
        b.iter(|| compute_statistics(black_box(&values)).unwrap())
    });
}

criterion_group!(benches, bench_simulation, bench_statistics);
criterion_main!(benches);

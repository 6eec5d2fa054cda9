//! Funnel overhead benchmarks.
//!
//! Compares routing inputs through a funnel against calling the same batch
//! converters directly and stitching results together by hand.
//!
//! # Running
//! ```bash
//! cargo bench --package funnel-core
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use funnel_core::Funnel;

// ─── Converters ───────────────────────────────────────────────────────────────

fn load_even(ids: &[u64]) -> Vec<u64> {
    ids.iter().map(|id| id.wrapping_mul(31)).collect()
}

fn load_odd(ids: &[u64]) -> Vec<u64> {
    ids.iter().map(|id| id.wrapping_add(17)).collect()
}

// ─── Benchmarks ───────────────────────────────────────────────────────────────

fn bench_funnel_two_lanes(c: &mut Criterion) {
    let mut group = c.benchmark_group("funnel_two_lanes");
    for size in [100u64, 1_000, 10_000, 100_000] {
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let funnel: Funnel<u64> = Funnel::new();
                let even = funnel.through(load_even);
                let odd = funnel.through(load_odd);
                for id in 0..size {
                    if id % 2 == 0 {
                        even.accept(id);
                    } else {
                        odd.accept(id);
                    }
                }
                black_box(funnel.run())
            });
        });
    }
    group.finish();
}

fn bench_manual_two_lanes(c: &mut Criterion) {
    let mut group = c.benchmark_group("manual_two_lanes");
    for size in [100u64, 1_000, 10_000, 100_000] {
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let (even, odd): (Vec<u64>, Vec<u64>) = (0..size).partition(|id| id % 2 == 0);
                let mut even = load_even(&even).into_iter();
                let mut odd = load_odd(&odd).into_iter();
                let merged: Vec<u64> = (0..size)
                    .filter_map(|id| if id % 2 == 0 { even.next() } else { odd.next() })
                    .collect();
                black_box(merged)
            });
        });
    }
    group.finish();
}

fn bench_passthrough(c: &mut Criterion) {
    c.bench_function("passthrough_10k", |b| {
        b.iter(|| {
            let funnel: Funnel<u64> = Funnel::new();
            for id in 0..10_000u64 {
                funnel.add(id);
            }
            black_box(funnel.run())
        });
    });
}

criterion_group!(
    benches,
    bench_funnel_two_lanes,
    bench_manual_two_lanes,
    bench_passthrough,
);
criterion_main!(benches);

//! Benchmarks for network sorting and prefix grouping.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use embargo::aggregator::{aggregate, group_by_prefix};
use embargo::network::sort_networks;
use std::hint::black_box;

/// Generate canonical CIDR strings in a scrambled order
fn generate_cidrs(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            let scrambled = (i as u32).wrapping_mul(2_654_435_761);
            let prefix = 16 + (i % 17) as u8; // Prefix lengths 16-32
            let addr = scrambled & (u32::MAX << (32 - u32::from(prefix)));
            let [a, b, c, d] = addr.to_be_bytes();
            format!("{}.{}.{}.{}/{}", a, b, c, d, prefix)
        })
        .collect()
}

fn bench_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("sort_networks");

    for size in [1_000, 10_000, 100_000] {
        let cidrs = generate_cidrs(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &cidrs, |b, cidrs| {
            b.iter(|| black_box(sort_networks(cidrs).unwrap()));
        });
    }

    group.finish();
}

fn bench_group(c: &mut Criterion) {
    let mut group = c.benchmark_group("post_sort");

    for size in [1_000, 10_000, 100_000] {
        let sorted = sort_networks(generate_cidrs(size)).unwrap();
        group.bench_with_input(
            BenchmarkId::new("group_by_prefix", size),
            &sorted,
            |b, sorted| b.iter(|| black_box(group_by_prefix(sorted))),
        );
        group.bench_with_input(BenchmarkId::new("aggregate", size), &sorted, |b, sorted| {
            b.iter(|| black_box(aggregate(sorted)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_sort, bench_group);
criterion_main!(benches);

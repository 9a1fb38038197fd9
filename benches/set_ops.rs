//! LongTreeSet against std's BTreeSet for the same i64 workloads.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use primset::{ColoringStrategy, LongTreeSet};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;

fn random_keys(n: usize, seed: u64) -> Vec<i64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen_range(0..(n as i64) * 4)).collect()
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");

    for size in [1_000, 10_000, 100_000].iter() {
        let keys = random_keys(*size, 1);

        group.bench_with_input(BenchmarkId::new("BTreeSet", size), size, |b, _| {
            b.iter(|| {
                let mut set = BTreeSet::new();
                for &k in &keys {
                    set.insert(k);
                }
                black_box(set)
            });
        });

        group.bench_with_input(BenchmarkId::new("LongTreeSet", size), size, |b, _| {
            b.iter(|| {
                let mut set = LongTreeSet::new();
                for &k in &keys {
                    set.add(k);
                }
                black_box(set)
            });
        });
    }

    group.finish();
}

fn bench_contains(c: &mut Criterion) {
    let mut group = c.benchmark_group("contains");

    for size in [1_000, 10_000, 100_000].iter() {
        let keys = random_keys(*size, 2);
        let probes = random_keys(*size, 3);
        let btree: BTreeSet<i64> = keys.iter().copied().collect();
        let tree: LongTreeSet = keys.iter().copied().collect();

        group.bench_with_input(BenchmarkId::new("BTreeSet", size), size, |b, _| {
            b.iter(|| probes.iter().filter(|k| btree.contains(k)).count());
        });

        group.bench_with_input(BenchmarkId::new("LongTreeSet", size), size, |b, _| {
            b.iter(|| probes.iter().filter(|&&k| tree.contains(k)).count());
        });
    }

    group.finish();
}

fn bench_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("churn");

    for size in [10_000, 100_000].iter() {
        let mut sorted = random_keys(*size, 4);
        sorted.sort_unstable();
        sorted.dedup();
        let ops = random_keys(*size, 5);

        for strategy in [
            ColoringStrategy::Balanced,
            ColoringStrategy::ToAdd,
            ColoringStrategy::ToRemove,
        ] {
            let base = LongTreeSet::from_sorted_unique_with(&sorted, strategy)
                .expect("keys are sorted and deduplicated");
            let id = BenchmarkId::new(format!("{strategy:?}"), size);
            group.bench_with_input(id, size, |b, _| {
                b.iter(|| {
                    let mut set = base.clone();
                    for (i, &k) in ops.iter().enumerate() {
                        if i % 2 == 0 {
                            set.add(k);
                        } else {
                            set.remove(k);
                        }
                    }
                    black_box(set)
                });
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_insert, bench_contains, bench_churn);
criterion_main!(benches);

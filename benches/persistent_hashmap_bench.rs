//! Benchmark for PersistentHashMap vs standard HashMap.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use sharetrie::persistent::PersistentHashMap;
use std::collections::HashMap;
use std::hint::black_box;

// =============================================================================
// insert Benchmark
// =============================================================================

fn benchmark_insert(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("insert");

    for size in [1_000, 10_000, 100_000] {
        group.bench_with_input(
            BenchmarkId::new("PersistentHashMap", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut map = PersistentHashMap::new();
                    for index in 0..size {
                        map = map.insert(black_box(index), black_box(index * 2));
                    }
                    black_box(map)
                });
            },
        );

        group.bench_with_input(BenchmarkId::new("HashMap", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut map = HashMap::new();
                for index in 0..size {
                    map.insert(black_box(index), black_box(index * 2));
                }
                black_box(map)
            });
        });
    }

    group.finish();
}

// =============================================================================
// get Benchmark
// =============================================================================

fn benchmark_get(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("get");

    for size in [1_000, 10_000, 100_000] {
        let persistent_map: PersistentHashMap<i32, i32> = (0..size).map(|key| (key, key)).collect();
        let standard_map: HashMap<i32, i32> = (0..size).map(|key| (key, key)).collect();

        group.bench_with_input(
            BenchmarkId::new("PersistentHashMap", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut sum = 0_i64;
                    for key in 0..size {
                        if let Some(&value) = persistent_map.get(&black_box(key)) {
                            sum += i64::from(value);
                        }
                    }
                    black_box(sum)
                });
            },
        );

        group.bench_with_input(BenchmarkId::new("HashMap", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut sum = 0_i64;
                for key in 0..size {
                    if let Some(&value) = standard_map.get(&black_box(key)) {
                        sum += i64::from(value);
                    }
                }
                black_box(sum)
            });
        });
    }

    group.finish();
}

// =============================================================================
// remove Benchmark
// =============================================================================

fn benchmark_remove(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("remove");

    for size in [1_000, 10_000] {
        let persistent_map: PersistentHashMap<i32, i32> = (0..size).map(|key| (key, key)).collect();

        group.bench_with_input(
            BenchmarkId::new("PersistentHashMap", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut map = persistent_map.clone();
                    for key in 0..size {
                        map = map.remove(&black_box(key));
                    }
                    black_box(map)
                });
            },
        );
    }

    group.finish();
}

// =============================================================================
// merge / iteration Benchmark
// =============================================================================

fn benchmark_merge(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("merge");
    let left: PersistentHashMap<i32, i32> = (0..10_000).map(|key| (key, key)).collect();
    let right: PersistentHashMap<i32, i32> = (5_000..15_000).map(|key| (key, -key)).collect();

    group.bench_function("merge_10000", |bencher| {
        bencher.iter(|| black_box(left.merge(&right)));
    });

    group.bench_function("iterate_10000", |bencher| {
        bencher.iter(|| black_box(left.iter().map(|(_, value)| i64::from(*value)).sum::<i64>()));
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_insert,
    benchmark_get,
    benchmark_remove,
    benchmark_merge
);

criterion_main!(benches);

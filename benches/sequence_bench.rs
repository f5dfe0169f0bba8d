//! Benchmark for lazy sequence pipelines vs `std` iterator chains.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use sharetrie::persistent::PersistentVector;
use std::hint::black_box;

fn benchmark_filter_map_take(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("filter_map_take");

    for size in [1_000, 100_000] {
        let vector: PersistentVector<i64> = (0..size).collect();

        group.bench_with_input(BenchmarkId::new("IndexedSeq", size), &size, |bencher, _| {
            bencher.iter(|| {
                let seq = vector
                    .to_seq()
                    .filter(|value| value % 3 == 0)
                    .map(|value| value * 2)
                    .take(100);
                black_box(seq.to_vec())
            });
        });

        group.bench_with_input(BenchmarkId::new("Iterator", size), &size, |bencher, _| {
            bencher.iter(|| {
                let values: Vec<i64> = vector
                    .iter()
                    .filter(|value| *value % 3 == 0)
                    .map(|value| value * 2)
                    .take(100)
                    .collect();
                black_box(values)
            });
        });
    }

    group.finish();
}

fn benchmark_reverse(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("reverse");
    let vector: PersistentVector<i64> = (0..100_000).collect();

    group.bench_function("reversible_source", |bencher| {
        bencher.iter(|| black_box(vector.to_seq().reverse().take(10).to_vec()));
    });

    group.bench_function("after_filter", |bencher| {
        bencher.iter(|| {
            black_box(
                vector
                    .to_seq()
                    .filter(|value| value % 2 == 0)
                    .reverse()
                    .take(10)
                    .to_vec(),
            )
        });
    });

    group.finish();
}

fn benchmark_count(criterion: &mut Criterion) {
    let vector: PersistentVector<i64> = (0..100_000).collect();

    criterion.bench_function("count_filtered", |bencher| {
        bencher.iter(|| black_box(vector.to_seq().filter(|value| value % 7 == 0).count()));
    });
}

criterion_group!(benches, benchmark_filter_map_take, benchmark_reverse, benchmark_count);

criterion_main!(benches);

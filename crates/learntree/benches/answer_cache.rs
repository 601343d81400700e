//! Answer cache construction cost per pool preset.
//!
//! Run with: `cargo bench --bench answer_cache`

mod common;

use common::default_criterion;

use learntree::testing::synthetic_images;
use learntree::training::AnswerCache;
use learntree::{Examples, PoolPreset};

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

fn bench_cache_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("component/cache/build");
    let validation = Examples::from_rows::<Vec<i32>>(&[]).unwrap();

    for preset in PoolPreset::ALL {
        for n_examples in [1_000usize, 5_000] {
            let training = synthetic_images(n_examples, 28, 42);
            let pool = preset.build_for(training.n_features()).unwrap();

            group.throughput(Throughput::Elements((n_examples * pool.len()) as u64));
            group.bench_with_input(
                BenchmarkId::new(preset.name(), n_examples),
                &training,
                |b, training| {
                    b.iter(|| {
                        black_box(AnswerCache::build(&pool, black_box(training), &validation).unwrap())
                    })
                },
            );
        }
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = default_criterion();
    targets = bench_cache_build
}
criterion_main!(benches);

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use f2gauss::{F2Matrix, GaussConfig, Strategy};
use rand::{rngs::SmallRng, SeedableRng};
use std::hint::black_box;

fn gauss_blocksizes(c: &mut Criterion) {
    let mut rng = SmallRng::seed_from_u64(1);
    let m = F2Matrix::random(&mut rng, 256, 256);
    let mut group = c.benchmark_group("gauss_full_256");

    group.bench_function("plain", |b| {
        let config = GaussConfig::new()
            .with_full_reduce(true)
            .with_strategy(Strategy::Plain);
        b.iter(|| black_box(m.clone()).gauss_with(&config, &mut (), &mut ()))
    });

    for blocksize in [2, 6, 8, 16, 256] {
        group.bench_with_input(
            BenchmarkId::new("block_dedup", blocksize),
            &blocksize,
            |b, &blocksize| {
                let config = GaussConfig::new()
                    .with_full_reduce(true)
                    .with_blocksize(blocksize);
                b.iter(|| black_box(m.clone()).gauss_with(&config, &mut (), &mut ()))
            },
        );
    }
    group.finish();
}

fn derived_ops(c: &mut Criterion) {
    let mut rng = SmallRng::seed_from_u64(2);
    let inv = F2Matrix::random_invertible(&mut rng, 200);
    let low_rank = &F2Matrix::random(&mut rng, 200, 50) * &F2Matrix::random(&mut rng, 50, 300);

    c.bench_function("inverse_200", |b| b.iter(|| black_box(&inv).inverse()));
    c.bench_function("factor_200x300", |b| b.iter(|| black_box(&low_rank).factor()));
    c.bench_function("nullspace_200x300", |b| {
        b.iter(|| black_box(&low_rank).nullspace())
    });
}

fn mult_transpose(c: &mut Criterion) {
    let mut rng = SmallRng::seed_from_u64(3);
    let m1 = F2Matrix::random(&mut rng, 500, 400);
    let m2 = F2Matrix::random(&mut rng, 400, 300);

    c.bench_function("mult_500x400x300", |b| {
        b.iter(|| black_box(&m1) * black_box(&m2))
    });
    c.bench_function("transpose_500x400", |b| {
        b.iter(|| black_box(&m1).transposed())
    });
}

criterion_group!(benches, gauss_blocksizes, derived_ops, mult_transpose);
criterion_main!(benches);

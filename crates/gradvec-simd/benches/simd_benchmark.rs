//! Benchmark comparing SIMD kernels against the scalar references.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use gradvec_simd::{
    SimdCapability, VectorSlice, dot, dot_kahan, dot_kahan_scalar, dot_scalar, squared_l2_norm,
};

fn bench_dot(c: &mut Criterion) {
    let mut group = c.benchmark_group("dot_product");
    let cap = SimdCapability::detect();

    // Odd sizes exercise the masked tail on every lane width.
    for size in [100, 503, 1000, 5001, 10000] {
        let a: Vec<f64> = (0..size).map(|i| i as f64 * 0.1).collect();
        let b: Vec<f64> = (0..size).map(|i| (size - i) as f64 * 0.2).collect();

        group.bench_with_input(BenchmarkId::new("scalar", size), &size, |bencher, _| {
            bencher.iter(|| dot_scalar(&a, &b));
        });

        group.bench_with_input(
            BenchmarkId::new(format!("{:?}", cap), size),
            &size,
            |bencher, _| {
                bencher.iter(|| dot(VectorSlice::full(&a), VectorSlice::full(&b), cap));
            },
        );
    }
    group.finish();
}

fn bench_dot_kahan(c: &mut Criterion) {
    let mut group = c.benchmark_group("dot_product_kahan");
    let cap = SimdCapability::detect();

    for size in [100, 503, 1000, 5001, 10000] {
        let a: Vec<f64> = (0..size)
            .map(|i| if i % 2 == 0 { 1e16 } else { -1e16 })
            .collect();
        let b: Vec<f64> = (0..size).map(|i| 1.0 / (i as f64 + 1.0)).collect();

        group.bench_with_input(BenchmarkId::new("scalar", size), &size, |bencher, _| {
            bencher.iter(|| dot_kahan_scalar(&a, &b));
        });

        group.bench_with_input(
            BenchmarkId::new(format!("{:?}", cap), size),
            &size,
            |bencher, _| {
                bencher.iter(|| dot_kahan(VectorSlice::full(&a), VectorSlice::full(&b), cap));
            },
        );
    }
    group.finish();
}

fn bench_norm(c: &mut Criterion) {
    let mut group = c.benchmark_group("squared_l2_norm");
    let cap = SimdCapability::detect();

    for size in [100, 1000, 10000] {
        let a: Vec<f64> = (0..size).map(|i| (i as f64 * 0.01).sin()).collect();

        group.bench_with_input(BenchmarkId::new("scalar", size), &size, |bencher, _| {
            bencher.iter(|| squared_l2_norm(VectorSlice::full(&a), SimdCapability::Scalar));
        });

        group.bench_with_input(
            BenchmarkId::new(format!("{:?}", cap), size),
            &size,
            |bencher, _| {
                bencher.iter(|| squared_l2_norm(VectorSlice::full(&a), cap));
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_dot, bench_dot_kahan, bench_norm);
criterion_main!(benches);

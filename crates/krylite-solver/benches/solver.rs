//! Benchmarks for the iterative solvers.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use krylite_core::{FnOperator, LinearOperator};
use krylite_solver::{CgLanczosConfig, GmresConfig, cg_lanczos, gmres};

fn tridiagonal(n: usize) -> impl LinearOperator<f64> {
    FnOperator::new(n, n, move |x: &[f64], y: &mut [f64]| {
        for i in 0..n {
            let mut acc = 4.0 * x[i];
            if i > 0 {
                acc -= x[i - 1];
            }
            if i + 1 < n {
                acc -= x[i + 1];
            }
            y[i] = acc;
        }
    })
    .assume_hermitian()
}

fn bench_cg_lanczos(c: &mut Criterion) {
    let mut group = c.benchmark_group("cg_lanczos");

    for size in [50, 200, 800] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |bencher, &size| {
            let op = tridiagonal(size);
            let b: Vec<f64> = (0..size).map(|i| 1.0 + (i % 7) as f64).collect();
            let config = CgLanczosConfig::default();

            bencher.iter(|| cg_lanczos(black_box(&op), black_box(&b), &config).unwrap());
        });
    }

    group.finish();
}

fn bench_gmres(c: &mut Criterion) {
    let mut group = c.benchmark_group("gmres");

    for size in [50, 200, 800] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |bencher, &size| {
            let op = tridiagonal(size);
            let b: Vec<f64> = (0..size).map(|i| 1.0 + (i % 7) as f64).collect();
            let config = GmresConfig {
                memory: 30,
                restart: true,
                ..GmresConfig::default()
            };

            bencher.iter(|| gmres(black_box(&op), black_box(&b), &config).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_cg_lanczos, bench_gmres);
criterion_main!(benches);

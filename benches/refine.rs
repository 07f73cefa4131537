use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use ilur::algorithm::{refine_step, sweep};
use ilur::prelude::*;
use num_complex::Complex64;

/// 5-point grid stencil with a slight diagonal perturbation so removal
/// thresholds are unambiguous
fn grid_matrix(k: usize) -> CsrMatrix {
    let n = k * k;
    let mut rows = Vec::new();
    let mut cols = Vec::new();
    let mut vals = Vec::new();
    let mut push = |r: usize, c: usize, v: f64| {
        rows.push(r);
        cols.push(c);
        vals.push(Complex64::new(v, 0.0));
    };
    for y in 0..k {
        for x in 0..k {
            let i = y * k + x;
            if y > 0 {
                push(i, i - k, -1.0);
            }
            if x > 0 {
                push(i, i - 1, -1.0);
            }
            push(i, i, 4.0 + 1e-3 * i as f64);
            if x < k - 1 {
                push(i, i + 1, -1.0);
            }
            if y < k - 1 {
                push(i, i + k, -1.0);
            }
        }
    }
    CsrMatrix::from_triplets(&rows, &cols, &vals, [n, n]).unwrap()
}

fn bench_sweep(c: &mut Criterion) {
    let a = grid_matrix(32);
    let factor = LinkedFactor::from_csr_lower(&a).unwrap();

    c.bench_function("sweep/grid32", |b| {
        b.iter_batched(
            || factor.clone(),
            |mut f| sweep(&a, &mut f),
            BatchSize::SmallInput,
        )
    });
}

fn bench_refine_step(c: &mut Criterion) {
    let a = grid_matrix(32);
    let factor = LinkedFactor::from_csr_lower(&a).unwrap();

    c.bench_function("refine_step/grid32", |b| {
        b.iter_batched(
            || factor.clone(),
            |mut f| refine_step(&a, &mut f, 64).unwrap(),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_sweep, bench_refine_step);
criterion_main!(benches);

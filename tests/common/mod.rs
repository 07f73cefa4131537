//! Common test utilities
#![allow(dead_code)]

use ilur::prelude::*;
use num_complex::Complex64;

/// Real-valued complex shorthand
pub fn c(re: f64) -> Complex64 {
    Complex64::new(re, 0.0)
}

/// Build a CSR matrix from (row, col, value) triplets with real values
pub fn csr(triplets: &[(usize, usize, f64)], n: usize) -> CsrMatrix {
    let rows: Vec<usize> = triplets.iter().map(|t| t.0).collect();
    let cols: Vec<usize> = triplets.iter().map(|t| t.1).collect();
    let vals: Vec<Complex64> = triplets.iter().map(|t| c(t.2)).collect();
    CsrMatrix::from_triplets(&rows, &cols, &vals, [n, n]).expect("CSR creation should succeed")
}

/// Create 1D Laplacian (SPD tridiagonal): diag=2, off-diag=-1
pub fn laplacian_1d(n: usize) -> CsrMatrix {
    let mut triplets = Vec::new();
    for i in 0..n {
        if i > 0 {
            triplets.push((i, i - 1, -1.0));
        }
        triplets.push((i, i, 2.0));
        if i < n - 1 {
            triplets.push((i, i + 1, -1.0));
        }
    }
    csr(&triplets, n)
}

/// Create 2D Laplacian (5-point stencil) on a k-by-k grid: diag=4,
/// neighbors=-1
pub fn laplacian_2d(k: usize) -> CsrMatrix {
    let n = k * k;
    let mut triplets = Vec::new();
    for y in 0..k {
        for x in 0..k {
            let i = y * k + x;
            if y > 0 {
                triplets.push((i, i - k, -1.0));
            }
            if x > 0 {
                triplets.push((i, i - 1, -1.0));
            }
            triplets.push((i, i, 4.0));
            if x < k - 1 {
                triplets.push((i, i + 1, -1.0));
            }
            if y < k - 1 {
                triplets.push((i, i + k, -1.0));
            }
        }
    }
    csr(&triplets, n)
}

/// Assert two complex values are within `tol` of each other
pub fn assert_close(a: Complex64, b: Complex64, tol: f64, msg: &str) {
    assert!(
        (a - b).norm() <= tol,
        "{}: {} vs {} (diff={})",
        msg,
        a,
        b,
        (a - b).norm()
    );
}

/// Largest entry of |L·Lᵀ − A| over all positions
///
/// Only meaningful when the factor's pattern covers the full Cholesky
/// pattern of `a`; otherwise the dropped positions contribute their
/// factorization defect.
pub fn reconstruction_error(a: &CsrMatrix, factor: &LinkedFactor) -> f64 {
    let n = a.nrows();
    let l = factor.to_csr();

    let mut dense_l = vec![vec![c(0.0); n]; n];
    for r in 0..n {
        let start = l.row_ptrs()[r] as usize;
        let end = l.row_ptrs()[r + 1] as usize;
        for idx in start..end {
            dense_l[r][l.col_indices()[idx] as usize] = l.values()[idx];
        }
    }

    let mut max_diff = 0.0f64;
    for i in 0..n {
        for j in 0..n {
            let mut prod = c(0.0);
            for k in 0..n {
                prod += dense_l[i][k] * dense_l[j][k];
            }
            let diff = (prod - a.get(i, j)).norm();
            max_diff = max_diff.max(diff);
        }
    }
    max_diff
}

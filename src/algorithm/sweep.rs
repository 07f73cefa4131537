//! Fixed-point relaxation sweep over the live factor values
//!
//! One pass re-solves every live entry from the values currently visible:
//! the diagonal gets `sqrt(A[r,r] - sum)`, an off-diagonal gets
//! `(A[r,c] - sum) / F[c,c]`, where `sum` runs over the shared columns of
//! rows `r` and `c` left of `c`. Values read during a parallel sweep may
//! already have been updated by other slots or may still be old; both are
//! acceptable states of the fixed-point iteration, so value access is
//! deliberately unsynchronized. Links and coordinates are not mutated.

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use super::helpers::merge_row_product;
use crate::sparse::{CsrMatrix, LinkedFactor, FREED};

/// Run one relaxation sweep of `factor` against `a`
///
/// Parallel over slots; freed slots and the sentinel are skipped. The dual
/// merge-walk of rows `r` and `c` ends on the match at column `c` (the
/// entry itself against the diagonal of row `c`), so the final matched term
/// is dropped from the sum and the final chain cursor hands back the slot
/// of `F[c,c]` for the division.
pub fn sweep(a: &CsrMatrix, factor: &mut LinkedFactor) {
    let slots = factor.slots();
    let cells = factor.cells();

    let update = |e: usize| {
        // Safety: links and coordinates are read-only during the sweep, and
        // value races are part of the relaxation scheme. Each slot's value
        // is written by its own iteration only.
        unsafe {
            if cells.next(e) == FREED {
                return;
            }
            let row = cells.rowidx(e) as usize;
            let col = cells.col(e) as usize;
            let a_e = a.get(row, col);

            let (sum, last, jold) = merge_row_product(
                cells.head_slice(),
                cells.col_slice(),
                cells.next_slice(),
                |s| unsafe { cells.val(s) },
                row,
                col,
            );
            let partial = sum - last;

            let value = if row == col {
                (a_e - partial).sqrt()
            } else {
                (a_e - partial) / cells.val(jold)
            };
            cells.set_val(e, value);
        }
    };

    #[cfg(feature = "rayon")]
    (1..slots).into_par_iter().for_each(update);
    #[cfg(not(feature = "rayon"))]
    (1..slots).for_each(update);
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;

    fn c(re: f64) -> Complex64 {
        Complex64::new(re, 0.0)
    }

    fn csr(triplets: &[(usize, usize, f64)], n: usize) -> CsrMatrix {
        let rows: Vec<usize> = triplets.iter().map(|t| t.0).collect();
        let cols: Vec<usize> = triplets.iter().map(|t| t.1).collect();
        let vals: Vec<Complex64> = triplets.iter().map(|t| c(t.2)).collect();
        CsrMatrix::from_triplets(&rows, &cols, &vals, [n, n]).unwrap()
    }

    #[test]
    fn test_sweep_on_identity_fixes_unit_diagonal() {
        let a = csr(&[(0, 0, 1.0), (1, 1, 1.0), (2, 2, 1.0), (3, 3, 1.0)], 4);
        let mut f = LinkedFactor::from_csr_lower(&a).unwrap();
        sweep(&a, &mut f);
        for r in 0..4 {
            let s = f.find(r, r).unwrap();
            assert_eq!(f.value(s), c(1.0));
        }
    }

    #[test]
    fn test_sweep_reaches_exact_cholesky_on_full_pattern() {
        // A = [[4, 1], [1, 3]]; L = [[2, 0], [0.5, sqrt(2.75)]].
        let a = csr(&[(0, 0, 4.0), (0, 1, 1.0), (1, 0, 1.0), (1, 1, 3.0)], 2);
        let mut f = LinkedFactor::from_csr_lower(&a).unwrap();

        // The pattern matches the exact Cholesky factor, so repeated sweeps
        // converge; the leading entries settle in the first pass.
        for _ in 0..3 {
            sweep(&a, &mut f);
        }

        let l00 = f.value(f.find(0, 0).unwrap());
        let l10 = f.value(f.find(1, 0).unwrap());
        let l11 = f.value(f.find(1, 1).unwrap());
        assert!((l00 - c(2.0)).norm() < 1e-12);
        assert!((l10 - c(0.5)).norm() < 1e-12);
        assert!((l11 - c((2.75f64).sqrt())).norm() < 1e-12);
    }

    #[test]
    fn test_sweep_is_idempotent_at_the_fixed_point() {
        let a = csr(&[(0, 0, 4.0), (0, 1, 1.0), (1, 0, 1.0), (1, 1, 3.0)], 2);
        let mut f = LinkedFactor::from_csr_lower(&a).unwrap();
        for _ in 0..6 {
            sweep(&a, &mut f);
        }
        let before: Vec<Complex64> = f.values().to_vec();
        sweep(&a, &mut f);
        for (x, y) in before.iter().zip(f.values()) {
            assert!((x - y).norm() < 1e-13);
        }
    }
}

//! Magnitude threshold selection and entry removal
//!
//! The selector picks the `num_rm`-th smallest magnitude over the slot pool
//! (working on a copy so the factor is never permuted); the remover then
//! unlinks every entry strictly below that threshold. Rows are walked by
//! exactly one thread each, so the chains need no locking; the only shared
//! state is the freed-slot list, guarded by a single counter lock.

use num_complex::Complex64;
use num_traits::Zero;
use parking_lot::Mutex;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::sparse::{LinkedFactor, FREED, NIL};

/// Magnitude of the `num_rm`-th smallest slot value
///
/// Operates on a copy of the slot values (live and freed alike, excluding
/// the sentinel), selected with the standard nth-element primitive. With
/// pairwise distinct magnitudes, [`remove_below`] with the returned
/// threshold frees exactly `num_rm` slots. `num_rm` at or beyond the pool
/// size clamps to the largest magnitude.
pub fn compute_threshold(factor: &LinkedFactor, num_rm: usize) -> f64 {
    let vals = factor.values();
    if vals.len() <= 1 {
        return 0.0;
    }

    let mut mags: Vec<f64> = vals[1..].iter().map(|v| v.norm()).collect();
    let k = num_rm.min(mags.len() - 1);
    let (_, kth, _) = mags.select_nth_unstable_by(k, f64::total_cmp);
    *kth
}

/// Unlink and free every entry with magnitude strictly below `threshold`
///
/// Parallel over rows. Each row walk keeps a predecessor cursor: a removed
/// slot is zeroed, marked freed, appended to the freed list under the
/// counter lock, and bridged over (head update when it was first in the
/// row). The walk never examines the last element of a chain, which for a
/// lower-triangular row is the diagonal, so diagonals survive any
/// threshold.
///
/// Returns the freed slot ids in discovery order.
pub fn remove_below(factor: &mut LinkedFactor, threshold: f64) -> Vec<usize> {
    let n = factor.num_rows();
    let cells = factor.cells();
    let removed = Mutex::new(Vec::new());

    let scan_row = |row: usize| {
        // Safety: this thread is the only one touching row `row`, and the
        // freed list append is serialized by the counter lock.
        unsafe {
            let mut i = cells.head(row);
            if i == NIL {
                return;
            }
            let mut lasti = i;
            let mut nexti = cells.next(i) as usize;

            while nexti != NIL {
                if cells.val(i).norm() < threshold {
                    cells.set_val(i, Complex64::zero());
                    cells.set_next(i, FREED);

                    removed.lock().push(i);

                    if cells.head(row) == i {
                        cells.set_head(row, nexti);
                        lasti = i;
                    } else {
                        cells.set_next(lasti, nexti as i64);
                    }
                    i = nexti;
                    nexti = cells.next(nexti) as usize;
                } else {
                    lasti = i;
                    i = nexti;
                    nexti = cells.next(nexti) as usize;
                }
            }
        }
    };

    #[cfg(feature = "rayon")]
    (0..n).into_par_iter().for_each(scan_row);
    #[cfg(not(feature = "rayon"))]
    (0..n).for_each(scan_row);

    removed.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sparse::CsrMatrix;

    fn c(re: f64) -> Complex64 {
        Complex64::new(re, 0.0)
    }

    fn lower_factor(triplets: &[(usize, usize, f64)], n: usize) -> LinkedFactor {
        let rows: Vec<usize> = triplets.iter().map(|t| t.0).collect();
        let cols: Vec<usize> = triplets.iter().map(|t| t.1).collect();
        let vals: Vec<Complex64> = triplets.iter().map(|t| c(t.2)).collect();
        let a = CsrMatrix::from_triplets(&rows, &cols, &vals, [n, n]).unwrap();
        LinkedFactor::from_csr_lower(&a).unwrap()
    }

    #[test]
    fn test_threshold_selects_kth_smallest() {
        let f = lower_factor(
            &[(0, 0, 4.0), (1, 0, 0.5), (1, 1, 3.0), (2, 1, 0.25), (2, 2, 2.0)],
            3,
        );
        // Magnitudes: [4, 0.5, 3, 0.25, 2] sorted [0.25, 0.5, 2, 3, 4].
        assert_eq!(compute_threshold(&f, 0), 0.25);
        assert_eq!(compute_threshold(&f, 2), 2.0);
        // Clamped beyond the pool.
        assert_eq!(compute_threshold(&f, 100), 4.0);
    }

    #[test]
    fn test_remove_exactly_num_rm_with_distinct_magnitudes() {
        let mut f = lower_factor(
            &[(0, 0, 4.0), (1, 0, 0.5), (1, 1, 3.0), (2, 1, 0.25), (2, 2, 2.0)],
            3,
        );
        let thrs = compute_threshold(&f, 2);
        let freed = remove_below(&mut f, thrs);
        assert_eq!(freed.len(), 2);
        f.validate().unwrap();
        assert_eq!(f.find(1, 0), None);
        assert_eq!(f.find(2, 1), None);
        assert_eq!(f.live_nnz(), 3);
    }

    #[test]
    fn test_remove_with_zero_threshold_is_noop() {
        let mut f = lower_factor(&[(0, 0, 2.0), (1, 0, 0.1), (1, 1, 2.0)], 2);
        let freed = remove_below(&mut f, 0.0);
        assert!(freed.is_empty());
        assert_eq!(f.live_nnz(), 3);
        f.validate().unwrap();
    }

    #[test]
    fn test_diagonal_survives_aggressive_threshold() {
        let mut f = lower_factor(
            &[(0, 0, 1e-3), (1, 0, 2.0), (1, 1, 1e-3), (2, 2, 1e-3)],
            3,
        );
        let freed = remove_below(&mut f, 1e6);
        f.validate().unwrap();
        // Only the off-diagonal can go; diagonals end their chains.
        assert_eq!(freed.len(), 1);
        assert!(f.is_freed(freed[0]));
        assert_eq!(f.find(1, 0), None);
        assert!(f.find(0, 0).is_some());
        assert!(f.find(1, 1).is_some());
        assert!(f.find(2, 2).is_some());
    }
}

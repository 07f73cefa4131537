//! Symbolic fill-in candidate discovery
//!
//! A position qualifies as a candidate when two entries of some row share it
//! as their elimination overlap: for live columns `c2 < c1` in a row, the
//! coordinate `(c1, c2)` is proposed unless the factor already stores it.
//! The same coordinate can be proposed by several rows; deduplication is the
//! inserter's job.

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use super::types::Candidate;
use crate::sparse::{LinkedFactor, NIL};

/// Marker wrapper so disjoint out-of-order writes can cross the parallel
/// loop boundary
struct SendPtr<T>(*mut T);

unsafe impl<T> Send for SendPtr<T> {}
unsafe impl<T> Sync for SendPtr<T> {}

/// Enumerate the candidate coordinates contributed by one row
///
/// The emit order is a pure function of the chain structure, so the count
/// pass and the write pass agree exactly by sharing this enumeration.
fn enumerate_row<E>(factor: &LinkedFactor, row: usize, mut emit: E)
where
    E: FnMut(usize, usize),
{
    let start = factor.head(row);

    let mut lcol1 = start;
    while lcol1 != NIL {
        // The diagonal never opens a pair.
        if factor.column(lcol1) == row {
            lcol1 = factor.next_slot(lcol1);
            continue;
        }
        let col1 = factor.column(lcol1);

        let mut lcol2 = start;
        while lcol2 != NIL {
            let col2 = factor.column(lcol2);
            if col2 >= col1 {
                lcol2 = factor.next_slot(lcol2);
                continue;
            }

            // Probe row col1 for column col2; propose (col1, col2) if absent.
            let mut exist = false;
            let mut check = factor.head(col1);
            while check != NIL {
                if factor.column(check) == col2 {
                    exist = true;
                    break;
                }
                check = factor.next_slot(check);
            }
            if !exist {
                emit(col1, col2);
            }

            lcol2 = factor.next_slot(lcol2);
        }

        lcol1 = factor.next_slot(lcol1);
    }
}

/// Discover new fill-in positions from the current factor pattern
///
/// Runs a per-row count pass, an exclusive prefix sum over the per-row
/// counts, and a per-row write pass that re-runs the same enumeration into
/// the reserved offset ranges. Both passes are parallel over rows; the scan
/// is sequential.
///
/// Produced candidates carry a zero residual; score them with
/// [`compute_residuals`](super::compute_residuals) before selection.
/// Coordinates proposed by several rows appear once per proposing row.
pub fn find_candidates(factor: &LinkedFactor) -> Vec<Candidate> {
    let n = factor.num_rows();

    let count_row = |row: usize| {
        let mut count = 0usize;
        enumerate_row(factor, row, |_, _| count += 1);
        count
    };

    #[cfg(feature = "rayon")]
    let counts: Vec<usize> = (0..n).into_par_iter().map(count_row).collect();
    #[cfg(not(feature = "rayon"))]
    let counts: Vec<usize> = (0..n).map(count_row).collect();

    let mut offsets = vec![0usize; n + 1];
    for r in 0..n {
        offsets[r + 1] = offsets[r] + counts[r];
    }
    let total = offsets[n];

    let mut candidates = vec![Candidate::default(); total];
    let out = SendPtr(candidates.as_mut_ptr());

    let write_row = |row: usize| {
        let out = &out;
        let mut at = offsets[row];
        enumerate_row(factor, row, |cr, ce| {
            debug_assert!(at < offsets[row + 1], "write pass exceeded counted range");
            // Disjoint range per row: [offsets[row], offsets[row + 1]).
            unsafe {
                out.0.add(at).write(Candidate {
                    row: cr,
                    col: ce,
                    ..Candidate::default()
                });
            }
            at += 1;
        });
        debug_assert_eq!(at, offsets[row + 1], "write pass disagrees with count pass");
    };

    #[cfg(feature = "rayon")]
    (0..n).into_par_iter().for_each(write_row);
    #[cfg(not(feature = "rayon"))]
    (0..n).for_each(write_row);

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sparse::CsrMatrix;
    use num_complex::Complex64;

    fn c(re: f64) -> Complex64 {
        Complex64::new(re, 0.0)
    }

    fn factor_from(triplets: &[(usize, usize, f64)], n: usize) -> LinkedFactor {
        let rows: Vec<usize> = triplets.iter().map(|t| t.0).collect();
        let cols: Vec<usize> = triplets.iter().map(|t| t.1).collect();
        let vals: Vec<Complex64> = triplets.iter().map(|t| c(t.2)).collect();
        let a = CsrMatrix::from_triplets(&rows, &cols, &vals, [n, n]).unwrap();
        LinkedFactor::from_csr_lower(&a).unwrap()
    }

    #[test]
    fn test_diagonal_factor_has_no_candidates() {
        let f = factor_from(&[(0, 0, 1.0), (1, 1, 1.0), (2, 2, 1.0)], 3);
        assert!(find_candidates(&f).is_empty());
    }

    #[test]
    fn test_arrow_row_proposes_missing_pair() {
        // Row 2 holds columns {0, 1, 2}; the pair (1, 0) is not stored.
        let f = factor_from(
            &[
                (0, 0, 2.0),
                (1, 1, 2.0),
                (2, 0, 1.0),
                (2, 1, 1.0),
                (2, 2, 2.0),
            ],
            3,
        );
        let cands = find_candidates(&f);
        assert_eq!(cands.len(), 1);
        assert_eq!((cands[0].row, cands[0].col), (1, 0));
    }

    #[test]
    fn test_stored_pair_is_not_proposed() {
        let f = factor_from(
            &[
                (0, 0, 2.0),
                (1, 0, 1.0),
                (1, 1, 2.0),
                (2, 0, 1.0),
                (2, 1, 1.0),
                (2, 2, 2.0),
            ],
            3,
        );
        assert!(find_candidates(&f).is_empty());
    }

    #[test]
    fn test_duplicates_across_rows_are_kept() {
        // Rows 2 and 3 both hold {0, 1}, so both propose (1, 0).
        let f = factor_from(
            &[
                (0, 0, 2.0),
                (1, 1, 2.0),
                (2, 0, 1.0),
                (2, 1, 1.0),
                (2, 2, 2.0),
                (3, 0, 1.0),
                (3, 1, 1.0),
                (3, 3, 2.0),
            ],
            4,
        );
        let cands = find_candidates(&f);
        assert_eq!(cands.len(), 2);
        assert!(cands.iter().all(|cd| (cd.row, cd.col) == (1, 0)));
    }
}

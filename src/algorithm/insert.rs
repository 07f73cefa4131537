//! Candidate insertion into freed slots
//!
//! The winners of the residual selection are spliced into their rows at the
//! column-ordered position, re-using the slots freed by the removal pass.
//! Candidates are processed in parallel; every structural access to a row
//! (head pointer and neighbor links) happens under that row's lock.

use num_complex::Complex64;
use num_traits::Zero;
use parking_lot::Mutex;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use super::types::Candidate;
use crate::sparse::{LinkedFactor, NIL};

/// Splice the top-`num_rm` candidates into the factor using freed slots
///
/// Brings the `num_rm` largest-magnitude residuals to the front of
/// `candidates` in place, then pairs `candidates[i]` with `freed[i]` for
/// `i < min(num_rm, freed.len())` and splices each at its ordered position.
/// New entries start with a zero value; the next relaxation sweep computes
/// their proper values.
///
/// A candidate whose coordinate is already stored (duplicates are expected:
/// several rows can propose the same position, and the discovery pass runs
/// before any insertion) is skipped, and its paired slot stays freed for
/// this iteration.
///
/// When `num_rm >= candidates.len()` the call is a no-op; the caller is
/// expected to notice the starved iteration by comparing successive
/// iterations. Returns the number of entries actually inserted.
pub fn insert_candidates(
    factor: &mut LinkedFactor,
    candidates: &mut [Candidate],
    freed: &[usize],
    num_rm: usize,
) -> usize {
    if num_rm >= candidates.len() {
        return 0;
    }

    // Partition so candidates[..num_rm] hold the largest residuals.
    candidates.select_nth_unstable_by(num_rm, |x, y| {
        y.residual.norm().total_cmp(&x.residual.norm())
    });

    let take = num_rm.min(freed.len());
    let winners = &candidates[..take];

    let locks: Vec<Mutex<()>> = (0..factor.num_rows()).map(|_| Mutex::new(())).collect();
    let cells = factor.cells();

    let insert_one = |i: usize| -> bool {
        let loc = freed[i];
        let row = winners[i].row;
        let new_col = winners[i].col as i64;

        let _guard = locks[row].lock();
        // Safety: all reads and writes of row `row`'s chain happen under its
        // lock; slot `loc` is paired with this candidate alone.
        unsafe {
            let old_head = cells.head(row);

            if new_col < cells.col(old_head) {
                cells.set_head(row, loc);
                cells.set_next(loc, old_head as i64);
                cells.set_rowidx(loc, row as i64);
                cells.set_col(loc, new_col);
                cells.set_val(loc, Complex64::zero());
                return true;
            }
            if new_col == cells.col(old_head) {
                // Duplicate of the first entry; slot stays freed.
                return false;
            }

            let mut j = old_head;
            let mut jn = cells.next(j) as usize;
            // The chain ends at the diagonal and new_col < row, so the walk
            // always terminates at a splice or a duplicate.
            while j != NIL {
                if cells.col(jn) == new_col {
                    return false;
                }
                if cells.col(jn) > new_col {
                    cells.set_next(j, loc as i64);
                    cells.set_next(loc, jn as i64);
                    cells.set_rowidx(loc, row as i64);
                    cells.set_col(loc, new_col);
                    cells.set_val(loc, Complex64::zero());
                    return true;
                }
                j = jn;
                jn = cells.next(jn) as usize;
            }
            false
        }
    };

    #[cfg(feature = "rayon")]
    let inserted = (0..take).into_par_iter().filter(|&i| insert_one(i)).count();
    #[cfg(not(feature = "rayon"))]
    let inserted = (0..take).filter(|&i| insert_one(i)).count();

    inserted
}

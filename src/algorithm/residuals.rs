//! Candidate scoring against the system matrix
//!
//! Each candidate `(i, j)` is scored by its local factorization defect
//! `A[i,j] - sum(F[i,k] * F[j,k])`, where the sum runs over the columns the
//! two factor rows share. Candidates are independent, so the pass is
//! embarrassingly parallel and touches nothing but its own record.

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use super::helpers::merge_row_product;
use super::types::Candidate;
use crate::sparse::{CsrMatrix, LinkedFactor};

/// Score every candidate by its residual against `a`
///
/// The accumulation is left-to-right in merge order within one candidate;
/// no compensation is applied. `A[i,j]` is looked up by a linear scan of
/// the CSR row and contributes zero when the position is not stored.
pub fn compute_residuals(a: &CsrMatrix, factor: &LinkedFactor, candidates: &mut [Candidate]) {
    let heads = factor.heads();
    let cols = factor.cols();
    let nexts = factor.nexts();
    let vals = factor.values();

    let score = |cand: &mut Candidate| {
        let a_e = a.get(cand.row, cand.col);
        let (sum, _, _) =
            merge_row_product(heads, cols, nexts, |s| vals[s], cand.row, cand.col);
        cand.residual = a_e - sum;
    };

    #[cfg(feature = "rayon")]
    candidates.par_iter_mut().for_each(score);
    #[cfg(not(feature = "rayon"))]
    candidates.iter_mut().for_each(score);
}

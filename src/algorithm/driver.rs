//! Refinement step and outer driver
//!
//! One refinement iteration runs the phases in their mandatory order:
//! relaxation sweep, candidate discovery, residual scoring, threshold
//! selection, removal, insertion. Removal must precede insertion so the
//! inserter finds freed slots. The drivers wrap a fixed number of such
//! iterations around an initial factor taken from the lower triangle of
//! the system matrix.

use super::candidates::find_candidates;
use super::insert::insert_candidates;
use super::residuals::compute_residuals;
use super::sweep::sweep;
use super::threshold::{compute_threshold, remove_below};
use super::types::{DynamicIcOptions, RefineMetrics};
use crate::error::{Error, Result};
use crate::sparse::{CsrMatrix, LinkedFactor};

/// Run one refinement iteration of `factor` against `a`
///
/// Exchanges up to `num_rm` entries: the `num_rm` smallest-magnitude slots
/// make room for the `num_rm` highest-residual fill-in candidates, and a
/// relaxation sweep (run first, so freshly inserted entries from the
/// previous iteration get values before they are judged) keeps the values
/// tracking the pattern.
///
/// When fewer than `num_rm` candidates exist the iteration stops after
/// scoring and performs no structural change; the returned metrics show
/// zero removals and insertions.
///
/// # Errors
///
/// [`Error::ShapeMismatch`] when the factor's row count does not match `a`.
pub fn refine_step(
    a: &CsrMatrix,
    factor: &mut LinkedFactor,
    num_rm: usize,
) -> Result<RefineMetrics> {
    if a.nrows() != factor.num_rows() {
        return Err(Error::ShapeMismatch {
            expected: vec![a.nrows()],
            got: vec![factor.num_rows()],
        });
    }

    sweep(a, factor);

    let mut candidates = find_candidates(factor);
    compute_residuals(a, factor, &mut candidates);

    if num_rm >= candidates.len() {
        return Ok(RefineMetrics {
            candidates: candidates.len(),
            threshold: 0.0,
            removed: 0,
            inserted: 0,
        });
    }

    let threshold = compute_threshold(factor, num_rm);
    let freed = remove_below(factor, threshold);
    let inserted = insert_candidates(factor, &mut candidates, &freed, num_rm);

    Ok(RefineMetrics {
        candidates: candidates.len(),
        threshold,
        removed: freed.len(),
        inserted,
    })
}

/// Dynamic incomplete factorization of the lower triangle of `a`
///
/// Convenience wrapper over [`dynamic_ic_with_metrics`] that drops the
/// per-iteration diagnostics.
///
/// # Errors
///
/// See [`dynamic_ic_with_metrics`].
pub fn dynamic_ic(a: &CsrMatrix, options: DynamicIcOptions) -> Result<LinkedFactor> {
    dynamic_ic_with_metrics(a, options).map(|(factor, _)| factor)
}

/// Dynamic incomplete factorization with per-iteration diagnostics
///
/// Starts from the lower triangle of `a` as both pattern and values, runs
/// `options.iterations` refinement iterations exchanging `options.num_rm`
/// entries each, and finishes with `options.final_sweeps` relaxation sweeps
/// so late insertions carry converged values.
///
/// # Errors
///
/// - [`Error::NonSquareMatrix`] when `a` is not square
/// - [`Error::MissingDiagonal`] / [`Error::UnsortedRow`] when the lower
///   triangle of `a` cannot seed the factor
pub fn dynamic_ic_with_metrics(
    a: &CsrMatrix,
    options: DynamicIcOptions,
) -> Result<(LinkedFactor, Vec<RefineMetrics>)> {
    let [nrows, ncols] = a.shape();
    if nrows != ncols {
        return Err(Error::NonSquareMatrix { nrows, ncols });
    }

    let mut factor = LinkedFactor::from_csr_lower(a)?;
    let mut metrics = Vec::with_capacity(options.iterations);

    for _ in 0..options.iterations {
        metrics.push(refine_step(a, &mut factor, options.num_rm)?);
    }
    for _ in 0..options.final_sweeps {
        sweep(a, &mut factor);
    }

    Ok((factor, metrics))
}

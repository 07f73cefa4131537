//! Types for the dynamic factorization engine
//!
//! Contains the candidate record, driver options, and per-iteration metrics.

use num_complex::Complex64;

/// A fill-in candidate: a coordinate not currently stored in the factor,
/// scored by its local factorization defect
///
/// Candidates are produced unscored (`residual == 0`), scored in place by
/// the residual pass, and partially reordered by the selection step so the
/// winners occupy the front of the list.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Candidate {
    /// Row of the proposed entry
    pub row: usize,
    /// Column of the proposed entry (always < `row`)
    pub col: usize,
    /// Local defect `A[row,col] - sum(F[row,k] * F[col,k])`
    pub residual: Complex64,
}

/// Configuration for the dynamic factorization driver
#[derive(Debug, Clone, Copy)]
pub struct DynamicIcOptions {
    /// Number of refinement iterations (default: 5)
    pub iterations: usize,

    /// Entries exchanged per iteration (default: 0, which keeps the
    /// sparsity pattern fixed and degenerates to pure value relaxation)
    pub num_rm: usize,

    /// Extra relaxation sweeps after the last iteration, so entries
    /// inserted late carry converged values (default: 1)
    pub final_sweeps: usize,
}

impl Default for DynamicIcOptions {
    fn default() -> Self {
        Self {
            iterations: 5,
            num_rm: 0,
            final_sweeps: 1,
        }
    }
}

/// Diagnostics reported by one refinement iteration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefineMetrics {
    /// Number of fill-in candidates proposed by the symbolic pass
    pub candidates: usize,

    /// Magnitude threshold used by the removal pass (0 when the iteration
    /// was skipped for lack of candidates)
    pub threshold: f64,

    /// Number of slots freed by the removal pass
    pub removed: usize,

    /// Number of candidates actually spliced into the factor
    pub inserted: usize,
}

//! # ilur
//!
//! **Dynamic threshold-based incomplete factorization for sparse matrices.**
//!
//! ilur iteratively refines a sparse lower-triangular factor of a system
//! matrix without committing to a sparsity pattern up front: every
//! iteration drops the least significant stored entries, promotes the
//! highest-scoring fill-in candidates into the freed storage, and relaxes
//! all values toward the fixed point of the factorization equations. The
//! result approximates an incomplete Cholesky factor whose pattern adapted
//! to the matrix, which makes it a useful preconditioner for iterative
//! solvers.
//!
//! ## Design
//!
//! - **Pool-linked factor storage**: the factor lives in fixed parallel
//!   slot arrays threaded by per-row linked chains, so entries can be
//!   dropped and re-inserted with stable slot ids and no reallocation
//!   under churn.
//! - **Phase-parallel refinement**: every phase is a fork/join parallel
//!   pass (rows, candidates, or slots) with minimal synchronization: one
//!   counter lock in removal, per-row locks in insertion, and a
//!   deliberately unsynchronized relaxation sweep.
//! - **Order-statistic selection**: removal cutoffs and candidate winners
//!   come from nth-element selection, never a full sort.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use ilur::prelude::*;
//!
//! let a = CsrMatrix::from_triplets(&rows, &cols, &values, [n, n])?;
//! let options = DynamicIcOptions { iterations: 10, num_rm: 32, ..Default::default() };
//! let factor = dynamic_ic(&a, options)?;
//! let l = factor.to_csr();
//! ```
//!
//! ## Feature flags
//!
//! - `rayon` (default): parallel refinement phases. Without it every phase
//!   runs the same logic sequentially.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algorithm;
pub mod error;
pub mod sparse;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::algorithm::{
        dynamic_ic, dynamic_ic_with_metrics, refine_step, Candidate, DynamicIcOptions,
        RefineMetrics,
    };
    pub use crate::error::{Error, Result};
    pub use crate::sparse::{CsrMatrix, LinkedFactor};
}

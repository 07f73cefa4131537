//! Dynamic threshold-based incomplete factorization
//!
//! The engine refines a sparse triangular factor whose sparsity pattern is
//! not fixed up front: each iteration drops the least significant stored
//! entries and spends the freed storage on the most promising fill-in
//! positions, then relaxes all values toward the fixed point of the
//! factorization equations.
//!
//! # Phase pipeline
//!
//! One iteration of [`refine_step`] runs, in order:
//!
//! 1. [`sweep`]: one relaxation pass over all live values.
//! 2. [`find_candidates`]: symbolic discovery of new fill-in positions.
//! 3. [`compute_residuals`]: scoring of each candidate against the system
//!    matrix.
//! 4. [`compute_threshold`]: order statistic picking the removal cutoff.
//! 5. [`remove_below`]: unlinking of entries below the cutoff.
//! 6. [`insert_candidates`]: splicing of the top candidates into the
//!    freed slots.
//!
//! The ordering is mandatory: insertion can only use slots the removal
//! pass freed in the same iteration. The phases are exposed individually
//! for drivers that want their own outer loop; [`dynamic_ic`] wraps a
//! fixed number of iterations for the common case.

pub mod candidates;
pub mod driver;
pub(crate) mod helpers;
pub mod insert;
pub mod residuals;
pub mod sweep;
pub mod threshold;
pub mod types;

pub use candidates::find_candidates;
pub use driver::{dynamic_ic, dynamic_ic_with_metrics, refine_step};
pub use insert::insert_candidates;
pub use residuals::compute_residuals;
pub use sweep::sweep;
pub use threshold::{compute_threshold, remove_below};
pub use types::{Candidate, DynamicIcOptions, RefineMetrics};

//! Sparse matrix containers
//!
//! Two containers cooperate in a factorization session:
//!
//! - [`CsrMatrix`]: the read-only system matrix in CSR format.
//! - [`LinkedFactor`]: the evolving triangular factor, stored as per-row
//!   linked chains threaded through a fixed slot pool so that entries can be
//!   dropped and re-inserted without reallocation or compaction.

pub mod csr;
pub mod linked;

pub use csr::CsrMatrix;
pub use linked::{LinkedFactor, RowSlots, FREED, NIL};

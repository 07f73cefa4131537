//! Error types for ilur

use thiserror::Error;

/// Result type alias using ilur's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in ilur operations
#[derive(Error, Debug)]
pub enum Error {
    /// Component length mismatch when assembling a sparse matrix
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected lengths
        expected: Vec<usize>,
        /// Actual lengths
        got: Vec<usize>,
    },

    /// Operation requires a square matrix
    #[error("Expected a square matrix, got {nrows}x{ncols}")]
    NonSquareMatrix {
        /// Number of rows
        nrows: usize,
        /// Number of columns
        ncols: usize,
    },

    /// Row pointer array is not monotonically non-decreasing or out of range
    #[error("Invalid row pointer at row {row}")]
    InvalidRowPointers {
        /// The offending row
        row: usize,
    },

    /// Column index outside the matrix dimensions
    #[error("Index {index} out of bounds for dimension of size {size}")]
    IndexOutOfBounds {
        /// The invalid index
        index: usize,
        /// Size of the dimension
        size: usize,
    },

    /// Two entries share the same coordinates
    #[error("Duplicate entry at row {row}, column {col}")]
    DuplicateEntry {
        /// Row of the duplicated entry
        row: usize,
        /// Column of the duplicated entry
        col: usize,
    },

    /// A row of the factor is missing its diagonal entry
    #[error("Missing diagonal entry in row {row}")]
    MissingDiagonal {
        /// The row without a diagonal
        row: usize,
    },

    /// Row entries are not sorted by strictly increasing column
    #[error("Columns of row {row} are not strictly increasing")]
    UnsortedRow {
        /// The offending row
        row: usize,
    },

    /// The linked structure of the factor is inconsistent
    #[error("Corrupt row chain at row {row}, slot {slot}: {reason}")]
    CorruptLink {
        /// Row whose chain is inconsistent
        row: usize,
        /// Slot at which the inconsistency was detected
        slot: usize,
        /// What was violated
        reason: &'static str,
    },
}

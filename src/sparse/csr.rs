//! CSR (Compressed Sparse Row) container for the system matrix
//!
//! The system matrix is read-only throughout a factorization session; this
//! container validates its structure once on construction and then hands out
//! slices for the row-scan lookups the refinement phases perform.

use num_complex::Complex64;
use num_traits::Zero;

use crate::error::{Error, Result};

/// Sparse matrix in CSR format with complex double values
///
/// Index arrays use `i64` entries; use sites cast to `usize` when indexing.
#[derive(Debug, Clone)]
pub struct CsrMatrix {
    row_ptrs: Vec<i64>,
    col_indices: Vec<i64>,
    values: Vec<Complex64>,
    shape: [usize; 2],
}

impl CsrMatrix {
    /// Create a new CSR matrix from components
    ///
    /// # Arguments
    ///
    /// * `row_ptrs` - Row pointers (length: nrows + 1)
    /// * `col_indices` - Column indices for each non-zero
    /// * `values` - Values at each position
    /// * `shape` - Matrix shape [nrows, ncols]
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `row_ptrs` length != nrows + 1
    /// - `col_indices` and `values` have different lengths
    /// - row pointers are not monotone or do not span `values`
    /// - a column index is outside the matrix
    pub fn new(
        row_ptrs: Vec<i64>,
        col_indices: Vec<i64>,
        values: Vec<Complex64>,
        shape: [usize; 2],
    ) -> Result<Self> {
        let [nrows, ncols] = shape;
        let nnz = values.len();

        if row_ptrs.len() != nrows + 1 {
            return Err(Error::ShapeMismatch {
                expected: vec![nrows + 1],
                got: vec![row_ptrs.len()],
            });
        }

        if col_indices.len() != nnz {
            return Err(Error::ShapeMismatch {
                expected: vec![nnz],
                got: vec![col_indices.len()],
            });
        }

        if row_ptrs[0] != 0 || row_ptrs[nrows] != nnz as i64 {
            return Err(Error::InvalidRowPointers {
                row: if row_ptrs[0] != 0 { 0 } else { nrows },
            });
        }

        for r in 0..nrows {
            if row_ptrs[r] > row_ptrs[r + 1] {
                return Err(Error::InvalidRowPointers { row: r });
            }
        }

        for &c in &col_indices {
            if c < 0 || c as usize >= ncols {
                return Err(Error::IndexOutOfBounds {
                    index: c as usize,
                    size: ncols,
                });
            }
        }

        Ok(Self {
            row_ptrs,
            col_indices,
            values,
            shape,
        })
    }

    /// Create a CSR matrix from unordered (row, col, value) triplets
    ///
    /// Triplets are sorted by row, then column. Duplicate coordinates are
    /// rejected rather than accumulated.
    ///
    /// # Errors
    ///
    /// Returns an error if component lengths disagree, a coordinate is out
    /// of bounds, or two triplets share the same coordinates.
    pub fn from_triplets(
        rows: &[usize],
        cols: &[usize],
        values: &[Complex64],
        shape: [usize; 2],
    ) -> Result<Self> {
        let [nrows, ncols] = shape;

        if rows.len() != values.len() || cols.len() != values.len() {
            return Err(Error::ShapeMismatch {
                expected: vec![values.len()],
                got: vec![rows.len(), cols.len()],
            });
        }

        for &r in rows {
            if r >= nrows {
                return Err(Error::IndexOutOfBounds {
                    index: r,
                    size: nrows,
                });
            }
        }
        for &c in cols {
            if c >= ncols {
                return Err(Error::IndexOutOfBounds {
                    index: c,
                    size: ncols,
                });
            }
        }

        let mut order: Vec<usize> = (0..values.len()).collect();
        order.sort_unstable_by_key(|&e| (rows[e], cols[e]));

        for pair in order.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if rows[a] == rows[b] && cols[a] == cols[b] {
                return Err(Error::DuplicateEntry {
                    row: rows[b],
                    col: cols[b],
                });
            }
        }

        let mut row_ptrs = vec![0i64; nrows + 1];
        let mut col_indices = Vec::with_capacity(values.len());
        let mut sorted_values = Vec::with_capacity(values.len());

        for &e in &order {
            row_ptrs[rows[e] + 1] += 1;
            col_indices.push(cols[e] as i64);
            sorted_values.push(values[e]);
        }
        for r in 0..nrows {
            row_ptrs[r + 1] += row_ptrs[r];
        }

        Ok(Self {
            row_ptrs,
            col_indices,
            values: sorted_values,
            shape,
        })
    }

    /// Assemble from components known to be consistent (internal use)
    pub(crate) fn from_parts_unchecked(
        row_ptrs: Vec<i64>,
        col_indices: Vec<i64>,
        values: Vec<Complex64>,
        shape: [usize; 2],
    ) -> Self {
        Self {
            row_ptrs,
            col_indices,
            values,
            shape,
        }
    }

    /// Number of rows
    pub fn nrows(&self) -> usize {
        self.shape[0]
    }

    /// Number of columns
    pub fn ncols(&self) -> usize {
        self.shape[1]
    }

    /// Matrix shape [nrows, ncols]
    pub fn shape(&self) -> [usize; 2] {
        self.shape
    }

    /// Number of stored entries
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Row pointers (length nrows + 1)
    pub fn row_ptrs(&self) -> &[i64] {
        &self.row_ptrs
    }

    /// Column indices for each stored entry
    pub fn col_indices(&self) -> &[i64] {
        &self.col_indices
    }

    /// Stored values
    pub fn values(&self) -> &[Complex64] {
        &self.values
    }

    /// Value at (row, col), or zero if the position is not stored
    ///
    /// Linear scan over the row, which matches the access pattern of the
    /// refinement phases: rows are short and scanned once per lookup.
    pub fn get(&self, row: usize, col: usize) -> Complex64 {
        let start = self.row_ptrs[row] as usize;
        let end = self.row_ptrs[row + 1] as usize;
        for idx in start..end {
            if self.col_indices[idx] as usize == col {
                return self.values[idx];
            }
        }
        Complex64::zero()
    }
}

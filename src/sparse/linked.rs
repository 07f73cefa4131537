//! Pool-allocated linked-list factor storage
//!
//! The evolving triangular factor lives in four parallel slot arrays
//! (`val`, `col`, `rowidx`, `next`) plus one head pointer per row. Each row
//! is a singly linked chain threaded through the shared arrays, sorted by
//! strictly increasing column. The pool is never compacted: removal marks a
//! slot as freed and insertion re-uses it in place, so slot ids stay stable
//! across the phases of one refinement iteration.
//!
//! # Slot conventions
//!
//! - Slot [`NIL`] (id 0) is reserved as the end-of-chain sentinel and never
//!   stores an entry; `next == 0` terminates a row.
//! - A freed slot has `next == -1` ([`FREED`]) and a zero value, and is not
//!   reachable from any row head.

use num_complex::Complex64;
use num_traits::Zero;

use crate::error::{Error, Result};
use crate::sparse::CsrMatrix;

/// Slot id of the reserved end-of-chain sentinel
pub const NIL: usize = 0;

/// `next` marker of a freed slot
pub const FREED: i64 = -1;

/// Sparse lower-triangular factor stored as per-row linked chains in a
/// fixed slot pool
///
/// See the [module docs](self) for the storage conventions. Structural
/// mutators ([`free_slot`](LinkedFactor::free_slot),
/// [`set_head`](LinkedFactor::set_head), [`set_next`](LinkedFactor::set_next),
/// [`splice_after`](LinkedFactor::splice_after),
/// [`place`](LinkedFactor::place)) only move links; keeping the chain
/// invariants intact across a sequence of them is the caller's job, and
/// [`validate`](LinkedFactor::validate) checks the result.
#[derive(Debug, Clone)]
pub struct LinkedFactor {
    num_rows: usize,
    val: Vec<Complex64>,
    col: Vec<i64>,
    rowidx: Vec<i64>,
    next: Vec<i64>,
    head: Vec<i64>,
}

impl LinkedFactor {
    /// Build the factor from the lower triangle of a CSR matrix
    ///
    /// Strictly-upper entries of `a` are dropped. Every row must keep its
    /// diagonal and its surviving columns must be strictly increasing.
    ///
    /// # Errors
    ///
    /// - [`Error::NonSquareMatrix`] when `a` is not square
    /// - [`Error::MissingDiagonal`] when a row has no diagonal entry
    /// - [`Error::UnsortedRow`] when a row is not sorted by column
    pub fn from_csr_lower(a: &CsrMatrix) -> Result<Self> {
        let [nrows, ncols] = a.shape();
        if nrows != ncols {
            return Err(Error::NonSquareMatrix { nrows, ncols });
        }

        let row_ptrs = a.row_ptrs();
        let col_indices = a.col_indices();

        // Count the lower triangle and validate per-row structure.
        let mut nnz_lower = 0usize;
        for r in 0..nrows {
            let start = row_ptrs[r] as usize;
            let end = row_ptrs[r + 1] as usize;
            let mut prev = -1i64;
            let mut has_diag = false;
            for idx in start..end {
                let c = col_indices[idx];
                if c as usize > r {
                    continue;
                }
                if c <= prev {
                    return Err(Error::UnsortedRow { row: r });
                }
                prev = c;
                if c as usize == r {
                    has_diag = true;
                }
                nnz_lower += 1;
            }
            if !has_diag {
                return Err(Error::MissingDiagonal { row: r });
            }
        }

        let slots = nnz_lower + 1;
        let mut factor = Self {
            num_rows: nrows,
            val: vec![Complex64::zero(); slots],
            col: vec![0; slots],
            rowidx: vec![0; slots],
            next: vec![0; slots],
            head: vec![0; nrows],
        };

        let mut s = 1usize;
        for r in 0..nrows {
            factor.head[r] = s as i64;
            let start = row_ptrs[r] as usize;
            let end = row_ptrs[r + 1] as usize;
            for idx in start..end {
                let c = col_indices[idx];
                if c as usize > r {
                    continue;
                }
                factor.val[s] = a.values()[idx];
                factor.col[s] = c;
                factor.rowidx[s] = r as i64;
                factor.next[s] = (s + 1) as i64;
                s += 1;
            }
            // Every row is non-empty (diagonal checked above).
            factor.next[s - 1] = NIL as i64;
        }

        Ok(factor)
    }

    /// Export the factor as a CSR matrix
    ///
    /// Chain traversal yields ascending columns per row, so the result is a
    /// sorted CSR containing only the live entries.
    pub fn to_csr(&self) -> CsrMatrix {
        let n = self.num_rows;
        let mut row_ptrs = Vec::with_capacity(n + 1);
        let mut col_indices = Vec::new();
        let mut values = Vec::new();

        row_ptrs.push(0i64);
        for r in 0..n {
            for s in self.row_slots(r) {
                col_indices.push(self.col[s]);
                values.push(self.val[s]);
            }
            row_ptrs.push(col_indices.len() as i64);
        }

        CsrMatrix::from_parts_unchecked(row_ptrs, col_indices, values, [n, n])
    }

    /// Number of rows
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Total number of slots in the pool, including the sentinel
    pub fn slots(&self) -> usize {
        self.val.len()
    }

    /// Number of live entries (non-sentinel slots that are not freed)
    pub fn live_nnz(&self) -> usize {
        self.next[1..].iter().filter(|&&n| n != FREED).count()
    }

    /// First live slot of `row`, or [`NIL`] for an empty row
    pub fn head(&self, row: usize) -> usize {
        self.head[row] as usize
    }

    /// Successor of `slot` in its row chain, or [`NIL`] at the end
    pub fn next_slot(&self, slot: usize) -> usize {
        debug_assert!(self.next[slot] >= 0, "walked into a freed slot");
        self.next[slot] as usize
    }

    /// Column stored at `slot`
    pub fn column(&self, slot: usize) -> usize {
        self.col[slot] as usize
    }

    /// Row stored at `slot`
    pub fn row_index(&self, slot: usize) -> usize {
        self.rowidx[slot] as usize
    }

    /// Value stored at `slot`
    pub fn value(&self, slot: usize) -> Complex64 {
        self.val[slot]
    }

    /// Overwrite the value stored at `slot`
    pub fn set_value(&mut self, slot: usize, value: Complex64) {
        self.val[slot] = value;
    }

    /// Whether `slot` is currently freed
    pub fn is_freed(&self, slot: usize) -> bool {
        self.next[slot] == FREED
    }

    /// Walk the chain of `row`, yielding slot ids in ascending column order
    pub fn row_slots(&self, row: usize) -> RowSlots<'_> {
        RowSlots {
            factor: self,
            row,
            slot: self.head(row),
        }
    }

    /// Slot of the entry at (row, col), if live
    pub fn find(&self, row: usize, col: usize) -> Option<usize> {
        self.row_slots(row).find(|&s| self.col[s] == col as i64)
    }

    /// Mark `slot` as freed: zero value, `next == -1` ([`FREED`])
    ///
    /// The caller must have unlinked the slot from its row chain (or do so
    /// next); a freed slot reachable from a head is a structural defect.
    pub fn free_slot(&mut self, slot: usize) {
        self.val[slot] = Complex64::zero();
        self.next[slot] = FREED;
    }

    /// Point the head of `row` at `slot`
    pub fn set_head(&mut self, row: usize, slot: usize) {
        self.head[row] = slot as i64;
    }

    /// Point the chain link of `slot` at `next`
    pub fn set_next(&mut self, slot: usize, next: usize) {
        self.next[slot] = next as i64;
    }

    /// Link `slot` into the chain directly after `prev`
    pub fn splice_after(&mut self, prev: usize, slot: usize) {
        self.next[slot] = self.next[prev];
        self.next[prev] = slot as i64;
    }

    /// Stamp `slot` with a coordinate and a zero value
    ///
    /// Linking the slot into the row chain is a separate step
    /// ([`set_head`](Self::set_head) or [`splice_after`](Self::splice_after)).
    pub fn place(&mut self, slot: usize, row: usize, col: usize) {
        self.rowidx[slot] = row as i64;
        self.col[slot] = col as i64;
        self.val[slot] = Complex64::zero();
    }

    /// Head pointer array
    pub(crate) fn heads(&self) -> &[i64] {
        &self.head
    }

    /// Column array over all slots
    pub(crate) fn cols(&self) -> &[i64] {
        &self.col
    }

    /// Chain link array over all slots
    pub(crate) fn nexts(&self) -> &[i64] {
        &self.next
    }

    /// Value array over all slots
    pub fn values(&self) -> &[Complex64] {
        &self.val
    }

    /// Raw slot access for the phase kernels
    pub(crate) fn cells(&mut self) -> FactorCells<'_> {
        FactorCells {
            head: self.head.as_mut_ptr(),
            col: self.col.as_mut_ptr(),
            rowidx: self.rowidx.as_mut_ptr(),
            next: self.next.as_mut_ptr(),
            val: self.val.as_mut_ptr(),
            rows: self.num_rows,
            slots: self.val.len(),
            _marker: std::marker::PhantomData,
        }
    }

    /// Check the structural invariants of the pool
    ///
    /// Verifies that every chain terminates without revisiting a slot, that
    /// slots agree with the row walked to reach them, that columns are
    /// strictly increasing and never exceed the row, that every row keeps a
    /// live diagonal, and that every unreachable slot is marked freed with a
    /// zero value.
    ///
    /// # Errors
    ///
    /// [`Error::CorruptLink`] or [`Error::MissingDiagonal`] describing the
    /// first violation found.
    pub fn validate(&self) -> Result<()> {
        let slots = self.slots();
        let mut reached = vec![false; slots];

        if self.next[NIL] != 0 {
            return Err(Error::CorruptLink {
                row: 0,
                slot: NIL,
                reason: "sentinel slot must terminate on itself",
            });
        }

        for r in 0..self.num_rows {
            let mut s = self.head[r];
            let mut prev_col = -1i64;
            let mut has_diag = false;

            while s != NIL as i64 {
                if s < 0 || s as usize >= slots {
                    return Err(Error::CorruptLink {
                        row: r,
                        slot: s.max(0) as usize,
                        reason: "link outside the slot pool",
                    });
                }
                let si = s as usize;
                if reached[si] {
                    return Err(Error::CorruptLink {
                        row: r,
                        slot: si,
                        reason: "slot reached twice",
                    });
                }
                reached[si] = true;

                if self.rowidx[si] != r as i64 {
                    return Err(Error::CorruptLink {
                        row: r,
                        slot: si,
                        reason: "slot row index disagrees with walked row",
                    });
                }
                if self.next[si] == FREED {
                    return Err(Error::CorruptLink {
                        row: r,
                        slot: si,
                        reason: "freed slot reachable from a row head",
                    });
                }
                let c = self.col[si];
                if c <= prev_col {
                    return Err(Error::CorruptLink {
                        row: r,
                        slot: si,
                        reason: "columns not strictly increasing",
                    });
                }
                if c as usize > r {
                    return Err(Error::CorruptLink {
                        row: r,
                        slot: si,
                        reason: "entry above the diagonal",
                    });
                }
                if c as usize == r {
                    has_diag = true;
                }
                prev_col = c;
                s = self.next[si];
            }

            if !has_diag {
                return Err(Error::MissingDiagonal { row: r });
            }
        }

        for (si, flag) in reached.iter().enumerate().skip(1) {
            if !flag && (self.next[si] != FREED || !self.val[si].is_zero()) {
                return Err(Error::CorruptLink {
                    row: self.rowidx[si] as usize,
                    slot: si,
                    reason: "unreachable slot not marked freed",
                });
            }
        }

        Ok(())
    }
}

/// Iterator over the live slots of one row, in chain (ascending column) order
pub struct RowSlots<'a> {
    factor: &'a LinkedFactor,
    row: usize,
    slot: usize,
}

impl Iterator for RowSlots<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.slot == NIL {
            return None;
        }
        let s = self.slot;
        debug_assert_eq!(
            self.factor.rowidx[s], self.row as i64,
            "corrupt link: slot {} does not belong to row {}",
            s, self.row
        );
        self.slot = self.factor.next_slot(s);
        Some(s)
    }
}

/// Raw pointers into the slot arrays, for the phase kernels
///
/// Constructed from an exclusive borrow of the factor, so no safe access can
/// alias it while the cells live. Every accessor is `unsafe`: the caller
/// must keep concurrent access disjoint (one thread per row for structural
/// fields, one writer per slot for values) or deliberately racy (value reads
/// during the relaxation sweep).
pub(crate) struct FactorCells<'a> {
    head: *mut i64,
    col: *mut i64,
    rowidx: *mut i64,
    next: *mut i64,
    val: *mut Complex64,
    rows: usize,
    slots: usize,
    _marker: std::marker::PhantomData<&'a mut LinkedFactor>,
}

unsafe impl Send for FactorCells<'_> {}
unsafe impl Sync for FactorCells<'_> {}

impl FactorCells<'_> {
    #[inline]
    pub(crate) unsafe fn head(&self, row: usize) -> usize {
        debug_assert!(row < self.rows);
        *self.head.add(row) as usize
    }

    #[inline]
    pub(crate) unsafe fn set_head(&self, row: usize, slot: usize) {
        debug_assert!(row < self.rows);
        *self.head.add(row) = slot as i64;
    }

    #[inline]
    pub(crate) unsafe fn col(&self, slot: usize) -> i64 {
        debug_assert!(slot < self.slots);
        *self.col.add(slot)
    }

    #[inline]
    pub(crate) unsafe fn set_col(&self, slot: usize, col: i64) {
        debug_assert!(slot < self.slots);
        *self.col.add(slot) = col;
    }

    #[inline]
    pub(crate) unsafe fn rowidx(&self, slot: usize) -> i64 {
        debug_assert!(slot < self.slots);
        *self.rowidx.add(slot)
    }

    #[inline]
    pub(crate) unsafe fn set_rowidx(&self, slot: usize, row: i64) {
        debug_assert!(slot < self.slots);
        *self.rowidx.add(slot) = row;
    }

    /// Head pointers as a slice; valid while no head is written
    #[inline]
    pub(crate) unsafe fn head_slice(&self) -> &[i64] {
        std::slice::from_raw_parts(self.head, self.rows)
    }

    /// Columns as a slice; valid while no column is written
    #[inline]
    pub(crate) unsafe fn col_slice(&self) -> &[i64] {
        std::slice::from_raw_parts(self.col, self.slots)
    }

    /// Chain links as a slice; valid while no link is written
    #[inline]
    pub(crate) unsafe fn next_slice(&self) -> &[i64] {
        std::slice::from_raw_parts(self.next, self.slots)
    }

    #[inline]
    pub(crate) unsafe fn next(&self, slot: usize) -> i64 {
        debug_assert!(slot < self.slots);
        *self.next.add(slot)
    }

    #[inline]
    pub(crate) unsafe fn set_next(&self, slot: usize, next: i64) {
        debug_assert!(slot < self.slots);
        *self.next.add(slot) = next;
    }

    #[inline]
    pub(crate) unsafe fn val(&self, slot: usize) -> Complex64 {
        debug_assert!(slot < self.slots);
        *self.val.add(slot)
    }

    #[inline]
    pub(crate) unsafe fn set_val(&self, slot: usize, value: Complex64) {
        debug_assert!(slot < self.slots);
        *self.val.add(slot) = value;
    }
}

//! Shared walk for the value-level phases
//!
//! The residual pass and the relaxation sweep both reduce two factor rows
//! against each other with the same dual merge-walk; only what they do with
//! the tail of the walk differs, so the walk lives here and reports enough
//! for both.

use num_complex::Complex64;
use num_traits::Zero;

use crate::sparse::NIL;

/// Merge-walk rows `row` and `col` of the factor, accumulating the product
/// of entries with matching columns
///
/// Value access is abstracted so callers can read either through a plain
/// slice or through the racy slot pointers of the sweep. Advances whichever
/// chain has the smaller column; terminates when either chain hits [`NIL`].
///
/// Returns `(sum, last, jold)` where `sum` is the left-to-right accumulation
/// over all matches, `last` is the product contributed by the final loop
/// iteration (zero if it did not match), and `jold` is the slot the
/// `col`-chain cursor occupied during that iteration. When `col <= row` and
/// both rows hold their diagonal, the walk always ends on the match at
/// column `col`, so `jold` lands on the slot of the diagonal entry
/// `(col, col)`.
pub(crate) fn merge_row_product<F>(
    heads: &[i64],
    cols: &[i64],
    nexts: &[i64],
    value: F,
    row: usize,
    col: usize,
) -> (Complex64, Complex64, usize)
where
    F: Fn(usize) -> Complex64,
{
    let mut i = heads[row] as usize;
    let mut j = heads[col] as usize;
    let mut sum = Complex64::zero();
    let mut last = Complex64::zero();
    let mut jold = j;

    while i != NIL && j != NIL {
        last = Complex64::zero();
        jold = j;
        let icol = cols[i];
        let jcol = cols[j];
        if icol == jcol {
            last = value(i) * value(j);
            sum += last;
            i = nexts[i] as usize;
            j = nexts[j] as usize;
        } else if icol < jcol {
            i = nexts[i] as usize;
        } else {
            j = nexts[j] as usize;
        }
    }

    (sum, last, jold)
}

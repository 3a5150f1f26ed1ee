//! Read-only matrix access traits
//!
//! These traits expose a matrix independently of how it is held: a built
//! matrix answers from its compressed layout, a parsed input file from its
//! raw entries, so callers can inspect either through the same interface.

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use super::element::Element;

/// Core sparse matrix trait for layout-agnostic access
pub trait SparseMatrix {
    /// The element type stored in this matrix
    type Element: Element;

    /// Get the stored element at the specified position
    ///
    /// Returns `None` if nothing is stored there or if the position is out
    /// of bounds. A stored entry equal to zero is still returned.
    fn get_element(&self, row: usize, col: usize) -> Option<Self::Element>;

    /// Get matrix dimensions as (rows, cols)
    fn dimensions(&self) -> (usize, usize);

    /// Get number of stored elements
    fn nnz(&self) -> usize;
}

/// Extension trait for row/column extraction (requires alloc feature)
#[cfg(feature = "alloc")]
pub trait MatrixOperations: SparseMatrix {
    /// Get all stored `(column, value)` pairs of a row, in column order
    fn get_row(&self, row_index: usize) -> Vec<(usize, Self::Element)>;

    /// Get all stored `(row, value)` pairs of a column, in row order
    fn get_col(&self, col_index: usize) -> Vec<(usize, Self::Element)>;
}

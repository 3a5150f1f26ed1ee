//! Sparse matrix with synchronised CRS and CCS views
//!
//! A [`Matrix`] keeps the same nonzero set in compressed row storage and in
//! compressed column storage. Both views share one capacity. Ingestion
//! counting-sorts triples into both views in two passes over the input.

use hashbrown::HashSet;
use spla_core::{
    cast, check_capacity, BinaryOperator, Descriptor, Element, IndexType, MatrixOperations,
    Result, SparseMatrix, SplaError,
};
use tracing::trace;

use crate::storage::CompressedStorage;

/// Sparse `m × n` matrix over element type `T`
///
/// `I` is the type of the nonzero offsets; ingesting more nonzeroes than it
/// can represent fails with `Overflow`.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T: Element, I: IndexType = usize> {
    pub(crate) m: usize,
    pub(crate) n: usize,
    pub(crate) crs: CompressedStorage<T, I>,
    pub(crate) ccs: CompressedStorage<T, I>,
    pub(crate) cap: usize,
    pub(crate) nz: usize,
}

/// A matrix read as itself or as its transpose
pub(crate) struct View<'a, T: Element, I: IndexType> {
    /// Row-major storage of the effective matrix
    pub rows: &'a CompressedStorage<T, I>,
    /// Column-major storage of the effective matrix
    pub cols: &'a CompressedStorage<T, I>,
    pub nrows: usize,
    pub ncols: usize,
}

impl<T: Element, I: IndexType> Matrix<T, I> {
    /// Create an empty `m × n` matrix without nonzero capacity
    pub fn new(m: usize, n: usize) -> Self {
        Self {
            m,
            n,
            crs: CompressedStorage::new(m),
            ccs: CompressedStorage::new(n),
            cap: 0,
            nz: 0,
        }
    }

    /// Create an empty matrix able to hold `cap` nonzeroes
    pub fn with_capacity(m: usize, n: usize, cap: usize) -> Result<Self> {
        let mut a = Self::new(m, n);
        a.resize(cap)?;
        Ok(a)
    }

    /// Create an `m × n` matrix from unique `(row, col, value)` triples
    pub fn from_triples<It>(m: usize, n: usize, triples: It) -> Result<Self>
    where
        It: IntoIterator<Item = (usize, usize, T)>,
        It::IntoIter: Clone,
    {
        let mut a = Self::new(m, n);
        a.build_matrix_unique(triples, Descriptor::NO_DUPLICATES)?;
        Ok(a)
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.m
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.n
    }

    /// Number of stored nonzeroes
    #[inline]
    pub fn nnz(&self) -> usize {
        self.nz
    }

    /// Number of nonzero slots allocated in each view
    #[inline]
    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Compressed row storage
    pub fn crs(&self) -> &CompressedStorage<T, I> {
        &self.crs
    }

    /// Compressed column storage
    pub fn ccs(&self) -> &CompressedStorage<T, I> {
        &self.ccs
    }

    pub(crate) fn view(&self, transposed: bool) -> View<'_, T, I> {
        if transposed {
            View {
                rows: &self.ccs,
                cols: &self.crs,
                nrows: self.n,
                ncols: self.m,
            }
        } else {
            View {
                rows: &self.crs,
                cols: &self.ccs,
                nrows: self.m,
                ncols: self.n,
            }
        }
    }

    /// Grow the nonzero capacity to at least `new_cap`
    ///
    /// Current contents are discarded when the capacity grows. Fails with
    /// `Overflow` if `I` cannot address `new_cap` nonzeroes and with
    /// `OutOfMemory` if allocation fails; in both cases nothing changes.
    pub fn resize(&mut self, new_cap: usize) -> Result<()> {
        if new_cap <= self.cap {
            return Ok(());
        }
        check_capacity::<I>(new_cap)?;
        let crs = CompressedStorage::<T, I>::allocate(new_cap, "matrix CRS")?;
        let ccs = CompressedStorage::<T, I>::allocate(new_cap, "matrix CCS")?;
        self.crs.install(crs);
        self.ccs.install(ccs);
        self.cap = new_cap;
        self.nz = 0;
        Ok(())
    }

    /// Remove all nonzeroes, keeping the capacity
    pub fn clear(&mut self) {
        self.crs.clear();
        self.ccs.clear();
        self.nz = 0;
    }

    /// Ingest unique `(row, col, value)` triples
    ///
    /// The input is traversed twice: once to count nonzeroes per row and
    /// column, once to fill both views. Each triple is written into the slot
    /// vacated by decrementing its row and column cursor, so within a row or
    /// column entries are stored in reverse arrival order.
    ///
    /// Without `no_duplicates` the counting pass also rejects a repeated
    /// coordinate with `Illegal`; with it, uniqueness is the caller's
    /// promise and is not checked.
    pub fn build_matrix_unique<It>(&mut self, triples: It, descr: Descriptor) -> Result<()>
    where
        It: IntoIterator<Item = (usize, usize, T)>,
        It::IntoIter: Clone,
    {
        let iter = triples.into_iter();

        let mut row_ends = vec![0usize; self.m + 1];
        let mut col_ends = vec![0usize; self.n + 1];
        let mut nnz = 0usize;
        let mut seen: Option<HashSet<(usize, usize)>> =
            (!descr.contains(Descriptor::NO_DUPLICATES)).then(HashSet::new);
        for (i, j, _) in iter.clone() {
            if i >= self.m || j >= self.n {
                return Err(SplaError::Mismatch);
            }
            if let Some(seen) = seen.as_mut() {
                if !seen.insert((i, j)) {
                    trace!(i, j, "duplicate coordinate");
                    return Err(SplaError::Illegal);
                }
            }
            row_ends[i] += 1;
            col_ends[j] += 1;
            nnz += 1;
        }

        check_capacity::<I>(nnz)?;
        self.resize(nnz)?;

        for k in 1..=self.m {
            row_ends[k] += row_ends[k - 1];
        }
        for k in 1..=self.n {
            col_ends[k] += col_ends[k - 1];
        }

        for (i, j, v) in iter {
            row_ends[i] -= 1;
            let slot = row_ends[i];
            self.crs.indices[slot] = j;
            self.crs.values[slot] = v;

            col_ends[j] -= 1;
            let slot = col_ends[j];
            self.ccs.indices[slot] = i;
            self.ccs.values[slot] = v;
        }

        self.crs.set_offsets(&row_ends);
        self.ccs.set_offsets(&col_ends);
        self.nz = nnz;
        trace!(nrows = self.m, ncols = self.n, nnz, "ingested matrix");
        Ok(())
    }

    /// Ingest triples that may repeat coordinates
    ///
    /// Values sharing a coordinate are folded left to right with `dup_op`.
    /// Under `no_duplicates` the input is handed straight to
    /// [`Matrix::build_matrix_unique`].
    pub fn build_matrix<It, Op>(&mut self, triples: It, dup_op: &Op, descr: Descriptor) -> Result<()>
    where
        It: IntoIterator<Item = (usize, usize, T)>,
        It::IntoIter: Clone,
        Op: BinaryOperator,
    {
        if descr.contains(Descriptor::NO_DUPLICATES) {
            return self.build_matrix_unique(triples, descr);
        }

        let mut sorted: Vec<(usize, usize, T)> = triples.into_iter().collect();
        if let Some(&(i, j, _)) = sorted.iter().find(|&&(i, j, _)| i >= self.m || j >= self.n) {
            trace!(i, j, "triple out of range");
            return Err(SplaError::Mismatch);
        }
        sorted.sort_by_key(|&(i, j, _)| (i, j));

        let mut unique: Vec<(usize, usize, T)> = Vec::with_capacity(sorted.len());
        for (i, j, v) in sorted {
            match unique.last_mut() {
                Some(last) if last.0 == i && last.1 == j => {
                    if !T::IS_PATTERN {
                        let folded = dup_op.apply(cast(last.2), cast(v));
                        last.2 = cast(folded);
                    }
                }
                _ => unique.push((i, j, v)),
            }
        }

        self.build_matrix_unique(unique, descr | Descriptor::NO_DUPLICATES)
    }

    /// Iterate stored `(row, col, value)` triples in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, T)> + '_ {
        (0..self.m).flat_map(move |i| self.crs.entries(i).map(move |(j, v)| (i, j, v)))
    }

    /// Value stored at `(i, j)`
    pub fn get(&self, i: usize, j: usize) -> Option<T> {
        if i >= self.m || j >= self.n {
            return None;
        }
        self.crs.get(i, j)
    }

    /// Rewrite the CCS view from the CRS view
    ///
    /// Used after value-only edits of the CRS view; rows come out ascending
    /// within each column.
    pub(crate) fn sync_ccs_from_crs(&mut self) {
        let mut cursor: Vec<usize> = (0..self.n).map(|j| self.ccs.range(j).start).collect();
        for i in 0..self.m {
            for p in self.crs.range(i) {
                let j = self.crs.indices[p];
                let slot = cursor[j];
                cursor[j] += 1;
                self.ccs.indices[slot] = i;
                self.ccs.values[slot] = self.crs.values[p];
            }
        }
    }

    /// Verify both views and their agreement
    ///
    /// Returns `Panic` if offsets, indices or the nonzero sets of the two
    /// views are inconsistent.
    pub fn check_invariants(&self) -> Result<()> {
        if self.nz > self.cap {
            return Err(SplaError::Panic);
        }
        self.crs.check_invariants(self.n, self.nz)?;
        self.ccs.check_invariants(self.m, self.nz)?;
        for (i, j, v) in self.iter() {
            match self.ccs.get(j, i) {
                Some(w) if w == v => {}
                _ => return Err(SplaError::Panic),
            }
        }
        Ok(())
    }
}

impl<T: Element, I: IndexType> SparseMatrix for Matrix<T, I> {
    type Element = T;

    fn get_element(&self, row: usize, col: usize) -> Option<T> {
        self.get(row, col)
    }

    fn dimensions(&self) -> (usize, usize) {
        (self.m, self.n)
    }

    fn nnz(&self) -> usize {
        self.nz
    }
}

impl<T: Element, I: IndexType> MatrixOperations for Matrix<T, I> {
    fn get_row(&self, row_index: usize) -> Vec<(usize, T)> {
        if row_index >= self.m {
            return Vec::new();
        }
        let mut row: Vec<_> = self.crs.entries(row_index).collect();
        row.sort_by_key(|&(j, _)| j);
        row
    }

    fn get_col(&self, col_index: usize) -> Vec<(usize, T)> {
        if col_index >= self.n {
            return Vec::new();
        }
        let mut col: Vec<_> = self.ccs.entries(col_index).collect();
        col.sort_by_key(|&(i, _)| i);
        col
    }
}

//! Sparse vector backed by a dense value array
//!
//! A [`Vector`] couples a preallocated value array with a [`Coordinates`]
//! set. Values are only defined at assigned indices; the vector is dense
//! when every index is assigned.

use spla_core::{cast, BinaryOperator, Descriptor, Element, Result, SplaError};

use crate::coordinates::Coordinates;
use crate::storage::try_zeroed_vec;

/// Sparse vector of dimension `n` over element type `T`
#[derive(Debug, Clone, PartialEq)]
pub struct Vector<T: Element> {
    pub(crate) values: Vec<T>,
    pub(crate) coords: Coordinates,
}

/// Anything whose dimension can be checked against a vector
pub trait Dimension {
    fn dimension(&self) -> usize;
}

impl<T: Element> Dimension for Vector<T> {
    fn dimension(&self) -> usize {
        self.size()
    }
}

impl<T: Element> Vector<T> {
    /// Create an empty vector of dimension `n`
    pub fn new(n: usize) -> Self {
        Self {
            values: vec![T::zeroed(); n],
            coords: Coordinates::new(n),
        }
    }

    /// Create an empty vector, reporting allocation failure
    pub fn try_new(n: usize) -> Result<Self> {
        Ok(Self {
            values: try_zeroed_vec::<T>(n, "vector values")?,
            coords: Coordinates::try_new(n)?,
        })
    }

    /// Create a dense vector holding `values`
    pub fn from_dense(values: &[T]) -> Self {
        let mut v = Self::new(values.len());
        v.values.copy_from_slice(values);
        v.coords.assign_all();
        v
    }

    /// Create a vector of dimension `n` from `(index, value)` pairs
    ///
    /// Later pairs overwrite earlier ones; indices must be below `n`.
    pub fn from_entries<It>(n: usize, entries: It) -> Result<Self>
    where
        It: IntoIterator<Item = (usize, T)>,
    {
        let mut v = Self::new(n);
        for (i, x) in entries {
            if i >= n {
                return Err(SplaError::Mismatch);
            }
            v.values[i] = x;
            v.coords.assign(i);
        }
        Ok(v)
    }

    /// Dimension
    #[inline]
    pub fn size(&self) -> usize {
        self.coords.size()
    }

    /// Number of assigned entries
    #[inline]
    pub fn nnz(&self) -> usize {
        self.coords.nonzeroes()
    }

    #[inline]
    pub fn is_dense(&self) -> bool {
        self.coords.is_dense()
    }

    /// Unassign every entry
    pub fn clear(&mut self) {
        self.coords.clear();
    }

    /// Check that `nz` entries fit
    ///
    /// The value array is preallocated, so this only validates.
    pub fn resize(&mut self, nz: usize) -> Result<()> {
        if nz > self.size() {
            return Err(SplaError::Mismatch);
        }
        Ok(())
    }

    /// Value at `i`, if assigned
    #[inline]
    pub fn get(&self, i: usize) -> Option<T> {
        if i < self.size() && self.coords.assigned(i) {
            Some(self.values[i])
        } else {
            None
        }
    }

    #[inline]
    pub fn assigned(&self, i: usize) -> bool {
        self.coords.assigned(i)
    }

    /// Iterate `(index, value)` over assigned entries in stack order
    pub fn iter(&self) -> impl Iterator<Item = (usize, T)> + '_ {
        self.coords.iter().map(move |i| (i, self.values[i]))
    }

    /// Assigned entries sorted by index
    pub fn to_sorted_entries(&self) -> Vec<(usize, T)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by_key(|&(i, _)| i);
        entries
    }

    pub fn coordinates(&self) -> &Coordinates {
        &self.coords
    }

    /// Raw value array; only assigned slots are meaningful
    pub fn raw_values(&self) -> &[T] {
        &self.values
    }

    /// Evaluate this vector as a mask at `i`
    #[inline]
    pub fn mask_at(&self, descr: Descriptor, i: usize) -> bool {
        self.coords.mask(descr, i, &self.values)
    }

    /// Whether this vector, used as a mask, is absent
    #[inline]
    pub(crate) fn is_absent_mask(&self) -> bool {
        self.size() == 0
    }

    /// Assign `x` at `i`, overwriting any previous value
    #[inline]
    pub(crate) fn put(&mut self, i: usize, x: T) {
        self.values[i] = x;
        self.coords.assign(i);
    }

    /// Fill from values given in index order
    ///
    /// Fails with `Mismatch` if the input holds more than `size()` values.
    pub fn build_vector<It>(&mut self, values: It, _descr: Descriptor) -> Result<()>
    where
        It: IntoIterator<Item = T>,
    {
        let staged: Vec<T> = values.into_iter().collect();
        if staged.len() > self.size() {
            return Err(SplaError::Mismatch);
        }
        self.coords.clear();
        for (i, x) in staged.into_iter().enumerate() {
            self.put(i, x);
        }
        Ok(())
    }

    /// Fill from `(index, value)` pairs
    ///
    /// Unless `no_duplicates` is set, a value arriving at an index already
    /// filled by this call is folded into it with `dup_op`. Fails with
    /// `Mismatch`, leaving the vector untouched, if an index is out of range.
    pub fn build_vector_unique<It, Op>(&mut self, entries: It, dup_op: &Op, descr: Descriptor) -> Result<()>
    where
        It: IntoIterator<Item = (usize, T)>,
        Op: BinaryOperator,
    {
        let staged: Vec<(usize, T)> = entries.into_iter().collect();
        if staged.iter().any(|&(i, _)| i >= self.size()) {
            return Err(SplaError::Mismatch);
        }
        self.coords.clear();
        let fold = !descr.contains(Descriptor::NO_DUPLICATES) && !T::IS_PATTERN;
        for (i, x) in staged {
            if fold && self.coords.assigned(i) {
                self.values[i] = cast(dup_op.apply(cast(self.values[i]), cast(x)));
            } else {
                self.put(i, x);
            }
        }
        Ok(())
    }

    /// Verify the coordinate set
    pub fn check_invariants(&self) -> Result<()> {
        if self.values.len() != self.coords.size() {
            return Err(SplaError::Panic);
        }
        self.coords.check_invariants()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spla_core::ops::Add;

    #[test]
    fn test_from_dense() {
        let v = Vector::from_dense(&[1.0, 2.0, 3.0]);
        assert!(v.is_dense());
        assert_eq!(v.get(1), Some(2.0));
        assert_eq!(v.get(3), None);
    }

    #[test]
    fn test_from_entries() {
        let v = Vector::from_entries(4, vec![(3, 1u32), (0, 2)]).unwrap();
        assert_eq!(v.nnz(), 2);
        assert_eq!(v.to_sorted_entries(), vec![(0, 2), (3, 1)]);
        assert_eq!(
            Vector::from_entries(2, vec![(2, 1u32)]),
            Err(SplaError::Mismatch)
        );
    }

    #[test]
    fn test_resize_checks_only() {
        let mut v = Vector::<f32>::new(3);
        assert_eq!(v.resize(3), Ok(()));
        assert_eq!(v.resize(4), Err(SplaError::Mismatch));
    }

    #[test]
    fn test_build_vector() {
        let mut v = Vector::<i32>::new(4);
        v.build_vector(vec![5, 6], Descriptor::NO_OPERATION).unwrap();
        assert_eq!(v.to_sorted_entries(), vec![(0, 5), (1, 6)]);
        assert_eq!(
            v.build_vector(vec![1, 2, 3, 4, 5], Descriptor::NO_OPERATION),
            Err(SplaError::Mismatch)
        );
        assert_eq!(v.nnz(), 2);
    }

    #[test]
    fn test_build_vector_unique_folds_duplicates() {
        let mut v = Vector::<i32>::new(4);
        let add = Add::<i32>::new();
        v.build_vector_unique(vec![(2, 1), (2, 5), (0, 3)], &add, Descriptor::NO_OPERATION)
            .unwrap();
        assert_eq!(v.to_sorted_entries(), vec![(0, 3), (2, 6)]);

        assert_eq!(
            v.build_vector_unique(vec![(9, 1)], &add, Descriptor::NO_OPERATION),
            Err(SplaError::Mismatch)
        );
        assert_eq!(v.nnz(), 2);
        v.check_invariants().unwrap();
    }

    #[test]
    fn test_mask_at() {
        let mask = Vector::from_entries(3, vec![(1, 7.0f64), (2, 0.0)]).unwrap();
        assert!(mask.mask_at(Descriptor::NO_OPERATION, 1));
        assert!(!mask.mask_at(Descriptor::NO_OPERATION, 2));
        assert!(mask.mask_at(Descriptor::STRUCTURAL, 2));
        assert!(mask.mask_at(Descriptor::STRUCTURAL_COMPLEMENT, 0));
    }
}

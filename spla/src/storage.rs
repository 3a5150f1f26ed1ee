//! Compressed row or column storage
//!
//! One [`CompressedStorage`] holds a CRS or a CCS view: `offsets` has one
//! entry per major index plus one, and `indices`/`values` list the minor
//! coordinates and values of each major slice. Pattern storage uses the
//! zero-sized element `()`, so its value array occupies no memory.

use std::ops::Range;

use spla_core::{checked_bytes, Element, IndexType, Result, SplaError};

use crate::config::report_allocation;

/// Allocate `len` zeroed elements, mapping failure to `OutOfMemory`
pub(crate) fn try_zeroed_vec<T: bytemuck::Zeroable + Clone>(len: usize, what: &str) -> Result<Vec<T>> {
    let bytes = checked_bytes::<T>(len)?;
    report_allocation(what, bytes);
    let mut v = Vec::new();
    v.try_reserve_exact(len).map_err(|_| SplaError::OutOfMemory)?;
    v.resize(len, T::zeroed());
    Ok(v)
}

/// Offsets, minor indices and values of one compressed view
#[derive(Debug, Clone, PartialEq)]
pub struct CompressedStorage<T, I = usize> {
    pub(crate) offsets: Vec<I>,
    pub(crate) indices: Vec<usize>,
    pub(crate) values: Vec<T>,
}

impl<T: Element, I: IndexType> CompressedStorage<T, I> {
    /// Create an empty view over `major` slices with no capacity
    pub fn new(major: usize) -> Self {
        Self {
            offsets: vec![I::default(); major + 1],
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Number of major slices
    #[inline]
    pub fn major(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Number of allocated nonzero slots
    #[inline]
    pub fn capacity(&self) -> usize {
        self.indices.len()
    }

    /// Stored nonzeroes according to the offsets
    #[inline]
    pub fn nnz(&self) -> usize {
        self.offsets[self.major()].to_usize()
    }

    #[inline]
    pub fn offsets(&self) -> &[I] {
        &self.offsets
    }

    #[inline]
    pub fn indices(&self) -> &[usize] {
        &self.indices[..self.nnz()]
    }

    #[inline]
    pub fn values(&self) -> &[T] {
        &self.values[..self.nnz()]
    }

    /// Slot range of major slice `k`
    #[inline]
    pub fn range(&self, k: usize) -> Range<usize> {
        self.offsets[k].to_usize()..self.offsets[k + 1].to_usize()
    }

    /// Length of major slice `k`
    #[inline]
    pub fn slice_len(&self, k: usize) -> usize {
        self.offsets[k + 1].to_usize() - self.offsets[k].to_usize()
    }

    /// Minor indices and values of major slice `k`
    #[inline]
    pub fn slice(&self, k: usize) -> (&[usize], &[T]) {
        let r = self.range(k);
        (&self.indices[r.clone()], &self.values[r])
    }

    /// Iterate `(minor, value)` pairs of major slice `k`
    pub fn entries(&self, k: usize) -> impl Iterator<Item = (usize, T)> + '_ {
        let (idx, val) = self.slice(k);
        idx.iter().copied().zip(val.iter().copied())
    }

    /// Value stored at `(k, minor)`, found by a scan of slice `k`
    pub fn get(&self, k: usize, minor: usize) -> Option<T> {
        let (idx, val) = self.slice(k);
        idx.iter().position(|&j| j == minor).map(|p| val[p])
    }

    /// Zero every offset
    pub fn clear(&mut self) {
        self.offsets.fill(I::default());
    }

    /// Allocate index and value arrays of `cap` slots
    pub(crate) fn allocate(cap: usize, what: &str) -> Result<(Vec<usize>, Vec<T>)> {
        let indices = try_zeroed_vec::<usize>(cap, what)?;
        let values = try_zeroed_vec::<T>(cap, what)?;
        Ok((indices, values))
    }

    /// Replace the index and value arrays and zero the offsets
    pub(crate) fn install(&mut self, arrays: (Vec<usize>, Vec<T>)) {
        self.indices = arrays.0;
        self.values = arrays.1;
        self.clear();
    }

    /// Install offsets from per-slice counts stored at `counts[k + 1]`
    ///
    /// `counts` is prefix-summed in place; callers have already checked the
    /// total against the index type.
    pub(crate) fn set_offsets_from_counts(&mut self, counts: &mut [usize]) {
        for k in 1..counts.len() {
            counts[k] += counts[k - 1];
        }
        for (o, &c) in self.offsets.iter_mut().zip(counts.iter()) {
            *o = I::from_usize(c);
        }
    }

    /// Install offsets given as exclusive slice starts plus the total
    pub(crate) fn set_offsets(&mut self, starts: &[usize]) {
        for (o, &c) in self.offsets.iter_mut().zip(starts) {
            *o = I::from_usize(c);
        }
    }

    /// Verify offsets are monotone, end at `nnz` and index below `minor`
    pub fn check_invariants(&self, minor: usize, nnz: usize) -> Result<()> {
        if self.offsets[0].to_usize() != 0 || self.nnz() != nnz || nnz > self.capacity() {
            return Err(SplaError::Panic);
        }
        for w in self.offsets.windows(2) {
            if w[0] > w[1] {
                return Err(SplaError::Panic);
            }
        }
        for k in 0..self.major() {
            let (idx, _) = self.slice(k);
            for (p, &j) in idx.iter().enumerate() {
                if j >= minor || idx[..p].contains(&j) {
                    return Err(SplaError::Panic);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CompressedStorage<f64, u32> {
        // [[1, 0, 2], [0, 0, 0], [0, 3, 0]]
        let mut s = CompressedStorage::<f64, u32>::new(3);
        s.install(CompressedStorage::<f64, u32>::allocate(3, "test").unwrap());
        let mut counts = vec![0, 2, 0, 1];
        s.set_offsets_from_counts(&mut counts);
        s.indices.copy_from_slice(&[0, 2, 1]);
        s.values.copy_from_slice(&[1.0, 2.0, 3.0]);
        s
    }

    #[test]
    fn test_offsets_from_counts() {
        let s = sample();
        assert_eq!(s.offsets(), &[0, 2, 2, 3]);
        assert_eq!(s.nnz(), 3);
        assert_eq!(s.slice_len(1), 0);
        s.check_invariants(3, 3).unwrap();
    }

    #[test]
    fn test_entries_and_get() {
        let s = sample();
        let row0: Vec<_> = s.entries(0).collect();
        assert_eq!(row0, vec![(0, 1.0), (2, 2.0)]);
        assert_eq!(s.get(2, 1), Some(3.0));
        assert_eq!(s.get(2, 0), None);
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut s = sample();
        s.clear();
        assert_eq!(s.nnz(), 0);
        assert_eq!(s.capacity(), 3);
        s.check_invariants(3, 0).unwrap();
    }

    #[test]
    fn test_invariant_violation() {
        let mut s = sample();
        s.indices[1] = 0;
        assert_eq!(s.check_invariants(3, 3), Err(SplaError::Panic));
    }

    #[test]
    fn test_pattern_storage() {
        let mut s = CompressedStorage::<(), usize>::new(2);
        s.install(CompressedStorage::<(), usize>::allocate(4, "test").unwrap());
        assert_eq!(s.capacity(), 4);
        assert_eq!(std::mem::size_of_val(s.values.as_slice()), 0);
    }
}

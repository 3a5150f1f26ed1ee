//! Capacity and index validation
//!
//! These functions decide between `Overflow`, `OutOfMemory` and `Mismatch`
//! before any container state is touched.

use crate::traits::IndexType;
use crate::{Result, SplaError};

/// Check that `nnz` nonzeroes fit the nonzero index type `I`
pub fn check_capacity<I: IndexType>(nnz: usize) -> Result<()> {
    if nnz > I::MAX {
        return Err(SplaError::Overflow);
    }
    Ok(())
}

/// Byte size of `count` elements of `T`, rejecting arithmetic overflow
pub const fn checked_bytes<T>(count: usize) -> Result<usize> {
    match count.checked_mul(core::mem::size_of::<T>()) {
        Some(bytes) if bytes <= isize::MAX as usize => Ok(bytes),
        _ => Err(SplaError::OutOfMemory),
    }
}

/// Check that `index` addresses a container of `size` entries
#[inline]
pub const fn check_index(index: usize, size: usize) -> Result<()> {
    if index >= size {
        return Err(SplaError::Mismatch);
    }
    Ok(())
}

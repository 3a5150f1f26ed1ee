//! Vector layer: assignment, folds, element-wise operations and reductions
//!
//! All primitives take an optional mask; a mask vector of dimension zero is
//! treated as absent, and the plain functions simply pass such an empty
//! mask to their `_masked` counterparts. Outputs are `&mut` and inputs are
//! `&`, so an output can never alias an input; in-place forms are the
//! `fold*` functions.

mod dot;
mod ewise;
mod fold;
mod lambda;
mod set;

pub use dot::{dot, dot_semiring};
pub use ewise::{
    ewise_add, ewise_add_masked, ewise_apply, ewise_apply_masked, ewise_apply_monoid,
    ewise_apply_monoid_masked, ewise_mul, ewise_mul_add, ewise_mul_add_masked, ewise_mul_masked,
    unzip, zip,
};
pub use fold::{
    foldl_into_scalar, foldl_into_scalar_masked, foldl_into_scalar_op, foldl_scalar,
    foldl_scalar_masked, foldl_scalar_monoid, foldl_scalar_monoid_masked, foldl_vector,
    foldl_vector_masked, foldl_vector_monoid, foldl_vector_monoid_masked, foldr_into_scalar,
    foldr_scalar, foldr_scalar_monoid, foldr_vector, foldr_vector_monoid,
};
pub use lambda::ewise_lambda;
pub use set::{set, set_element, set_masked_scalar, set_vector, set_vector_masked};

use spla_core::{Descriptor, Element, Result, Scalar, SplaError};

use crate::blas0::value_or_index;
use crate::vector::Vector;

/// One side of an element-wise operation: a scalar broadcast to every
/// index, or a vector
#[derive(Debug)]
pub enum Operand<'a, T: Element> {
    Scalar(T),
    Vector(&'a Vector<T>),
}

impl<T: Element> Clone for Operand<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Element> Copy for Operand<'_, T> {}

impl<'a, T: Element> Operand<'a, T> {
    /// Value at `i`; a scalar is present everywhere
    #[inline]
    pub fn get(&self, i: usize) -> Option<T> {
        match self {
            Operand::Scalar(x) => Some(*x),
            Operand::Vector(v) => v.get(i),
        }
    }

    /// Whether every index carries a value
    #[inline]
    pub fn is_dense(&self) -> bool {
        match self {
            Operand::Scalar(_) => true,
            Operand::Vector(v) => v.is_dense(),
        }
    }

    /// Check the vector dimension against `n`
    #[inline]
    pub(crate) fn check_size(&self, n: usize) -> Result<()> {
        match self {
            Operand::Vector(v) if v.size() != n => Err(SplaError::Mismatch),
            _ => Ok(()),
        }
    }

    #[inline]
    pub(crate) fn as_vector(&self) -> Option<&'a Vector<T>> {
        match self {
            Operand::Scalar(_) => None,
            Operand::Vector(v) => Some(v),
        }
    }

    /// Value at `i` lifted into `Out`, if present
    #[inline]
    pub(crate) fn read<Out: Scalar>(&self, i: usize, use_index: bool) -> Option<Out> {
        self.get(i).map(|x| value_or_index(use_index, x, i, Out::one()))
    }
}

/// Assigned value of `x` at `i` lifted into `Out`
#[inline]
pub(crate) fn read<Out: Scalar, T: Element>(x: &Vector<T>, i: usize, use_index: bool) -> Out {
    value_or_index(use_index, x.values[i], i, Out::one())
}

impl<'a, T: Element> From<&'a Vector<T>> for Operand<'a, T> {
    fn from(v: &'a Vector<T>) -> Self {
        Operand::Vector(v)
    }
}

/// An absent mask
#[inline]
pub(crate) fn no_mask() -> Vector<bool> {
    Vector::new(0)
}

/// Whether the mask admits index `i`
#[inline]
pub(crate) fn admits<M: Element>(mask: &Vector<M>, descr: Descriptor, i: usize) -> bool {
    mask.is_absent_mask() || mask.mask_at(descr, i)
}

/// Check a mask's dimension against `n`
#[inline]
pub(crate) fn check_mask<M: Element>(mask: &Vector<M>, n: usize) -> Result<()> {
    if !mask.is_absent_mask() && mask.size() != n {
        return Err(SplaError::Mismatch);
    }
    Ok(())
}

/// Under `dense`, every vector argument must be fully assigned
#[inline]
pub(crate) fn check_dense(descr: Descriptor, all_dense: impl FnOnce() -> bool) -> Result<()> {
    if descr.is_dense() && !all_dense() {
        return Err(SplaError::Illegal);
    }
    Ok(())
}

/// A mask counts as dense when it is absent or fully assigned
#[inline]
pub(crate) fn dense_mask<M: Element>(mask: &Vector<M>) -> bool {
    mask.is_absent_mask() || mask.is_dense()
}

/// Indices a masked primitive needs to visit
///
/// A present, non-inverted mask limits the candidates to its own assigned
/// indices; otherwise `fallback` is used.
pub(crate) fn candidates<M: Element>(
    mask: &Vector<M>,
    descr: Descriptor,
    fallback: impl FnOnce() -> Vec<usize>,
) -> Vec<usize> {
    if !mask.is_absent_mask() && !descr.is_inverted_mask() {
        mask.coords.stack().to_vec()
    } else {
        fallback()
    }
}

/// Unassign every entry of `x`
pub fn clear<T: Element>(x: &mut Vector<T>) -> Result<()> {
    x.clear();
    Ok(())
}

/// Dimension of `x`
pub fn size<T: Element>(x: &Vector<T>) -> usize {
    x.size()
}

/// Number of assigned entries of `x`
pub fn nnz<T: Element>(x: &Vector<T>) -> usize {
    x.nnz()
}

/// Fails with `Mismatch` if `nz` entries cannot fit in `x`
pub fn resize<T: Element>(x: &mut Vector<T>, nz: usize) -> Result<()> {
    x.resize(nz)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operand_access() {
        let v = Vector::from_entries(3, vec![(1, 2.0f64)]).unwrap();
        let a = Operand::from(&v);
        assert_eq!(a.get(1), Some(2.0));
        assert_eq!(a.get(0), None);
        assert!(!a.is_dense());
        assert_eq!(a.check_size(4), Err(SplaError::Mismatch));

        let s = Operand::<f64>::Scalar(5.0);
        assert_eq!(s.get(100), Some(5.0));
        assert!(s.is_dense());
        assert_eq!(s.check_size(4), Ok(()));
    }

    #[test]
    fn test_candidates() {
        let mask = Vector::from_entries(5, vec![(3, true), (1, true)]).unwrap();
        let c = candidates(&mask, Descriptor::NO_OPERATION, || (0..5).collect());
        assert_eq!(c, vec![3, 1]);
        let c = candidates(&mask, Descriptor::INVERT_MASK, || (0..5).collect());
        assert_eq!(c.len(), 5);
        let c = candidates(&no_mask(), Descriptor::NO_OPERATION, || vec![2]);
        assert_eq!(c, vec![2]);
    }

    #[test]
    fn test_check_dense() {
        let holes = Vector::from_entries(3, vec![(0, 1u8)]).unwrap();
        let full = Vector::from_dense(&[true, false, true]);
        assert_eq!(check_dense(Descriptor::NO_OPERATION, || holes.is_dense()), Ok(()));
        assert_eq!(check_dense(Descriptor::DENSE, || holes.is_dense()), Err(SplaError::Illegal));
        assert_eq!(check_dense(Descriptor::DENSE, || dense_mask(&full)), Ok(()));
        assert!(dense_mask(&no_mask()));
        assert!(!dense_mask(&holes));
    }

    #[test]
    fn test_vector_queries() {
        let mut v = Vector::from_dense(&[1u8, 2]);
        assert_eq!(size(&v), 2);
        assert_eq!(nnz(&v), 2);
        clear(&mut v).unwrap();
        assert_eq!(nnz(&v), 0);
        assert_eq!(resize(&mut v, 3), Err(SplaError::Mismatch));
    }
}

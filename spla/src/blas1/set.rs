//! Assignment into vectors

use rayon::prelude::*;
use spla_core::{cast, check_index, Descriptor, Element, Result, Scalar, SplaError};

use super::{admits, candidates, check_dense, check_mask, dense_mask, no_mask};
use crate::blas0::{domain_ok, ensure_no_casting};
use crate::vector::Vector;

/// Read `value` for copying into a `T` slot at index `i`
#[inline]
fn copy_value<T: Element, S: Element>(value: S, i: usize, use_index: bool) -> T {
    if use_index {
        T::from_i128(i as i128)
    } else if S::IS_PATTERN {
        T::default()
    } else {
        cast(value)
    }
}

/// Assign `val` at every index of `x`
///
/// Under `use_index` index `i` receives `i` instead.
pub fn set<T: Scalar, S: Element>(x: &mut Vector<T>, val: S, descr: Descriptor) -> Result<()> {
    ensure_no_casting(descr, domain_ok::<S, T>())?;
    let use_index = descr.contains(Descriptor::USE_INDEX);
    let val: T = cast(val);
    x.values.par_iter_mut().enumerate().for_each(|(i, slot)| {
        *slot = if use_index { T::from_index(i) } else { val };
    });
    x.coords.assign_all();
    Ok(())
}

/// Assign `val` at the indices admitted by `mask`
///
/// Previous contents of `x` are discarded.
pub fn set_masked_scalar<T: Scalar, M: Element, S: Element>(
    x: &mut Vector<T>,
    mask: &Vector<M>,
    val: S,
    descr: Descriptor,
) -> Result<()> {
    if mask.is_absent_mask() {
        return set(x, val, descr);
    }
    check_mask(mask, x.size())?;
    ensure_no_casting(descr, domain_ok::<S, T>())?;
    check_dense(descr, || dense_mask(mask))?;
    let use_index = descr.contains(Descriptor::USE_INDEX);
    let val: T = cast(val);
    let n = x.size();
    let visit = candidates(mask, descr, || (0..n).collect());
    x.clear();
    for i in visit {
        if mask.mask_at(descr, i) {
            x.put(i, if use_index { T::from_index(i) } else { val });
        }
    }
    Ok(())
}

/// Assign `val` at index `i`, overwriting any previous value
pub fn set_element<T: Element, S: Element>(x: &mut Vector<T>, val: S, i: usize, descr: Descriptor) -> Result<()> {
    check_index(i, x.size())?;
    ensure_no_casting(descr, domain_ok::<S, T>())?;
    x.put(i, copy_value(val, i, descr.contains(Descriptor::USE_INDEX)));
    Ok(())
}

/// Make `x` a copy of `y`
///
/// Copying from a pattern vector default-constructs the values.
pub fn set_vector<T: Element, S: Element>(x: &mut Vector<T>, y: &Vector<S>, descr: Descriptor) -> Result<()> {
    set_vector_masked(x, &no_mask(), y, descr)
}

/// Copy the entries of `y` admitted by `mask` into a cleared `x`
pub fn set_vector_masked<T: Element, M: Element, S: Element>(
    x: &mut Vector<T>,
    mask: &Vector<M>,
    y: &Vector<S>,
    descr: Descriptor,
) -> Result<()> {
    if x.size() != y.size() {
        return Err(SplaError::Mismatch);
    }
    check_mask(mask, x.size())?;
    ensure_no_casting(descr, domain_ok::<S, T>())?;
    check_dense(descr, || y.is_dense() && dense_mask(mask))?;
    let use_index = descr.contains(Descriptor::USE_INDEX);

    x.clear();
    if mask.is_absent_mask() {
        x.coords.copy_from(&y.coords);
        for &i in y.coords.stack() {
            x.values[i] = copy_value(y.values[i], i, use_index);
        }
        return Ok(());
    }

    // Walk whichever of the mask and the source is sparser
    let from_mask = !descr.is_inverted_mask() && mask.nnz() < y.nnz();
    let visit: &[usize] = if from_mask { mask.coords.stack() } else { y.coords.stack() };
    for &i in visit {
        if y.assigned(i) && admits(mask, descr, i) {
            x.put(i, copy_value(y.values[i], i, use_index));
        }
    }
    Ok(())
}

//! Sparse matrix–vector multiplication
//!
//! `mxv` computes `u ⊕= A·v` and `vxm` computes `u ⊕= v·A`, each with an
//! optional output mask and an optional input mask. `transpose_matrix`
//! swaps the role of `A` and `Aᵀ`, so `vxm` under it equals plain `mxv`
//! and vice versa. An algebra given as an additive monoid and a bare
//! multiplicative operator is passed as an
//! [`OperatorSemiring`](spla_core::OperatorSemiring).

mod kernel;

use kernel::Hand;

use spla_core::{Descriptor, Element, IndexType, Result, Semiring, SplaError};
use tracing::warn;

use crate::blas1::no_mask;
use crate::matrix::Matrix;
use crate::vector::Vector;

/// `u ⊕= A·v`
pub fn mxv<T, A, I, V, R>(u: &mut Vector<T>, a: &Matrix<A, I>, v: &Vector<V>, ring: &R, descr: Descriptor) -> Result<()>
where
    T: Element,
    A: Element,
    I: IndexType,
    V: Element,
    R: Semiring,
{
    mxv_masked_input(u, &no_mask(), a, v, &no_mask(), ring, descr)
}

/// `u⟨mask⟩ ⊕= A·v`
pub fn mxv_masked<T, M, A, I, V, R>(
    u: &mut Vector<T>,
    mask: &Vector<M>,
    a: &Matrix<A, I>,
    v: &Vector<V>,
    ring: &R,
    descr: Descriptor,
) -> Result<()>
where
    T: Element,
    M: Element,
    A: Element,
    I: IndexType,
    V: Element,
    R: Semiring,
{
    mxv_masked_input(u, mask, a, v, &no_mask(), ring, descr)
}

/// `u⟨mask⟩ ⊕= A·v⟨v_mask⟩`
///
/// Both masks are read under `descr`.
pub fn mxv_masked_input<T, M, A, I, V, VM, R>(
    u: &mut Vector<T>,
    mask: &Vector<M>,
    a: &Matrix<A, I>,
    v: &Vector<V>,
    v_mask: &Vector<VM>,
    ring: &R,
    descr: Descriptor,
) -> Result<()>
where
    T: Element,
    M: Element,
    A: Element,
    I: IndexType,
    V: Element,
    VM: Element,
    R: Semiring,
{
    kernel::spmv(
        u,
        mask,
        a,
        v,
        v_mask,
        ring.additive(),
        ring.multiplicative(),
        ring.one(),
        descr,
        Hand::Right,
    )
}

/// `u ⊕= v·A`
pub fn vxm<T, V, A, I, R>(u: &mut Vector<T>, v: &Vector<V>, a: &Matrix<A, I>, ring: &R, descr: Descriptor) -> Result<()>
where
    T: Element,
    V: Element,
    A: Element,
    I: IndexType,
    R: Semiring,
{
    vxm_masked_input(u, &no_mask(), v, &no_mask(), a, ring, descr)
}

/// `u⟨mask⟩ ⊕= v·A`
pub fn vxm_masked<T, M, V, A, I, R>(
    u: &mut Vector<T>,
    mask: &Vector<M>,
    v: &Vector<V>,
    a: &Matrix<A, I>,
    ring: &R,
    descr: Descriptor,
) -> Result<()>
where
    T: Element,
    M: Element,
    V: Element,
    A: Element,
    I: IndexType,
    R: Semiring,
{
    vxm_masked_input(u, mask, v, &no_mask(), a, ring, descr)
}

/// `u⟨mask⟩ ⊕= v⟨v_mask⟩·A`
pub fn vxm_masked_input<T, M, V, VM, A, I, R>(
    u: &mut Vector<T>,
    mask: &Vector<M>,
    v: &Vector<V>,
    v_mask: &Vector<VM>,
    a: &Matrix<A, I>,
    ring: &R,
    descr: Descriptor,
) -> Result<()>
where
    T: Element,
    M: Element,
    V: Element,
    VM: Element,
    A: Element,
    I: IndexType,
    R: Semiring,
{
    kernel::spmv(
        u,
        mask,
        a,
        v,
        v_mask,
        ring.additive(),
        ring.multiplicative(),
        ring.one(),
        descr,
        Hand::Left,
    )
}

/// `u ⊕= A·u`, reading the input before any output is written
///
/// The output and input are the same vector, so the call fails with
/// `Overlap` unless `safe_overlap` is set.
pub fn mxv_in_place<T, A, I, R>(u: &mut Vector<T>, a: &Matrix<A, I>, ring: &R, descr: Descriptor) -> Result<()>
where
    T: Element,
    A: Element,
    I: IndexType,
    R: Semiring,
{
    if !descr.contains(Descriptor::SAFE_OVERLAP) {
        warn!("mxv with aliased input and output requires safe_overlap");
        return Err(SplaError::Overlap);
    }
    let input = u.clone();
    mxv(u, a, &input, ring, descr)
}

/// `u ⊕= u·A`; see [`mxv_in_place`]
pub fn vxm_in_place<T, A, I, R>(u: &mut Vector<T>, a: &Matrix<A, I>, ring: &R, descr: Descriptor) -> Result<()>
where
    T: Element,
    A: Element,
    I: IndexType,
    R: Semiring,
{
    if !descr.contains(Descriptor::SAFE_OVERLAP) {
        warn!("vxm with aliased input and output requires safe_overlap");
        return Err(SplaError::Overlap);
    }
    let input = u.clone();
    vxm(u, &input, a, ring, descr)
}

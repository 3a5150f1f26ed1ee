//! Inner products over arbitrary monoid/operator pairs

use spla_core::{
    cast, same_domain, BinaryOperator, Descriptor, Element, Monoid, Result, Scalar, Semiring, SplaError,
};
use tracing::trace;

use super::{check_dense, read};
use crate::blas0::{domain_ok, ensure_no_casting};
use crate::vector::Vector;

/// `s = s ⊕ (⊕ᵢ x[i] ⊗ y[i])`
///
/// Only indices assigned in both vectors contribute. Dense inputs take a
/// blocked loop sized by `mul.blocksize()`; sparse inputs iterate the
/// vector with fewer nonzeroes.
pub fn dot<S, A, B, Add, Mul>(
    s: &mut S,
    x: &Vector<A>,
    y: &Vector<B>,
    add: &Add,
    mul: &Mul,
    descr: Descriptor,
) -> Result<()>
where
    S: Element,
    A: Element,
    B: Element,
    Add: Monoid,
    Mul: BinaryOperator,
{
    if x.size() != y.size() {
        return Err(SplaError::Mismatch);
    }
    ensure_no_casting(
        descr,
        domain_ok::<A, Mul::D1>()
            && domain_ok::<B, Mul::D2>()
            && same_domain::<Mul::D3, Add::D2>()
            && same_domain::<S, Add::D1>()
            && same_domain::<S, Add::D3>(),
    )?;
    check_dense(descr, || x.is_dense() && y.is_dense())?;
    let use_index = descr.contains(Descriptor::USE_INDEX);
    let n = x.size();
    let mut reduced = add.identity();

    if x.is_dense() && y.is_dense() {
        let bs = mul.blocksize().max(1);
        trace!(n, blocksize = bs, "dense dot");
        let mut zz: Vec<Add::D2> = vec![<Add::D2 as Scalar>::zero(); bs];
        let mut i = 0;
        while i + bs <= n {
            for (k, z) in zz.iter_mut().enumerate() {
                let a: Mul::D1 = read(x, i + k, use_index);
                let b: Mul::D2 = read(y, i + k, use_index);
                *z = cast(mul.apply(a, b));
            }
            add.foldl_array(&mut reduced, &zz);
            i += bs;
        }
        for k in i..n {
            let t = mul.apply(read(x, k, use_index), read(y, k, use_index));
            add.foldl(&mut reduced, cast(t));
        }
    } else {
        let left_shorter = x.nnz() <= y.nnz();
        let stack = if left_shorter { x.coords.stack() } else { y.coords.stack() };
        trace!(visited = stack.len(), "sparse dot");
        for &i in stack {
            if x.assigned(i) && y.assigned(i) {
                let t = mul.apply(read(x, i, use_index), read(y, i, use_index));
                add.foldl(&mut reduced, cast(t));
            }
        }
    }

    *s = cast(add.apply(cast(*s), cast(reduced)));
    Ok(())
}

/// [`dot`] under a semiring's additive monoid and multiplicative operator
pub fn dot_semiring<S, A, B, R>(s: &mut S, x: &Vector<A>, y: &Vector<B>, ring: &R, descr: Descriptor) -> Result<()>
where
    S: Element,
    A: Element,
    B: Element,
    R: Semiring,
{
    dot(s, x, y, ring.additive(), ring.multiplicative(), descr)
}

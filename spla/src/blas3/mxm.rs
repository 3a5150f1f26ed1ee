//! Sparse matrix–matrix multiplication

use spla_core::ops::RightAssign;
use spla_core::{cast, same_domain, BinaryOperator, Descriptor, Element, IndexType, Result, Scalar, Semiring, SplaError};
use tracing::debug;

use super::{assemble, Phase};
use crate::blas0::{domain_ok, ensure_no_casting, value_or_index};
use crate::matrix::Matrix;
use crate::vector::Vector;

/// Row-by-row Gustavson product `C = eff(A) · eff(B)`
///
/// `add` only needs to be an operator: the first product landing in an
/// output slot is stored as is and later ones are folded into it.
#[allow(clippy::too_many_arguments)]
fn multiply<T, I, A, IA, B, IB, Add, Mul>(
    c: &mut Matrix<T, I>,
    a: &Matrix<A, IA>,
    b: &Matrix<B, IB>,
    add: &Add,
    mul: &Mul,
    one: Mul::D3,
    descr: Descriptor,
    phase: Option<Phase>,
) -> Result<()>
where
    T: Element,
    I: IndexType,
    A: Element,
    IA: IndexType,
    B: Element,
    IB: IndexType,
    Add: BinaryOperator,
    Mul: BinaryOperator,
{
    let ea = a.view(descr.contains(Descriptor::TRANSPOSE_LEFT));
    let eb = b.view(descr.contains(Descriptor::TRANSPOSE_RIGHT));
    if c.m != ea.nrows || c.n != eb.ncols || ea.ncols != eb.nrows {
        return Err(SplaError::Mismatch);
    }
    ensure_no_casting(
        descr,
        domain_ok::<A, Mul::D1>()
            && domain_ok::<B, Mul::D2>()
            && same_domain::<Mul::D3, Add::D2>()
            && same_domain::<T, Add::D3>(),
    )?;
    debug!(
        m = ea.nrows,
        k = ea.ncols,
        n = eb.ncols,
        a_nnz = a.nnz(),
        b_nnz = b.nnz(),
        "mxm"
    );

    let one_d1: Mul::D1 = cast(one);
    let one_d2: Mul::D2 = cast(one);
    assemble::<T, I, Add::D3, _>(c, phase, |i, scratch, values, numeric| {
        for (k, a_val) in ea.rows.entries(i) {
            for (l, b_val) in eb.rows.entries(k) {
                let seen = scratch.assign(l);
                if !numeric {
                    continue;
                }
                let t = mul.apply(
                    value_or_index(false, a_val, k, one_d1),
                    value_or_index(false, b_val, l, one_d2),
                );
                values[l] = if seen {
                    add.apply(cast(values[l]), cast(t))
                } else {
                    cast(t)
                };
            }
        }
    })
}

/// `C = A·B` under `ring`
///
/// `transpose_left` and `transpose_right` replace `A` and `B` with their
/// transposes. Previous contents of `C` are discarded; its capacity grows
/// as needed.
pub fn mxm<T, I, A, IA, B, IB, R>(
    c: &mut Matrix<T, I>,
    a: &Matrix<A, IA>,
    b: &Matrix<B, IB>,
    ring: &R,
    descr: Descriptor,
) -> Result<()>
where
    T: Element,
    I: IndexType,
    A: Element,
    IA: IndexType,
    B: Element,
    IB: IndexType,
    R: Semiring,
{
    multiply(c, a, b, ring.additive(), ring.multiplicative(), ring.one(), descr, None)
}

/// Run one phase of [`mxm`]
///
/// [`Phase::Resize`] only sizes `C` for the product. [`Phase::Execute`]
/// computes it within the current capacity and fails with `Illegal`,
/// leaving `C` empty, if that capacity is too small.
pub fn mxm_phase<T, I, A, IA, B, IB, R>(
    c: &mut Matrix<T, I>,
    a: &Matrix<A, IA>,
    b: &Matrix<B, IB>,
    ring: &R,
    descr: Descriptor,
    phase: Phase,
) -> Result<()>
where
    T: Element,
    I: IndexType,
    A: Element,
    IA: IndexType,
    B: Element,
    IB: IndexType,
    R: Semiring,
{
    multiply(c, a, b, ring.additive(), ring.multiplicative(), ring.one(), descr, Some(phase))
}

/// Outer product `C[i][j] = u[i] ⊗ v[j]` over the assigned entries
pub fn outer<T, I, U, V, Mul>(
    c: &mut Matrix<T, I>,
    u: &Vector<U>,
    v: &Vector<V>,
    mul: &Mul,
    descr: Descriptor,
) -> Result<()>
where
    T: Element,
    I: IndexType,
    U: Element,
    V: Element,
    Mul: BinaryOperator,
{
    if c.m != u.size() || c.n != v.size() {
        return Err(SplaError::Mismatch);
    }
    let column: Vec<(usize, usize, U)> = u.iter().map(|(i, x)| (i, 0, x)).collect();
    let row: Vec<(usize, usize, V)> = v.iter().map(|(j, x)| (0, j, x)).collect();
    let left = Matrix::<U>::from_triples(u.size(), 1, column)?;
    let right = Matrix::<V>::from_triples(1, v.size(), row)?;
    let descr = descr.without(Descriptor::TRANSPOSE_LEFT | Descriptor::TRANSPOSE_RIGHT);
    multiply(
        c,
        &left,
        &right,
        &RightAssign::<Mul::D3>::new(),
        mul,
        <Mul::D3 as Scalar>::one(),
        descr,
        None,
    )
}

//! In-place folds and reductions
//!
//! `foldl` combines the container on the left of the operator, `foldr` on
//! the right. Operator variants need a dense container because an operator
//! has no identity to stand in for missing entries; monoid variants accept
//! sparse containers.

use rayon::prelude::*;
use spla_core::{cast, same_domain, BinaryOperator, Descriptor, Element, Monoid, Result, Scalar, SplaError};
use tracing::trace;

use super::{admits, candidates, check_dense, check_mask, dense_mask, no_mask, read};
use crate::blas0::{domain_ok, ensure_no_casting, value_or_index};
use crate::vector::Vector;

/// Which side of the operator the updated vector sits on
#[derive(Clone, Copy, PartialEq, Eq)]
enum Hand {
    Left,
    Right,
}

#[inline(always)]
fn combine<Op: BinaryOperator, T: Element>(op: &Op, x: T, y: Op::D2, hand: Hand) -> T {
    match hand {
        Hand::Left => cast(op.apply(cast(x), y)),
        Hand::Right => cast(op.apply(cast(y), cast(x))),
    }
}

fn check_domains<Op: BinaryOperator, T: Element, S: Element>(descr: Descriptor, hand: Hand) -> Result<()> {
    let ok = match hand {
        Hand::Left => domain_ok::<T, Op::D1>() && domain_ok::<S, Op::D2>(),
        Hand::Right => domain_ok::<S, Op::D1>() && domain_ok::<T, Op::D2>(),
    };
    ensure_no_casting(descr, ok && same_domain::<T, Op::D3>())
}

/// Shared body of the scalar folds
///
/// With `identity` absent the vector must be dense. Otherwise a missing
/// entry becomes `identity ⊙ val`.
fn fold_scalar<T, M, S, Op>(
    x: &mut Vector<T>,
    mask: &Vector<M>,
    val: S,
    op: &Op,
    identity: Option<Op::D3>,
    hand: Hand,
    descr: Descriptor,
) -> Result<()>
where
    T: Element,
    M: Element,
    S: Element,
    Op: BinaryOperator,
{
    check_mask(mask, x.size())?;
    check_domains::<Op, T, S>(descr, hand)?;
    check_dense(descr, || x.is_dense() && dense_mask(mask))?;
    if identity.is_none() && !x.is_dense() {
        return Err(SplaError::Illegal);
    }
    let y: Op::D2 = cast(val);

    if mask.is_absent_mask() && x.is_dense() {
        x.values.par_iter_mut().for_each(|v| *v = combine(op, *v, y, hand));
        return Ok(());
    }

    let n = x.size();
    for i in candidates(mask, descr, || (0..n).collect()) {
        if !admits(mask, descr, i) {
            continue;
        }
        if x.assigned(i) {
            x.values[i] = combine(op, x.values[i], y, hand);
        } else if let Some(id) = identity {
            x.put(i, cast(combine(op, id, y, hand)));
        }
    }
    Ok(())
}

/// `x[i] = x[i] ⊙ val` for every `i`; `x` must be dense
pub fn foldl_scalar<T, S, Op>(x: &mut Vector<T>, val: S, op: &Op, descr: Descriptor) -> Result<()>
where
    T: Element,
    S: Element,
    Op: BinaryOperator,
{
    fold_scalar(x, &no_mask(), val, op, None, Hand::Left, descr)
}

pub fn foldl_scalar_masked<T, M, S, Op>(
    x: &mut Vector<T>,
    mask: &Vector<M>,
    val: S,
    op: &Op,
    descr: Descriptor,
) -> Result<()>
where
    T: Element,
    M: Element,
    S: Element,
    Op: BinaryOperator,
{
    fold_scalar(x, mask, val, op, None, Hand::Left, descr)
}

/// `x[i] = x[i] ⊕ val`; missing entries become `val`
pub fn foldl_scalar_monoid<T, S, Op>(x: &mut Vector<T>, val: S, monoid: &Op, descr: Descriptor) -> Result<()>
where
    T: Element,
    S: Element,
    Op: Monoid,
{
    fold_scalar(x, &no_mask(), val, monoid, Some(monoid.identity()), Hand::Left, descr)
}

pub fn foldl_scalar_monoid_masked<T, M, S, Op>(
    x: &mut Vector<T>,
    mask: &Vector<M>,
    val: S,
    monoid: &Op,
    descr: Descriptor,
) -> Result<()>
where
    T: Element,
    M: Element,
    S: Element,
    Op: Monoid,
{
    fold_scalar(x, mask, val, monoid, Some(monoid.identity()), Hand::Left, descr)
}

/// `x[i] = val ⊙ x[i]`; `x` must be dense
pub fn foldr_scalar<T, S, Op>(val: S, x: &mut Vector<T>, op: &Op, descr: Descriptor) -> Result<()>
where
    T: Element,
    S: Element,
    Op: BinaryOperator,
{
    fold_scalar(x, &no_mask(), val, op, None, Hand::Right, descr)
}

/// `x[i] = val ⊕ x[i]`; missing entries become `val`
pub fn foldr_scalar_monoid<T, S, Op>(val: S, x: &mut Vector<T>, monoid: &Op, descr: Descriptor) -> Result<()>
where
    T: Element,
    S: Element,
    Op: Monoid,
{
    fold_scalar(x, &no_mask(), val, monoid, Some(monoid.identity()), Hand::Right, descr)
}

/// Shared body of the vector-into-vector folds
fn fold_vector<T, M, S, Op>(
    x: &mut Vector<T>,
    mask: &Vector<M>,
    y: &Vector<S>,
    op: &Op,
    identity: Option<Op::D3>,
    hand: Hand,
    descr: Descriptor,
) -> Result<()>
where
    T: Element,
    M: Element,
    S: Element,
    Op: BinaryOperator,
{
    if x.size() != y.size() {
        return Err(SplaError::Mismatch);
    }
    check_mask(mask, x.size())?;
    check_domains::<Op, T, S>(descr, hand)?;
    check_dense(descr, || x.is_dense() && y.is_dense() && dense_mask(mask))?;
    if identity.is_none() && !x.is_dense() {
        return Err(SplaError::Illegal);
    }
    let use_index = descr.contains(Descriptor::USE_INDEX);

    if mask.is_absent_mask() && x.is_dense() && y.is_dense() {
        trace!(n = x.size(), "dense vector fold");
        x.values.par_iter_mut().zip(y.values.par_iter()).enumerate().for_each(|(i, (v, &w))| {
            let w: Op::D2 = value_or_index(use_index, w, i, <Op::D2 as Scalar>::one());
            *v = combine(op, *v, w, hand);
        });
        return Ok(());
    }

    // Dense x meets only y's nonzeroes; a sparse x additionally gains them
    trace!(x_nnz = x.nnz(), y_nnz = y.nnz(), "sparse vector fold");
    for &i in y.coords.stack() {
        if !admits(mask, descr, i) {
            continue;
        }
        let w: Op::D2 = read(y, i, use_index);
        if x.assigned(i) {
            x.values[i] = combine(op, x.values[i], w, hand);
        } else if let Some(id) = identity {
            x.put(i, cast(combine(op, id, w, hand)));
        }
    }
    Ok(())
}

/// `x[i] = x[i] ⊙ y[i]` where `y` is assigned; `x` must be dense
pub fn foldl_vector<T, S, Op>(x: &mut Vector<T>, y: &Vector<S>, op: &Op, descr: Descriptor) -> Result<()>
where
    T: Element,
    S: Element,
    Op: BinaryOperator,
{
    fold_vector(x, &no_mask(), y, op, None, Hand::Left, descr)
}

pub fn foldl_vector_masked<T, M, S, Op>(
    x: &mut Vector<T>,
    mask: &Vector<M>,
    y: &Vector<S>,
    op: &Op,
    descr: Descriptor,
) -> Result<()>
where
    T: Element,
    M: Element,
    S: Element,
    Op: BinaryOperator,
{
    fold_vector(x, mask, y, op, None, Hand::Left, descr)
}

/// `x[i] = x[i] ⊕ y[i]`; indices only `y` holds become assigned in `x`
pub fn foldl_vector_monoid<T, S, Op>(x: &mut Vector<T>, y: &Vector<S>, monoid: &Op, descr: Descriptor) -> Result<()>
where
    T: Element,
    S: Element,
    Op: Monoid,
{
    fold_vector(x, &no_mask(), y, monoid, Some(monoid.identity()), Hand::Left, descr)
}

pub fn foldl_vector_monoid_masked<T, M, S, Op>(
    x: &mut Vector<T>,
    mask: &Vector<M>,
    y: &Vector<S>,
    monoid: &Op,
    descr: Descriptor,
) -> Result<()>
where
    T: Element,
    M: Element,
    S: Element,
    Op: Monoid,
{
    fold_vector(x, mask, y, monoid, Some(monoid.identity()), Hand::Left, descr)
}

/// `x[i] = y[i] ⊙ x[i]` where `y` is assigned; `x` must be dense
pub fn foldr_vector<T, S, Op>(y: &Vector<S>, x: &mut Vector<T>, op: &Op, descr: Descriptor) -> Result<()>
where
    T: Element,
    S: Element,
    Op: BinaryOperator,
{
    fold_vector(x, &no_mask(), y, op, None, Hand::Right, descr)
}

/// `x[i] = y[i] ⊕ x[i]`; indices only `y` holds become assigned in `x`
pub fn foldr_vector_monoid<T, S, Op>(y: &Vector<S>, x: &mut Vector<T>, monoid: &Op, descr: Descriptor) -> Result<()>
where
    T: Element,
    S: Element,
    Op: Monoid,
{
    fold_vector(x, &no_mask(), y, monoid, Some(monoid.identity()), Hand::Right, descr)
}

/// `s = s ⊕ (⊕ᵢ x[i])` over the assigned entries of `x`
pub fn foldl_into_scalar<S, T, Op>(s: &mut S, x: &Vector<T>, monoid: &Op, descr: Descriptor) -> Result<()>
where
    S: Element,
    T: Element,
    Op: Monoid,
{
    foldl_into_scalar_masked(s, x, &no_mask(), monoid, descr)
}

/// Reduce the entries of `x` admitted by `mask` into `s`
pub fn foldl_into_scalar_masked<S, T, M, Op>(
    s: &mut S,
    x: &Vector<T>,
    mask: &Vector<M>,
    monoid: &Op,
    descr: Descriptor,
) -> Result<()>
where
    S: Element,
    T: Element,
    M: Element,
    Op: Monoid,
{
    check_mask(mask, x.size())?;
    ensure_no_casting(
        descr,
        domain_ok::<T, Op::D2>() && same_domain::<S, Op::D1>() && same_domain::<S, Op::D3>(),
    )?;
    check_dense(descr, || x.is_dense() && dense_mask(mask))?;
    let use_index = descr.contains(Descriptor::USE_INDEX);
    let identity = monoid.identity();

    let partial = if mask.is_absent_mask() && x.is_dense() {
        let bs = monoid.blocksize().max(1);
        x.values
            .par_chunks(bs)
            .enumerate()
            .map(|(c, chunk)| {
                let block: Vec<Op::D2> = chunk
                    .iter()
                    .enumerate()
                    .map(|(k, &v)| value_or_index(use_index, v, c * bs + k, <Op::D2 as Scalar>::one()))
                    .collect();
                let mut acc = identity;
                monoid.foldl_array(&mut acc, &block);
                acc
            })
            .reduce(|| identity, |a, b| monoid.apply(cast(a), cast(b)))
    } else {
        let visit = candidates(mask, descr, || x.coords.stack().to_vec());
        let mut acc = identity;
        for i in visit {
            if x.assigned(i) && admits(mask, descr, i) {
                monoid.foldl(&mut acc, read(x, i, use_index));
            }
        }
        acc
    };

    *s = cast(monoid.apply(cast(*s), cast(partial)));
    Ok(())
}

/// `s = s ⊙ x[0] ⊙ x[1] ⊙ …`; `x` must be dense
pub fn foldl_into_scalar_op<S, T, Op>(s: &mut S, x: &Vector<T>, op: &Op, descr: Descriptor) -> Result<()>
where
    S: Element,
    T: Element,
    Op: BinaryOperator,
{
    ensure_no_casting(
        descr,
        domain_ok::<T, Op::D2>() && same_domain::<S, Op::D1>() && same_domain::<S, Op::D3>(),
    )?;
    if !x.is_dense() {
        return Err(SplaError::Illegal);
    }
    let use_index = descr.contains(Descriptor::USE_INDEX);
    let bs = op.blocksize().max(1);
    let mut acc: Op::D3 = cast(*s);
    let mut block: Vec<Op::D2> = Vec::with_capacity(bs);
    for (c, chunk) in x.values.chunks(bs).enumerate() {
        block.clear();
        block.extend(
            chunk
                .iter()
                .enumerate()
                .map(|(k, &v)| value_or_index(use_index, v, c * bs + k, <Op::D2 as Scalar>::one())),
        );
        op.foldl_array(&mut acc, &block);
    }
    *s = cast(acc);
    Ok(())
}

/// `s = x[i₀] ⊕ (x[i₁] ⊕ (… ⊕ s))` over assigned indices in ascending order
pub fn foldr_into_scalar<S, T, Op>(x: &Vector<T>, s: &mut S, monoid: &Op, descr: Descriptor) -> Result<()>
where
    S: Element,
    T: Element,
    Op: Monoid,
{
    ensure_no_casting(
        descr,
        domain_ok::<T, Op::D1>() && same_domain::<S, Op::D2>() && same_domain::<S, Op::D3>(),
    )?;
    check_dense(descr, || x.is_dense())?;
    let use_index = descr.contains(Descriptor::USE_INDEX);
    let mut indices = x.coords.stack().to_vec();
    indices.sort_unstable();
    let mut acc: Op::D3 = cast(*s);
    for &i in indices.iter().rev() {
        monoid.foldr(read(x, i, use_index), &mut acc);
    }
    *s = cast(acc);
    Ok(())
}

//! Element-wise operations on vectors

use rayon::prelude::*;
use spla_core::{
    cast, same_domain, BinaryOperator, Descriptor, Element, Monoid, Result, Semiring, SplaError,
};
use tracing::trace;

use super::{admits, candidates, check_dense, check_mask, dense_mask, no_mask, Operand};
use crate::blas0::{domain_ok, ensure_no_casting};
use crate::coordinates::Coordinates;
use crate::vector::Vector;

/// Indices where at least one operand is present
///
/// A scalar operand is present everywhere.
fn union_of<A: Element, B: Element>(n: usize, x: &Operand<'_, A>, y: &Operand<'_, B>) -> Vec<usize> {
    match (x.as_vector(), y.as_vector()) {
        (Some(x), Some(y)) => {
            let mut seen = Coordinates::new(n);
            for &i in x.coords.stack().iter().chain(y.coords.stack()) {
                seen.assign(i);
            }
            seen.stack().to_vec()
        }
        _ => (0..n).collect(),
    }
}

/// Indices that may hold both operands: the stack of the sparser vector
fn intersection_candidates<A: Element, B: Element>(n: usize, x: &Operand<'_, A>, y: &Operand<'_, B>) -> Vec<usize> {
    match (x.as_vector(), y.as_vector()) {
        (Some(x), Some(y)) if x.nnz() <= y.nnz() => x.coords.stack().to_vec(),
        (_, Some(y)) => y.coords.stack().to_vec(),
        (Some(x), None) => x.coords.stack().to_vec(),
        (None, None) => (0..n).collect(),
    }
}

fn check_operands<T: Element, M: Element, A: Element, B: Element>(
    z: &Vector<T>,
    mask: &Vector<M>,
    x: &Operand<'_, A>,
    y: &Operand<'_, B>,
) -> Result<usize> {
    let n = z.size();
    x.check_size(n)?;
    y.check_size(n)?;
    check_mask(mask, n)?;
    Ok(n)
}

/// `z[i] = x[i] ⊙ y[i]` at every index
///
/// Both operands must be dense. `z` is overwritten.
pub fn ewise_apply<T, A, B, Op>(
    z: &mut Vector<T>,
    x: Operand<'_, A>,
    y: Operand<'_, B>,
    op: &Op,
    descr: Descriptor,
) -> Result<()>
where
    T: Element,
    A: Element,
    B: Element,
    Op: BinaryOperator,
{
    ewise_apply_masked(z, &no_mask(), x, y, op, descr)
}

pub fn ewise_apply_masked<T, M, A, B, Op>(
    z: &mut Vector<T>,
    mask: &Vector<M>,
    x: Operand<'_, A>,
    y: Operand<'_, B>,
    op: &Op,
    descr: Descriptor,
) -> Result<()>
where
    T: Element,
    M: Element,
    A: Element,
    B: Element,
    Op: BinaryOperator,
{
    let n = check_operands(z, mask, &x, &y)?;
    ensure_no_casting(
        descr,
        domain_ok::<A, Op::D1>() && domain_ok::<B, Op::D2>() && same_domain::<T, Op::D3>(),
    )?;
    check_dense(descr, || z.is_dense() && dense_mask(mask))?;
    if !x.is_dense() || !y.is_dense() {
        return Err(SplaError::Illegal);
    }
    let use_index = descr.contains(Descriptor::USE_INDEX);

    if mask.is_absent_mask() {
        z.values.par_iter_mut().enumerate().for_each(|(i, slot)| {
            if let (Some(a), Some(b)) = (x.read(i, use_index), y.read(i, use_index)) {
                *slot = cast(op.apply(a, b));
            }
        });
        z.coords.assign_all();
        return Ok(());
    }

    z.clear();
    for i in candidates(mask, descr, || (0..n).collect()) {
        if !admits(mask, descr, i) {
            continue;
        }
        if let (Some(a), Some(b)) = (x.read(i, use_index), y.read(i, use_index)) {
            z.put(i, cast(op.apply(a, b)));
        }
    }
    Ok(())
}

/// `z[i] = x[i] ⊕ y[i]` over the union of the operands' indices
///
/// A missing operand reads as the monoid identity. `z` is overwritten.
pub fn ewise_apply_monoid<T, A, B, Op>(
    z: &mut Vector<T>,
    x: Operand<'_, A>,
    y: Operand<'_, B>,
    monoid: &Op,
    descr: Descriptor,
) -> Result<()>
where
    T: Element,
    A: Element,
    B: Element,
    Op: Monoid,
{
    ewise_apply_monoid_masked(z, &no_mask(), x, y, monoid, descr)
}

pub fn ewise_apply_monoid_masked<T, M, A, B, Op>(
    z: &mut Vector<T>,
    mask: &Vector<M>,
    x: Operand<'_, A>,
    y: Operand<'_, B>,
    monoid: &Op,
    descr: Descriptor,
) -> Result<()>
where
    T: Element,
    M: Element,
    A: Element,
    B: Element,
    Op: Monoid,
{
    let n = check_operands(z, mask, &x, &y)?;
    ensure_no_casting(
        descr,
        domain_ok::<A, Op::D1>() && domain_ok::<B, Op::D2>() && same_domain::<T, Op::D3>(),
    )?;
    check_dense(descr, || z.is_dense() && x.is_dense() && y.is_dense() && dense_mask(mask))?;
    let use_index = descr.contains(Descriptor::USE_INDEX);
    let identity = monoid.identity();

    let visit = candidates(mask, descr, || union_of(n, &x, &y));
    trace!(visited = visit.len(), "monoid ewise apply");
    z.clear();
    for i in visit {
        if !admits(mask, descr, i) {
            continue;
        }
        let out = match (x.read::<Op::D1>(i, use_index), y.read::<Op::D2>(i, use_index)) {
            (Some(a), Some(b)) => monoid.apply(a, b),
            (Some(a), None) => monoid.apply(a, cast(identity)),
            (None, Some(b)) => monoid.apply(cast(identity), b),
            (None, None) => continue,
        };
        z.put(i, cast(out));
    }
    Ok(())
}

/// `z = x ⊕ y` under the semiring's additive monoid
pub fn ewise_add<T, A, B, R>(z: &mut Vector<T>, x: Operand<'_, A>, y: Operand<'_, B>, ring: &R, descr: Descriptor) -> Result<()>
where
    T: Element,
    A: Element,
    B: Element,
    R: Semiring,
{
    ewise_apply_monoid(z, x, y, ring.additive(), descr)
}

pub fn ewise_add_masked<T, M, A, B, R>(
    z: &mut Vector<T>,
    mask: &Vector<M>,
    x: Operand<'_, A>,
    y: Operand<'_, B>,
    ring: &R,
    descr: Descriptor,
) -> Result<()>
where
    T: Element,
    M: Element,
    A: Element,
    B: Element,
    R: Semiring,
{
    ewise_apply_monoid_masked(z, mask, x, y, ring.additive(), descr)
}

/// `z = x ⊗ y` on the intersection of the operands' indices
///
/// Entries of `z` the mask admits but the intersection misses are set to
/// the additive identity; other entries of `z` are left alone.
pub fn ewise_mul<T, A, B, R>(z: &mut Vector<T>, x: Operand<'_, A>, y: Operand<'_, B>, ring: &R, descr: Descriptor) -> Result<()>
where
    T: Element,
    A: Element,
    B: Element,
    R: Semiring,
{
    ewise_mul_masked(z, &no_mask(), x, y, ring, descr)
}

pub fn ewise_mul_masked<T, M, A, B, R>(
    z: &mut Vector<T>,
    mask: &Vector<M>,
    x: Operand<'_, A>,
    y: Operand<'_, B>,
    ring: &R,
    descr: Descriptor,
) -> Result<()>
where
    T: Element,
    M: Element,
    A: Element,
    B: Element,
    R: Semiring,
{
    let n = check_operands(z, mask, &x, &y)?;
    let mul = ring.multiplicative();
    ensure_no_casting(
        descr,
        domain_ok::<A, <R::Mul as BinaryOperator>::D1>()
            && domain_ok::<B, <R::Mul as BinaryOperator>::D2>()
            && same_domain::<T, <R::Mul as BinaryOperator>::D3>(),
    )?;
    check_dense(descr, || z.is_dense() && x.is_dense() && y.is_dense() && dense_mask(mask))?;
    let use_index = descr.contains(Descriptor::USE_INDEX);

    let mut products: Vec<(usize, T)> = Vec::new();
    for i in candidates(mask, descr, || intersection_candidates(n, &x, &y)) {
        if !admits(mask, descr, i) {
            continue;
        }
        if let (Some(a), Some(b)) = (x.read(i, use_index), y.read(i, use_index)) {
            products.push((i, cast(mul.apply(a, b))));
        }
    }

    let zero: T = cast(ring.zero());
    let Vector { values, coords } = &mut *z;
    for &i in coords.stack() {
        if admits(mask, descr, i) {
            values[i] = zero;
        }
    }
    for (i, v) in products {
        z.put(i, v);
    }
    Ok(())
}

/// `z = z ⊕ ((a ⊗ x) ⊕ y)`
///
/// Computed on `(a ∩ x) ∪ y`; entries of `z` outside that set are
/// untouched, and an unassigned `z` entry takes the new term as is.
pub fn ewise_mul_add<T, A, X, Y, R>(
    z: &mut Vector<T>,
    a: Operand<'_, A>,
    x: Operand<'_, X>,
    y: Operand<'_, Y>,
    ring: &R,
    descr: Descriptor,
) -> Result<()>
where
    T: Element,
    A: Element,
    X: Element,
    Y: Element,
    R: Semiring,
{
    ewise_mul_add_masked(z, &no_mask(), a, x, y, ring, descr)
}

pub fn ewise_mul_add_masked<T, M, A, X, Y, R>(
    z: &mut Vector<T>,
    mask: &Vector<M>,
    a: Operand<'_, A>,
    x: Operand<'_, X>,
    y: Operand<'_, Y>,
    ring: &R,
    descr: Descriptor,
) -> Result<()>
where
    T: Element,
    M: Element,
    A: Element,
    X: Element,
    Y: Element,
    R: Semiring,
{
    let n = z.size();
    a.check_size(n)?;
    x.check_size(n)?;
    y.check_size(n)?;
    check_mask(mask, n)?;
    let add = ring.additive();
    let mul = ring.multiplicative();
    ensure_no_casting(
        descr,
        domain_ok::<A, <R::Mul as BinaryOperator>::D1>()
            && domain_ok::<X, <R::Mul as BinaryOperator>::D2>()
            && domain_ok::<Y, <R::Add as BinaryOperator>::D2>()
            && same_domain::<T, <R::Add as BinaryOperator>::D3>(),
    )?;
    check_dense(descr, || {
        z.is_dense() && a.is_dense() && x.is_dense() && y.is_dense() && dense_mask(mask)
    })?;
    let use_index = descr.contains(Descriptor::USE_INDEX);

    let term = |i: usize| {
        let product = match (a.read(i, use_index), x.read(i, use_index)) {
            (Some(p), Some(q)) => Some(mul.apply(p, q)),
            _ => None,
        };
        match (product, y.read(i, use_index)) {
            (Some(p), Some(q)) => Some(add.apply(cast(p), q)),
            (Some(p), None) => Some(cast(p)),
            (None, Some(q)) => Some(add.apply(cast(add.identity()), q)),
            (None, None) => None,
        }
    };

    if mask.is_absent_mask() && a.is_dense() && x.is_dense() && y.is_dense() && z.is_dense() {
        trace!(n, "dense fused multiply-add");
        z.values.par_iter_mut().enumerate().for_each(|(i, slot)| {
            if let Some(t) = term(i) {
                *slot = cast(add.apply(cast(*slot), cast(t)));
            }
        });
        return Ok(());
    }

    let visit = candidates(mask, descr, || {
        let mut seen = Coordinates::new(n);
        for i in intersection_candidates(n, &a, &x) {
            seen.assign(i);
        }
        match y.as_vector() {
            Some(y) => {
                for &i in y.coords.stack() {
                    seen.assign(i);
                }
            }
            None => seen.assign_all(),
        }
        seen.stack().to_vec()
    });
    for i in visit {
        if !admits(mask, descr, i) {
            continue;
        }
        if let Some(t) = term(i) {
            if z.assigned(i) {
                z.values[i] = cast(add.apply(cast(z.values[i]), cast(t)));
            } else {
                z.put(i, cast(t));
            }
        }
    }
    Ok(())
}

/// Pack `x` and `y` into a vector of pairs
///
/// Both inputs must share one index set; differing nonzero counts or
/// structures are `Illegal`.
pub fn zip<A: Element, B: Element>(
    z: &mut Vector<(A, B)>,
    x: &Vector<A>,
    y: &Vector<B>,
    descr: Descriptor,
) -> Result<()> {
    if z.size() != x.size() || x.size() != y.size() {
        return Err(SplaError::Mismatch);
    }
    check_dense(descr, || x.is_dense() && y.is_dense())?;
    if x.nnz() != y.nnz() || x.coords.stack().iter().any(|&i| !y.assigned(i)) {
        return Err(SplaError::Illegal);
    }
    z.clear();
    for &i in x.coords.stack() {
        z.put(i, (x.values[i], y.values[i]));
    }
    Ok(())
}

/// Split a vector of pairs into its two components
pub fn unzip<A: Element, B: Element>(
    x: &mut Vector<A>,
    y: &mut Vector<B>,
    z: &Vector<(A, B)>,
    descr: Descriptor,
) -> Result<()> {
    if z.size() != x.size() || x.size() != y.size() {
        return Err(SplaError::Mismatch);
    }
    check_dense(descr, || z.is_dense())?;
    x.clear();
    y.clear();
    for &i in z.coords.stack() {
        let (a, b) = z.values[i];
        x.put(i, a);
        y.put(i, b);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use spla_core::ops::{self, Add, Min, Subtract};

    fn v(n: usize, entries: &[(usize, f64)]) -> Vector<f64> {
        Vector::from_entries(n, entries.iter().copied()).unwrap()
    }

    #[test]
    fn test_ewise_apply_dense_only() {
        let x = Vector::from_dense(&[5.0f64, 6.0]);
        let y = v(2, &[(0, 1.0)]);
        let mut z = Vector::<f64>::new(2);
        let sub = Subtract::<f64>::new();
        assert_eq!(
            ewise_apply(&mut z, (&x).into(), (&y).into(), &sub, Descriptor::NO_OPERATION),
            Err(SplaError::Illegal)
        );
        ewise_apply(&mut z, (&x).into(), Operand::Scalar(1.0f64), &sub, Descriptor::NO_OPERATION).unwrap();
        assert_eq!(z.raw_values(), &[4.0, 5.0]);
        assert!(z.is_dense());
    }

    #[test]
    fn test_ewise_apply_masked() {
        let x = Vector::from_dense(&[1.0f64, 2.0, 3.0]);
        let mask = Vector::from_entries(3, vec![(1, true)]).unwrap();
        let mut z = Vector::from_dense(&[9.0f64; 3]);
        let add = Add::<f64>::new();
        ewise_apply_masked(&mut z, &mask, (&x).into(), (&x).into(), &add, Descriptor::NO_OPERATION).unwrap();
        assert_eq!(z.to_sorted_entries(), vec![(1, 4.0)]);
    }

    #[test]
    fn test_ewise_add_union() {
        let x = v(4, &[(0, 1.0), (2, 3.0)]);
        let y = v(4, &[(2, 4.0), (3, 5.0)]);
        let mut z = v(4, &[(1, 100.0)]);
        ewise_add(&mut z, (&x).into(), (&y).into(), &ops::plus_times::<f64>(), Descriptor::NO_OPERATION).unwrap();
        assert_eq!(z.to_sorted_entries(), vec![(0, 1.0), (2, 7.0), (3, 5.0)]);
    }

    #[test]
    fn test_ewise_apply_monoid_identity_fills() {
        let x = v(3, &[(0, 4.0)]);
        let y = v(3, &[(2, 1.0)]);
        let mut z = Vector::<f64>::new(3);
        ewise_apply_monoid(&mut z, (&x).into(), (&y).into(), &Min::<f64>::new(), Descriptor::NO_OPERATION)
            .unwrap();
        assert_eq!(z.to_sorted_entries(), vec![(0, 4.0), (2, 1.0)]);
    }

    #[test]
    fn test_ewise_mul_intersection() {
        let x = v(4, &[(0, 1.0), (2, 3.0), (3, 4.0)]);
        let y = v(4, &[(0, 2.0), (1, 2.0), (3, 5.0)]);
        let mut z = v(4, &[(1, 8.0), (2, 8.0)]);
        ewise_mul(&mut z, (&x).into(), (&y).into(), &ops::plus_times::<f64>(), Descriptor::NO_OPERATION).unwrap();
        assert_eq!(z.to_sorted_entries(), vec![(0, 2.0), (1, 0.0), (2, 0.0), (3, 20.0)]);
        z.check_invariants().unwrap();
    }

    #[test]
    fn test_dense_descriptor_rejects_holes() {
        let ring = ops::plus_times::<f64>();
        let x = v(3, &[(1, 2.0)]);
        let full = Vector::from_dense(&[1.0f64, 2.0, 3.0]);
        let mut z = Vector::from_dense(&[7.0f64; 3]);

        assert_eq!(
            ewise_mul(&mut z, (&x).into(), (&full).into(), &ring, Descriptor::DENSE),
            Err(SplaError::Illegal)
        );
        assert_eq!(z.raw_values(), &[7.0; 3]);
        assert_eq!(
            ewise_add(&mut z, (&full).into(), (&x).into(), &ring, Descriptor::DENSE),
            Err(SplaError::Illegal)
        );

        let mut sparse_out = Vector::<f64>::new(3);
        assert_eq!(
            ewise_mul(&mut sparse_out, (&full).into(), (&full).into(), &ring, Descriptor::DENSE),
            Err(SplaError::Illegal)
        );
        assert_eq!(sparse_out.nnz(), 0);

        ewise_mul(&mut z, (&full).into(), (&full).into(), &ring, Descriptor::DENSE).unwrap();
        assert_eq!(z.raw_values(), &[1.0, 4.0, 9.0]);
        ewise_mul_add(&mut z, Operand::Scalar(1.0f64), (&full).into(), (&full).into(), &ring, Descriptor::DENSE)
            .unwrap();
        assert_eq!(z.raw_values(), &[3.0, 8.0, 15.0]);

        let mut pairs = Vector::<(f64, f64)>::new(3);
        assert_eq!(zip(&mut pairs, &x, &x, Descriptor::DENSE), Err(SplaError::Illegal));
        zip(&mut pairs, &full, &full, Descriptor::DENSE).unwrap();
        assert_eq!(pairs.nnz(), 3);
    }

    #[test]
    fn test_ewise_mul_add() {
        let ring = ops::plus_times::<f64>();
        let x = v(4, &[(0, 2.0), (1, 3.0)]);
        let y = v(4, &[(1, 1.0), (2, 7.0)]);
        let mut z = v(4, &[(0, 10.0), (3, 50.0)]);
        ewise_mul_add(&mut z, Operand::Scalar(2.0f64), (&x).into(), (&y).into(), &ring, Descriptor::NO_OPERATION)
            .unwrap();
        // index 0: 10 + 4, index 1: 6 + 1, index 2: 7, index 3 untouched
        assert_eq!(z.to_sorted_entries(), vec![(0, 14.0), (1, 7.0), (2, 7.0), (3, 50.0)]);
    }

    #[test]
    fn test_ewise_mul_add_dense() {
        let ring = ops::plus_times::<i32>();
        let a = Vector::from_dense(&[1, 2, 3]);
        let x = Vector::from_dense(&[4, 5, 6]);
        let y = Vector::from_dense(&[1, 1, 1]);
        let mut z = Vector::from_dense(&[0, 10, 0]);
        ewise_mul_add(&mut z, (&a).into(), (&x).into(), (&y).into(), &ring, Descriptor::NO_OPERATION).unwrap();
        assert_eq!(z.raw_values(), &[5, 21, 19]);
    }

    #[test]
    fn test_zip_unzip() {
        let x = Vector::from_entries(3, vec![(0, 1u32), (2, 3)]).unwrap();
        let y = Vector::from_entries(3, vec![(2, 1.5f64), (0, 0.5)]).unwrap();
        let mut z = Vector::<(u32, f64)>::new(3);
        zip(&mut z, &x, &y, Descriptor::NO_OPERATION).unwrap();
        assert_eq!(z.get(2), Some((3, 1.5)));

        let mut a = Vector::<u32>::new(3);
        let mut b = Vector::<f64>::new(3);
        unzip(&mut a, &mut b, &z, Descriptor::NO_OPERATION).unwrap();
        assert_eq!(a.to_sorted_entries(), x.to_sorted_entries());
        assert_eq!(b.to_sorted_entries(), y.to_sorted_entries());

        let other = Vector::from_entries(3, vec![(1, 1.0f64), (0, 0.5)]).unwrap();
        assert_eq!(zip(&mut z, &x, &other, Descriptor::NO_OPERATION), Err(SplaError::Illegal));
        let short = Vector::<f64>::new(2);
        assert_eq!(zip(&mut z, &x, &short, Descriptor::NO_OPERATION), Err(SplaError::Mismatch));
    }
}

//! Element-wise combination of two matrices

use spla_core::{cast, same_domain, BinaryOperator, Descriptor, Element, IndexType, Monoid, Result, Scalar, SplaError};

use super::assemble;
use crate::blas0::{domain_ok, ensure_no_casting, value_or_index};
use crate::coordinates::Coordinates;
use crate::matrix::{Matrix, View};

fn check_shapes<T, I, A, IA, B, IB>(c: &Matrix<T, I>, ea: &View<'_, A, IA>, eb: &View<'_, B, IB>) -> Result<()>
where
    T: Element,
    I: IndexType,
    A: Element,
    IA: IndexType,
    B: Element,
    IB: IndexType,
{
    if ea.nrows != c.m || ea.ncols != c.n || eb.nrows != c.m || eb.ncols != c.n {
        return Err(SplaError::Mismatch);
    }
    Ok(())
}

fn check_domains<T, A, B, Op: BinaryOperator>(descr: Descriptor) -> Result<()>
where
    T: Element,
    A: Element,
    B: Element,
{
    ensure_no_casting(
        descr,
        domain_ok::<A, Op::D1>() && domain_ok::<B, Op::D2>() && same_domain::<T, Op::D3>(),
    )
}

/// `C = A ⊙ B` on the intersection of the two nonzero sets
///
/// `transpose_left` and `transpose_right` apply to `A` and `B`.
pub fn ewise_apply_matrix<T, I, A, IA, B, IB, Op>(
    c: &mut Matrix<T, I>,
    a: &Matrix<A, IA>,
    b: &Matrix<B, IB>,
    op: &Op,
    descr: Descriptor,
) -> Result<()>
where
    T: Element,
    I: IndexType,
    A: Element,
    IA: IndexType,
    B: Element,
    IB: IndexType,
    Op: BinaryOperator,
{
    let ea = a.view(descr.contains(Descriptor::TRANSPOSE_LEFT));
    let eb = b.view(descr.contains(Descriptor::TRANSPOSE_RIGHT));
    check_shapes(c, &ea, &eb)?;
    check_domains::<T, A, B, Op>(descr)?;

    let mut marker = Coordinates::try_new(c.n)?;
    let mut a_row: Vec<Op::D1> = vec![<Op::D1 as Default>::default(); c.n];
    assemble::<T, I, Op::D3, _>(c, None, |i, scratch, values, numeric| {
        marker.clear();
        for (j, x) in ea.rows.entries(i) {
            marker.assign(j);
            a_row[j] = value_or_index(false, x, j, <Op::D1 as Scalar>::one());
        }
        for (j, y) in eb.rows.entries(i) {
            if !marker.assigned(j) {
                continue;
            }
            scratch.assign(j);
            if numeric {
                values[j] = op.apply(a_row[j], value_or_index(false, y, j, <Op::D2 as Scalar>::one()));
            }
        }
    })
}

/// `C = A ⊙ B` on the union of the two nonzero sets
///
/// Where only one operand has an entry, the monoid identity stands in for
/// the other.
pub fn ewise_apply_matrix_monoid<T, I, A, IA, B, IB, Op>(
    c: &mut Matrix<T, I>,
    a: &Matrix<A, IA>,
    b: &Matrix<B, IB>,
    monoid: &Op,
    descr: Descriptor,
) -> Result<()>
where
    T: Element,
    I: IndexType,
    A: Element,
    IA: IndexType,
    B: Element,
    IB: IndexType,
    Op: Monoid,
{
    let ea = a.view(descr.contains(Descriptor::TRANSPOSE_LEFT));
    let eb = b.view(descr.contains(Descriptor::TRANSPOSE_RIGHT));
    check_shapes(c, &ea, &eb)?;
    check_domains::<T, A, B, Op>(descr)?;

    let id = monoid.identity();
    let mut marker = Coordinates::try_new(c.n)?;
    let mut a_row: Vec<Op::D1> = vec![<Op::D1 as Default>::default(); c.n];
    assemble::<T, I, Op::D3, _>(c, None, |i, scratch, values, numeric| {
        marker.clear();
        for (j, x) in ea.rows.entries(i) {
            marker.assign(j);
            scratch.assign(j);
            if numeric {
                a_row[j] = value_or_index(false, x, j, <Op::D1 as Scalar>::one());
                values[j] = monoid.apply(a_row[j], cast(id));
            }
        }
        for (j, y) in eb.rows.entries(i) {
            scratch.assign(j);
            if numeric {
                let left = if marker.assigned(j) { a_row[j] } else { cast(id) };
                values[j] = monoid.apply(left, value_or_index(false, y, j, <Op::D2 as Scalar>::one()));
            }
        }
    })
}

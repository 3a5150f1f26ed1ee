//! Scalar layer: domain lifting around single operator applications
//!
//! Every higher-level primitive reads container values through these
//! helpers, so that casting policy, index substitution and pattern values
//! are decided in one place.

use spla_core::{cast, same_domain, BinaryOperator, Descriptor, Element, Result, Scalar, SplaError};

/// Side of an operator an identity is applied on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// `identity ⊙ x`
    Left,
    /// `x ⊙ identity`
    Right,
}

/// Whether a value of type `S` may enter domain `D` under `no_casting`
///
/// Pattern values carry no domain and always pass.
#[inline]
pub(crate) fn domain_ok<S: Element, D: Element>() -> bool {
    S::IS_PATTERN || same_domain::<S, D>()
}

/// Fail with `Illegal` if `no_casting` is set and `matches` is false
#[inline]
pub(crate) fn ensure_no_casting(descr: Descriptor, matches: bool) -> Result<()> {
    if descr.contains(Descriptor::NO_CASTING) && !matches {
        return Err(SplaError::Illegal);
    }
    Ok(())
}

/// `out = x ⊙ y` with inputs lifted into the operator's domains
pub fn apply<Op, O, A, B>(out: &mut O, x: A, y: B, op: &Op, descr: Descriptor) -> Result<()>
where
    Op: BinaryOperator,
    O: Element,
    A: Element,
    B: Element,
{
    ensure_no_casting(
        descr,
        same_domain::<A, Op::D1>() && same_domain::<B, Op::D2>() && same_domain::<O, Op::D3>(),
    )?;
    *out = cast(op.apply(cast(x), cast(y)));
    Ok(())
}

/// `x = x ⊙ y`
pub fn foldl<Op, A, B>(x: &mut A, y: B, op: &Op, descr: Descriptor) -> Result<()>
where
    Op: BinaryOperator,
    A: Element,
    B: Element,
{
    ensure_no_casting(
        descr,
        same_domain::<A, Op::D1>() && same_domain::<B, Op::D2>() && same_domain::<A, Op::D3>(),
    )?;
    *x = cast(op.apply(cast(*x), cast(y)));
    Ok(())
}

/// `y = x ⊙ y`
pub fn foldr<Op, A, B>(x: A, y: &mut B, op: &Op, descr: Descriptor) -> Result<()>
where
    Op: BinaryOperator,
    A: Element,
    B: Element,
{
    ensure_no_casting(
        descr,
        same_domain::<A, Op::D1>() && same_domain::<B, Op::D2>() && same_domain::<B, Op::D3>(),
    )?;
    *y = cast(op.apply(cast(x), cast(*y)));
    Ok(())
}

/// Read a container value into domain `Out`
///
/// Under `use_index` the global index replaces the value; a pattern value
/// reads as `one`.
#[inline(always)]
pub fn value_or_index<Out: Scalar, In: Element>(use_index: bool, value: In, index: usize, one: Out) -> Out {
    if use_index {
        Out::from_index(index)
    } else if In::IS_PATTERN {
        one
    } else {
        cast(value)
    }
}

/// Lift `value` into `Out`
///
/// A value already in `Out`'s domain is copied. Otherwise it is combined
/// with `identity` through `op` on the given side, which lands it in the
/// operator's output domain.
#[inline(always)]
pub fn copy_or_apply_with_identity<Out, In, Op>(value: In, op: &Op, identity: Op::D3, side: Side) -> Out
where
    Out: Element,
    In: Element,
    Op: BinaryOperator,
{
    if same_domain::<In, Out>() {
        return cast(value);
    }
    let lifted = match side {
        Side::Left => op.apply(cast(identity), cast(value)),
        Side::Right => op.apply(cast(value), cast(identity)),
    };
    cast(lifted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use spla_core::ops::{Add, Equal, Min, Mul};

    #[test]
    fn test_apply_casts_domains() {
        let mut out = 0i64;
        apply(&mut out, 2.5f32, 3i32, &Add::<f64>::new(), Descriptor::NO_OPERATION).unwrap();
        assert_eq!(out, 5);
    }

    #[test]
    fn test_no_casting_rejects_mismatch() {
        let mut out = 0i64;
        assert_eq!(
            apply(&mut out, 2.5f32, 3i32, &Add::<f64>::new(), Descriptor::NO_CASTING),
            Err(SplaError::Illegal)
        );
        assert_eq!(out, 0);

        let mut out = 0.0f64;
        apply(&mut out, 2.5f64, 3.0f64, &Add::<f64>::new(), Descriptor::NO_CASTING).unwrap();
        assert_eq!(out, 5.5);
    }

    #[test]
    fn test_folds() {
        let mut x = 10.0f64;
        foldl(&mut x, 4.0f64, &Min::<f64>::new(), Descriptor::NO_OPERATION).unwrap();
        assert_eq!(x, 4.0);

        let mut y = 3i32;
        foldr(2i32, &mut y, &Mul::<i32>::new(), Descriptor::NO_OPERATION).unwrap();
        assert_eq!(y, 6);
    }

    #[test]
    fn test_value_or_index() {
        assert_eq!(value_or_index::<f64, f64>(false, 2.5, 7, 1.0), 2.5);
        assert_eq!(value_or_index::<f64, f64>(true, 2.5, 7, 1.0), 7.0);
        assert_eq!(value_or_index::<f64, ()>(false, (), 7, 0.0), 0.0);
    }

    #[test]
    fn test_copy_or_apply_with_identity() {
        let add = Add::<f64>::new();
        let same: f64 = copy_or_apply_with_identity(3.0f64, &add, 0.0, Side::Left);
        assert_eq!(same, 3.0);

        // bool output differs from the i32 input and goes through the operator
        let eq = Equal::<i32>::new();
        let lifted: bool = copy_or_apply_with_identity(4i32, &eq, true, Side::Right);
        assert!(!lifted);
    }
}

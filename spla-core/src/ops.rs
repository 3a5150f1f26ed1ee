//! Standard operators, monoids and semirings
//!
//! Every operator here is a zero-sized marker generic over its scalar
//! domain. Associative operators with a natural identity are also monoids.

use core::marker::PhantomData;

use crate::traits::{BinaryOperator, Monoid, MonoidSemiring, Scalar};

macro_rules! operator {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        pub struct $name<T>(PhantomData<fn() -> T>);

        impl<T> $name<T> {
            pub const fn new() -> Self {
                Self(PhantomData)
            }
        }

        impl<T> Default for $name<T> {
            fn default() -> Self {
                Self::new()
            }
        }

        impl<T> Clone for $name<T> {
            fn clone(&self) -> Self {
                *self
            }
        }

        impl<T> Copy for $name<T> {}

        impl<T> core::fmt::Debug for $name<T> {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}<{}>", stringify!($name), core::any::type_name::<T>())
            }
        }
    };
}

operator!(
    /// `a + b`
    Add
);
operator!(
    /// `a * b`
    Mul
);
operator!(
    /// `min(a, b)`
    Min
);
operator!(
    /// `max(a, b)`
    Max
);
operator!(
    /// `a - b`
    Subtract
);
operator!(
    /// `a / b`
    Divide
);
operator!(
    /// Returns the left operand
    LeftAssign
);
operator!(
    /// Returns the right operand
    RightAssign
);
operator!(
    /// Returns the left operand if it is nonzero, else the right one
    AnyOr
);
operator!(
    /// `a || b` over truthiness
    LogicalOr
);
operator!(
    /// `a && b` over truthiness
    LogicalAnd
);
operator!(
    /// `a == b`, yielding a boolean
    Equal
);
operator!(
    /// `|a - b|`
    AbsDiff
);

impl<T: Scalar> BinaryOperator for Add<T> {
    type D1 = T;
    type D2 = T;
    type D3 = T;
    const ASSOCIATIVE: bool = true;
    const COMMUTATIVE: bool = true;

    #[inline(always)]
    fn apply(&self, a: T, b: T) -> T {
        a.plus(b)
    }
}

impl<T: Scalar> Monoid for Add<T> {
    fn identity(&self) -> T {
        T::zero()
    }
}

impl<T: Scalar> BinaryOperator for Mul<T> {
    type D1 = T;
    type D2 = T;
    type D3 = T;
    const ASSOCIATIVE: bool = true;
    const COMMUTATIVE: bool = true;

    #[inline(always)]
    fn apply(&self, a: T, b: T) -> T {
        a.times(b)
    }
}

impl<T: Scalar> Monoid for Mul<T> {
    fn identity(&self) -> T {
        T::one()
    }
}

impl<T: Scalar> BinaryOperator for Min<T> {
    type D1 = T;
    type D2 = T;
    type D3 = T;
    const ASSOCIATIVE: bool = true;
    const COMMUTATIVE: bool = true;
    const IDEMPOTENT: bool = true;

    #[inline(always)]
    fn apply(&self, a: T, b: T) -> T {
        if b < a {
            b
        } else {
            a
        }
    }
}

impl<T: Scalar> Monoid for Min<T> {
    fn identity(&self) -> T {
        T::max_value()
    }
}

impl<T: Scalar> BinaryOperator for Max<T> {
    type D1 = T;
    type D2 = T;
    type D3 = T;
    const ASSOCIATIVE: bool = true;
    const COMMUTATIVE: bool = true;
    const IDEMPOTENT: bool = true;

    #[inline(always)]
    fn apply(&self, a: T, b: T) -> T {
        if b > a {
            b
        } else {
            a
        }
    }
}

impl<T: Scalar> Monoid for Max<T> {
    fn identity(&self) -> T {
        T::min_value()
    }
}

impl<T: Scalar> BinaryOperator for Subtract<T> {
    type D1 = T;
    type D2 = T;
    type D3 = T;

    #[inline(always)]
    fn apply(&self, a: T, b: T) -> T {
        a.minus(b)
    }
}

impl<T: Scalar> BinaryOperator for Divide<T> {
    type D1 = T;
    type D2 = T;
    type D3 = T;

    #[inline(always)]
    fn apply(&self, a: T, b: T) -> T {
        a.divide(b)
    }
}

impl<T: Scalar> BinaryOperator for LeftAssign<T> {
    type D1 = T;
    type D2 = T;
    type D3 = T;
    const ASSOCIATIVE: bool = true;
    const IDEMPOTENT: bool = true;

    #[inline(always)]
    fn apply(&self, a: T, _b: T) -> T {
        a
    }
}

impl<T: Scalar> BinaryOperator for RightAssign<T> {
    type D1 = T;
    type D2 = T;
    type D3 = T;
    const ASSOCIATIVE: bool = true;
    const IDEMPOTENT: bool = true;

    #[inline(always)]
    fn apply(&self, _a: T, b: T) -> T {
        b
    }
}

impl<T: Scalar> BinaryOperator for AnyOr<T> {
    type D1 = T;
    type D2 = T;
    type D3 = T;
    const ASSOCIATIVE: bool = true;
    const IDEMPOTENT: bool = true;
    const IMMUTABLE_NONZEROES: bool = true;

    #[inline(always)]
    fn apply(&self, a: T, b: T) -> T {
        if a.is_truthy() {
            a
        } else {
            b
        }
    }
}

impl<T: Scalar> Monoid for AnyOr<T> {
    fn identity(&self) -> T {
        T::zero()
    }
}

impl<T: Scalar> BinaryOperator for LogicalOr<T> {
    type D1 = T;
    type D2 = T;
    type D3 = T;
    const ASSOCIATIVE: bool = true;
    const COMMUTATIVE: bool = true;
    const IDEMPOTENT: bool = true;
    const IMMUTABLE_NONZEROES: bool = true;

    #[inline(always)]
    fn apply(&self, a: T, b: T) -> T {
        if a.is_truthy() || b.is_truthy() {
            T::one()
        } else {
            T::zero()
        }
    }
}

impl<T: Scalar> Monoid for LogicalOr<T> {
    fn identity(&self) -> T {
        T::zero()
    }
}

impl<T: Scalar> BinaryOperator for LogicalAnd<T> {
    type D1 = T;
    type D2 = T;
    type D3 = T;
    const ASSOCIATIVE: bool = true;
    const COMMUTATIVE: bool = true;
    const IDEMPOTENT: bool = true;

    #[inline(always)]
    fn apply(&self, a: T, b: T) -> T {
        if a.is_truthy() && b.is_truthy() {
            T::one()
        } else {
            T::zero()
        }
    }
}

impl<T: Scalar> Monoid for LogicalAnd<T> {
    fn identity(&self) -> T {
        T::one()
    }
}

impl<T: Scalar> BinaryOperator for Equal<T> {
    type D1 = T;
    type D2 = T;
    type D3 = bool;
    const COMMUTATIVE: bool = true;

    #[inline(always)]
    fn apply(&self, a: T, b: T) -> bool {
        a == b
    }
}

impl<T: Scalar> BinaryOperator for AbsDiff<T> {
    type D1 = T;
    type D2 = T;
    type D3 = T;
    const COMMUTATIVE: bool = true;

    #[inline(always)]
    fn apply(&self, a: T, b: T) -> T {
        a.abs_diff(b)
    }
}

/// `(+, 0, ×, 1)`
pub fn plus_times<T: Scalar>() -> MonoidSemiring<Add<T>, Mul<T>> {
    MonoidSemiring::new(Add::new(), Mul::new())
}

/// Tropical `(min, +∞, +, 0)`
pub fn min_plus<T: Scalar>() -> MonoidSemiring<Min<T>, Add<T>> {
    MonoidSemiring::new(Min::new(), Add::new())
}

/// `(max, −∞, +, 0)`
pub fn max_plus<T: Scalar>() -> MonoidSemiring<Max<T>, Add<T>> {
    MonoidSemiring::new(Max::new(), Add::new())
}

/// `(max, −∞, ×, 1)`
pub fn max_times<T: Scalar>() -> MonoidSemiring<Max<T>, Mul<T>> {
    MonoidSemiring::new(Max::new(), Mul::new())
}

/// `(min, +∞, ×, 1)`
pub fn min_times<T: Scalar>() -> MonoidSemiring<Min<T>, Mul<T>> {
    MonoidSemiring::new(Min::new(), Mul::new())
}

/// Boolean `(∨, false, ∧, true)`
pub fn lor_land<T: Scalar>() -> MonoidSemiring<LogicalOr<T>, LogicalAnd<T>> {
    MonoidSemiring::new(LogicalOr::new(), LogicalAnd::new())
}

/// Reachability semiring for pattern inputs: `(any_or, 0, ∧, true)`
pub fn any_or<T: Scalar>() -> MonoidSemiring<AnyOr<T>, LogicalAnd<T>> {
    MonoidSemiring::new(AnyOr::new(), LogicalAnd::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Semiring;

    #[test]
    fn test_min_max_identities() {
        let min = Min::<f64>::new();
        assert_eq!(min.apply(min.identity(), 3.0), 3.0);
        let max = Max::<i32>::new();
        assert_eq!(max.apply(max.identity(), -7), -7);
        assert!(min.is_idempotent());
    }

    #[test]
    fn test_semiring_identities() {
        let ring = min_plus::<f64>();
        assert_eq!(ring.zero(), f64::INFINITY);
        assert_eq!(ring.one(), 0.0);

        let ring = plus_times::<i64>();
        assert_eq!(ring.zero(), 0);
        assert_eq!(ring.one(), 1);
    }

    #[test]
    fn test_any_or() {
        let op = AnyOr::<u32>::new();
        assert_eq!(op.apply(0, 5), 5);
        assert_eq!(op.apply(3, 5), 3);
        assert!(op.has_immutable_nonzeroes());
    }

    #[test]
    fn test_fold_arrays() {
        let add = Add::<i32>::new();
        let mut acc = 10;
        add.foldl_array(&mut acc, &[1, 2, 3]);
        assert_eq!(acc, 16);

        let sub = Subtract::<i32>::new();
        let mut acc = 0;
        // 1 - (2 - (3 - 0))
        sub.foldr_array(&[1, 2, 3], &mut acc);
        assert_eq!(acc, 2);
    }

    #[test]
    fn test_equal_domains() {
        let eq = Equal::<f32>::new();
        assert!(eq.apply(1.5, 1.5));
        assert!(!eq.apply(1.5, 2.5));
    }

    #[test]
    fn test_ewise_apply() {
        let mul = Mul::<i32>::new();
        let mut c = [0; 3];
        mul.ewise_apply(&[1, 2, 3], &[4, 5, 6], &mut c);
        assert_eq!(c, [4, 10, 18]);
    }
}

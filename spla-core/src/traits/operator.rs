//! Operator and monoid abstractions
//!
//! An operator maps `D1 × D2 → D3`. Kernels never look inside an operator;
//! they only call [`BinaryOperator::apply`] and the folded forms built on top
//! of it, and query the capability flags to pick shortcuts.

use super::element::{cast, Scalar};
use crate::format::simd_blocksize;

/// Binary operator over three scalar domains
pub trait BinaryOperator: Send + Sync {
    /// Left input domain
    type D1: Scalar;
    /// Right input domain
    type D2: Scalar;
    /// Output domain
    type D3: Scalar;

    const ASSOCIATIVE: bool = false;
    const COMMUTATIVE: bool = false;
    const IDEMPOTENT: bool = false;
    /// Once an accumulator differs from the identity, folding cannot change it
    const IMMUTABLE_NONZEROES: bool = false;

    fn apply(&self, a: Self::D1, b: Self::D2) -> Self::D3;

    /// Preferred unroll width of blocked loops
    fn blocksize(&self) -> usize {
        simd_blocksize::<Self::D3>()
    }

    fn is_associative(&self) -> bool {
        Self::ASSOCIATIVE
    }

    fn is_commutative(&self) -> bool {
        Self::COMMUTATIVE
    }

    fn is_idempotent(&self) -> bool {
        Self::IDEMPOTENT
    }

    fn has_immutable_nonzeroes(&self) -> bool {
        Self::IMMUTABLE_NONZEROES
    }

    /// `a = a ⊙ b`
    #[inline(always)]
    fn foldl(&self, a: &mut Self::D3, b: Self::D2) {
        *a = self.apply(cast(*a), b);
    }

    /// `b = a ⊙ b`
    #[inline(always)]
    fn foldr(&self, a: Self::D1, b: &mut Self::D3) {
        *b = self.apply(a, cast(*b));
    }

    /// Fold every element of `xs` into `acc` from the left
    fn foldl_array(&self, acc: &mut Self::D3, xs: &[Self::D2]) {
        for &x in xs {
            self.foldl(acc, x);
        }
    }

    /// Fold every element of `xs` into `acc` from the right
    fn foldr_array(&self, xs: &[Self::D1], acc: &mut Self::D3) {
        for &x in xs.iter().rev() {
            self.foldr(x, acc);
        }
    }

    /// `c[i] = a[i] ⊙ b[i]` over the common length of the three slices
    fn ewise_apply(&self, a: &[Self::D1], b: &[Self::D2], c: &mut [Self::D3]) {
        for ((c, &a), &b) in c.iter_mut().zip(a).zip(b) {
            *c = self.apply(a, b);
        }
    }
}

/// Associative operator with a two-sided identity
pub trait Monoid: BinaryOperator {
    fn identity(&self) -> Self::D3;

    /// Whether `x` equals the identity
    fn is_identity(&self, x: Self::D3) -> bool {
        x == self.identity()
    }
}

impl<T: BinaryOperator + ?Sized> BinaryOperator for &T {
    type D1 = T::D1;
    type D2 = T::D2;
    type D3 = T::D3;

    const ASSOCIATIVE: bool = T::ASSOCIATIVE;
    const COMMUTATIVE: bool = T::COMMUTATIVE;
    const IDEMPOTENT: bool = T::IDEMPOTENT;
    const IMMUTABLE_NONZEROES: bool = T::IMMUTABLE_NONZEROES;

    #[inline(always)]
    fn apply(&self, a: Self::D1, b: Self::D2) -> Self::D3 {
        (**self).apply(a, b)
    }

    fn blocksize(&self) -> usize {
        (**self).blocksize()
    }
}

impl<T: Monoid + ?Sized> Monoid for &T {
    fn identity(&self) -> Self::D3 {
        (**self).identity()
    }
}

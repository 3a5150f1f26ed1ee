//! Semiring abstraction
//!
//! A semiring bundles an additive monoid `(⊕, 0)` with a multiplicative
//! operator `⊗` whose identity is `1`.

use super::element::Scalar;
use super::operator::{BinaryOperator, Monoid};

/// Additive monoid, multiplicative operator and multiplicative identity
pub trait Semiring: Send + Sync {
    type Add: Monoid;
    type Mul: BinaryOperator;

    fn additive(&self) -> &Self::Add;

    fn multiplicative(&self) -> &Self::Mul;

    /// Additive identity, the annihilator of `⊗`
    fn zero(&self) -> <Self::Add as BinaryOperator>::D3 {
        self.additive().identity()
    }

    /// Multiplicative identity
    fn one(&self) -> <Self::Mul as BinaryOperator>::D3;
}

/// Semiring assembled from two monoids
#[derive(Debug, Clone, Copy, Default)]
pub struct MonoidSemiring<A, M> {
    add: A,
    mul: M,
}

impl<A: Monoid, M: Monoid> MonoidSemiring<A, M> {
    pub const fn new(add: A, mul: M) -> Self {
        Self { add, mul }
    }
}

impl<A: Monoid, M: Monoid> Semiring for MonoidSemiring<A, M> {
    type Add = A;
    type Mul = M;

    fn additive(&self) -> &A {
        &self.add
    }

    fn multiplicative(&self) -> &M {
        &self.mul
    }

    fn one(&self) -> M::D3 {
        self.mul.identity()
    }
}

/// Semiring assembled from a monoid, an operator and an explicit `1`
#[derive(Debug, Clone, Copy)]
pub struct OperatorSemiring<A, M: BinaryOperator> {
    add: A,
    mul: M,
    one: M::D3,
}

impl<A: Monoid, M: BinaryOperator> OperatorSemiring<A, M> {
    pub fn new(add: A, mul: M, one: M::D3) -> Self {
        Self { add, mul, one }
    }

    /// Use the scalar `1` of the operator's output domain
    pub fn with_unit_one(add: A, mul: M) -> Self {
        Self {
            add,
            mul,
            one: <M::D3 as Scalar>::one(),
        }
    }
}

impl<A: Monoid, M: BinaryOperator> Semiring for OperatorSemiring<A, M> {
    type Add = A;
    type Mul = M;

    fn additive(&self) -> &A {
        &self.add
    }

    fn multiplicative(&self) -> &M {
        &self.mul
    }

    fn one(&self) -> M::D3 {
        self.one
    }
}

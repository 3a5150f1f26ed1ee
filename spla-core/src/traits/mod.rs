//! Abstract interfaces shared by every container and kernel
//!
//! Traits are pure interfaces; the standard implementations of the
//! algebraic ones live in [`crate::ops`].

pub mod element;
pub mod matrix;
pub mod operator;
pub mod semiring;

pub use element::{cast, same_domain, Element, IndexType, Scalar};
#[cfg(feature = "alloc")]
pub use matrix::MatrixOperations;
pub use matrix::SparseMatrix;
pub use operator::{BinaryOperator, Monoid};
pub use semiring::{MonoidSemiring, OperatorSemiring, Semiring};

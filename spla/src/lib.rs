//! SPLA - Sparse linear algebra over generalized semirings
//!
//! This library implements sparse vectors and matrices together with the
//! BLAS-style primitives that combine them under a user-supplied algebra:
//! any additive monoid paired with any multiplicative operator.
//!
//! ## Architecture
//!
//! SPLA follows a definition/implementation split:
//!
//! - **spla-core**: result codes, descriptors, algebraic traits, the
//!   operator catalogue and the Matrix Market grammar (no I/O)
//! - **spla**: containers, kernels and the file parser
//!
//! ## Quick Start
//!
//! ```rust
//! use spla::{blas2, ops, Descriptor, Matrix, Vector};
//!
//! fn example() -> spla::Result<()> {
//!     let a: Matrix<f64> = Matrix::from_triples(2, 2, vec![(0, 0, 1.0), (0, 1, 2.0), (1, 1, 3.0)])?;
//!     let v = Vector::from_dense(&[1.0, 1.0]);
//!     let mut u = Vector::<f64>::new(2);
//!
//!     blas2::mxv(&mut u, &a, &v, &ops::plus_times::<f64>(), Descriptor::NO_OPERATION)?;
//!     assert_eq!(u.get(0), Some(3.0));
//!     Ok(())
//! }
//! # example().unwrap();
//! ```
//!
//! ## Features
//!
//! - **Dual storage**: every matrix keeps synchronised CRS and CCS views
//! - **Adaptive SpMV**: gather or scatter chosen per call, parallel gather
//!   over row blocks with rayon
//! - **Two-phase SpGEMM**: symbolic sizing followed by numeric fill
//! - **Descriptors**: masks, transposition, index substitution and identity
//!   lifting selected per call
//! - **Parser**: Matrix Market and edge-list files, memory mapped with the
//!   `mmap` feature

// Re-export core abstractions
pub use spla_core::{
    // Algebra
    cast, ops, BinaryOperator, Element, IndexType, Monoid, MonoidSemiring, OperatorSemiring, Scalar, Semiring,
    // Per-call semantics
    Descriptor,
    // Format definitions
    DataType, MatrixProperties, Symmetry,
    // Error handling
    ErrorCategory, Result, SplaError,
    // Container traits
    MatrixOperations, SparseMatrix,
};

// Containers
pub mod coordinates;
pub mod matrix;
pub mod storage;
pub mod vector;

// Primitives
pub mod blas0;
pub mod blas1;
pub mod blas2;
pub mod blas3;

pub mod config;
pub mod parser;

// Public exports
pub use blas1::Operand;
pub use blas3::Phase;
pub use config::{FileFormat, ParserConfig};
pub use coordinates::{Coordinates, Update};
pub use matrix::Matrix;
pub use parser::MatrixFile;
pub use storage::CompressedStorage;
pub use vector::{Dimension, Vector};

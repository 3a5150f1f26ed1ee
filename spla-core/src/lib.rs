#![no_std]

//! SPLA Core - Algebraic and descriptor definitions for sparse linear algebra
//!
//! This crate provides the pure, I/O-free building blocks shared by every
//! execution backend: result codes, the descriptor bitset, the operator /
//! monoid / semiring traits together with a catalogue of standard algebraic
//! structures, element and index-type traits, the configuration constants,
//! and the Matrix Market header grammar.

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod descriptor;
pub mod error;
pub mod format;
pub mod ops;
pub mod traits;
pub mod validation;

pub use descriptor::*;
pub use error::*;
pub use format::*;
pub use traits::*;
pub use validation::*;

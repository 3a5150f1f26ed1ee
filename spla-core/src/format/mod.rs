//! Configuration constants and input-format grammar
//!
//! This module contains pure definitions only; the parser that reads files
//! lives in the `spla` crate.

pub mod constants;
pub mod matrix_market;

pub use constants::simd_blocksize;
pub use matrix_market::{DataType, Field, Layout, MatrixMarketHeader, Symmetry};
#[cfg(feature = "alloc")]
pub use matrix_market::MatrixProperties;

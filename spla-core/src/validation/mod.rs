//! Pure validation helpers
//!
//! Capacity and overflow arithmetic plus token-level parsing of input
//! lines. Nothing here performs I/O.

pub mod bounds;
pub mod parsing;

pub use bounds::{check_capacity, check_index, checked_bytes};
pub use parsing::{parse_array_value, parse_entry, parse_size_line, parse_usize, Entry};

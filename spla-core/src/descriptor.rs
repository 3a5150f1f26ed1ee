//! Descriptor bitset modifying per-call semantics
//!
//! Descriptors are additive: combining two descriptors with `|` requests both
//! behaviours.

use core::ops::{BitOr, BitOrAssign};

/// Per-call semantic modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Descriptor(u16);

impl Descriptor {
    /// Default semantics
    pub const NO_OPERATION: Self = Self(0);
    /// Read the mask as its logical complement
    pub const INVERT_MASK: Self = Self(1);
    /// Interpret the matrix argument of mxv/vxm as its transpose
    pub const TRANSPOSE_MATRIX: Self = Self(1 << 1);
    /// The caller guarantees ingested (i, j) pairs are unique
    pub const NO_DUPLICATES: Self = Self(1 << 2);
    /// Mask values are ignored; only presence is tested
    pub const STRUCTURAL: Self = Self(1 << 3);
    /// Structural mask, inverted
    pub const STRUCTURAL_COMPLEMENT: Self = Self((1 << 3) | 1);
    /// All vectors are dense; assignment checks may be skipped
    pub const DENSE: Self = Self(1 << 4);
    /// The matrix is treated as `A + I`
    pub const ADD_IDENTITY: Self = Self(1 << 5);
    /// Use the index of an input element in place of its value
    pub const USE_INDEX: Self = Self(1 << 6);
    /// Reject any implicit domain conversion
    pub const NO_CASTING: Self = Self(1 << 8);
    /// Write the additive identity rather than leave an entry unassigned
    pub const EXPLICIT_ZERO: Self = Self(1 << 9);
    /// The caller asserts that aliasing is safe
    pub const SAFE_OVERLAP: Self = Self(1 << 10);
    /// Transpose the left-hand matrix of mxm
    pub const TRANSPOSE_LEFT: Self = Self(1 << 11);
    /// Transpose the right-hand matrix of mxm
    pub const TRANSPOSE_RIGHT: Self = Self(1 << 12);

    const NAMES: [(Descriptor, &'static str); 13] = [
        (Self::INVERT_MASK, "invert_mask"),
        (Self::TRANSPOSE_MATRIX, "transpose_matrix"),
        (Self::NO_DUPLICATES, "no_duplicates"),
        (Self::STRUCTURAL, "structural"),
        (Self::DENSE, "dense"),
        (Self::ADD_IDENTITY, "add_identity"),
        (Self::USE_INDEX, "use_index"),
        (Self::NO_CASTING, "no_casting"),
        (Self::EXPLICIT_ZERO, "explicit_zero"),
        (Self::SAFE_OVERLAP, "safe_overlap"),
        (Self::TRANSPOSE_LEFT, "transpose_left"),
        (Self::TRANSPOSE_RIGHT, "transpose_right"),
        (Self::NO_OPERATION, "no_operation"),
    ];

    /// Get the raw bit representation
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Create from raw bits, rejecting values outside the recognised set
    pub const fn from_bits(bits: u16) -> Option<Self> {
        if bits > crate::format::constants::MAX_DESCRIPTOR_VALUE {
            None
        } else {
            Some(Self(bits))
        }
    }

    /// Check whether every bit of `other` is set
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Combine two descriptors
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Flip the bits of `other`
    pub const fn toggle(self, other: Self) -> Self {
        Self(self.0 ^ other.0)
    }

    /// Clear the bits of `other`
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    pub const fn is_inverted_mask(self) -> bool {
        self.contains(Self::INVERT_MASK)
    }

    pub const fn is_structural(self) -> bool {
        self.contains(Self::STRUCTURAL)
    }

    pub const fn is_transposed(self) -> bool {
        self.contains(Self::TRANSPOSE_MATRIX)
    }

    pub const fn is_dense(self) -> bool {
        self.contains(Self::DENSE)
    }
}

impl BitOr for Descriptor {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for Descriptor {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl core::fmt::Display for Descriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.0 == 0 {
            return write!(f, "no_operation");
        }
        let mut first = true;
        for (flag, name) in Self::NAMES.iter() {
            if flag.0 != 0 && self.contains(*flag) {
                if !first {
                    write!(f, "|")?;
                }
                write!(f, "{name}")?;
                first = false;
            }
        }
        Ok(())
    }
}

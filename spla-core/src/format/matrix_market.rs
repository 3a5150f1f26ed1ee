//! Matrix Market banner grammar and matrix property bundle
//!
//! The banner is the first line of a Matrix Market file:
//! `%%MatrixMarket matrix {coordinate|array} {real|pattern|complex|integer}
//! {general|symmetric|skew-symmetric|hermitian}`. Keywords are matched
//! case-insensitively.

#[cfg(feature = "alloc")]
use alloc::string::String;

use super::constants::matrix_market::{BANNER, OBJECT};
use crate::{Result, SplaError};

/// Element type tag of a container
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DataType {
    /// 32-bit floating point
    F32 = 0,
    /// 64-bit floating point
    F64 = 1,
    /// 32-bit signed integer
    I32 = 2,
    /// 64-bit signed integer
    I64 = 3,
    /// 32-bit unsigned integer
    U32 = 4,
    /// 64-bit unsigned integer
    U64 = 5,
    /// Boolean
    Bool = 6,
    /// Pointer-sized unsigned integer
    Usize = 7,
    /// 8-bit signed integer
    I8 = 8,
    /// 16-bit signed integer
    I16 = 9,
    /// 8-bit unsigned integer
    U8 = 10,
    /// 16-bit unsigned integer
    U16 = 11,
    /// No value; pattern containers
    Void = 12,
    /// Pair of two element types
    Composite = 13,
}

impl DataType {
    /// Convert from u8 representation
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(DataType::F32),
            1 => Some(DataType::F64),
            2 => Some(DataType::I32),
            3 => Some(DataType::I64),
            4 => Some(DataType::U32),
            5 => Some(DataType::U64),
            6 => Some(DataType::Bool),
            7 => Some(DataType::Usize),
            8 => Some(DataType::I8),
            9 => Some(DataType::I16),
            10 => Some(DataType::U8),
            11 => Some(DataType::U16),
            12 => Some(DataType::Void),
            13 => Some(DataType::Composite),
            _ => None,
        }
    }

    /// Convert to u8 representation
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Whether values of this type can be substituted by an index
    pub const fn is_arithmetic(self) -> bool {
        !matches!(self, DataType::Void | DataType::Composite)
    }
}

impl core::fmt::Display for DataType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            DataType::F32 => "f32",
            DataType::F64 => "f64",
            DataType::I32 => "i32",
            DataType::I64 => "i64",
            DataType::U32 => "u32",
            DataType::U64 => "u64",
            DataType::Bool => "bool",
            DataType::Usize => "usize",
            DataType::I8 => "i8",
            DataType::I16 => "i16",
            DataType::U8 => "u8",
            DataType::U16 => "u16",
            DataType::Void => "void",
            DataType::Composite => "composite",
        };
        write!(f, "{name}")
    }
}

/// Storage layout declared by the banner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Layout {
    /// One `i j [v]` line per stored entry
    #[default]
    Coordinate,
    /// Every entry in column-major order, values only
    Array,
}

/// Value field declared by the banner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Field {
    #[default]
    Real,
    Integer,
    Complex,
    /// No values are stored
    Pattern,
}

/// Symmetry declared by the banner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Symmetry {
    #[default]
    General,
    Symmetric,
    SkewSymmetric,
    Hermitian,
}

impl Symmetry {
    /// Whether off-diagonal entries are stored once and mirrored
    pub const fn is_mirrored(self) -> bool {
        !matches!(self, Symmetry::General)
    }

    /// Sign applied to the mirrored copy of an off-diagonal entry
    pub const fn mirror_sign(self) -> f64 {
        match self {
            Symmetry::SkewSymmetric => -1.0,
            _ => 1.0,
        }
    }
}

/// Parsed Matrix Market banner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatrixMarketHeader {
    pub layout: Layout,
    pub field: Field,
    pub symmetry: Symmetry,
}

impl MatrixMarketHeader {
    /// Parse the banner line
    ///
    /// Returns `Parse` if the line is not a Matrix Market banner or names an
    /// unknown keyword.
    pub fn parse(line: &str) -> Result<Self> {
        let mut tokens = line.split_ascii_whitespace();

        match tokens.next() {
            Some(banner) if banner.eq_ignore_ascii_case(BANNER) => {}
            _ => return Err(SplaError::Parse),
        }
        match tokens.next() {
            Some(object) if object.eq_ignore_ascii_case(OBJECT) => {}
            _ => return Err(SplaError::Parse),
        }

        let layout = match tokens.next() {
            Some(t) if t.eq_ignore_ascii_case("coordinate") => Layout::Coordinate,
            Some(t) if t.eq_ignore_ascii_case("array") => Layout::Array,
            _ => return Err(SplaError::Parse),
        };

        let field = match tokens.next() {
            Some(t) if t.eq_ignore_ascii_case("real") => Field::Real,
            Some(t) if t.eq_ignore_ascii_case("double") => Field::Real,
            Some(t) if t.eq_ignore_ascii_case("integer") => Field::Integer,
            Some(t) if t.eq_ignore_ascii_case("complex") => Field::Complex,
            Some(t) if t.eq_ignore_ascii_case("pattern") => Field::Pattern,
            _ => return Err(SplaError::Parse),
        };

        let symmetry = match tokens.next() {
            Some(t) if t.eq_ignore_ascii_case("general") => Symmetry::General,
            Some(t) if t.eq_ignore_ascii_case("symmetric") => Symmetry::Symmetric,
            Some(t) if t.eq_ignore_ascii_case("skew-symmetric") => Symmetry::SkewSymmetric,
            Some(t) if t.eq_ignore_ascii_case("hermitian") => Symmetry::Hermitian,
            _ => return Err(SplaError::Parse),
        };

        if tokens.next().is_some() {
            return Err(SplaError::Parse);
        }

        // Array files cannot omit values
        if layout == Layout::Array && field == Field::Pattern {
            return Err(SplaError::Parse);
        }

        Ok(Self {
            layout,
            field,
            symmetry,
        })
    }

    /// Whether `line` starts with the Matrix Market banner
    pub fn is_banner(line: &str) -> bool {
        line.len() >= BANNER.len() && line[..BANNER.len()].eq_ignore_ascii_case(BANNER)
    }
}

/// Property bundle describing a parsed input file
#[cfg(feature = "alloc")]
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatrixProperties {
    /// Path of the file the properties were read from
    pub filename: String,
    /// Number of rows
    pub m: usize,
    /// Number of columns
    pub n: usize,
    /// Nonzeroes after symmetric expansion
    pub nz: usize,
    /// Entries stored in the file
    pub entries: usize,
    pub symmetry: Symmetry,
    /// Whether the file uses one-based indices
    pub one_based: bool,
    /// Whether the file stores no values
    pub pattern: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_banner() {
        let h = MatrixMarketHeader::parse("%%MatrixMarket matrix coordinate real symmetric").unwrap();
        assert_eq!(h.layout, Layout::Coordinate);
        assert_eq!(h.field, Field::Real);
        assert_eq!(h.symmetry, Symmetry::Symmetric);

        let h = MatrixMarketHeader::parse("%%matrixmarket MATRIX Coordinate Pattern General").unwrap();
        assert_eq!(h.field, Field::Pattern);
        assert_eq!(h.symmetry, Symmetry::General);
    }

    #[test]
    fn test_parse_banner_rejects() {
        assert_eq!(
            MatrixMarketHeader::parse("%%MatrixMarket vector coordinate real general"),
            Err(SplaError::Parse)
        );
        assert_eq!(
            MatrixMarketHeader::parse("%%MatrixMarket matrix array pattern general"),
            Err(SplaError::Parse)
        );
        assert_eq!(
            MatrixMarketHeader::parse("%%MatrixMarket matrix coordinate real"),
            Err(SplaError::Parse)
        );
        assert_eq!(MatrixMarketHeader::parse("1 2 3"), Err(SplaError::Parse));
    }

    #[test]
    fn test_symmetry_mirror() {
        assert!(!Symmetry::General.is_mirrored());
        assert!(Symmetry::Hermitian.is_mirrored());
        assert_eq!(Symmetry::SkewSymmetric.mirror_sign(), -1.0);
    }

    #[test]
    fn test_data_type_round_trip() {
        for v in 0..14u8 {
            let dt = DataType::from_u8(v).unwrap();
            assert_eq!(dt.to_u8(), v);
        }
        assert_eq!(DataType::from_u8(14), None);
        assert!(!DataType::Void.is_arithmetic());
    }
}

//! Element, scalar and index type constraints
//!
//! [`Element`] is what a container may store, [`Scalar`] is what an operator
//! may compute with, and [`IndexType`] is the integer type used for the
//! nonzero offsets of a matrix.

use core::any::Any;

use crate::format::DataType;

/// Trait for types that can be stored in a matrix or vector
///
/// Value arrays are allocated zero-initialised, hence the `Zeroable` bound.
/// The unit type `()` is the pattern element: containers of `()` store only
/// their sparsity structure.
pub trait Element:
    Copy + Default + PartialEq + core::fmt::Debug + Send + Sync + 'static + bytemuck::Zeroable
{
    /// Whether this is the valueless pattern element
    const IS_PATTERN: bool = false;

    /// Integer and Boolean types convert among themselves through `i128`
    const IS_INTEGRAL: bool = false;

    /// Get the DataType tag for this element type
    fn data_type() -> DataType;

    /// Get the size in bytes of this element type
    fn size_bytes() -> usize {
        core::mem::size_of::<Self>()
    }

    /// Convert from f64 for generic construction
    fn from_f64(value: f64) -> Self;

    /// Convert to f64 for domain lifting between unrelated types
    fn to_f64(self) -> f64;

    /// Exact conversion from an integer; truncates like `as`
    fn from_i128(value: i128) -> Self {
        Self::from_f64(value as f64)
    }

    /// Exact integer view of an integral value
    fn to_i128(self) -> i128 {
        self.to_f64() as i128
    }

    /// Mask interpretation of this value
    fn is_truthy(self) -> bool;
}

/// Arithmetic element types operators compute with
pub trait Scalar: Element + PartialOrd {
    fn zero() -> Self;
    fn one() -> Self;
    /// Largest value; the identity of `min`
    fn max_value() -> Self;
    /// Smallest value; the identity of `max`
    fn min_value() -> Self;

    /// Convert an index for the `use_index` descriptor
    fn from_index(index: usize) -> Self;

    fn plus(self, rhs: Self) -> Self;
    fn times(self, rhs: Self) -> Self;
    fn minus(self, rhs: Self) -> Self;
    fn divide(self, rhs: Self) -> Self;
    fn abs_diff(self, rhs: Self) -> Self;
}

/// Convert `value` into domain `T`
///
/// Identical types are passed through untouched. Between integral types
/// the value goes through `i128` and wraps like `as`; every other
/// conversion goes through `f64`.
#[inline(always)]
pub fn cast<S: Element, T: Element>(value: S) -> T {
    match (&value as &dyn Any).downcast_ref::<T>() {
        Some(same) => *same,
        None if S::IS_INTEGRAL && T::IS_INTEGRAL => T::from_i128(value.to_i128()),
        None => T::from_f64(value.to_f64()),
    }
}

/// Whether `S` and `T` are the same type
#[inline(always)]
pub fn same_domain<S: 'static, T: 'static>() -> bool {
    core::any::TypeId::of::<S>() == core::any::TypeId::of::<T>()
}

macro_rules! impl_float {
    ($($t:ty => $dt:expr),*) => {$(
        impl Element for $t {
            fn data_type() -> DataType {
                $dt
            }

            fn from_f64(value: f64) -> Self {
                value as $t
            }

            fn to_f64(self) -> f64 {
                self as f64
            }

            fn is_truthy(self) -> bool {
                self != 0.0
            }
        }

        impl Scalar for $t {
            fn zero() -> Self { 0.0 }
            fn one() -> Self { 1.0 }
            fn max_value() -> Self { <$t>::INFINITY }
            fn min_value() -> Self { <$t>::NEG_INFINITY }

            fn from_index(index: usize) -> Self {
                index as $t
            }

            fn plus(self, rhs: Self) -> Self { self + rhs }
            fn times(self, rhs: Self) -> Self { self * rhs }
            fn minus(self, rhs: Self) -> Self { self - rhs }
            fn divide(self, rhs: Self) -> Self { self / rhs }

            fn abs_diff(self, rhs: Self) -> Self {
                if self > rhs { self - rhs } else { rhs - self }
            }
        }
    )*};
}

macro_rules! impl_integer {
    ($($t:ty => $dt:expr),*) => {$(
        impl Element for $t {
            const IS_INTEGRAL: bool = true;

            fn data_type() -> DataType {
                $dt
            }

            fn from_f64(value: f64) -> Self {
                value as $t
            }

            fn to_f64(self) -> f64 {
                self as f64
            }

            fn from_i128(value: i128) -> Self {
                value as $t
            }

            fn to_i128(self) -> i128 {
                self as i128
            }

            fn is_truthy(self) -> bool {
                self != 0
            }
        }

        impl Scalar for $t {
            fn zero() -> Self { 0 }
            fn one() -> Self { 1 }
            fn max_value() -> Self { <$t>::MAX }
            fn min_value() -> Self { <$t>::MIN }

            fn from_index(index: usize) -> Self {
                index as $t
            }

            fn plus(self, rhs: Self) -> Self { self.wrapping_add(rhs) }
            fn times(self, rhs: Self) -> Self { self.wrapping_mul(rhs) }
            fn minus(self, rhs: Self) -> Self { self.wrapping_sub(rhs) }

            // Division by zero saturates instead of trapping
            fn divide(self, rhs: Self) -> Self {
                if rhs == 0 { <$t>::MAX } else { self.wrapping_div(rhs) }
            }

            fn abs_diff(self, rhs: Self) -> Self {
                if self > rhs { self.wrapping_sub(rhs) } else { rhs.wrapping_sub(self) }
            }
        }
    )*};
}

impl_float!(f32 => DataType::F32, f64 => DataType::F64);
impl_integer!(
    i8 => DataType::I8,
    i16 => DataType::I16,
    i32 => DataType::I32,
    i64 => DataType::I64,
    u8 => DataType::U8,
    u16 => DataType::U16,
    u32 => DataType::U32,
    u64 => DataType::U64,
    usize => DataType::Usize
);

impl Element for bool {
    const IS_INTEGRAL: bool = true;

    fn data_type() -> DataType {
        DataType::Bool
    }

    fn from_i128(value: i128) -> Self {
        value != 0
    }

    fn to_i128(self) -> i128 {
        self as i128
    }

    fn from_f64(value: f64) -> Self {
        value != 0.0
    }

    fn to_f64(self) -> f64 {
        if self {
            1.0
        } else {
            0.0
        }
    }

    fn is_truthy(self) -> bool {
        self
    }
}

impl Scalar for bool {
    fn zero() -> Self {
        false
    }
    fn one() -> Self {
        true
    }
    fn max_value() -> Self {
        true
    }
    fn min_value() -> Self {
        false
    }

    fn from_index(index: usize) -> Self {
        index != 0
    }

    fn plus(self, rhs: Self) -> Self {
        self || rhs
    }
    fn times(self, rhs: Self) -> Self {
        self && rhs
    }
    fn minus(self, rhs: Self) -> Self {
        self ^ rhs
    }
    fn divide(self, rhs: Self) -> Self {
        self && rhs
    }
    fn abs_diff(self, rhs: Self) -> Self {
        self ^ rhs
    }
}

impl Element for () {
    const IS_PATTERN: bool = true;

    fn data_type() -> DataType {
        DataType::Void
    }

    fn from_f64(_value: f64) -> Self {}

    // A stored pattern entry reads as one
    fn to_f64(self) -> f64 {
        1.0
    }

    fn is_truthy(self) -> bool {
        true
    }
}

/// Pairs are produced by `zip` and consumed by `unzip`
impl<A: Element, B: Element> Element for (A, B) {
    fn data_type() -> DataType {
        DataType::Composite
    }

    fn from_f64(value: f64) -> Self {
        (A::from_f64(value), B::default())
    }

    fn to_f64(self) -> f64 {
        self.0.to_f64()
    }

    fn is_truthy(self) -> bool {
        self.0.is_truthy()
    }
}

/// Integer type holding the nonzero offsets of a matrix
pub trait IndexType: Copy + Default + Ord + core::fmt::Debug + Send + Sync + 'static {
    /// Largest nonzero count representable
    const MAX: usize;

    /// Convert from usize; callers check against [`IndexType::MAX`] first
    fn from_usize(value: usize) -> Self;

    fn to_usize(self) -> usize;
}

macro_rules! impl_index_type {
    ($($t:ty),*) => {$(
        impl IndexType for $t {
            const MAX: usize = if (<$t>::MAX as u128) > (usize::MAX as u128) {
                usize::MAX
            } else {
                <$t>::MAX as usize
            };

            #[inline(always)]
            fn from_usize(value: usize) -> Self {
                value as $t
            }

            #[inline(always)]
            fn to_usize(self) -> usize {
                self as usize
            }
        }
    )*};
}

impl_index_type!(u16, u32, u64, usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cast_same_type() {
        let x: f64 = 0.1 + 0.2;
        assert_eq!(cast::<f64, f64>(x), x);
        assert_eq!(cast::<u64, u64>(u64::MAX), u64::MAX);
    }

    #[test]
    fn test_cast_between_domains() {
        assert_eq!(cast::<f64, i32>(3.7), 3);
        assert_eq!(cast::<i32, f64>(-2), -2.0);
        assert!(cast::<f32, bool>(2.0));
        assert_eq!(cast::<bool, u8>(true), 1);
        assert_eq!(cast::<(), f64>(()), 1.0);
    }

    #[test]
    fn test_cast_between_integers_is_exact() {
        let big = (1i64 << 53) + 1;
        assert_eq!(cast::<i64, u64>(big), 9_007_199_254_740_993);
        assert_eq!(cast::<u64, i64>(u64::MAX - 1), -2);
        assert_eq!(cast::<i32, u8>(300), 44);
        assert_eq!(cast::<usize, i64>(usize::MAX >> 1) as u64, (usize::MAX >> 1) as u64);
        assert!(cast::<i64, bool>(big));
        assert_eq!(cast::<bool, i64>(true), 1);
        // floats still go through f64
        assert_eq!(cast::<i64, f64>(big), 9_007_199_254_740_992.0);
    }

    #[test]
    fn test_integer_division_by_zero() {
        assert_eq!(7i32.divide(0), i32::MAX);
        assert_eq!(7i32.divide(2), 3);
    }

    #[test]
    fn test_index_type_max() {
        assert_eq!(<u16 as IndexType>::MAX, 65535);
        assert_eq!(<usize as IndexType>::MAX, usize::MAX);
        assert_eq!(u16::from_usize(42).to_usize(), 42);
    }

    #[test]
    fn test_pattern_flags() {
        assert!(<() as Element>::IS_PATTERN);
        assert!(!<f64 as Element>::IS_PATTERN);
        assert_eq!(<()>::data_type(), DataType::Void);
        assert_eq!(<(f64, u32)>::data_type(), DataType::Composite);
    }
}

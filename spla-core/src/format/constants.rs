//! Process-wide configuration constants
//!
//! None of these are mutable at runtime; runtime knobs live in the parser
//! configuration of the `spla` crate.

/// Size of a cache line in bytes
pub const CACHE_LINE_SIZE: usize = 64;

/// Width of a SIMD register in bytes
pub const SIMD_SIZE: usize = 64;

/// Bytes read ahead per parser block
pub const PARSER_READ_BUFFER_SIZE: usize = 1 << 20;

/// Allocations of at least this many bytes are reported
pub const BIG_ALLOCATION_THRESHOLD: usize = 1 << 31;

/// Output rows handled by one task of the parallel gather kernel
pub const GATHER_CHUNK_ROWS: usize = 4096;

/// Largest descriptor bit pattern accepted by `Descriptor::from_bits`
pub const MAX_DESCRIPTOR_VALUE: u16 = (1 << 13) - 1;

/// Number of elements of type `T` that fit in one SIMD register
///
/// Zero-sized types yield 1 so that blocked loops always advance.
pub const fn simd_blocksize<T>() -> usize {
    let size = core::mem::size_of::<T>();
    if size == 0 || size >= SIMD_SIZE {
        1
    } else {
        SIMD_SIZE / size
    }
}

/// Matrix Market grammar tokens
pub mod matrix_market {
    /// Banner opening every Matrix Market file
    pub const BANNER: &str = "%%MatrixMarket";

    /// Object keyword following the banner
    pub const OBJECT: &str = "matrix";

    /// Line prefixes that mark comments
    pub const COMMENT_PREFIXES: [u8; 2] = [b'%', b'#'];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simd_blocksize() {
        assert_eq!(simd_blocksize::<f64>(), 8);
        assert_eq!(simd_blocksize::<f32>(), 16);
        assert_eq!(simd_blocksize::<u8>(), 64);
        assert_eq!(simd_blocksize::<()>(), 1);
        assert_eq!(simd_blocksize::<[u8; 128]>(), 1);
    }
}

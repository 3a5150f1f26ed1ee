//! Error types for sparse linear algebra primitives
//!
//! Every primitive returns [`Result`]; `Ok(())` stands for success and each
//! remaining result code is a variant of [`SplaError`].

/// Result codes other than success that a primitive may return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SplaError {
    /// Irrecoverable internal invariant violation
    Panic,
    /// Capacity could not be allocated
    OutOfMemory,
    /// Container dimensions disagree
    Mismatch,
    /// Containers alias where aliasing is forbidden
    Overlap,
    /// The index type cannot represent the required capacity
    Overflow,
    /// The requested combination is not supported
    Unsupported,
    /// A descriptor or argument violates a stated precondition
    Illegal,
    /// Algorithm-level non-convergence; never produced by core primitives
    Failed,
    /// The parser could not read its input
    Io,
    /// The parser met malformed input
    Parse,
}

/// Coarse classification of [`SplaError`] values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Dimension or argument checks at primitive entry
    Precondition,
    /// Allocation or I/O resources
    Resource,
    /// Index type overflow during ingestion
    Overflow,
    /// Forbidden aliasing
    Aliasing,
    /// Sparse operand to non-monoid op, self-copy, length mismatch
    Semantic,
    /// Internal invariant violation
    Irrecoverable,
    /// Reported by algorithms built on top of the primitives
    Algorithm,
}

impl SplaError {
    /// Get the category of this error
    pub const fn category(&self) -> ErrorCategory {
        match self {
            SplaError::Mismatch | SplaError::Parse => ErrorCategory::Precondition,
            SplaError::OutOfMemory | SplaError::Io => ErrorCategory::Resource,
            SplaError::Overflow => ErrorCategory::Overflow,
            SplaError::Overlap => ErrorCategory::Aliasing,
            SplaError::Illegal | SplaError::Unsupported => ErrorCategory::Semantic,
            SplaError::Panic => ErrorCategory::Irrecoverable,
            SplaError::Failed => ErrorCategory::Algorithm,
        }
    }

    /// Whether retrying the same call can ever succeed
    pub const fn is_retryable(&self) -> bool {
        matches!(self, SplaError::OutOfMemory | SplaError::Io)
    }
}

impl core::fmt::Display for SplaError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            SplaError::Panic => "Internal invariant violated",
            SplaError::OutOfMemory => "Out of memory",
            SplaError::Mismatch => "Dimension mismatch",
            SplaError::Overlap => "Overlapping containers",
            SplaError::Overflow => "Index type overflow",
            SplaError::Unsupported => "Unsupported operation",
            SplaError::Illegal => "Illegal argument",
            SplaError::Failed => "Algorithm failed",
            SplaError::Io => "I/O error",
            SplaError::Parse => "Malformed input",
        };
        write!(f, "{msg}")
    }
}

/// Result type for sparse linear algebra primitives
pub type Result<T> = core::result::Result<T, SplaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(SplaError::Mismatch.category(), ErrorCategory::Precondition);
        assert_eq!(SplaError::OutOfMemory.category(), ErrorCategory::Resource);
        assert_eq!(SplaError::Overlap.category(), ErrorCategory::Aliasing);
        assert_eq!(SplaError::Illegal.category(), ErrorCategory::Semantic);
        assert_eq!(SplaError::Panic.category(), ErrorCategory::Irrecoverable);
        assert!(!SplaError::Panic.is_retryable());
        assert!(SplaError::OutOfMemory.is_retryable());
    }
}

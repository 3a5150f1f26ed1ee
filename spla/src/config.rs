//! Runtime configuration and allocation diagnostics

use spla_core::format::constants::{BIG_ALLOCATION_THRESHOLD, PARSER_READ_BUFFER_SIZE};
use tracing::info;

/// Input file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FileFormat {
    /// Detect from the first line: a Matrix Market banner or an edge list
    #[default]
    Auto,
    MatrixMarket,
    /// SNAP-style edge list with optional `#` comments
    Snap,
}

/// Configuration for the file parser
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParserConfig {
    /// Number of workers reading disjoint byte ranges
    pub workers: usize,
    /// Minimum bytes handed to one worker
    pub read_buffer_size: usize,
    /// Whether edge-list indices start at one; Matrix Market is always one-based
    pub one_based: bool,
    pub format: FileFormat,
}

impl ParserConfig {
    /// Set the number of parser workers
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set the per-worker read-ahead size in bytes
    pub fn with_read_buffer_size(mut self, read_buffer_size: usize) -> Self {
        self.read_buffer_size = read_buffer_size.max(1);
        self
    }

    /// Set whether edge-list indices are one-based
    pub fn with_one_based(mut self, one_based: bool) -> Self {
        self.one_based = one_based;
        self
    }

    /// Set the input format
    pub fn with_format(mut self, format: FileFormat) -> Self {
        self.format = format;
        self
    }

    /// Number of workers to use for an input of `len` bytes
    ///
    /// Small inputs are not split below one read buffer per worker.
    pub fn effective_workers(&self, len: usize) -> usize {
        let by_size = len.div_ceil(self.read_buffer_size).max(1);
        self.workers.min(by_size).max(1)
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            workers: rayon::current_num_threads(),
            read_buffer_size: PARSER_READ_BUFFER_SIZE,
            one_based: false,
            format: FileFormat::Auto,
        }
    }
}

/// Report an allocation of `bytes` bytes made for `what`
///
/// Only allocations at or above [`BIG_ALLOCATION_THRESHOLD`] are logged.
pub fn report_allocation(what: &str, bytes: usize) {
    if bytes >= BIG_ALLOCATION_THRESHOLD {
        info!(
            what,
            bytes,
            gib = bytes as f64 / (1u64 << 30) as f64,
            "big allocation"
        );
    }
}

//! Raw file access and newline-aligned parallel line parsing

use std::fs::File;
#[cfg(not(feature = "mmap"))]
use std::io::Read;
use std::path::Path;

#[cfg(feature = "mmap")]
use memmap2::{Mmap, MmapOptions};
use rayon::prelude::*;
use spla_core::format::constants::matrix_market::COMMENT_PREFIXES;
use spla_core::{parse_size_line, MatrixMarketHeader, Result, SplaError};
use tracing::debug;

use crate::config::{report_allocation, FileFormat};

/// Bytes of an input file, mapped or read into memory
pub(crate) enum Source {
    #[cfg(feature = "mmap")]
    Mapped(Mmap),
    Buffered(Vec<u8>),
}

impl Source {
    pub(crate) fn bytes(&self) -> &[u8] {
        match self {
            #[cfg(feature = "mmap")]
            Source::Mapped(map) => &map[..],
            Source::Buffered(buf) => &buf[..],
        }
    }
}

/// Open `path` for parsing
#[cfg(feature = "mmap")]
pub(crate) fn load(path: &Path) -> Result<Source> {
    let file = File::open(path).map_err(|_| SplaError::Io)?;
    let len = file.metadata().map_err(|_| SplaError::Io)?.len();
    if len == 0 {
        return Ok(Source::Buffered(Vec::new()));
    }
    // SAFETY: read-only mapping; the file is not modified while parsed
    let map = unsafe { MmapOptions::new().map(&file).map_err(|_| SplaError::Io)? };
    Ok(Source::Mapped(map))
}

/// Open `path` for parsing
#[cfg(not(feature = "mmap"))]
pub(crate) fn load(path: &Path) -> Result<Source> {
    let mut file = File::open(path).map_err(|_| SplaError::Io)?;
    let len = file.metadata().map_err(|_| SplaError::Io)?.len() as usize;
    let mut buf = Vec::new();
    buf.try_reserve_exact(len).map_err(|_| SplaError::OutOfMemory)?;
    report_allocation("parser buffer", len);
    file.read_to_end(&mut buf).map_err(|_| SplaError::Io)?;
    Ok(Source::Buffered(buf))
}

/// What the sequential header scan found
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Header {
    /// `None` for an edge list
    pub banner: Option<MatrixMarketHeader>,
    /// `(m, n, entries)`; edge lists carry no size line
    pub size: Option<(usize, usize, Option<usize>)>,
    /// Byte offset of the first data line
    pub data_offset: usize,
}

pub(crate) fn is_comment(line: &str) -> bool {
    line.as_bytes()
        .first()
        .is_some_and(|b| COMMENT_PREFIXES.contains(b))
}

/// Iterate `(offset_after_line, line)` pairs from `start`
fn lines_from(bytes: &[u8], start: usize) -> impl Iterator<Item = (usize, &[u8])> {
    let mut pos = start;
    std::iter::from_fn(move || {
        if pos >= bytes.len() {
            return None;
        }
        let end = bytes[pos..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(bytes.len(), |p| pos + p + 1);
        let line = &bytes[pos..end];
        pos = end;
        Some((end, line))
    })
}

fn as_text(line: &[u8]) -> Result<&str> {
    std::str::from_utf8(line).map_err(|_| SplaError::Parse)
}

/// Scan the banner, comments and size line
pub(crate) fn read_header(bytes: &[u8], format: FileFormat) -> Result<Header> {
    let mut lines = lines_from(bytes, 0);
    let first = match lines.next() {
        Some((_, line)) => as_text(line)?.trim(),
        None => return Err(SplaError::Parse),
    };

    let matrix_market = match format {
        FileFormat::Auto => MatrixMarketHeader::is_banner(first),
        FileFormat::MatrixMarket => true,
        FileFormat::Snap => false,
    };
    if !matrix_market {
        return Ok(Header {
            banner: None,
            size: None,
            data_offset: 0,
        });
    }

    let banner = MatrixMarketHeader::parse(first)?;
    for (offset, line) in lines {
        let line = as_text(line)?.trim();
        if line.is_empty() || is_comment(line) {
            continue;
        }
        let size = parse_size_line(line)?;
        return Ok(Header {
            banner: Some(banner),
            size: Some(size),
            data_offset: offset,
        });
    }
    Err(SplaError::Parse)
}

/// Split `data` into at most `workers` ranges ending on line boundaries
pub(crate) fn split_ranges(data: &[u8], workers: usize) -> Vec<(usize, usize)> {
    let len = data.len();
    let workers = workers.max(1);
    let mut bounds = vec![0usize];
    for w in 1..workers {
        let guess = w * len / workers;
        let last = bounds.last().copied().unwrap_or(0);
        if guess <= last {
            continue;
        }
        let aligned = data[guess..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(len, |p| guess + p + 1);
        if aligned > last && aligned < len {
            bounds.push(aligned);
        }
    }
    bounds.push(len);
    bounds.windows(2).map(|w| (w[0], w[1])).collect()
}

/// Parse every data line of `data` in parallel, preserving file order
///
/// Blank lines and comment lines are skipped. `parse` sees the trimmed
/// line.
pub(crate) fn parse_lines<T, F>(data: &[u8], workers: usize, parse: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(&str) -> Result<T> + Sync,
{
    let ranges = split_ranges(data, workers);
    debug!(bytes = data.len(), ranges = ranges.len(), "parsing data lines");

    let batches: Vec<Vec<T>> = ranges
        .into_par_iter()
        .map(|(start, end)| {
            let text = as_text(&data[start..end])?;
            let mut batch = Vec::new();
            for line in text.lines() {
                let line = line.trim();
                if line.is_empty() || is_comment(line) {
                    continue;
                }
                batch.push(parse(line)?);
            }
            Ok(batch)
        })
        .collect::<Result<_>>()?;

    let total = batches.iter().map(Vec::len).sum();
    let mut out = Vec::new();
    out.try_reserve_exact(total).map_err(|_| SplaError::OutOfMemory)?;
    report_allocation("parsed entries", total * std::mem::size_of::<T>());
    for batch in batches {
        out.extend(batch);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_ranges_align_to_lines() {
        let data = b"1 2\n3 4\n5 6\n7 8\n";
        let ranges = split_ranges(data, 3);
        assert_eq!(ranges.first().map(|r| r.0), Some(0));
        assert_eq!(ranges.last().map(|r| r.1), Some(data.len()));
        for &(start, _) in &ranges[1..] {
            assert_eq!(data[start - 1], b'\n');
        }

        assert_eq!(split_ranges(b"", 4), vec![(0, 0)]);
        assert_eq!(split_ranges(b"1 2", 4), vec![(0, 3)]);
    }

    #[test]
    fn test_parse_lines_keeps_order() {
        let data = b"% comment\n1\n\n2\n# other\n3\n4\n5\n";
        for workers in 1..6 {
            let out = parse_lines(data, workers, |l| l.parse::<u32>().map_err(|_| SplaError::Parse)).unwrap();
            assert_eq!(out, vec![1, 2, 3, 4, 5]);
        }
        let bad = parse_lines(b"1\nx\n", 2, |l| l.parse::<u32>().map_err(|_| SplaError::Parse));
        assert_eq!(bad, Err(SplaError::Parse));
    }

    #[test]
    fn test_read_header() {
        let text = b"%%MatrixMarket matrix coordinate real general\n% c\n\n2 3 1\n1 1 5\n";
        let header = read_header(text, FileFormat::Auto).unwrap();
        assert_eq!(header.size, Some((2, 3, Some(1))));
        assert_eq!(&text[header.data_offset..], b"1 1 5\n");

        let snap = read_header(b"# edges\n0 1\n", FileFormat::Auto).unwrap();
        assert!(snap.banner.is_none());
        assert_eq!(snap.data_offset, 0);

        assert_eq!(read_header(b"", FileFormat::Auto), Err(SplaError::Parse));
        assert_eq!(
            read_header(b"%%MatrixMarket matrix coordinate real general\n", FileFormat::Auto),
            Err(SplaError::Parse)
        );
    }
}

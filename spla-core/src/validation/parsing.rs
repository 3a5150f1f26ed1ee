//! Token parsing for text matrix formats
//!
//! Lines are split on ASCII whitespace. Index conversion between one- and
//! zero-based conventions is left to the caller.

use crate::{Result, SplaError};

/// One data line of a coordinate file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entry {
    pub row: usize,
    pub col: usize,
    /// `None` for pattern files
    pub value: Option<f64>,
}

/// Parse a usize from a string with error handling
pub fn parse_usize(s: &str) -> Result<usize> {
    if s.is_empty() {
        return Err(SplaError::Parse);
    }

    let mut result: usize = 0;

    for byte in s.bytes() {
        if !byte.is_ascii_digit() {
            return Err(SplaError::Parse);
        }

        let digit = (byte - b'0') as usize;

        if result > (usize::MAX - digit) / 10 {
            return Err(SplaError::Overflow);
        }

        result = result * 10 + digit;
    }

    Ok(result)
}

fn parse_value(s: &str) -> Result<f64> {
    s.parse::<f64>().map_err(|_| SplaError::Parse)
}

/// Parse the size line of a Matrix Market file
///
/// Coordinate files carry `m n entries`; array files carry `m n`, in which
/// case the entry count is `None`.
pub fn parse_size_line(line: &str) -> Result<(usize, usize, Option<usize>)> {
    let mut tokens = line.split_ascii_whitespace();
    let m = parse_usize(tokens.next().ok_or(SplaError::Parse)?)?;
    let n = parse_usize(tokens.next().ok_or(SplaError::Parse)?)?;
    let entries = match tokens.next() {
        Some(t) => Some(parse_usize(t)?),
        None => None,
    };
    if tokens.next().is_some() {
        return Err(SplaError::Parse);
    }
    Ok((m, n, entries))
}

/// Parse an `i j [v]` data line
///
/// With `pattern` set a trailing value is ignored; otherwise it is
/// required. Complex files carry an imaginary part that is skipped.
pub fn parse_entry(line: &str, pattern: bool) -> Result<Entry> {
    let mut tokens = line.split_ascii_whitespace();
    let row = parse_usize(tokens.next().ok_or(SplaError::Parse)?)?;
    let col = parse_usize(tokens.next().ok_or(SplaError::Parse)?)?;
    let value = if pattern {
        None
    } else {
        Some(parse_value(tokens.next().ok_or(SplaError::Parse)?)?)
    };
    Ok(Entry { row, col, value })
}

/// Parse the single value of an array-format data line
pub fn parse_array_value(line: &str) -> Result<f64> {
    let mut tokens = line.split_ascii_whitespace();
    parse_value(tokens.next().ok_or(SplaError::Parse)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_usize() {
        assert_eq!(parse_usize("0"), Ok(0));
        assert_eq!(parse_usize("65535"), Ok(65535));
        assert_eq!(parse_usize(""), Err(SplaError::Parse));
        assert_eq!(parse_usize("-1"), Err(SplaError::Parse));
        assert_eq!(parse_usize("99999999999999999999999"), Err(SplaError::Overflow));
    }

    #[test]
    fn test_parse_size_line() {
        assert_eq!(parse_size_line("3 4 5"), Ok((3, 4, Some(5))));
        assert_eq!(parse_size_line("  3\t4 "), Ok((3, 4, None)));
        assert_eq!(parse_size_line("3"), Err(SplaError::Parse));
        assert_eq!(parse_size_line("3 4 5 6"), Err(SplaError::Parse));
    }

    #[test]
    fn test_parse_entry() {
        assert_eq!(
            parse_entry("1 2 3.5", false),
            Ok(Entry { row: 1, col: 2, value: Some(3.5) })
        );
        assert_eq!(
            parse_entry("1 2", true),
            Ok(Entry { row: 1, col: 2, value: None })
        );
        assert_eq!(parse_entry("1 2", false), Err(SplaError::Parse));
        assert_eq!(parse_entry("1 x 2", false), Err(SplaError::Parse));
        assert_eq!(
            parse_entry("4 4 -1e-3 0.5", false),
            Ok(Entry { row: 4, col: 4, value: Some(-1e-3) })
        );
    }

    #[test]
    fn test_parse_array_value() {
        assert_eq!(parse_array_value(" 2.25 "), Ok(2.25));
        assert_eq!(parse_array_value(""), Err(SplaError::Parse));
    }
}

//! Matrix Market and edge-list file parser
//!
//! The header is read sequentially; data lines are then split into
//! newline-aligned byte ranges and parsed by a rayon worker pool. Parsed
//! entries are zero-based and validated against the declared size before
//! any [`Matrix`] is touched.
//!
//! ```no_run
//! use spla::{config::ParserConfig, Descriptor, Matrix};
//!
//! let a: Matrix<f64> = Matrix::from_file("web.mtx", &ParserConfig::default(), Descriptor::NO_OPERATION)?;
//! # Ok::<(), spla::SplaError>(())
//! ```

mod iterator;
mod reader;

pub use iterator::{Entries, PatternEntries};

use std::path::Path;

use spla_core::ops::RightAssign;
use spla_core::{
    parse_array_value, parse_entry, Descriptor, Element, Entry, Field, IndexType, Layout, MatrixMarketHeader,
    MatrixOperations, MatrixProperties, Result, SparseMatrix, SplaError, Symmetry,
};
use tracing::debug;

use crate::config::ParserConfig;
use crate::matrix::Matrix;
use iterator::RawEntry;

/// A parsed input file: its properties and its stored entries
#[derive(Debug, Clone)]
pub struct MatrixFile {
    properties: MatrixProperties,
    entries: Vec<RawEntry>,
}

impl MatrixFile {
    /// Read and parse the file at `path`
    ///
    /// Fails with `Io` if the file cannot be read, `Parse` on malformed or
    /// inconsistent content and `Unsupported` for complex-valued files.
    pub fn open<P: AsRef<Path>>(path: P, config: &ParserConfig) -> Result<Self> {
        let path = path.as_ref();
        let source = reader::load(path)?;
        Self::parse_bytes(&path.display().to_string(), source.bytes(), config)
    }

    /// Parse file contents held in memory; `name` is recorded as the filename
    pub fn parse_bytes(name: &str, bytes: &[u8], config: &ParserConfig) -> Result<Self> {
        let header = reader::read_header(bytes, config.format)?;
        let data = &bytes[header.data_offset..];
        let workers = config.effective_workers(data.len());

        let file = match (header.banner, header.size) {
            (Some(banner), Some((m, n, entries))) => matrix_market(name, banner, m, n, entries, data, workers)?,
            _ => edge_list(name, data, workers, config.one_based)?,
        };
        let p = &file.properties;
        debug!(
            filename = %p.filename,
            m = p.m,
            n = p.n,
            nz = p.nz,
            entries = p.entries,
            symmetry = ?p.symmetry,
            pattern = p.pattern,
            workers,
            "parsed matrix file"
        );
        Ok(file)
    }

    pub fn properties(&self) -> &MatrixProperties {
        &self.properties
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.properties.m
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.properties.n
    }

    /// Number of nonzeroes after symmetric expansion
    #[inline]
    pub fn nnz(&self) -> usize {
        self.properties.nz
    }

    /// Iterate `((row, col), value)` with zero-based indices
    ///
    /// Pattern files yield the value `1`.
    pub fn iter(&self) -> Entries<'_> {
        Entries::new(&self.entries, self.properties.symmetry)
    }

    /// Iterate `(row, col)` with zero-based indices
    pub fn iter_pattern(&self) -> PatternEntries<'_> {
        PatternEntries::new(&self.entries, self.properties.symmetry)
    }

    /// Build a matrix from the parsed entries
    ///
    /// Without `no_duplicates` repeated coordinates keep the value read last.
    pub fn to_matrix<T: Element, I: IndexType>(&self, descr: Descriptor) -> Result<Matrix<T, I>> {
        let mut a = Matrix::new(self.nrows(), self.ncols());
        let triples = self.iter().map(|((i, j), v)| (i, j, T::from_f64(v)));
        if descr.contains(Descriptor::NO_DUPLICATES) {
            a.build_matrix_unique(triples, descr)?;
        } else {
            a.build_matrix(triples, &RightAssign::<f64>::new(), descr)?;
        }
        Ok(a)
    }
}

impl<T: Element, I: IndexType> Matrix<T, I> {
    /// Read a Matrix Market file or an edge list into a new matrix
    pub fn from_file<P: AsRef<Path>>(path: P, config: &ParserConfig, descr: Descriptor) -> Result<Self> {
        MatrixFile::open(path, config)?.to_matrix(descr)
    }
}

/// Lookups scan the parsed entries; a repeated coordinate reads the value
/// stored last, as [`MatrixFile::to_matrix`] keeps it.
impl SparseMatrix for MatrixFile {
    type Element = f64;

    fn get_element(&self, row: usize, col: usize) -> Option<f64> {
        self.iter().filter(|&(ij, _)| ij == (row, col)).last().map(|(_, v)| v)
    }

    fn dimensions(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }

    fn nnz(&self) -> usize {
        self.properties.nz
    }
}

impl MatrixOperations for MatrixFile {
    fn get_row(&self, row_index: usize) -> Vec<(usize, f64)> {
        let mut row: Vec<_> = self.iter().filter(|&((i, _), _)| i == row_index).map(|((_, j), v)| (j, v)).collect();
        row.sort_by_key(|&(j, _)| j);
        row
    }

    fn get_col(&self, col_index: usize) -> Vec<(usize, f64)> {
        let mut col: Vec<_> = self.iter().filter(|&((_, j), _)| j == col_index).map(|((i, _), v)| (i, v)).collect();
        col.sort_by_key(|&(i, _)| i);
        col
    }
}

fn mirrored_nz(entries: &[RawEntry], symmetry: Symmetry) -> usize {
    if symmetry.is_mirrored() {
        entries.len() + entries.iter().filter(|&&(i, j, _)| i != j).count()
    } else {
        entries.len()
    }
}

/// Coordinates of an array file in storage order
fn array_positions(m: usize, n: usize, symmetry: Symmetry) -> impl Iterator<Item = (usize, usize)> {
    (0..n).flat_map(move |j| {
        // mirrored layouts store the lower triangle only
        let first = match symmetry {
            Symmetry::General => 0,
            Symmetry::SkewSymmetric => j + 1,
            Symmetry::Symmetric | Symmetry::Hermitian => j,
        };
        (first..m).map(move |i| (i, j))
    })
}

fn matrix_market(
    name: &str,
    banner: MatrixMarketHeader,
    m: usize,
    n: usize,
    declared: Option<usize>,
    data: &[u8],
    workers: usize,
) -> Result<MatrixFile> {
    if banner.field == Field::Complex {
        return Err(SplaError::Unsupported);
    }
    if banner.symmetry.is_mirrored() && m != n {
        return Err(SplaError::Parse);
    }
    let pattern = banner.field == Field::Pattern;

    let entries: Vec<RawEntry> = match banner.layout {
        Layout::Coordinate => {
            let declared = declared.ok_or(SplaError::Parse)?;
            let entries = reader::parse_lines(data, workers, |line| {
                let Entry { row, col, value } = parse_entry(line, pattern)?;
                if row == 0 || col == 0 || row > m || col > n {
                    return Err(SplaError::Parse);
                }
                Ok((row - 1, col - 1, value.unwrap_or(1.0)))
            })?;
            if entries.len() != declared {
                return Err(SplaError::Parse);
            }
            entries
        }
        Layout::Array => {
            if declared.is_some() {
                return Err(SplaError::Parse);
            }
            let values = reader::parse_lines(data, workers, parse_array_value)?;
            let positions: Vec<(usize, usize)> = array_positions(m, n, banner.symmetry).collect();
            if values.len() != positions.len() {
                return Err(SplaError::Parse);
            }
            positions.into_iter().zip(values).map(|((i, j), v)| (i, j, v)).collect()
        }
    };

    Ok(MatrixFile {
        properties: MatrixProperties {
            filename: name.to_string(),
            m,
            n,
            nz: mirrored_nz(&entries, banner.symmetry),
            entries: entries.len(),
            symmetry: banner.symmetry,
            one_based: true,
            pattern,
        },
        entries,
    })
}

/// Parse an edge list; the matrix is square, sized by the largest index
fn edge_list(name: &str, data: &[u8], workers: usize, one_based: bool) -> Result<MatrixFile> {
    let parsed = reader::parse_lines(data, workers, |line| {
        let Entry { row, col, .. } = parse_entry(line, true)?;
        let value = match line.split_ascii_whitespace().nth(2) {
            Some(token) => Some(parse_array_value(token)?),
            None => None,
        };
        Ok((row, col, value))
    })?;

    let pattern = parsed.iter().all(|&(_, _, v)| v.is_none());
    let shift = usize::from(one_based);
    let mut entries = Vec::new();
    entries
        .try_reserve_exact(parsed.len())
        .map_err(|_| SplaError::OutOfMemory)?;
    let mut dim = 0usize;
    for (row, col, value) in parsed {
        if row < shift || col < shift {
            return Err(SplaError::Parse);
        }
        let (i, j) = (row - shift, col - shift);
        dim = dim.max(i + 1).max(j + 1);
        entries.push((i, j, value.unwrap_or(1.0)));
    }

    Ok(MatrixFile {
        properties: MatrixProperties {
            filename: name.to_string(),
            m: dim,
            n: dim,
            nz: entries.len(),
            entries: entries.len(),
            symmetry: Symmetry::General,
            one_based,
            pattern,
        },
        entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileFormat;
    use std::path::PathBuf;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("spla-{}-{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn parse(text: &str) -> Result<MatrixFile> {
        MatrixFile::parse_bytes("inline", text.as_bytes(), &ParserConfig::default())
    }

    const GENERAL: &str = "%%MatrixMarket matrix coordinate real general\n\
                           % a comment\n\
                           3 3 4\n\
                           1 1 1.0\n\
                           1 3 2\n\
                           2 2 3e0\n\
                           3 1 -4\n";

    #[test]
    fn test_from_file_general() {
        let path = temp_file("general.mtx", GENERAL);
        let a: Matrix<f64> = Matrix::from_file(&path, &ParserConfig::default(), Descriptor::NO_DUPLICATES).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!((a.nrows(), a.ncols(), a.nnz()), (3, 3, 4));
        assert_eq!(a.get(0, 2), Some(2.0));
        assert_eq!(a.get(2, 0), Some(-4.0));
        a.check_invariants().unwrap();
    }

    #[test]
    fn test_properties() {
        let file = parse(GENERAL).unwrap();
        let p = file.properties();
        assert_eq!(p.filename, "inline");
        assert_eq!((p.m, p.n, p.nz, p.entries), (3, 3, 4, 4));
        assert!(p.one_based);
        assert!(!p.pattern);
        assert_eq!(p.symmetry, Symmetry::General);
        assert_eq!(file.iter().next(), Some(((0, 0), 1.0)));
    }

    #[test]
    fn test_symmetric_files() {
        let text = "%%MatrixMarket matrix coordinate real symmetric\n3 3 3\n1 1 1\n2 1 5\n3 3 2\n";
        let file = parse(text).unwrap();
        assert_eq!(file.nnz(), 4);
        assert_eq!(file.properties().entries, 3);
        let a: Matrix<f64> = file.to_matrix(Descriptor::NO_OPERATION).unwrap();
        assert_eq!(a.get(0, 1), Some(5.0));
        assert_eq!(a.get(1, 0), Some(5.0));
        assert_eq!(a.nnz(), 4);

        let skew = text.replace("symmetric", "skew-symmetric");
        let a: Matrix<i32> = parse(&skew).unwrap().to_matrix(Descriptor::NO_OPERATION).unwrap();
        assert_eq!(a.get(1, 0), Some(5));
        assert_eq!(a.get(0, 1), Some(-5));

        let rect = "%%MatrixMarket matrix coordinate real symmetric\n2 3 1\n1 1 1\n";
        assert_eq!(parse(rect).err(), Some(SplaError::Parse));
    }

    fn same_rows<A, B>(a: &A, b: &B) -> bool
    where
        A: MatrixOperations<Element = f64>,
        B: MatrixOperations<Element = f64>,
    {
        let (m, n) = a.dimensions();
        (m, n) == b.dimensions()
            && SparseMatrix::nnz(a) == SparseMatrix::nnz(b)
            && (0..m).all(|i| a.get_row(i) == b.get_row(i))
            && (0..n).all(|j| a.get_col(j) == b.get_col(j))
    }

    #[test]
    fn test_file_views_match_matrix() {
        let text = "%%MatrixMarket matrix coordinate real symmetric\n3 3 3\n1 1 1\n2 1 5\n3 3 2\n";
        let file = parse(text).unwrap();
        assert_eq!(file.get_row(0), vec![(0, 1.0), (1, 5.0)]);
        assert_eq!(file.get_col(2), vec![(2, 2.0)]);
        assert_eq!(file.get_element(0, 1), Some(5.0));
        assert_eq!(file.get_element(0, 2), None);

        let a: Matrix<f64> = file.to_matrix(Descriptor::NO_OPERATION).unwrap();
        assert!(same_rows(&file, &a));

        let repeated = parse("%%MatrixMarket matrix coordinate real general\n2 2 2\n1 1 1\n1 1 7\n").unwrap();
        assert_eq!(repeated.get_element(0, 0), Some(7.0));
        let b: Matrix<f64> = repeated.to_matrix(Descriptor::NO_OPERATION).unwrap();
        assert_eq!(b.get_element(0, 0), Some(7.0));
        assert_eq!(SparseMatrix::nnz(&repeated), 2);
        assert_eq!(SparseMatrix::nnz(&b), 1);
    }

    #[test]
    fn test_pattern_file() {
        let text = "%%MatrixMarket matrix coordinate pattern general\n2 2 2\n1 2\n2 1\n";
        let file = parse(text).unwrap();
        assert!(file.properties().pattern);
        assert_eq!(file.iter_pattern().collect::<Vec<_>>(), vec![(0, 1), (1, 0)]);

        let p: Matrix<()> = file.to_matrix(Descriptor::NO_DUPLICATES).unwrap();
        assert_eq!(p.get(0, 1), Some(()));
        let ones: Matrix<u8, u16> = file.to_matrix(Descriptor::NO_DUPLICATES).unwrap();
        assert_eq!(ones.get(1, 0), Some(1));
    }

    #[test]
    fn test_array_file() {
        let text = "%%MatrixMarket matrix array real general\n2 2\n1\n2\n3\n4\n";
        let a: Matrix<f64> = parse(text).unwrap().to_matrix(Descriptor::NO_DUPLICATES).unwrap();
        assert_eq!(a.get(1, 0), Some(2.0));
        assert_eq!(a.get(0, 1), Some(3.0));
        assert_eq!(a.nnz(), 4);

        let sym = "%%MatrixMarket matrix array real symmetric\n2 2\n1\n2\n4\n";
        let file = parse(sym).unwrap();
        assert_eq!(file.nnz(), 4);
        let a: Matrix<f64> = file.to_matrix(Descriptor::NO_DUPLICATES).unwrap();
        assert_eq!(a.get(0, 1), Some(2.0));
        assert_eq!(a.get(1, 1), Some(4.0));

        let short = "%%MatrixMarket matrix array real general\n2 2\n1\n2\n3\n";
        assert_eq!(parse(short).err(), Some(SplaError::Parse));
    }

    #[test]
    fn test_edge_list() {
        let text = "# graph\n0 1\n1 2\n2 0\n";
        let file = parse(text).unwrap();
        assert_eq!((file.nrows(), file.ncols(), file.nnz()), (3, 3, 3));
        assert!(file.properties().pattern);

        let config = ParserConfig::default()
            .with_format(FileFormat::Snap)
            .with_one_based(true);
        let file = MatrixFile::parse_bytes("one", b"1 2 0.5\n4 1 2\n", &config).unwrap();
        assert_eq!(file.nrows(), 4);
        assert!(!file.properties().pattern);
        assert_eq!(file.iter().collect::<Vec<_>>(), vec![((0, 1), 0.5), ((3, 0), 2.0)]);

        let zero = MatrixFile::parse_bytes("zero", b"0 1\n", &config);
        assert_eq!(zero.err(), Some(SplaError::Parse));
    }

    #[test]
    fn test_duplicates_keep_last() {
        let text = "%%MatrixMarket matrix coordinate integer general\n2 2 2\n1 1 1\n1 1 5\n";
        let a: Matrix<i64> = parse(text).unwrap().to_matrix(Descriptor::NO_OPERATION).unwrap();
        assert_eq!(a.nnz(), 1);
        assert_eq!(a.get(0, 0), Some(5));
    }

    #[test]
    fn test_malformed_inputs() {
        let short = "%%MatrixMarket matrix coordinate real general\n2 2 3\n1 1 1\n";
        assert_eq!(parse(short).err(), Some(SplaError::Parse));

        let zero_index = "%%MatrixMarket matrix coordinate real general\n2 2 1\n0 1 1\n";
        assert_eq!(parse(zero_index).err(), Some(SplaError::Parse));

        let out_of_range = "%%MatrixMarket matrix coordinate real general\n2 2 1\n3 1 1\n";
        assert_eq!(parse(out_of_range).err(), Some(SplaError::Parse));

        let complex = "%%MatrixMarket matrix coordinate complex general\n1 1 1\n1 1 1 0\n";
        assert_eq!(parse(complex).err(), Some(SplaError::Unsupported));

        let missing = std::env::temp_dir().join("spla-definitely-missing.mtx");
        assert_eq!(
            MatrixFile::open(missing, &ParserConfig::default()).err(),
            Some(SplaError::Io)
        );
    }

    #[test]
    fn test_parallel_ranges_agree() {
        let mut text = String::from("%%MatrixMarket matrix coordinate real general\n50 50 200\n");
        for k in 0..200 {
            text.push_str(&format!("{} {} {}\n", k % 50 + 1, (k * 7) % 50 + 1, k));
        }
        let path = temp_file("parallel.mtx", &text);
        let serial = MatrixFile::open(&path, &ParserConfig::default().with_workers(1)).unwrap();
        let parallel = MatrixFile::open(
            &path,
            &ParserConfig::default()
                .with_workers(8)
                .with_read_buffer_size(64),
        )
        .unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(
            serial.iter().collect::<Vec<_>>(),
            parallel.iter().collect::<Vec<_>>()
        );
        assert_eq!(parallel.nnz(), 200);
    }
}

//! Matrix layer: sparse matrix–matrix products and element-wise operations
//!
//! Every primitive that produces a new nonzero structure runs in two
//! phases. The symbolic phase counts the nonzeroes of each output row and
//! column using a scratch [`Coordinates`] set; the numeric phase writes
//! CRS and CCS together, the latter through per-column insertion cursors.

mod ewise;
mod mxm;

pub use ewise::{ewise_apply_matrix, ewise_apply_matrix_monoid};
pub use mxm::{mxm, mxm_phase, outer};

use spla_core::{cast, check_capacity, Descriptor, Element, IndexType, Result, SplaError};
use tracing::debug;

use crate::blas0::{domain_ok, ensure_no_casting};
use crate::coordinates::Coordinates;
use crate::matrix::Matrix;
use crate::storage::CompressedStorage;
use crate::vector::{Dimension, Vector};

/// Which part of a two-phase primitive to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Count the output nonzeroes and grow the output capacity
    Resize,
    /// Compute the output; the capacity must already suffice
    Execute,
}

/// Build the output matrix row by row
///
/// `row(i, scratch, values, numeric)` assigns the output columns of row
/// `i` in `scratch`; when `numeric` is set it also stores their values in
/// `values`, indexed by column. It is called once per row in each phase.
/// With `phase` absent both phases run.
pub(crate) fn assemble<T, I, D, F>(c: &mut Matrix<T, I>, phase: Option<Phase>, mut row: F) -> Result<()>
where
    T: Element,
    I: IndexType,
    D: Element,
    F: FnMut(usize, &mut Coordinates, &mut [D], bool),
{
    let (m, n) = (c.m, c.n);
    let mut scratch = Coordinates::try_new(n)?;
    let mut values: Vec<D> = vec![D::default(); n];

    let mut counts = vec![0usize; n + 1];
    let mut nnz = 0usize;
    for i in 0..m {
        scratch.clear();
        row(i, &mut scratch, &mut values, false);
        for &l in scratch.stack() {
            counts[l + 1] += 1;
        }
        nnz += scratch.nonzeroes();
    }
    check_capacity::<I>(nnz)?;
    debug!(nrows = m, ncols = n, nnz, capacity = c.capacity(), ?phase, "symbolic phase done");

    match phase {
        Some(Phase::Resize) => return c.resize(nnz),
        Some(Phase::Execute) if c.capacity() < nnz => {
            c.clear();
            return Err(SplaError::Illegal);
        }
        _ => c.resize(nnz)?,
    }

    c.clear();
    c.ccs.set_offsets_from_counts(&mut counts);
    let mut cursors = vec![0usize; n];
    let mut nzc = 0usize;
    for i in 0..m {
        scratch.clear();
        row(i, &mut scratch, &mut values, true);
        for &l in scratch.stack() {
            let value: T = cast(values[l]);
            c.crs.indices[nzc] = l;
            c.crs.values[nzc] = value;
            nzc += 1;

            let slot = c.ccs.offsets[l].to_usize() + cursors[l];
            cursors[l] += 1;
            c.ccs.indices[slot] = i;
            c.ccs.values[slot] = value;
        }
        c.crs.offsets[i + 1] = I::from_usize(nzc);
    }
    c.nz = nzc;
    Ok(())
}

/// Copy one compressed view into another with converted values
fn copy_view<T, I, S, J>(
    dst: &mut CompressedStorage<T, I>,
    src: &CompressedStorage<S, J>,
    mut convert: impl FnMut(S) -> T,
) where
    T: Element,
    I: IndexType,
    S: Element,
    J: IndexType,
{
    let nnz = src.nnz();
    for (o, s) in dst.offsets.iter_mut().zip(src.offsets()) {
        *o = I::from_usize(s.to_usize());
    }
    dst.indices[..nnz].copy_from_slice(src.indices());
    for (d, &s) in dst.values[..nnz].iter_mut().zip(src.values()) {
        *d = convert(s);
    }
}

/// Resize `c` for `a` and copy `a`'s structure with converted values
fn copy_structure<T, I, S, J>(c: &mut Matrix<T, I>, a: &Matrix<S, J>, mut convert: impl FnMut(S) -> T) -> Result<()>
where
    T: Element,
    I: IndexType,
    S: Element,
    J: IndexType,
{
    if c.m != a.m || c.n != a.n {
        return Err(SplaError::Mismatch);
    }
    check_capacity::<I>(a.nnz())?;
    c.resize(a.nnz())?;
    copy_view(&mut c.crs, &a.crs, &mut convert);
    copy_view(&mut c.ccs, &a.ccs, &mut convert);
    c.nz = a.nz;
    Ok(())
}

/// Make `c` a copy of `a`
///
/// Copying from a pattern matrix writes `1` at every nonzero.
pub fn set_matrix<T, I, S, J>(c: &mut Matrix<T, I>, a: &Matrix<S, J>, descr: Descriptor) -> Result<()>
where
    T: Element,
    I: IndexType,
    S: Element,
    J: IndexType,
{
    ensure_no_casting(descr, domain_ok::<S, T>())?;
    copy_structure(c, a, |x| if S::IS_PATTERN { T::from_f64(1.0) } else { cast(x) })
}

/// Give `c` the structure of `a` with `val` at every nonzero
pub fn set_matrix_value<T, I, S, J, V>(c: &mut Matrix<T, I>, a: &Matrix<S, J>, val: V, descr: Descriptor) -> Result<()>
where
    T: Element,
    I: IndexType,
    S: Element,
    J: IndexType,
    V: Element,
{
    ensure_no_casting(descr, domain_ok::<V, T>())?;
    let val: T = cast(val);
    copy_structure(c, a, |_| val)
}

/// Coordinate `x` if it lies in `0..bound`
fn coordinate<X: Element>(x: X, bound: usize) -> Result<usize> {
    match usize::try_from(x.to_i128()) {
        Ok(i) if i < bound => Ok(i),
        _ => Err(SplaError::Mismatch),
    }
}

/// Collect `(row, col, value)` triples from three vectors sharing one index set
///
/// Under `no_casting` the coordinate vectors must hold integers.
fn zipped_triples<R, C, T>(
    m: usize,
    n: usize,
    rows: &Vector<R>,
    cols: &Vector<C>,
    descr: Descriptor,
    mut value: impl FnMut(usize) -> T,
) -> Result<Vec<(usize, usize, T)>>
where
    R: Element,
    C: Element,
{
    if rows.size() != cols.size() {
        return Err(SplaError::Mismatch);
    }
    ensure_no_casting(descr, R::IS_INTEGRAL && C::IS_INTEGRAL)?;
    if rows.nnz() != cols.nnz() || rows.coords.stack().iter().any(|&k| !cols.assigned(k)) {
        return Err(SplaError::Illegal);
    }
    let mut stack = rows.coords.stack().to_vec();
    stack.sort_unstable();
    let mut triples = Vec::with_capacity(stack.len());
    for k in stack {
        let i = coordinate(rows.values[k], m)?;
        let j = coordinate(cols.values[k], n)?;
        triples.push((i, j, value(k)));
    }
    Ok(triples)
}

fn ingest_within_capacity<T: Element, I: IndexType>(c: &mut Matrix<T, I>, triples: Vec<(usize, usize, T)>) -> Result<()> {
    if c.capacity() < triples.len() {
        return Err(SplaError::Failed);
    }
    c.build_matrix_unique(triples, Descriptor::NO_DUPLICATES)
}

/// Build `c` from coordinate vectors `rows`, `cols` and value vector `vals`
///
/// The three vectors must share one index set (`Illegal` otherwise); the
/// `k`-th nonzero is `(rows[k], cols[k], vals[k])`. `c` must already have
/// the capacity (`Failed` otherwise) and coordinates must be unique.
pub fn zip_matrix<T, I, R, C, V>(
    c: &mut Matrix<T, I>,
    rows: &Vector<R>,
    cols: &Vector<C>,
    vals: &Vector<V>,
    descr: Descriptor,
) -> Result<()>
where
    T: Element,
    I: IndexType,
    R: Element,
    C: Element,
    V: Element,
{
    if vals.size() != rows.size() {
        return Err(SplaError::Mismatch);
    }
    ensure_no_casting(descr, domain_ok::<V, T>())?;
    if vals.nnz() != rows.nnz() || rows.coords.stack().iter().any(|&k| !vals.assigned(k)) {
        return Err(SplaError::Illegal);
    }
    let triples = zipped_triples(c.m, c.n, rows, cols, descr, |k| cast::<V, T>(vals.values[k]))?;
    ingest_within_capacity(c, triples)
}

/// Build a pattern matrix from coordinate vectors; see [`zip_matrix`]
pub fn zip_pattern<I, R, C>(c: &mut Matrix<(), I>, rows: &Vector<R>, cols: &Vector<C>, descr: Descriptor) -> Result<()>
where
    I: IndexType,
    R: Element,
    C: Element,
{
    let triples = zipped_triples(c.m, c.n, rows, cols, descr, |_| ())?;
    ingest_within_capacity(c, triples)
}

/// Call `f(i, j, &mut a[i][j])` for every stored nonzero
///
/// Edits are value-only; the column view is refreshed afterwards. Each of
/// `others` must match either dimension of `a`.
pub fn ewise_lambda_matrix<T, I, F>(mut f: F, a: &mut Matrix<T, I>, others: &[&dyn Dimension]) -> Result<()>
where
    T: Element,
    I: IndexType,
    F: FnMut(usize, usize, &mut T),
{
    if others.iter().any(|o| o.dimension() != a.m && o.dimension() != a.n) {
        return Err(SplaError::Mismatch);
    }
    for i in 0..a.m {
        for p in a.crs.range(i) {
            let j = a.crs.indices[p];
            f(i, j, &mut a.crs.values[p]);
        }
    }
    a.sync_ccs_from_crs();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Matrix<f64> {
        Matrix::from_triples(2, 3, vec![(0, 2, 1.5), (1, 0, 2.5), (0, 0, 3.5)]).unwrap()
    }

    #[test]
    fn test_set_matrix_copies() {
        let a = sample();
        let mut c = Matrix::<f32, u32>::new(2, 3);
        set_matrix(&mut c, &a, Descriptor::NO_OPERATION).unwrap();
        assert_eq!(c.nnz(), 3);
        assert_eq!(c.get(1, 0), Some(2.5));
        c.check_invariants().unwrap();

        let mut wrong = Matrix::<f32>::new(3, 3);
        assert_eq!(set_matrix(&mut wrong, &a, Descriptor::NO_OPERATION), Err(SplaError::Mismatch));
    }

    #[test]
    fn test_set_matrix_from_pattern() {
        let p = Matrix::<()>::from_triples(2, 2, vec![(0, 1, ()), (1, 1, ())]).unwrap();
        let mut c = Matrix::<i32>::new(2, 2);
        set_matrix(&mut c, &p, Descriptor::NO_OPERATION).unwrap();
        assert_eq!(c.get(0, 1), Some(1));
        assert_eq!(c.get(1, 1), Some(1));
        c.check_invariants().unwrap();
    }

    #[test]
    fn test_set_matrix_value() {
        let a = sample();
        let mut c = Matrix::<u8>::new(2, 3);
        set_matrix_value(&mut c, &a, 7u8, Descriptor::NO_OPERATION).unwrap();
        assert!(c.iter().all(|(_, _, v)| v == 7));
        assert_eq!(c.nnz(), 3);
        c.check_invariants().unwrap();
    }

    #[test]
    fn test_zip_matrix() {
        let rows = Vector::from_dense(&[0usize, 1, 1]);
        let cols = Vector::from_dense(&[2usize, 0, 1]);
        let vals = Vector::from_dense(&[1.0f64, 2.0, 3.0]);

        let mut c = Matrix::<f64>::new(2, 3);
        assert_eq!(
            zip_matrix(&mut c, &rows, &cols, &vals, Descriptor::NO_OPERATION),
            Err(SplaError::Failed)
        );

        c.resize(3).unwrap();
        zip_matrix(&mut c, &rows, &cols, &vals, Descriptor::NO_OPERATION).unwrap();
        assert_eq!(c.get(1, 1), Some(3.0));
        assert_eq!(c.nnz(), 3);
        c.check_invariants().unwrap();

        let sparse_vals = Vector::from_entries(3, vec![(0, 1.0f64)]).unwrap();
        assert_eq!(
            zip_matrix(&mut c, &rows, &cols, &sparse_vals, Descriptor::NO_OPERATION),
            Err(SplaError::Illegal)
        );
    }

    #[test]
    fn test_zip_pattern() {
        let rows = Vector::from_dense(&[1u32, 0]);
        let cols = Vector::from_dense(&[1u32, 1]);
        let mut c = Matrix::<()>::with_capacity(2, 2, 2).unwrap();
        zip_pattern(&mut c, &rows, &cols, Descriptor::NO_OPERATION).unwrap();
        assert_eq!(c.get(0, 1), Some(()));
        assert_eq!(c.get(1, 0), None);

        let out_of_range = Vector::from_dense(&[5u32, 0]);
        assert_eq!(
            zip_pattern(&mut c, &out_of_range, &cols, Descriptor::NO_OPERATION),
            Err(SplaError::Mismatch)
        );
    }

    #[test]
    fn test_no_casting_on_copies_and_zips() {
        let a = Matrix::<f64>::from_triples(2, 2, vec![(0, 0, 1.5)]).unwrap();
        let mut c = Matrix::<i32>::new(2, 2);
        assert_eq!(set_matrix(&mut c, &a, Descriptor::NO_CASTING), Err(SplaError::Illegal));
        assert_eq!(set_matrix_value(&mut c, &a, 2.0f32, Descriptor::NO_CASTING), Err(SplaError::Illegal));
        assert_eq!(c.nnz(), 0);
        set_matrix_value(&mut c, &a, 2i32, Descriptor::NO_CASTING).unwrap();
        assert_eq!(c.get(0, 0), Some(2));

        let mut same = Matrix::<f64>::new(2, 2);
        set_matrix(&mut same, &a, Descriptor::NO_CASTING).unwrap();
        assert_eq!(same.get(0, 0), Some(1.5));
        let pattern = Matrix::<()>::from_triples(2, 2, vec![(1, 1, ())]).unwrap();
        set_matrix(&mut c, &pattern, Descriptor::NO_CASTING).unwrap();
        assert_eq!(c.get(1, 1), Some(1));

        let rows = Vector::from_dense(&[0usize, 1]);
        let cols = Vector::from_dense(&[1usize, 0]);
        let vals = Vector::from_dense(&[0.5f32, 0.25]);
        let mut z = Matrix::<f64>::with_capacity(2, 2, 2).unwrap();
        assert_eq!(
            zip_matrix(&mut z, &rows, &cols, &vals, Descriptor::NO_CASTING),
            Err(SplaError::Illegal)
        );
        assert_eq!(z.nnz(), 0);
        zip_matrix(&mut z, &rows, &cols, &vals, Descriptor::NO_OPERATION).unwrap();
        assert_eq!(z.get(0, 1), Some(0.5));

        let float_rows = Vector::from_dense(&[0.0f64, 1.0]);
        let mut p = Matrix::<()>::with_capacity(2, 2, 2).unwrap();
        assert_eq!(
            zip_pattern(&mut p, &float_rows, &cols, Descriptor::NO_CASTING),
            Err(SplaError::Illegal)
        );
        zip_pattern(&mut p, &rows, &cols, Descriptor::NO_CASTING).unwrap();
        assert_eq!(p.nnz(), 2);
    }

    #[test]
    fn test_zip_rejects_negative_coordinates() {
        let rows = Vector::from_dense(&[-1i32, 0]);
        let cols = Vector::from_dense(&[0i32, 1]);
        let mut p = Matrix::<()>::with_capacity(2, 2, 2).unwrap();
        assert_eq!(zip_pattern(&mut p, &rows, &cols, Descriptor::NO_OPERATION), Err(SplaError::Mismatch));
    }

    #[test]
    fn test_ewise_lambda_matrix() {
        let mut a = sample();
        let scale = Vector::from_dense(&[10.0f64, 100.0]);
        ewise_lambda_matrix(
            |i, _, v| {
                if let Some(s) = scale.get(i) {
                    *v *= s;
                }
            },
            &mut a,
            &[&scale],
        )
        .unwrap();
        assert_eq!(a.get(0, 2), Some(15.0));
        assert_eq!(a.get(1, 0), Some(250.0));
        a.check_invariants().unwrap();

        let bad = Vector::<f64>::new(5);
        assert_eq!(ewise_lambda_matrix(|_, _, _| {}, &mut a, &[&bad]), Err(SplaError::Mismatch));
    }
}

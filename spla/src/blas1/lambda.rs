//! User callbacks over assigned indices

use spla_core::{Element, Result, SplaError};

use crate::vector::{Dimension, Vector};

/// Call `f(i, &mut x[i])` for every assigned index of `x`
///
/// `others` are the vectors `f` reads through its captures; they only have
/// their dimensions checked against `x`.
pub fn ewise_lambda<T, F>(mut f: F, x: &mut Vector<T>, others: &[&dyn Dimension]) -> Result<()>
where
    T: Element,
    F: FnMut(usize, &mut T),
{
    if others.iter().any(|o| o.dimension() != x.size()) {
        return Err(SplaError::Mismatch);
    }
    let Vector { values, coords } = x;
    for &i in coords.stack() {
        f(i, &mut values[i]);
    }
    Ok(())
}

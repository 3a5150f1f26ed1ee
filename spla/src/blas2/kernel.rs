//! Generic sparse matrix–vector kernel
//!
//! One kernel serves `mxv` and `vxm` in every masking combination. It picks
//! between a gather traversal (one output row at a time, parallel over row
//! chunks) and a scatter traversal (one input nonzero at a time) from a
//! cost estimate.

use rayon::prelude::*;
use spla_core::format::constants::GATHER_CHUNK_ROWS;
use spla_core::{cast, same_domain, BinaryOperator, Descriptor, Element, IndexType, Monoid, Result, SplaError};
use tracing::{debug, trace};

use crate::blas0::{copy_or_apply_with_identity, domain_ok, ensure_no_casting, value_or_index, Side};
use crate::blas1::{admits, candidates, check_mask};
use crate::coordinates::{Coordinates, Update};
use crate::matrix::Matrix;
use crate::vector::Vector;

/// Operand order of the multiplication
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Hand {
    /// `a ⊗ v`, as in `mxv`
    Right,
    /// `v ⊗ a`, as in `vxm`
    Left,
}

/// Traversal chosen for one call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Strategy {
    Gather,
    Scatter,
}

/// Pick the cheaper traversal
///
/// Gather touches `gather_rows` rows of average length `nnz / nrows`;
/// scatter touches `scatter_inputs` columns of average length
/// `nnz / ncols`. Both sides are scaled by `nrows · ncols`, and ties go to
/// gather.
pub(crate) fn choose_strategy(gather_rows: usize, scatter_inputs: usize, nrows: usize, ncols: usize) -> Strategy {
    let gather = gather_rows as u128 * ncols as u128;
    let scatter = scatter_inputs as u128 * nrows as u128;
    if scatter < gather {
        Strategy::Scatter
    } else {
        Strategy::Gather
    }
}

/// `u ⊕= eff(A) · v` under `(add, mul)`
///
/// `eff(A)` is `A` for a right-handed call and `Aᵀ` for a left-handed one,
/// toggled by `transpose_matrix`. `mask` and `v_mask` follow the same
/// descriptor; an empty vector stands for an absent mask.
#[allow(clippy::too_many_arguments)]
pub(crate) fn spmv<T, M, A, I, V, VM, Add, Mul>(
    u: &mut Vector<T>,
    mask: &Vector<M>,
    a: &Matrix<A, I>,
    v: &Vector<V>,
    v_mask: &Vector<VM>,
    add: &Add,
    mul: &Mul,
    one: Mul::D3,
    descr: Descriptor,
    hand: Hand,
) -> Result<()>
where
    T: Element,
    M: Element,
    A: Element,
    I: IndexType,
    V: Element,
    VM: Element,
    Add: Monoid,
    Mul: BinaryOperator,
{
    let transposed = match hand {
        Hand::Right => descr.is_transposed(),
        Hand::Left => !descr.is_transposed(),
    };
    let view = a.view(transposed);
    if u.size() != view.nrows || v.size() != view.ncols {
        return Err(SplaError::Mismatch);
    }
    check_mask(mask, u.size())?;
    check_mask(v_mask, v.size())?;
    let operands_ok = match hand {
        Hand::Right => domain_ok::<A, Mul::D1>() && domain_ok::<V, Mul::D2>(),
        Hand::Left => domain_ok::<V, Mul::D1>() && domain_ok::<A, Mul::D2>(),
    };
    ensure_no_casting(
        descr,
        operands_ok && same_domain::<Mul::D3, Add::D2>() && same_domain::<T, Add::D3>(),
    )?;

    let add_identity = descr.contains(Descriptor::ADD_IDENTITY);
    let explicit_zero = descr.contains(Descriptor::EXPLICIT_ZERO);
    let use_index = descr.contains(Descriptor::USE_INDEX);
    let dense = descr.is_dense();
    let inverted = descr.is_inverted_mask();
    let masked = !mask.is_absent_mask();
    let input_masked = !v_mask.is_absent_mask();

    let trivial = v.nnz() == 0
        || view.nrows == 0
        || view.ncols == 0
        || (a.nnz() == 0 && !add_identity)
        || (masked && !inverted && mask.nnz() == 0)
        || (input_masked && !inverted && v_mask.nnz() == 0);
    if trivial {
        trace!(
            nrows = view.nrows,
            ncols = view.ncols,
            v_nnz = v.nnz(),
            a_nnz = a.nnz(),
            "trivial spmv"
        );
        finish_trivial(u, mask, add, descr);
        return Ok(());
    }

    let one_d1: Mul::D1 = cast(one);
    let one_d2: Mul::D2 = cast(one);
    let product = |a_val: A, v_val: V, k: usize| -> Add::D2 {
        let t = match hand {
            Hand::Right => mul.apply(
                value_or_index(false, a_val, k, one_d1),
                value_or_index(use_index, v_val, k, one_d2),
            ),
            Hand::Left => mul.apply(
                value_or_index(use_index, v_val, k, one_d1),
                value_or_index(false, a_val, k, one_d2),
            ),
        };
        cast(t)
    };
    // Diagonal of the implicit identity, combined with v[k]
    let lift = |v_val: V, k: usize| -> Add::D2 {
        match hand {
            Hand::Right => {
                let x: Mul::D2 = value_or_index(use_index, v_val, k, one_d2);
                copy_or_apply_with_identity(x, mul, one, Side::Left)
            }
            Hand::Left => {
                let x: Mul::D1 = value_or_index(use_index, v_val, k, one_d1);
                copy_or_apply_with_identity(x, mul, one, Side::Right)
            }
        }
    };
    let input_ok = |k: usize| (dense || v.assigned(k)) && (!input_masked || v_mask.mask_at(descr, k));
    let output_ok = |i: usize| !masked || mask.mask_at(descr, i);
    let settled = |assigned: bool, current: T| {
        add.has_immutable_nonzeroes() && assigned && !add.is_identity(cast(current))
    };
    let merge = |assigned: bool, current: T, t: Add::D2| -> T {
        if assigned {
            cast(add.apply(cast(current), t))
        } else {
            cast(add.apply(cast(add.identity()), t))
        }
    };

    let gather_rows = if masked && !inverted { mask.nnz() } else { view.nrows };
    let scatter_inputs = if input_masked && !inverted {
        v.nnz().min(v_mask.nnz())
    } else {
        v.nnz()
    };
    let strategy = choose_strategy(gather_rows, scatter_inputs, view.nrows, view.ncols);
    debug!(
        ?strategy,
        ?hand,
        gather_rows,
        scatter_inputs,
        nrows = view.nrows,
        ncols = view.ncols,
        "spmv"
    );

    match strategy {
        Strategy::Gather => {
            let gather_row = |i: usize| -> Option<Add::D3> {
                let mut acc = add.identity();
                let mut touched = false;
                if add_identity && i < view.ncols && input_ok(i) {
                    acc = add.apply(cast(acc), lift(v.values[i], i));
                    touched = true;
                }
                for (k, a_val) in view.rows.entries(i) {
                    if input_ok(k) {
                        acc = add.apply(cast(acc), product(a_val, v.values[k], k));
                        touched = true;
                    }
                }
                (touched || explicit_zero).then_some(acc)
            };

            if masked && !inverted {
                for &i in mask.coords.stack() {
                    if !mask.mask_at(descr, i) {
                        continue;
                    }
                    let assigned = u.assigned(i);
                    if settled(assigned, u.values[i]) {
                        continue;
                    }
                    if let Some(acc) = gather_row(i) {
                        let value = merge(assigned, u.values[i], cast(acc));
                        u.put(i, value);
                    }
                }
            } else {
                let Vector { values, coords } = &mut *u;
                let shared: &Coordinates = coords;
                let updates: Vec<Update> = values
                    .par_chunks_mut(GATHER_CHUNK_ROWS)
                    .enumerate()
                    .map(|(c, chunk)| {
                        let base = c * GATHER_CHUNK_ROWS;
                        let mut update = Update::new();
                        for (r, slot) in chunk.iter_mut().enumerate() {
                            let i = base + r;
                            if !output_ok(i) || settled(shared.assigned(i), *slot) {
                                continue;
                            }
                            if let Some(acc) = gather_row(i) {
                                let assigned = shared.async_assign(i, &mut update);
                                *slot = merge(assigned, *slot, cast(acc));
                            }
                        }
                        update
                    })
                    .collect();
                for update in updates {
                    coords.join_update(update);
                }
            }
        }
        Strategy::Scatter => {
            let inputs: &[usize] = if input_masked && !inverted && v_mask.nnz() < v.nnz() {
                v_mask.coords.stack()
            } else {
                v.coords.stack()
            };
            for &k in inputs {
                if !input_ok(k) {
                    continue;
                }
                let v_val = v.values[k];
                if add_identity && k < view.nrows && output_ok(k) {
                    let assigned = u.assigned(k);
                    if !settled(assigned, u.values[k]) {
                        let value = merge(assigned, u.values[k], lift(v_val, k));
                        u.put(k, value);
                    }
                }
                for (i, a_val) in view.cols.entries(k) {
                    if !output_ok(i) {
                        continue;
                    }
                    let assigned = u.assigned(i);
                    if settled(assigned, u.values[i]) {
                        continue;
                    }
                    let value = merge(assigned, u.values[i], product(a_val, v_val, k));
                    u.put(i, value);
                }
            }
            if explicit_zero {
                let zero: T = cast(add.identity());
                let n = u.size();
                for i in candidates(mask, descr, || (0..n).collect()) {
                    if admits(mask, descr, i) && !u.assigned(i) {
                        u.put(i, zero);
                    }
                }
            }
        }
    }
    Ok(())
}

/// Output update when the product is structurally empty
///
/// Assigned entries absorb the additive identity; under `explicit_zero`
/// every admitted unassigned entry receives it.
fn finish_trivial<T: Element, M: Element, Add: Monoid>(
    u: &mut Vector<T>,
    mask: &Vector<M>,
    add: &Add,
    descr: Descriptor,
) {
    let zero = add.identity();
    for &i in u.coords.stack() {
        if admits(mask, descr, i) {
            u.values[i] = cast(add.apply(cast(u.values[i]), cast(zero)));
        }
    }
    if descr.contains(Descriptor::EXPLICIT_ZERO) {
        let n = u.size();
        for i in candidates(mask, descr, || (0..n).collect()) {
            if admits(mask, descr, i) && !u.assigned(i) {
                u.put(i, cast(zero));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choose_strategy() {
        // full output, one input nonzero: scatter
        assert_eq!(choose_strategy(1000, 1, 1000, 1000), Strategy::Scatter);
        // one masked output row, dense input: gather
        assert_eq!(choose_strategy(1, 1000, 1000, 1000), Strategy::Gather);
        // tie
        assert_eq!(choose_strategy(10, 10, 10, 10), Strategy::Gather);
        // wide matrix: rows are long, columns short
        assert_eq!(choose_strategy(10, 100, 10, 10_000), Strategy::Scatter);
    }
}

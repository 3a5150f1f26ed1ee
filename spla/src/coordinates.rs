//! Sparse index set over `[0, n)`
//!
//! A [`Coordinates`] keeps both a packed stack of assigned indices and a
//! per-index flag, so that iteration costs O(nnz) and membership costs O(1).
//! Parallel kernels stage assignments in private [`Update`] handles and merge
//! them with [`Coordinates::join_update`] after the parallel region.

use hashbrown::HashSet;
use spla_core::{Descriptor, Element, Result, SplaError};

/// Staged assignments of one worker
///
/// An update is an append-only log; staging the same index twice in one
/// update records it once.
#[derive(Debug, Default, Clone)]
pub struct Update {
    staged: Vec<usize>,
    seen: HashSet<usize>,
}

impl Update {
    /// Create an empty update
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an update sized for `capacity` staged indices
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            staged: Vec::with_capacity(capacity),
            seen: HashSet::with_capacity(capacity),
        }
    }

    /// Number of staged indices
    pub fn len(&self) -> usize {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Staged indices in staging order
    pub fn staged(&self) -> &[usize] {
        &self.staged
    }

    fn stage(&mut self, i: usize) -> bool {
        if self.seen.insert(i) {
            self.staged.push(i);
            true
        } else {
            false
        }
    }
}

/// Set of assigned indices over `[0, size)`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Coordinates {
    assigned: Vec<bool>,
    stack: Vec<usize>,
}

impl Coordinates {
    /// Create an empty set over `[0, size)`
    pub fn new(size: usize) -> Self {
        Self {
            assigned: vec![false; size],
            stack: Vec::new(),
        }
    }

    /// Create an empty set, reporting allocation failure
    pub fn try_new(size: usize) -> Result<Self> {
        let mut assigned = Vec::new();
        assigned
            .try_reserve_exact(size)
            .map_err(|_| SplaError::OutOfMemory)?;
        assigned.resize(size, false);
        Ok(Self {
            assigned,
            stack: Vec::new(),
        })
    }

    /// Dimension of the index space
    #[inline]
    pub fn size(&self) -> usize {
        self.assigned.len()
    }

    /// Number of assigned indices
    #[inline]
    pub fn nonzeroes(&self) -> usize {
        self.stack.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Whether every index is assigned
    #[inline]
    pub fn is_dense(&self) -> bool {
        self.stack.len() == self.assigned.len()
    }

    #[inline]
    pub fn assigned(&self, i: usize) -> bool {
        self.assigned[i]
    }

    /// Assign `i`, returning whether it was already assigned
    #[inline]
    pub fn assign(&mut self, i: usize) -> bool {
        if self.assigned[i] {
            true
        } else {
            self.assigned[i] = true;
            self.stack.push(i);
            false
        }
    }

    /// Remove `i` from the set, returning whether it was assigned
    ///
    /// Costs O(nnz) to locate `i` in the stack.
    pub fn unassign(&mut self, i: usize) -> bool {
        if !self.assigned[i] {
            return false;
        }
        self.assigned[i] = false;
        if let Some(pos) = self.stack.iter().position(|&k| k == i) {
            self.stack.swap_remove(pos);
        }
        true
    }

    /// The `k`-th assigned index
    #[inline]
    pub fn index(&self, k: usize) -> usize {
        self.stack[k]
    }

    /// Assigned indices in stack order
    #[inline]
    pub fn stack(&self) -> &[usize] {
        &self.stack
    }

    /// Iterate over assigned indices in stack order
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.stack.iter().copied()
    }

    /// Stage the assignment of `i` in `update`
    ///
    /// Returns whether `i` was already assigned globally or staged earlier in
    /// the same update.
    #[inline]
    pub fn async_assign(&self, i: usize, update: &mut Update) -> bool {
        if self.assigned[i] {
            return true;
        }
        !update.stage(i)
    }

    /// Commit the staged assignments of `update`
    ///
    /// Joining several updates in any order yields the same set.
    pub fn join_update(&mut self, update: Update) {
        for i in update.staged {
            self.assign(i);
        }
    }

    /// Stage a copy of the `k`-th assigned index of `other`, returning it
    #[inline]
    pub fn async_copy(&self, other: &Coordinates, k: usize, update: &mut Update) -> usize {
        let i = other.stack[k];
        update.stage(i);
        i
    }

    /// Commit copies staged by [`Coordinates::async_copy`]
    pub fn join_copy(&mut self, update: Update) {
        self.join_update(update);
    }

    /// Make this set equal to `other`
    pub fn copy_from(&mut self, other: &Coordinates) {
        self.clear();
        self.stack.extend_from_slice(&other.stack);
        for &i in &self.stack {
            self.assigned[i] = true;
        }
    }

    /// Unassign every index without releasing memory
    pub fn clear(&mut self) {
        if self.is_dense() {
            self.assigned.fill(false);
        } else {
            for &i in &self.stack {
                self.assigned[i] = false;
            }
        }
        self.stack.clear();
    }

    /// Assign every index
    pub fn assign_all(&mut self) {
        if self.is_dense() {
            return;
        }
        self.assigned.fill(true);
        self.stack.clear();
        self.stack.extend(0..self.assigned.len());
    }

    /// Evaluate the mask at `i`
    ///
    /// An unassigned index reads false. Unless `structural` is set, an
    /// assigned index reads the truthiness of `values[i]`. `invert_mask`
    /// negates the outcome.
    #[inline]
    pub fn mask<M: Element>(&self, descr: Descriptor, i: usize, values: &[M]) -> bool {
        let hit = self.assigned[i] && (descr.is_structural() || values[i].is_truthy());
        hit != descr.is_inverted_mask()
    }

    /// Verify that the stack and the flags describe the same set
    pub fn check_invariants(&self) -> Result<()> {
        let mut count = 0;
        for &i in &self.stack {
            if i >= self.assigned.len() || !self.assigned[i] {
                return Err(SplaError::Panic);
            }
            count += 1;
        }
        let flagged = self.assigned.iter().filter(|&&a| a).count();
        if flagged != count {
            return Err(SplaError::Panic);
        }
        Ok(())
    }
}

//! Forward iterators over parsed file entries
//!
//! Entries are stored once, as read. Mirrored symmetries are expanded while
//! iterating: each off-diagonal entry is followed by its transposed copy.

use spla_core::Symmetry;

/// One stored entry with zero-based coordinates
pub(crate) type RawEntry = (usize, usize, f64);

/// Iterator over `((row, col), value)` with symmetric expansion
#[derive(Debug, Clone)]
pub struct Entries<'a> {
    raw: &'a [RawEntry],
    pos: usize,
    mirror: Option<RawEntry>,
    symmetry: Symmetry,
}

impl<'a> Entries<'a> {
    pub(crate) fn new(raw: &'a [RawEntry], symmetry: Symmetry) -> Self {
        Self {
            raw,
            pos: 0,
            mirror: None,
            symmetry,
        }
    }
}

impl Iterator for Entries<'_> {
    type Item = ((usize, usize), f64);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some((i, j, v)) = self.mirror.take() {
            return Some(((i, j), v));
        }
        let &(i, j, v) = self.raw.get(self.pos)?;
        self.pos += 1;
        if self.symmetry.is_mirrored() && i != j {
            self.mirror = Some((j, i, v * self.symmetry.mirror_sign()));
        }
        Some(((i, j), v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.raw.len() - self.pos + usize::from(self.mirror.is_some());
        if self.symmetry.is_mirrored() {
            (rest, Some(rest + self.raw.len() - self.pos))
        } else {
            (rest, Some(rest))
        }
    }
}

/// Iterator over `(row, col)` pairs with symmetric expansion
#[derive(Debug, Clone)]
pub struct PatternEntries<'a>(Entries<'a>);

impl<'a> PatternEntries<'a> {
    pub(crate) fn new(raw: &'a [RawEntry], symmetry: Symmetry) -> Self {
        Self(Entries::new(raw, symmetry))
    }
}

impl Iterator for PatternEntries<'_> {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(coord, _)| coord)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: [RawEntry; 3] = [(0, 0, 1.0), (2, 0, 2.0), (1, 1, 3.0)];

    #[test]
    fn test_general_passthrough() {
        let all: Vec<_> = Entries::new(&RAW, Symmetry::General).collect();
        assert_eq!(all, vec![((0, 0), 1.0), ((2, 0), 2.0), ((1, 1), 3.0)]);
    }

    #[test]
    fn test_symmetric_expansion() {
        let all: Vec<_> = Entries::new(&RAW, Symmetry::Symmetric).collect();
        assert_eq!(
            all,
            vec![((0, 0), 1.0), ((2, 0), 2.0), ((0, 2), 2.0), ((1, 1), 3.0)]
        );

        let skew: Vec<_> = Entries::new(&RAW[1..2], Symmetry::SkewSymmetric).collect();
        assert_eq!(skew, vec![((2, 0), 2.0), ((0, 2), -2.0)]);
    }

    #[test]
    fn test_pattern_and_clone() {
        let mut it = PatternEntries::new(&RAW, Symmetry::Hermitian);
        assert_eq!(it.next(), Some((0, 0)));
        let rest = it.clone();
        assert_eq!(it.count(), 3);
        assert_eq!(rest.collect::<Vec<_>>(), vec![(2, 0), (0, 2), (1, 1)]);
    }
}

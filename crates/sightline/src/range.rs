//! Half-open row-index ranges with set algebra.
//!
//! [`RowRange`] is the currency of the virtual scrolling controller: the
//! materialized window, the requested window and every render/remove delta
//! are expressed as `[from, to)` ranges over row indices.

/// A half-open range of row indices: `[from, to)`.
///
/// Invariant: `from <= to`. A zero-size range carries no rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RowRange {
    /// First row in the range (inclusive).
    pub from: usize,
    /// One past the last row in the range (exclusive).
    pub to: usize,
}

impl RowRange {
    /// Creates a new range.
    ///
    /// # Panics
    ///
    /// Panics if `from > to`; a reversed range is a programming error.
    pub fn new(from: usize, to: usize) -> Self {
        assert!(from <= to, "reversed row range: [{from}, {to})");
        Self { from, to }
    }

    /// Returns the empty range at row 0.
    pub fn empty() -> Self {
        Self { from: 0, to: 0 }
    }

    /// Returns the number of rows in the range, never negative.
    pub fn size(&self) -> usize {
        self.to - self.from
    }

    /// Returns `true` if the range carries no rows.
    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }

    /// Returns `true` if `row` lies within the range.
    pub fn contains(&self, row: usize) -> bool {
        row >= self.from && row < self.to
    }

    /// Returns an iterator over the rows in the range.
    pub fn rows(&self) -> std::ops::Range<usize> {
        self.from..self.to
    }

    /// Returns `true` if the ranges share at least one row.
    pub fn overlaps(&self, other: &RowRange) -> bool {
        self.from < other.to && other.from < self.to
    }

    /// Returns `true` if the ranges overlap or are directly adjacent.
    pub fn touches(&self, other: &RowRange) -> bool {
        self.from <= other.to && other.from <= self.to
    }

    /// Returns the union of two ranges.
    ///
    /// Overlapping or touching ranges merge into a single range. Disjoint
    /// ranges stay separate, sorted by `from`. Callers that assume a
    /// contiguous extension must treat a two-element result as an error.
    pub fn union(&self, other: &RowRange) -> Vec<RowRange> {
        if self.is_empty() {
            return vec![*other];
        }
        if other.is_empty() {
            return vec![*self];
        }
        if self.touches(other) {
            vec![RowRange::new(
                self.from.min(other.from),
                self.to.max(other.to),
            )]
        } else if self.from < other.from {
            vec![*self, *other]
        } else {
            vec![*other, *self]
        }
    }

    /// Returns the parts of `self` not covered by `other`: 0, 1 or 2 ranges.
    pub fn subtract(&self, other: &RowRange) -> Vec<RowRange> {
        if !self.overlaps(other) {
            if self.is_empty() {
                return Vec::new();
            }
            return vec![*self];
        }

        let mut parts = Vec::new();
        if self.from < other.from {
            parts.push(RowRange::new(self.from, other.from));
        }
        if other.to < self.to {
            parts.push(RowRange::new(other.to, self.to));
        }
        parts
    }

    /// Returns the overlapping sub-range, possibly of size 0.
    pub fn intersect(&self, other: &RowRange) -> RowRange {
        let from = self.from.max(other.from);
        let to = self.to.min(other.to);
        if from >= to {
            RowRange::empty()
        } else {
            RowRange::new(from, to)
        }
    }
}

impl std::fmt::Display for RowRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.from, self.to)
    }
}

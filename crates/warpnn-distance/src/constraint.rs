//! Band constraint shared by every elastic kernel and by the envelope cache.

use std::ops::Range;

/// Constraint on how far index `i` of one series may be aligned to index `j` of the other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BandConstraint {
    /// No constraint. Every cell of the alignment grid is admissible.
    #[default]
    Unconstrained,

    /// Sakoe-Chiba band: cell (i,j) is valid only if |i - j| <= radius.
    SakoeChibaRadius(usize),
}

impl BandConstraint {
    /// Build a constraint from an optional radius. `None` means unconstrained.
    #[must_use]
    pub fn from_radius(radius: Option<usize>) -> Self {
        match radius {
            None => Self::Unconstrained,
            Some(r) => Self::SakoeChibaRadius(r),
        }
    }

    /// Return the band radius, or `None` when unconstrained.
    #[must_use]
    pub fn radius(&self) -> Option<usize> {
        match self {
            Self::Unconstrained => None,
            Self::SakoeChibaRadius(r) => Some(*r),
        }
    }

    /// Return true if cell `(i, j)` lies inside the band.
    #[must_use]
    pub fn admits(&self, i: usize, j: usize) -> bool {
        match self {
            Self::Unconstrained => true,
            Self::SakoeChibaRadius(r) => i.abs_diff(j) <= *r,
        }
    }

    /// Return the valid column range for a given row of the alignment grid.
    ///
    /// For unconstrained alignment, returns `0..n_cols`.
    /// For Sakoe-Chiba, returns the intersection of `[row - r, row + r]` with `[0, n_cols)`,
    /// which is empty once the row lies more than `r` past the last column.
    #[must_use]
    pub fn column_range(&self, row: usize, n_cols: usize) -> Range<usize> {
        match self {
            Self::Unconstrained => 0..n_cols,
            Self::SakoeChibaRadius(r) => {
                let start = row.saturating_sub(*r).min(n_cols);
                let end = row.saturating_add(*r).saturating_add(1).min(n_cols);
                start..end
            }
        }
    }
}

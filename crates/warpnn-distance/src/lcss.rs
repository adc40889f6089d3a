//! Longest common subsequence with a value tolerance and a warping window.

use tracing::instrument;

use crate::constraint::BandConstraint;
use crate::distance::{Distance, ExtendedDistance};
use crate::error::{DistanceError, require_non_negative};
use crate::measure::ElasticDistance;
use crate::series::TimeSeriesView;

/// Match count of a cell and the widest `|i - j|` on the chain that produced it.
#[derive(Debug, Clone, Copy, Default)]
struct Matches {
    count: usize,
    reach: usize,
}

impl Matches {
    fn from_parent(parent: Self, count: usize, i: usize, j: usize) -> Self {
        Self {
            count,
            reach: if count == 0 {
                0
            } else {
                parent.reach.max(i.abs_diff(j))
            },
        }
    }
}

/// LCSS configuration.
///
/// Two points match when `|a_i - b_j| <= epsilon` and `|i - j|` is inside the
/// band. The distance is `1 - matches / len(a)`, so it lies in `[0, 1]` and is
/// normalised by the first argument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lcss {
    epsilon: f64,
    constraint: BandConstraint,
}

impl Lcss {
    /// Create an unconstrained LCSS calculator with match tolerance `epsilon`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DistanceError::InvalidParameter`] | `epsilon` is negative, NaN or infinite |
    pub fn new(epsilon: f64) -> Result<Self, DistanceError> {
        Ok(Self {
            epsilon: require_non_negative("epsilon", epsilon)?,
            constraint: BandConstraint::Unconstrained,
        })
    }

    /// Apply a band constraint (the `delta` window).
    #[must_use]
    pub fn with_constraint(mut self, constraint: BandConstraint) -> Self {
        self.constraint = constraint;
        self
    }

    /// Return the match tolerance.
    #[must_use]
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }
}

impl ElasticDistance for Lcss {
    fn constraint(&self) -> BandConstraint {
        self.constraint
    }

    /// Count DP over an `(n+1) x (m+1)` grid. Cells outside the band read as
    /// zero matches.
    ///
    /// After each row the best reachable count is bounded by the row maximum
    /// plus the rows left, which gives the abandon test. When the band cannot
    /// reach the final cell the distance is 1 with no validity radius, since
    /// a wider band may find matches.
    ///
    /// # Errors
    ///
    /// Never fails; unequal lengths are allowed.
    #[instrument(level = "trace", skip(a, b))]
    fn distance_extended(
        &self,
        a: TimeSeriesView<'_>,
        b: TimeSeriesView<'_>,
        cutoff: f64,
    ) -> Result<ExtendedDistance, DistanceError> {
        let (a, b) = (a.as_slice(), b.as_slice());
        let (n, m) = (a.len(), b.len());
        let total = n as f64;

        if !self.constraint.admits(n, m) {
            if 1.0 >= cutoff {
                return Ok(ExtendedDistance::ABANDONED);
            }
            return Ok(ExtendedDistance {
                distance: Distance::new(1.0),
                validity_radius: None,
            });
        }

        let mut prev = vec![Matches::default(); m + 1];
        let mut curr = vec![Matches::default(); m + 1];
        // Row 0 is all zeros and entirely readable.
        let mut prev_range = 0..m + 1;

        for i in 1..=n {
            let band = self.constraint.column_range(i, m + 1);
            let range = band.start.max(1)..band.end;
            let mut row_max = 0;

            for j in range.clone() {
                let diag = if prev_range.contains(&(j - 1)) {
                    prev[j - 1]
                } else {
                    Matches::default()
                };

                let cell = if (a[i - 1] - b[j - 1]).abs() <= self.epsilon {
                    Matches::from_parent(diag, diag.count + 1, i, j)
                } else {
                    let up = if prev_range.contains(&j) {
                        prev[j]
                    } else {
                        Matches::default()
                    };
                    let left = if j > range.start {
                        curr[j - 1]
                    } else {
                        Matches::default()
                    };
                    let parent = if diag.count >= up.count && diag.count >= left.count {
                        diag
                    } else if up.count >= left.count {
                        up
                    } else {
                        left
                    };
                    Matches::from_parent(parent, parent.count, i, j)
                };
                curr[j] = cell;
                row_max = row_max.max(cell.count);
            }

            if 1.0 - (row_max + (n - i)) as f64 / total >= cutoff {
                return Ok(ExtendedDistance::ABANDONED);
            }

            prev_range = range;
            std::mem::swap(&mut prev, &mut curr);
        }

        let end = prev[m];
        let distance = 1.0 - end.count as f64 / total;
        if distance >= cutoff {
            return Ok(ExtendedDistance::ABANDONED);
        }
        Ok(ExtendedDistance::new(distance, end.reach))
    }
}

//! Edit distance with real penalty.

use tracing::instrument;

use crate::constraint::BandConstraint;
use crate::distance::ExtendedDistance;
use crate::error::{DistanceError, require_finite};
use crate::grid::{Grid, Step};
use crate::measure::ElasticDistance;
use crate::series::TimeSeriesView;

/// ERP configuration: gaps are charged against a fixed reference value `g`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Erp {
    gap: f64,
    constraint: BandConstraint,
}

impl Erp {
    /// Create an unconstrained ERP calculator with gap value `gap`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DistanceError::InvalidParameter`] | `gap` is NaN or infinite |
    pub fn new(gap: f64) -> Result<Self, DistanceError> {
        Ok(Self {
            gap: require_finite("g", gap)?,
            constraint: BandConstraint::Unconstrained,
        })
    }

    /// Apply a band constraint.
    #[must_use]
    pub fn with_constraint(mut self, constraint: BandConstraint) -> Self {
        self.constraint = constraint;
        self
    }

    /// Return the gap value.
    #[must_use]
    pub fn gap(&self) -> f64 {
        self.gap
    }
}

impl ElasticDistance for Erp {
    fn constraint(&self) -> BandConstraint {
        self.constraint
    }

    /// ERP over an `(n+1) x (m+1)` grid whose first row and column accumulate
    /// gap costs.
    ///
    /// A match is taken only when strictly cheaper than both gaps; among the
    /// gaps, deleting from `a` wins ties. This order decides which reach is
    /// propagated, so it is part of the result.
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
        let (a, b, g) = (a.as_slice(), b.as_slice(), self.gap);

        let end = Grid::new(a.len() + 1, b.len() + 1, self.constraint).min_cost(
            0.0,
            cutoff,
            |i, j, diag, up, left| {
                let matched = if i > 0 && j > 0 {
                    diag + (a[i - 1] - b[j - 1]).powi(2)
                } else {
                    f64::INFINITY
                };
                let deleted = if i > 0 {
                    up + (a[i - 1] - g).powi(2)
                } else {
                    f64::INFINITY
                };
                let inserted = if j > 0 {
                    left + (b[j - 1] - g).powi(2)
                } else {
                    f64::INFINITY
                };

                if matched < deleted && matched < inserted {
                    (matched, Step::Diagonal)
                } else if deleted <= inserted {
                    (deleted, Step::Up)
                } else {
                    (inserted, Step::Left)
                }
            },
        );
        Ok(ExtendedDistance::new(end.cost, end.reach))
    }
}

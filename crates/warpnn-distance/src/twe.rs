//! Time warp edit distance.

use tracing::instrument;

use crate::constraint::BandConstraint;
use crate::distance::ExtendedDistance;
use crate::error::{DistanceError, require_non_negative};
use crate::grid::{Grid, Step, prefer_diagonal};
use crate::measure::ElasticDistance;
use crate::series::TimeSeriesView;

/// TWE configuration.
///
/// | Parameter | Meaning | Constraint |
/// |---|---|---|
/// | `nu` | Stiffness: cost per unit of time offset | finite, `>= 0` |
/// | `lambda` | Constant penalty for a deletion | finite, `>= 0` |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Twe {
    nu: f64,
    lambda: f64,
    constraint: BandConstraint,
}

impl Twe {
    /// Create an unconstrained TWE calculator.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DistanceError::InvalidParameter`] | `nu` or `lambda` is negative, NaN or infinite |
    pub fn new(nu: f64, lambda: f64) -> Result<Self, DistanceError> {
        Ok(Self {
            nu: require_non_negative("nu", nu)?,
            lambda: require_non_negative("lambda", lambda)?,
            constraint: BandConstraint::Unconstrained,
        })
    }

    /// Apply a band constraint.
    #[must_use]
    pub fn with_constraint(mut self, constraint: BandConstraint) -> Self {
        self.constraint = constraint;
        self
    }

    /// Return the stiffness.
    #[must_use]
    pub fn nu(&self) -> f64 {
        self.nu
    }

    /// Return the deletion penalty.
    #[must_use]
    pub fn lambda(&self) -> f64 {
        self.lambda
    }
}

impl ElasticDistance for Twe {
    fn constraint(&self) -> BandConstraint {
        self.constraint
    }

    /// TWE over an `(n+1) x (m+1)` grid. Both series are read with a leading
    /// zero at padded index 0; every boundary cell except the origin is
    /// unreachable.
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
        let at = |s: &[f64], k: usize| if k == 0 { 0.0 } else { s[k - 1] };
        let delete = self.nu + self.lambda;

        let end = Grid::new(a.len() + 1, b.len() + 1, self.constraint).min_cost(
            0.0,
            cutoff,
            |i, j, diag, up, left| {
                if i == 0 || j == 0 {
                    return (f64::INFINITY, Step::Diagonal);
                }
                let stiffness = self.nu * i.abs_diff(j) as f64;
                let matched = if i > 1 && j > 1 {
                    diag + (at(a, i) - at(b, j)).abs()
                        + (at(a, i - 1) - at(b, j - 1)).abs()
                        + 2.0 * stiffness
                } else {
                    diag + (at(a, i) - at(b, j)).abs() + stiffness
                };
                let deleted_a = up + (at(a, i) - at(a, i - 1)).abs() + delete;
                let deleted_b = left + (at(b, j) - at(b, j - 1)).abs() + delete;
                prefer_diagonal(matched, deleted_a, deleted_b)
            },
        );
        Ok(ExtendedDistance::new(end.cost, end.reach))
    }
}

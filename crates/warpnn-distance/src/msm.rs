//! Move-split-merge distance.

use tracing::instrument;

use crate::constraint::BandConstraint;
use crate::distance::ExtendedDistance;
use crate::error::{DistanceError, require_non_negative};
use crate::grid::{Grid, prefer_diagonal};
use crate::measure::ElasticDistance;
use crate::series::TimeSeriesView;

/// Cost of splitting or merging `x` given its neighbour `y` and the point `z`
/// it is aligned against.
///
/// Only the constant `c` is charged when `x` lies between `y` and `z`.
pub(crate) fn split_merge_cost(x: f64, y: f64, z: f64, c: f64) -> f64 {
    if (y <= x && x <= z) || (y >= x && x >= z) {
        c
    } else {
        c + (x - y).abs().min((x - z).abs())
    }
}

/// MSM configuration with split/merge cost `c`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Msm {
    cost: f64,
    constraint: BandConstraint,
}

impl Msm {
    /// Create an unconstrained MSM calculator.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DistanceError::InvalidParameter`] | `cost` is negative, NaN or infinite |
    pub fn new(cost: f64) -> Result<Self, DistanceError> {
        Ok(Self {
            cost: require_non_negative("c", cost)?,
            constraint: BandConstraint::Unconstrained,
        })
    }

    /// Apply a band constraint.
    #[must_use]
    pub fn with_constraint(mut self, constraint: BandConstraint) -> Self {
        self.constraint = constraint;
        self
    }

    /// Return the split/merge cost.
    #[must_use]
    pub fn cost(&self) -> f64 {
        self.cost
    }
}

impl ElasticDistance for Msm {
    fn constraint(&self) -> BandConstraint {
        self.constraint
    }

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
        let (a, b, c) = (a.as_slice(), b.as_slice(), self.cost);

        let end = Grid::new(a.len(), b.len(), self.constraint).min_cost(
            (a[0] - b[0]).abs(),
            cutoff,
            |i, j, diag, up, left| {
                let moved = diag + (a[i] - b[j]).abs();
                let split = if i > 0 {
                    up + split_merge_cost(a[i], a[i - 1], b[j], c)
                } else {
                    f64::INFINITY
                };
                let merged = if j > 0 {
                    left + split_merge_cost(b[j], a[i], b[j - 1], c)
                } else {
                    f64::INFINITY
                };
                prefer_diagonal(moved, split, merged)
            },
        );
        Ok(ExtendedDistance::new(end.cost, end.reach))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::TimeSeries;

    fn ts(values: &[f64]) -> TimeSeries {
        TimeSeries::new(values.to_vec()).unwrap()
    }

    #[test]
    fn split_merge_between_neighbours_costs_constant() {
        assert_eq!(split_merge_cost(1.5, 1.0, 2.0, 0.1), 0.1);
        assert_eq!(split_merge_cost(1.5, 2.0, 1.0, 0.1), 0.1);
        assert_eq!(split_merge_cost(3.0, 1.0, 2.0, 0.1), 1.1);
    }

    #[test]
    fn reference_values() {
        let a = ts(&[1.0, 3.0, 2.0, 5.0, 4.0]);
        let b = ts(&[2.0, 1.0, 4.0, 3.0, 6.0]);
        let msm = Msm::new(1.0).unwrap();
        let e = msm.distance_extended(a.as_view(), b.as_view(), f64::INFINITY).unwrap();
        assert_eq!(e.distance.value(), 7.0);
        assert_eq!(e.validity_radius, Some(1));

        let locked = msm.with_constraint(BandConstraint::SakoeChibaRadius(0));
        assert_eq!(locked.distance(a.as_view(), b.as_view()).unwrap().value(), 9.0);
    }

    #[test]
    fn unequal_lengths() {
        let a = ts(&[1.0, 3.0, 2.0, 5.0, 4.0]);
        let b = ts(&[0.5, -1.0, 2.0]);
        let d = Msm::new(1.0).unwrap().distance(a.as_view(), b.as_view()).unwrap();
        assert!((d.value() - 9.5).abs() < 1e-12);
    }

    #[test]
    fn symmetric() {
        let a = ts(&[0.2, 1.7, -0.4, 0.9]);
        let b = ts(&[1.1, -0.3, 0.0, 2.2, 0.6]);
        let msm = Msm::new(0.5).unwrap();
        let ab = msm.distance(a.as_view(), b.as_view()).unwrap().value();
        let ba = msm.distance(b.as_view(), a.as_view()).unwrap().value();
        assert!((ab - ba).abs() < 1e-12);
    }
}

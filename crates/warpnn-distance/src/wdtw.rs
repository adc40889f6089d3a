//! Weighted DTW: squared differences scaled by a logistic penalty on `|i - j|`.

use tracing::instrument;

use crate::constraint::BandConstraint;
use crate::distance::ExtendedDistance;
use crate::error::{DistanceError, require_finite};
use crate::grid::{Grid, prefer_diagonal};
use crate::measure::ElasticDistance;
use crate::series::TimeSeriesView;

/// Logistic weight for a warping offset `k` in a series of length `len`.
///
/// `w(k) = 1 / (1 + exp(-g * (k - len / 2)))`
pub(crate) fn weight(g: f64, k: usize, len: usize) -> f64 {
    1.0 / (1.0 + (-g * (k as f64 - len as f64 / 2.0)).exp())
}

/// Smallest weight over offsets `0..len`. The weight is monotone in `k`, so
/// the minimum sits at one end.
pub(crate) fn min_weight(g: f64, len: usize) -> f64 {
    weight(g, 0, len).min(weight(g, len.saturating_sub(1), len))
}

/// Weighted DTW configuration.
///
/// | Parameter | Meaning | Constraint |
/// |---|---|---|
/// | `g` | Steepness of the offset penalty | finite |
/// | `constraint` | Band applied on top of the weighting | any |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wdtw {
    g: f64,
    constraint: BandConstraint,
}

impl Wdtw {
    /// Create an unconstrained weighted DTW calculator.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DistanceError::InvalidParameter`] | `g` is NaN or infinite |
    pub fn new(g: f64) -> Result<Self, DistanceError> {
        Ok(Self {
            g: require_finite("g", g)?,
            constraint: BandConstraint::Unconstrained,
        })
    }

    /// Apply a band constraint.
    #[must_use]
    pub fn with_constraint(mut self, constraint: BandConstraint) -> Self {
        self.constraint = constraint;
        self
    }

    /// Return the penalty steepness.
    #[must_use]
    pub fn g(&self) -> f64 {
        self.g
    }
}

impl ElasticDistance for Wdtw {
    fn constraint(&self) -> BandConstraint {
        self.constraint
    }

    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DistanceError::LengthMismatch`] | `a` and `b` differ in length |
    #[instrument(level = "trace", skip(a, b))]
    fn distance_extended(
        &self,
        a: TimeSeriesView<'_>,
        b: TimeSeriesView<'_>,
        cutoff: f64,
    ) -> Result<ExtendedDistance, DistanceError> {
        let n = a.len();
        if n != b.len() {
            return Err(DistanceError::LengthMismatch {
                left: n,
                right: b.len(),
            });
        }
        let weights: Vec<f64> = (0..n).map(|k| weight(self.g, k, n)).collect();
        let (a, b) = (a.as_slice(), b.as_slice());

        let end = Grid::new(n, n, self.constraint).min_cost(
            weights[0] * (a[0] - b[0]).powi(2),
            cutoff,
            |i, j, diag, up, left| {
                let (best, from) = prefer_diagonal(diag, up, left);
                (best + weights[i.abs_diff(j)] * (a[i] - b[j]).powi(2), from)
            },
        );
        Ok(ExtendedDistance::new(end.cost, end.reach))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtw::Dtw;
    use crate::series::TimeSeries;

    fn ts(values: &[f64]) -> TimeSeries {
        TimeSeries::new(values.to_vec()).unwrap()
    }

    #[test]
    fn rejects_non_finite_g() {
        assert!(matches!(
            Wdtw::new(f64::NAN),
            Err(DistanceError::InvalidParameter { name: "g", .. })
        ));
    }

    #[test]
    fn weights_are_monotone_and_bounded() {
        let ws: Vec<f64> = (0..10).map(|k| weight(0.2, k, 10)).collect();
        assert!(ws.windows(2).all(|p| p[0] <= p[1]));
        assert!(ws.iter().all(|&w| w > 0.0 && w < 1.0));
        assert_eq!(min_weight(0.2, 10), ws[0]);
        assert_eq!(min_weight(-0.2, 10), weight(-0.2, 9, 10));
    }

    #[test]
    fn reference_values() {
        let a = ts(&[1.0, 3.0, 2.0, 5.0, 4.0]);
        let b = ts(&[2.0, 1.0, 4.0, 3.0, 6.0]);
        let e = Wdtw::new(0.05)
            .unwrap()
            .distance_extended(a.as_view(), b.as_view(), f64::INFINITY)
            .unwrap();
        assert!((e.distance.value() - 3.787_729_485_495_613).abs() < 1e-9);
        assert_eq!(e.validity_radius, Some(1));
    }

    #[test]
    fn rejects_unequal_lengths() {
        let a = ts(&[1.0, 2.0, 3.0]);
        let b = ts(&[1.0, 2.0]);
        let err = Wdtw::new(0.1).unwrap().distance(a.as_view(), b.as_view()).unwrap_err();
        assert_eq!(err, DistanceError::LengthMismatch { left: 3, right: 2 });
    }

    #[test]
    fn never_exceeds_unweighted_dtw() {
        // Every weight is below 1, so each path costs less than under DTW.
        let a = ts(&[0.0, 2.0, 1.0, -1.0, 0.5, 3.0]);
        let b = ts(&[1.0, 0.0, 2.5, 1.0, -2.0, 0.0]);
        let w = Wdtw::new(0.3).unwrap().distance(a.as_view(), b.as_view()).unwrap();
        let d = Dtw::unconstrained().distance(a.as_view(), b.as_view()).unwrap();
        assert!(w.value() <= d.value());
    }
}

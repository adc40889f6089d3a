//! Lock-step squared Euclidean distance.

use tracing::instrument;

use crate::constraint::BandConstraint;
use crate::distance::ExtendedDistance;
use crate::error::DistanceError;
use crate::measure::ElasticDistance;
use crate::series::TimeSeriesView;

/// Squared Euclidean distance. Compares index `i` with index `i` only, so the
/// validity radius of every finite result is 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Euclidean;

impl Euclidean {
    /// Create a Euclidean calculator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ElasticDistance for Euclidean {
    fn constraint(&self) -> BandConstraint {
        BandConstraint::SakoeChibaRadius(0)
    }

    /// Sum of squared differences, abandoned once the running sum reaches `cutoff`.
    ///
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
        if a.len() != b.len() {
            return Err(DistanceError::LengthMismatch {
                left: a.len(),
                right: b.len(),
            });
        }

        let mut sum = 0.0;
        for (x, y) in a.as_slice().iter().zip(b.as_slice()) {
            sum += (x - y).powi(2);
            if sum >= cutoff {
                return Ok(ExtendedDistance::ABANDONED);
            }
        }
        Ok(ExtendedDistance::new(sum, 0))
    }
}

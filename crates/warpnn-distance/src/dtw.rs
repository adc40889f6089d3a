//! Dynamic time warping over squared differences.

use tracing::instrument;

use crate::constraint::BandConstraint;
use crate::distance::ExtendedDistance;
use crate::error::DistanceError;
use crate::grid::{Grid, prefer_diagonal};
use crate::measure::ElasticDistance;
use crate::series::TimeSeriesView;

/// Immutable DTW configuration. Thread-safe and copyable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dtw {
    constraint: BandConstraint,
}

impl Dtw {
    /// Create an unconstrained DTW calculator.
    #[must_use]
    pub fn unconstrained() -> Self {
        Self {
            constraint: BandConstraint::Unconstrained,
        }
    }

    /// Create a DTW calculator with a Sakoe-Chiba band constraint.
    #[must_use]
    pub fn with_sakoe_chiba(radius: usize) -> Self {
        Self {
            constraint: BandConstraint::SakoeChibaRadius(radius),
        }
    }

    /// Create a DTW calculator from an existing [`BandConstraint`].
    #[must_use]
    pub fn from_constraint(constraint: BandConstraint) -> Self {
        Self { constraint }
    }
}

impl ElasticDistance for Dtw {
    fn constraint(&self) -> BandConstraint {
        self.constraint
    }

    /// Rolling-row DTW with early abandoning and reach tracking.
    ///
    /// `C[i][j] = min(diag, up, left) + (a[i] - b[j])^2`. Ties go to the
    /// diagonal, then to the cell above, which keeps the reported validity
    /// radius as small as the chosen path allows. Runs in O(n * bw) time and
    /// O(m) space.
    ///
    /// # Errors
    ///
    /// Never fails; unequal lengths are allowed and yield an infinite distance
    /// only when the band cannot reach the final cell.
    #[instrument(level = "trace", skip(a, b))]
    fn distance_extended(
        &self,
        a: TimeSeriesView<'_>,
        b: TimeSeriesView<'_>,
        cutoff: f64,
    ) -> Result<ExtendedDistance, DistanceError> {
        let (a, b) = (a.as_slice(), b.as_slice());
        let end = Grid::new(a.len(), b.len(), self.constraint).min_cost(
            (a[0] - b[0]).powi(2),
            cutoff,
            |i, j, diag, up, left| {
                let (best, from) = prefer_diagonal(diag, up, left);
                (best + (a[i] - b[j]).powi(2), from)
            },
        );
        Ok(ExtendedDistance::new(end.cost, end.reach))
    }
}

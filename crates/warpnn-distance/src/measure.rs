//! The common kernel interface and the closed set of supported measures.

use std::fmt;

use crate::bounds::{BoundInput, lb_erp, lb_global, lb_lcss, lb_lcss_global, lb_msm, lb_twe};
use crate::constraint::BandConstraint;
use crate::distance::{Distance, ExtendedDistance};
use crate::dtw::Dtw;
use crate::envelope::lb_keogh_ranked;
use crate::erp::Erp;
use crate::error::DistanceError;
use crate::euclidean::Euclidean;
use crate::lcss::Lcss;
use crate::msm::Msm;
use crate::twe::Twe;
use crate::series::TimeSeriesView;
use crate::wdtw::{Wdtw, min_weight};

/// A pairwise elastic distance in its three call shapes.
///
/// Implementors supply only [`distance_extended`][Self::distance_extended];
/// the cutoff-free and distance-only shapes delegate to it. An early-abandoned
/// call returns [`Distance::INFINITY`], never an approximate finite value.
pub trait ElasticDistance {
    /// Band applied by this measure.
    fn constraint(&self) -> BandConstraint;

    /// Distance with early abandoning plus the narrowest band reproducing it.
    ///
    /// Returns a finite distance if and only if it is strictly below `cutoff`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DistanceError::LengthMismatch`] | Lock-step family given series of different lengths |
    fn distance_extended(
        &self,
        a: TimeSeriesView<'_>,
        b: TimeSeriesView<'_>,
        cutoff: f64,
    ) -> Result<ExtendedDistance, DistanceError>;

    /// Distance with early abandoning at `cutoff`.
    ///
    /// # Errors
    ///
    /// Same as [`distance_extended`][Self::distance_extended].
    fn distance_with_cutoff(
        &self,
        a: TimeSeriesView<'_>,
        b: TimeSeriesView<'_>,
        cutoff: f64,
    ) -> Result<Distance, DistanceError> {
        Ok(self.distance_extended(a, b, cutoff)?.distance)
    }

    /// Full distance.
    ///
    /// # Errors
    ///
    /// Same as [`distance_extended`][Self::distance_extended].
    fn distance(&self, a: TimeSeriesView<'_>, b: TimeSeriesView<'_>) -> Result<Distance, DistanceError> {
        self.distance_with_cutoff(a, b, f64::INFINITY)
    }
}

/// One of the supported elastic families with its parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measure {
    /// Lock-step squared Euclidean distance.
    Euclidean(Euclidean),
    /// Dynamic time warping.
    Dtw(Dtw),
    /// Weighted dynamic time warping.
    Wdtw(Wdtw),
    /// Edit distance with real penalty.
    Erp(Erp),
    /// Longest common subsequence.
    Lcss(Lcss),
    /// Move-split-merge.
    Msm(Msm),
    /// Time warp edit.
    Twe(Twe),
}

impl Measure {
    /// Short lowercase name of the family.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Euclidean(_) => "euclidean",
            Self::Dtw(_) => "dtw",
            Self::Wdtw(_) => "wdtw",
            Self::Erp(_) => "erp",
            Self::Lcss(_) => "lcss",
            Self::Msm(_) => "msm",
            Self::Twe(_) => "twe",
        }
    }

    /// Return this measure with its band replaced. Euclidean has no band and
    /// is returned unchanged.
    #[must_use]
    pub fn with_constraint(self, constraint: BandConstraint) -> Self {
        match self {
            Self::Euclidean(m) => Self::Euclidean(m),
            Self::Dtw(_) => Self::Dtw(Dtw::from_constraint(constraint)),
            Self::Wdtw(m) => Self::Wdtw(m.with_constraint(constraint)),
            Self::Erp(m) => Self::Erp(m.with_constraint(constraint)),
            Self::Lcss(m) => Self::Lcss(m.with_constraint(constraint)),
            Self::Msm(m) => Self::Msm(m.with_constraint(constraint)),
            Self::Twe(m) => Self::Twe(m.with_constraint(constraint)),
        }
    }

    /// Return this measure restricted to a Sakoe-Chiba band of `radius`.
    #[must_use]
    pub fn with_window(self, radius: usize) -> Self {
        self.with_constraint(BandConstraint::SakoeChibaRadius(radius))
    }

    /// True when the window parameter changes the result.
    #[must_use]
    pub fn is_windowed(&self) -> bool {
        !matches!(self, Self::Euclidean(_))
    }

    /// Band at which reference envelopes must be built for
    /// [`lower_bound`][Self::lower_bound], or `None` when the bound only reads
    /// global statistics.
    #[must_use]
    pub fn envelope_constraint(&self) -> Option<BandConstraint> {
        match self {
            Self::Dtw(_) | Self::Erp(_) | Self::Lcss(_) => Some(self.constraint()),
            _ => None,
        }
    }

    /// Admissible lower bound on `self.distance(query, reference)`.
    ///
    /// Envelope-based families use the reference envelope when one is attached
    /// and fall back to its global extrema otherwise. The result may stop
    /// short once it reaches `cutoff`.
    #[must_use]
    pub fn lower_bound(&self, query: &BoundInput<'_>, reference: &BoundInput<'_>, cutoff: f64) -> f64 {
        let q = query.series().as_slice();
        let rs = reference.stats();
        match self {
            Self::Euclidean(_) => lb_global(q, rs.min(), rs.max(), 1.0, cutoff),
            Self::Dtw(_) => match reference.envelope() {
                Some(env) => lb_keogh_ranked(q, env, query.stats().ranking(), cutoff),
                None => lb_global(q, rs.min(), rs.max(), 1.0, cutoff),
            },
            Self::Wdtw(m) => lb_global(q, rs.min(), rs.max(), min_weight(m.g(), q.len()), cutoff),
            Self::Erp(m) => match reference.envelope() {
                Some(env) => lb_erp(q, env, m.gap(), cutoff),
                None => lb_global(q, rs.min().min(m.gap()), rs.max().max(m.gap()), 1.0, cutoff),
            },
            Self::Lcss(m) => match reference.envelope() {
                Some(env) => lb_lcss(q, env, m.epsilon()),
                None => lb_lcss_global(q, rs.min(), rs.max(), m.epsilon()),
            },
            Self::Msm(m) => lb_msm(query, reference, m.cost()),
            Self::Twe(m) => lb_twe(
                query.stats(),
                reference.series().as_slice(),
                m.nu(),
                m.lambda(),
                cutoff,
            ),
        }
    }
}

impl ElasticDistance for Measure {
    fn constraint(&self) -> BandConstraint {
        match self {
            Self::Euclidean(m) => m.constraint(),
            Self::Dtw(m) => m.constraint(),
            Self::Wdtw(m) => m.constraint(),
            Self::Erp(m) => m.constraint(),
            Self::Lcss(m) => m.constraint(),
            Self::Msm(m) => m.constraint(),
            Self::Twe(m) => m.constraint(),
        }
    }

    fn distance_extended(
        &self,
        a: TimeSeriesView<'_>,
        b: TimeSeriesView<'_>,
        cutoff: f64,
    ) -> Result<ExtendedDistance, DistanceError> {
        match self {
            Self::Euclidean(m) => m.distance_extended(a, b, cutoff),
            Self::Dtw(m) => m.distance_extended(a, b, cutoff),
            Self::Wdtw(m) => m.distance_extended(a, b, cutoff),
            Self::Erp(m) => m.distance_extended(a, b, cutoff),
            Self::Lcss(m) => m.distance_extended(a, b, cutoff),
            Self::Msm(m) => m.distance_extended(a, b, cutoff),
            Self::Twe(m) => m.distance_extended(a, b, cutoff),
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Euclidean> for Measure {
    fn from(m: Euclidean) -> Self {
        Self::Euclidean(m)
    }
}

impl From<Dtw> for Measure {
    fn from(m: Dtw) -> Self {
        Self::Dtw(m)
    }
}

impl From<Wdtw> for Measure {
    fn from(m: Wdtw) -> Self {
        Self::Wdtw(m)
    }
}

impl From<Erp> for Measure {
    fn from(m: Erp) -> Self {
        Self::Erp(m)
    }
}

impl From<Lcss> for Measure {
    fn from(m: Lcss) -> Self {
        Self::Lcss(m)
    }
}

impl From<Msm> for Measure {
    fn from(m: Msm) -> Self {
        Self::Msm(m)
    }
}

impl From<Twe> for Measure {
    fn from(m: Twe) -> Self {
        Self::Twe(m)
    }
}

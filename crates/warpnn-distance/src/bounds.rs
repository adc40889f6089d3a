//! Admissible lower bounds for each elastic family.
//!
//! Every bound is at most the true distance for the band its envelope was
//! built with and for every narrower band. Bounds that take a `cutoff` may
//! stop summing once the partial sum reaches it; a partial sum of
//! non-negative terms is still a lower bound.

use crate::envelope::{SeriesEnvelope, outside};
use crate::series::TimeSeriesView;
use crate::stats::SeriesStats;

/// The per-series inputs a lower bound may read.
///
/// `envelope` must have been built for the band of the measure being
/// bounded (or a wider one). Bounds that need an envelope fall back to the
/// series' global extrema when it is absent.
#[derive(Debug, Clone, Copy)]
pub struct BoundInput<'a> {
    series: TimeSeriesView<'a>,
    stats: &'a SeriesStats,
    envelope: Option<&'a SeriesEnvelope>,
}

impl<'a> BoundInput<'a> {
    /// Bundle a series with its statistics.
    #[must_use]
    pub fn new(series: TimeSeriesView<'a>, stats: &'a SeriesStats) -> Self {
        Self {
            series,
            stats,
            envelope: None,
        }
    }

    /// Attach an envelope of this series.
    #[must_use]
    pub fn with_envelope(mut self, envelope: &'a SeriesEnvelope) -> Self {
        self.envelope = Some(envelope);
        self
    }

    #[must_use]
    pub fn series(&self) -> TimeSeriesView<'a> {
        self.series
    }

    #[must_use]
    pub fn stats(&self) -> &'a SeriesStats {
        self.stats
    }

    #[must_use]
    pub fn envelope(&self) -> Option<&'a SeriesEnvelope> {
        self.envelope
    }
}

/// Squared gap of each query point to the fixed interval `[lo, hi]`, scaled
/// by `scale`.
///
/// With the reference's global extrema this bounds DTW under any band, and
/// WDTW when `scale` is the smallest weight.
#[must_use]
pub fn lb_global(query: &[f64], lo: f64, hi: f64, scale: f64, cutoff: f64) -> f64 {
    let mut sum = 0.0;
    for &x in query {
        sum += scale * outside(x, lo, hi).powi(2);
        if sum >= cutoff {
            break;
        }
    }
    sum
}

/// LB_Keogh for ERP: each query point either matches a reference point inside
/// the envelope or is charged against the gap value, so the envelope is
/// widened to include `gap`.
#[must_use]
pub fn lb_erp(query: &[f64], envelope: &SeriesEnvelope, gap: f64, cutoff: f64) -> f64 {
    let n = query.len().min(envelope.len());
    let (upper, lower) = (envelope.upper(), envelope.lower());
    let mut sum = 0.0;
    for i in 0..n {
        sum += outside(query[i], lower[i].min(gap), upper[i].max(gap)).powi(2);
        if sum >= cutoff {
            break;
        }
    }
    sum
}

/// LCSS bound: only query points within `epsilon` of the envelope can match,
/// so `1 - candidates / len(query)` cannot exceed the distance.
///
/// Query points past the end of a shorter reference can still align with its
/// tail; they are tested against the last envelope step, which covers every
/// reference value such a point can reach.
///
/// Compares the gap itself against `epsilon` (rather than widening the
/// envelope by `epsilon`) so the test rounds exactly as the kernel's
/// `|a - b| <= epsilon` does.
#[must_use]
pub fn lb_lcss(query: &[f64], envelope: &SeriesEnvelope, epsilon: f64) -> f64 {
    let (upper, lower) = (envelope.upper(), envelope.lower());
    let Some(last) = envelope.len().checked_sub(1) else {
        return 0.0;
    };
    let candidates = query
        .iter()
        .enumerate()
        .filter(|&(i, &x)| {
            let k = i.min(last);
            outside(x, lower[k], upper[k]) <= epsilon
        })
        .count();
    1.0 - candidates as f64 / query.len() as f64
}

/// [`lb_lcss`] against the reference's global range.
#[must_use]
pub fn lb_lcss_global(query: &[f64], lo: f64, hi: f64, epsilon: f64) -> f64 {
    let candidates = query
        .iter()
        .filter(|&&x| outside(x, lo, hi) <= epsilon)
        .count();
    1.0 - candidates as f64 / query.len() as f64
}

/// Extremum term for one side of the MSM bound.
///
/// If `own`'s maximum exceeds `other`'s, some alignment step must produce the
/// first maximum of `own`: either a move costing at least the extremum gap,
/// or a split/merge out of its predecessor. A maximum at index 0 is already
/// covered by the first-value term and contributes nothing; the minimum is
/// handled symmetrically.
fn msm_side(own: &[f64], own_stats: &SeriesStats, other: &SeriesStats, c: f64) -> f64 {
    let mut term = 0.0;
    let i = own_stats.argmax();
    if own_stats.max() > other.max() && i > 0 {
        term += (own_stats.max() - other.max()).min(c + own[i] - own[i - 1]);
    }
    let j = own_stats.argmin();
    if own_stats.min() < other.min() && j > 0 {
        term += (other.min() - own_stats.min()).min(c + own[j - 1] - own[j]);
    }
    term
}

/// MSM bound: `|a_0 - b_0|` plus the larger of the query-side and
/// reference-side extremum terms.
///
/// Row-entry and column-entry steps of an alignment are disjoint from each
/// other and from the origin, so either side's term can be added to the
/// first-value term without counting any step twice.
#[must_use]
pub fn lb_msm(query: &BoundInput<'_>, reference: &BoundInput<'_>, c: f64) -> f64 {
    let (a, b) = (query.series.as_slice(), reference.series.as_slice());
    let rows = msm_side(a, query.stats, reference.stats, c);
    let cols = msm_side(b, reference.stats, query.stats, c);
    (a[0] - b[0]).abs() + rows.max(cols)
}

/// TWE bound: every reference point is entered either by a match with some
/// query value (at least its gap to the query's range) or by a deletion
/// (its step from the previous point plus `nu + lambda`).
#[must_use]
pub fn lb_twe(
    query_stats: &SeriesStats,
    reference: &[f64],
    nu: f64,
    lambda: f64,
    cutoff: f64,
) -> f64 {
    let (lo, hi) = (query_stats.min(), query_stats.max());
    let mut prev = 0.0;
    let mut sum = 0.0;
    for &x in reference {
        sum += outside(x, lo, hi).min((x - prev).abs() + nu + lambda);
        if sum >= cutoff {
            break;
        }
        prev = x;
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::BandConstraint;
    use crate::lcss::Lcss;
    use crate::measure::ElasticDistance;
    use crate::series::TimeSeries;

    fn ts(values: &[f64]) -> TimeSeries {
        TimeSeries::new(values.to_vec()).unwrap()
    }

    #[test]
    fn msm_reference_value() {
        let a = ts(&[1.0, 3.0, 2.0, 5.0, 4.0]);
        let b = ts(&[2.0, 1.0, 4.0, 3.0, 6.0]);
        let (sa, sb) = (SeriesStats::compute(a.as_view()), SeriesStats::compute(b.as_view()));
        let lb = lb_msm(
            &BoundInput::new(a.as_view(), &sa),
            &BoundInput::new(b.as_view(), &sb),
            1.0,
        );
        assert_eq!(lb, 2.0);
    }

    #[test]
    fn msm_extremum_at_start_is_not_counted_twice() {
        let a = ts(&[10.0, 0.0, 0.0]);
        let b = ts(&[0.0, 0.0, 0.0]);
        let (sa, sb) = (SeriesStats::compute(a.as_view()), SeriesStats::compute(b.as_view()));
        let lb = lb_msm(
            &BoundInput::new(a.as_view(), &sa),
            &BoundInput::new(b.as_view(), &sb),
            1.0,
        );
        assert_eq!(lb, 10.0);
    }

    #[test]
    fn twe_reference_value() {
        let a = ts(&[1.0, 3.0, 2.0, 5.0, 4.0]);
        let sa = SeriesStats::compute(a.as_view());
        assert_eq!(lb_twe(&sa, &[2.0, 1.0, 4.0, 3.0, 6.0], 0.5, 1.0, f64::INFINITY), 1.0);
    }

    #[test]
    fn erp_gap_widens_envelope() {
        let b = ts(&[5.0, 5.0, 5.0]);
        let env = SeriesEnvelope::compute(b.as_view(), BandConstraint::SakoeChibaRadius(0));
        // 0.0 lies between the gap value and the envelope, so it costs nothing.
        assert_eq!(lb_erp(&[0.0, 0.0, 0.0], &env, 0.0, f64::INFINITY), 0.0);
        assert_eq!(lb_erp(&[7.0, 0.0, 0.0], &env, 0.0, f64::INFINITY), 4.0);
    }

    #[test]
    fn lcss_counts_points_within_tolerance() {
        let b = ts(&[0.0, 0.0, 0.0, 0.0]);
        let env = SeriesEnvelope::compute(b.as_view(), BandConstraint::SakoeChibaRadius(1));
        let lb = lb_lcss(&[0.1, 0.5, 2.0, -0.2], &env, 0.2);
        assert!((lb - 0.5).abs() < 1e-12);
        assert!((lb_lcss_global(&[0.1, 0.5, 2.0, -0.2], 0.0, 0.0, 0.2) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn lcss_longer_query_reaches_reference_tail() {
        let a = ts(&[5.0, 5.0, 1.0, 1.0, 1.0]);
        let b = ts(&[1.0, 1.0, 1.0]);
        for constraint in [BandConstraint::Unconstrained, BandConstraint::SakoeChibaRadius(2)] {
            let env = SeriesEnvelope::compute(b.as_view(), constraint);
            let lb = lb_lcss(a.as_ref(), &env, 0.0);
            let d = Lcss::new(0.0)
                .unwrap()
                .with_constraint(constraint)
                .distance(a.as_view(), b.as_view())
                .unwrap()
                .value();
            assert!((d - 0.4).abs() < 1e-12, "{constraint:?}: distance {d}");
            assert!(lb <= d + 1e-12, "{constraint:?}: lb {lb} > distance {d}");
        }
    }

    #[test]
    fn global_bound_scales() {
        assert_eq!(lb_global(&[3.0, -1.0], 0.0, 1.0, 1.0, f64::INFINITY), 5.0);
        assert_eq!(lb_global(&[3.0, -1.0], 0.0, 1.0, 0.5, f64::INFINITY), 2.5);
        assert_eq!(lb_global(&[3.0, -1.0], 0.0, 1.0, 1.0, 3.0), 4.0);
    }
}

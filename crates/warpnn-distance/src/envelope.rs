//! Sakoe-Chiba envelopes and the LB_Keogh family of lower bounds.

use std::collections::VecDeque;

use tracing::instrument;

use crate::constraint::BandConstraint;
use crate::series::TimeSeriesView;

/// Distance from `x` to the interval `[lo, hi]`; zero inside.
pub(crate) fn outside(x: f64, lo: f64, hi: f64) -> f64 {
    if x > hi {
        x - hi
    } else if x < lo {
        lo - x
    } else {
        0.0
    }
}

/// Extremum of `data[i - radius..=i + radius]` for every `i`.
///
/// `dominated(kept, new)` is true when `new` makes `kept` useless, so the
/// deque front always holds the window's extremum.
fn sliding_extremum(data: &[f64], radius: usize, dominated: impl Fn(f64, f64) -> bool) -> Vec<f64> {
    let n = data.len();
    let mut out = Vec::with_capacity(n);
    let mut window: VecDeque<usize> = VecDeque::new();
    let mut pushed = 0;
    for i in 0..n {
        let last = (i + radius).min(n - 1);
        for j in pushed..=last {
            while window.back().is_some_and(|&k| dominated(data[k], data[j])) {
                window.pop_back();
            }
            window.push_back(j);
        }
        pushed = last + 1;
        while window.front().is_some_and(|&k| k + radius < i) {
            window.pop_front();
        }
        if let Some(&k) = window.front() {
            out.push(data[k]);
        }
    }
    out
}

/// Upper and lower envelope of a reference series under a band.
///
/// For each time step `i`, `upper[i]` is the maximum of `series[j]` where
/// `|i - j| <= radius`, and `lower[i]` is the minimum. The envelope bounds the
/// values the reference can offer to a query point at `i`; the query itself
/// is not required to lie inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesEnvelope {
    upper: Vec<f64>,
    lower: Vec<f64>,
}

impl SeriesEnvelope {
    /// Envelope of `series` under `constraint`.
    ///
    /// Unconstrained bands give the global maximum and minimum at every step.
    /// Banded envelopes use a monotonic-deque sliding window, O(n) per side.
    #[must_use]
    #[instrument(level = "trace", skip(series), fields(n = series.len()))]
    pub fn compute(series: TimeSeriesView<'_>, constraint: BandConstraint) -> Self {
        let data = series.as_slice();
        match constraint.radius() {
            Some(radius) if radius + 1 < data.len() => Self {
                upper: sliding_extremum(data, radius, |kept, new| kept <= new),
                lower: sliding_extremum(data, radius, |kept, new| kept >= new),
            },
            _ => {
                let hi = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let lo = data.iter().copied().fold(f64::INFINITY, f64::min);
                Self {
                    upper: vec![hi; data.len()],
                    lower: vec![lo; data.len()],
                }
            }
        }
    }

    #[must_use]
    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    #[must_use]
    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    /// Number of steps, equal to the series length.
    #[must_use]
    pub fn len(&self) -> usize {
        self.upper.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.upper.is_empty()
    }
}

/// LB_Keogh lower bound on DTW, in squared units.
///
/// Sums the squared gap between each query point and the reference envelope
/// at the same index. Positions past the shorter of the two are skipped.
/// Returns the partial sum as soon as it reaches `cutoff`, which is still a
/// valid lower bound.
///
/// `lb_keogh(q, envelope(c, r)) <= dtw_w(q, c)` for every band `w <= r`.
#[must_use]
pub fn lb_keogh(query: &[f64], envelope: &SeriesEnvelope, cutoff: f64) -> f64 {
    let n = query.len().min(envelope.len());
    let mut sum = 0.0;
    for i in 0..n {
        sum += outside(query[i], envelope.lower[i], envelope.upper[i]).powi(2);
        if sum >= cutoff {
            break;
        }
    }
    sum
}

/// [`lb_keogh`] visiting query positions in the given order.
///
/// Passing the query's magnitude ranking (largest `|value|` first) makes the
/// sum reach `cutoff` sooner on z-normalised data. Indices outside the
/// envelope are skipped.
#[must_use]
pub fn lb_keogh_ranked(
    query: &[f64],
    envelope: &SeriesEnvelope,
    order: &[usize],
    cutoff: f64,
) -> f64 {
    let n = query.len().min(envelope.len());
    let mut sum = 0.0;
    for &i in order.iter().filter(|&&i| i < n) {
        sum += outside(query[i], envelope.lower[i], envelope.upper[i]).powi(2);
        if sum >= cutoff {
            break;
        }
    }
    sum
}

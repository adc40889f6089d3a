//! Band-independent summary statistics of a series.

use crate::series::TimeSeriesView;

/// Global extrema, their first positions, boundary flags and the
/// magnitude ranking of a series. Computed once; never depends on a band.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesStats {
    min: f64,
    max: f64,
    argmin: usize,
    argmax: usize,
    len: usize,
    min_at_last: bool,
    max_at_last: bool,
    ranking: Vec<usize>,
}

impl SeriesStats {
    /// Compute statistics for a series in O(n log n).
    #[must_use]
    pub fn compute(series: TimeSeriesView<'_>) -> Self {
        let data = series.as_slice();
        let len = data.len();

        let (mut argmin, mut argmax) = (0, 0);
        for (i, &v) in data.iter().enumerate() {
            if v < data[argmin] {
                argmin = i;
            }
            if v > data[argmax] {
                argmax = i;
            }
        }
        let (min, max) = (data[argmin], data[argmax]);

        let mut ranking: Vec<usize> = (0..len).collect();
        ranking.sort_by(|&i, &j| data[j].abs().total_cmp(&data[i].abs()));

        Self {
            min,
            max,
            argmin,
            argmax,
            len,
            min_at_last: data[len - 1] == min,
            max_at_last: data[len - 1] == max,
            ranking,
        }
    }

    /// Smallest value.
    #[must_use]
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Largest value.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.max
    }

    /// First index holding the minimum.
    #[must_use]
    pub fn argmin(&self) -> usize {
        self.argmin
    }

    /// First index holding the maximum.
    #[must_use]
    pub fn argmax(&self) -> usize {
        self.argmax
    }

    /// Length of the summarised series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false; series are non-empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn min_at_first(&self) -> bool {
        self.argmin == 0
    }

    #[must_use]
    pub fn min_at_last(&self) -> bool {
        self.min_at_last
    }

    #[must_use]
    pub fn max_at_first(&self) -> bool {
        self.argmax == 0
    }

    #[must_use]
    pub fn max_at_last(&self) -> bool {
        self.max_at_last
    }

    /// Indices sorted by descending `|value|`; ties keep index order.
    #[must_use]
    pub fn ranking(&self) -> &[usize] {
        &self.ranking
    }

    /// Position holding the `rank`-th largest magnitude, if `rank < len`.
    #[must_use]
    pub fn ranked_index(&self, rank: usize) -> Option<usize> {
        self.ranking.get(rank).copied()
    }
}

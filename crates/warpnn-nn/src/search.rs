//! Pruned 1-NN search of one query against a cached reference set.

use std::iter::Sum;
use std::ops::{Add, AddAssign};

use warpnn_distance::{BandConstraint, BoundInput, ElasticDistance, Measure};

use crate::cache::SequenceCache;
use crate::candidate::Candidate;
use crate::error::SweepError;

/// How each reference visited during a search was resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruningStats {
    /// Rejected because the lower bound reached the best distance.
    pub lower_bound_pruned: usize,
    /// Kernel started but abandoned at the cutoff.
    pub early_abandoned: usize,
    /// Kernel ran to completion.
    pub computed: usize,
    /// Distance taken from an earlier, still valid computation.
    pub reused: usize,
}

impl PruningStats {
    /// Number of references resolved in any way.
    #[must_use]
    pub fn total(&self) -> usize {
        self.lower_bound_pruned + self.early_abandoned + self.computed + self.reused
    }

    /// Share of resolved references that needed no completed kernel run.
    #[must_use]
    pub fn avoided_fraction(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (total - self.computed) as f64 / total as f64
    }
}

impl Add for PruningStats {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl AddAssign for PruningStats {
    fn add_assign(&mut self, rhs: Self) {
        self.lower_bound_pruned += rhs.lower_bound_pruned;
        self.early_abandoned += rhs.early_abandoned;
        self.computed += rhs.computed;
        self.reused += rhs.reused;
    }
}

impl Sum for PruningStats {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// 1-NN search under one measure against the sequences of a cache.
///
/// For envelope-based measures the cache must already hold envelopes for
/// [`Measure::envelope_constraint`] (see [`SequenceCache::prepare_envelopes`]).
#[derive(Debug, Clone, Copy)]
pub struct NearestNeighbor<'a> {
    measure: Measure,
    envelope: Option<BandConstraint>,
    references: &'a SequenceCache,
}

impl<'a> NearestNeighbor<'a> {
    #[must_use]
    pub fn new(measure: Measure, references: &'a SequenceCache) -> Self {
        Self {
            measure,
            envelope: measure.envelope_constraint(),
            references,
        }
    }

    /// Find the nearest reference to `query`, skipping `exclude`.
    ///
    /// References are visited in index order. Each is first tested against
    /// the lower bound at the current best distance, then computed with that
    /// distance as cutoff. Only strict improvements replace the candidate, so
    /// ties go to the lowest index.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`SweepError::Cache`] | Envelopes are not prepared for the measure's band |
    /// | [`SweepError::Distance`] | The kernel rejects the pair (lock-step length mismatch) |
    pub fn search(
        &self,
        query: &BoundInput<'_>,
        exclude: Option<usize>,
    ) -> Result<(Candidate, PruningStats), SweepError> {
        let mut candidate = Candidate::new();
        let mut stats = PruningStats::default();

        for index in (0..self.references.len()).filter(|&i| Some(i) != exclude) {
            let reference = self.references.bound_input(index, self.envelope)?;
            let best = candidate.distance();

            if self.measure.lower_bound(query, &reference, best) >= best {
                stats.lower_bound_pruned += 1;
                continue;
            }

            let extended =
                self.measure
                    .distance_extended(query.series(), reference.series(), best)?;
            if extended.distance.is_finite() {
                stats.computed += 1;
                candidate.offer(index, extended);
            } else {
                stats.early_abandoned += 1;
            }
        }

        Ok((candidate, stats))
    }
}

//! Per-dataset cache of envelopes, global statistics and pairwise bounds.

use rayon::prelude::*;
use tracing::{debug, instrument};

use warpnn_distance::{BandConstraint, BoundInput, SeriesEnvelope, SeriesStats, TimeSeries};

use crate::error::CacheError;
use crate::sequence::Sequence;

/// State of one sequence's envelope.
///
/// The only transition is a rebuild, which replaces the slot wholesale with
/// `BuiltFor` the requested band.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum EnvelopeSlot {
    /// No envelope has been requested yet.
    #[default]
    Unbuilt,
    /// Envelope valid for exactly `constraint`.
    BuiltFor {
        /// Band the envelope was computed with.
        constraint: BandConstraint,
        /// The envelope itself.
        envelope: SeriesEnvelope,
    },
}

impl EnvelopeSlot {
    /// Return the envelope if it was built for `constraint`.
    #[must_use]
    pub fn envelope_for(&self, constraint: BandConstraint) -> Option<&SeriesEnvelope> {
        match self {
            Self::BuiltFor {
                constraint: built,
                envelope,
            } if *built == constraint => Some(envelope),
            _ => None,
        }
    }

    /// Rebuild for `constraint` unless already built for it. Returns true on rebuild.
    fn ensure(&mut self, series: &TimeSeries, constraint: BandConstraint) -> bool {
        if self.envelope_for(constraint).is_some() {
            return false;
        }
        *self = Self::BuiltFor {
            constraint,
            envelope: SeriesEnvelope::compute(series.as_view(), constraint),
        };
        true
    }
}

/// Derived artifacts for every sequence of one dataset.
///
/// Global statistics and magnitude rankings are computed once at
/// construction. Envelopes are built lazily per `(sequence, band)` and a
/// rebuild of one slot never touches another.
///
/// The optional pairwise matrix stores the latest lower bound between two
/// sequences, with `0.0` meaning "not computed". A true zero bound is
/// therefore indistinguishable from an unset entry; callers that need the
/// distinction must track it themselves.
#[derive(Debug, Clone)]
pub struct SequenceCache {
    series: Vec<TimeSeries>,
    stats: Vec<SeriesStats>,
    slots: Vec<EnvelopeSlot>,
    constraint: BandConstraint,
    rebuilds: usize,
    pairwise: Option<Vec<f64>>,
}

impl SequenceCache {
    /// Build statistics for the primary channel of every sequence.
    ///
    /// `initial` is the band reported by [`constraint`][Self::constraint]
    /// until [`prepare_envelopes`][Self::prepare_envelopes] is called with
    /// another one. No envelope is built here.
    #[must_use]
    #[instrument(skip(sequences), fields(n = sequences.len()))]
    pub fn new(sequences: &[Sequence], initial: BandConstraint) -> Self {
        let series: Vec<TimeSeries> = sequences.iter().map(|s| s.primary().clone()).collect();
        let stats: Vec<SeriesStats> = series
            .par_iter()
            .map(|s| SeriesStats::compute(s.as_view()))
            .collect();
        let n = series.len();
        Self {
            series,
            stats,
            slots: vec![EnvelopeSlot::Unbuilt; n],
            constraint: initial,
            rebuilds: 0,
            pairwise: None,
        }
    }

    /// Allocate the `n x n` pairwise lower-bound matrix, all entries unset.
    #[must_use]
    pub fn with_pairwise_bounds(mut self) -> Self {
        let n = self.series.len();
        self.pairwise = Some(vec![0.0; n * n]);
        self
    }

    /// Number of sequences.
    #[must_use]
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// True when the cache holds no sequences.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Band of the most recent [`prepare_envelopes`][Self::prepare_envelopes]
    /// call, or the initial band.
    #[must_use]
    pub fn constraint(&self) -> BandConstraint {
        self.constraint
    }

    /// Total number of envelope builds so far.
    #[must_use]
    pub fn rebuild_count(&self) -> usize {
        self.rebuilds
    }

    fn check(&self, index: usize) -> Result<(), CacheError> {
        if index < self.series.len() {
            Ok(())
        } else {
            Err(CacheError::UnknownSequence {
                index,
                len: self.series.len(),
            })
        }
    }

    /// The cached primary channel of sequence `index`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`CacheError::UnknownSequence`] | `index >= len()` |
    pub fn series(&self, index: usize) -> Result<&TimeSeries, CacheError> {
        self.check(index)?;
        Ok(&self.series[index])
    }

    /// Global statistics of sequence `index`. O(1).
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`CacheError::UnknownSequence`] | `index >= len()` |
    pub fn stats(&self, index: usize) -> Result<&SeriesStats, CacheError> {
        self.check(index)?;
        Ok(&self.stats[index])
    }

    /// Position of the `rank`-th largest magnitude in sequence `index`. O(1).
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`CacheError::UnknownSequence`] | `index >= len()` |
    pub fn ranked_index(&self, index: usize, rank: usize) -> Result<Option<usize>, CacheError> {
        Ok(self.stats(index)?.ranked_index(rank))
    }

    /// Envelope of sequence `index` for `constraint`, rebuilding on a miss.
    ///
    /// A second call with the same band returns the stored envelope without
    /// recomputation.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`CacheError::UnknownSequence`] | `index >= len()` |
    pub fn get_envelope(
        &mut self,
        index: usize,
        constraint: BandConstraint,
    ) -> Result<&SeriesEnvelope, CacheError> {
        self.check(index)?;
        if self.slots[index].ensure(&self.series[index], constraint) {
            self.rebuilds += 1;
        }
        self.envelope(index, constraint)
    }

    /// Read-only envelope access; never rebuilds.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`CacheError::UnknownSequence`] | `index >= len()` |
    /// | [`CacheError::StaleEnvelope`] | The slot is unbuilt or built for another band |
    pub fn envelope(
        &self,
        index: usize,
        constraint: BandConstraint,
    ) -> Result<&SeriesEnvelope, CacheError> {
        self.check(index)?;
        self.slots[index]
            .envelope_for(constraint)
            .ok_or(CacheError::StaleEnvelope {
                index,
                requested: constraint,
            })
    }

    /// Bring every slot up to date for `constraint`, in parallel.
    ///
    /// Slots are disjoint, so each worker rebuilds only the slot it owns.
    /// Returns the number of slots rebuilt.
    #[instrument(skip(self), fields(n = self.series.len()))]
    pub fn prepare_envelopes(&mut self, constraint: BandConstraint) -> usize {
        let rebuilt: usize = self
            .slots
            .par_iter_mut()
            .zip(self.series.par_iter())
            .map(|(slot, series)| usize::from(slot.ensure(series, constraint)))
            .sum();
        self.rebuilds += rebuilt;
        self.constraint = constraint;
        debug!(rebuilt, "envelopes prepared");
        rebuilt
    }

    /// Bound inputs for sequence `index`, with its envelope attached when
    /// `constraint` is given.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`CacheError::UnknownSequence`] | `index >= len()` |
    /// | [`CacheError::StaleEnvelope`] | `constraint` is given but not prepared |
    pub fn bound_input(
        &self,
        index: usize,
        constraint: Option<BandConstraint>,
    ) -> Result<BoundInput<'_>, CacheError> {
        let input = BoundInput::new(self.series(index)?.as_view(), &self.stats[index]);
        match constraint {
            Some(c) => Ok(input.with_envelope(self.envelope(index, c)?)),
            None => Ok(input),
        }
    }

    fn pairwise_offset(&self, i: usize, j: usize) -> Result<usize, CacheError> {
        self.check(i)?;
        self.check(j)?;
        if self.pairwise.is_none() {
            return Err(CacheError::PairwiseBoundsDisabled);
        }
        Ok(i * self.series.len() + j)
    }

    /// Store the latest lower bound between sequences `i` and `j`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`CacheError::UnknownSequence`] | `i` or `j` is out of range |
    /// | [`CacheError::PairwiseBoundsDisabled`] | The matrix was not enabled |
    pub fn set_bound(&mut self, i: usize, j: usize, value: f64) -> Result<(), CacheError> {
        let offset = self.pairwise_offset(i, j)?;
        if let Some(matrix) = self.pairwise.as_mut() {
            matrix[offset] = value;
        }
        Ok(())
    }

    /// The stored bound between `i` and `j`; `0.0` when never set.
    ///
    /// # Errors
    ///
    /// Same as [`set_bound`][Self::set_bound].
    pub fn bound(&self, i: usize, j: usize) -> Result<f64, CacheError> {
        let offset = self.pairwise_offset(i, j)?;
        Ok(self.pairwise.as_ref().map_or(0.0, |m| m[offset]))
    }

    /// True when the stored bound is non-zero.
    ///
    /// # Errors
    ///
    /// Same as [`set_bound`][Self::set_bound].
    pub fn has_bound(&self, i: usize, j: usize) -> Result<bool, CacheError> {
        Ok(self.bound(i, j)? != 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::ClassLabel;

    fn dataset() -> Vec<Sequence> {
        [
            vec![0.0, 1.0, 2.0, 1.0, 0.0],
            vec![3.0, -1.0, 4.0, 1.0, 5.0],
            vec![-2.0, -2.0, 0.0, 2.0, 2.0],
        ]
        .into_iter()
        .map(|v| Sequence::univariate(TimeSeries::new(v).unwrap(), ClassLabel::new(0)))
        .collect()
    }

    #[test]
    fn statistics_are_eager_envelopes_lazy() {
        let cache = SequenceCache::new(&dataset(), BandConstraint::SakoeChibaRadius(1));
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.stats(1).unwrap().max(), 5.0);
        assert_eq!(cache.stats(1).unwrap().argmin(), 1);
        assert_eq!(cache.ranked_index(1, 0).unwrap(), Some(4));
        assert_eq!(cache.rebuild_count(), 0);
        assert!(matches!(
            cache.envelope(0, BandConstraint::SakoeChibaRadius(1)),
            Err(CacheError::StaleEnvelope { index: 0, .. })
        ));
    }

    #[test]
    fn repeated_request_does_not_rebuild() {
        let mut cache = SequenceCache::new(&dataset(), BandConstraint::Unconstrained);
        let c = BandConstraint::SakoeChibaRadius(1);
        let first = cache.get_envelope(0, c).unwrap().clone();
        let second = cache.get_envelope(0, c).unwrap().clone();
        assert_eq!(first, second);
        assert_eq!(cache.rebuild_count(), 1);
    }

    #[test]
    fn band_change_rebuilds_only_that_slot() {
        let mut cache = SequenceCache::new(&dataset(), BandConstraint::Unconstrained);
        let narrow = BandConstraint::SakoeChibaRadius(0);
        let wide = BandConstraint::SakoeChibaRadius(2);
        cache.get_envelope(0, narrow).unwrap();
        cache.get_envelope(1, narrow).unwrap();
        cache.get_envelope(0, wide).unwrap();
        assert_eq!(cache.rebuild_count(), 3);
        assert!(cache.envelope(1, narrow).is_ok());
        assert!(cache.envelope(0, narrow).is_err());
    }

    #[test]
    fn prepare_rebuilds_stale_slots_only() {
        let mut cache = SequenceCache::new(&dataset(), BandConstraint::Unconstrained);
        let c = BandConstraint::SakoeChibaRadius(1);
        cache.get_envelope(2, c).unwrap();
        assert_eq!(cache.prepare_envelopes(c), 2);
        assert_eq!(cache.prepare_envelopes(c), 0);
        assert_eq!(cache.rebuild_count(), 3);
        assert_eq!(cache.constraint(), c);
        assert!(cache.bound_input(1, Some(c)).unwrap().envelope().is_some());
    }

    #[test]
    fn unknown_index_fails_loudly() {
        let mut cache = SequenceCache::new(&dataset(), BandConstraint::Unconstrained);
        assert_eq!(
            cache.get_envelope(7, BandConstraint::Unconstrained).unwrap_err(),
            CacheError::UnknownSequence { index: 7, len: 3 }
        );
        assert!(cache.stats(3).is_err());
    }

    #[test]
    fn pairwise_matrix_is_opt_in() {
        let mut cache = SequenceCache::new(&dataset(), BandConstraint::Unconstrained);
        assert_eq!(cache.set_bound(0, 1, 2.0), Err(CacheError::PairwiseBoundsDisabled));

        let mut cache = cache.with_pairwise_bounds();
        assert!(!cache.has_bound(0, 1).unwrap());
        cache.set_bound(0, 1, 2.0).unwrap();
        assert!(cache.has_bound(0, 1).unwrap());
        assert_eq!(cache.bound(0, 1).unwrap(), 2.0);
        assert!(!cache.has_bound(1, 0).unwrap());
    }

    #[test]
    fn zero_bound_reads_as_unset() {
        let mut cache =
            SequenceCache::new(&dataset(), BandConstraint::Unconstrained).with_pairwise_bounds();
        cache.set_bound(2, 0, 0.0).unwrap();
        assert!(!cache.has_bound(2, 0).unwrap());
    }
}

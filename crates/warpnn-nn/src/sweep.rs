//! Leave-one-out window sweep with candidate reuse across windows.
//!
//! Every query first gets the distance to every other sequence at the widest
//! window W. That table orders the scan at every narrower window: a value at W
//! is a lower bound at any window ≤ W and is exact once the window reaches its
//! validity radius. The sweep walks windows upward, carries each query's
//! candidate forward, and stops work on a query once its candidate is
//! confirmed for every remaining window.

use std::cmp::Ordering;

use rayon::prelude::*;
use tracing::{debug, info, instrument};
use warpnn_distance::{BoundInput, ElasticDistance, Measure};

use crate::cache::SequenceCache;
use crate::candidate::{Candidate, CandidateStatus};
use crate::error::SweepError;
use crate::result::{SweepResult, WindowScore};
use crate::search::PruningStats;
use crate::sequence::Sequence;

/// One row of a query's max-window table.
#[derive(Debug, Clone, Copy)]
struct Neighbor {
    index: usize,
    distance: f64,
    radius: Option<usize>,
}

impl Neighbor {
    fn cmp_by_distance(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then(self.index.cmp(&other.index))
    }
}

/// Sweep state of one query.
#[derive(Debug)]
struct QueryState {
    candidate: Candidate,
    /// Position of the candidate in `neighbors`.
    position: Option<usize>,
    /// Every other sequence, ascending by distance at the widest window.
    neighbors: Vec<Neighbor>,
}

impl QueryState {
    fn new(neighbors: Vec<Neighbor>) -> Self {
        Self {
            candidate: Candidate::new(),
            position: None,
            neighbors,
        }
    }

    /// Smallest distance to any other sequence at the widest window.
    fn floor(&self) -> f64 {
        self.neighbors.first().map_or(f64::INFINITY, |n| n.distance)
    }

    fn accept(&mut self, position: usize, distance: f64, radius: Option<usize>) {
        if distance < self.candidate.distance() {
            self.candidate.update(
                self.neighbors[position].index,
                radius,
                distance,
                CandidateStatus::BestCandidate,
            );
            self.position = Some(position);
        }
    }

    /// Resolve the neighbour at `position` at the current window, either from
    /// the table or by running the kernel with the current best as cutoff.
    fn resolve(
        &mut self,
        position: usize,
        window: usize,
        measure: &Measure,
        query: &BoundInput<'_>,
        cache: &SequenceCache,
        stats: &mut PruningStats,
    ) -> Result<(), SweepError> {
        let neighbor = self.neighbors[position];
        if neighbor.radius.is_some_and(|r| r <= window) {
            stats.reused += 1;
            self.accept(position, neighbor.distance, neighbor.radius);
            return Ok(());
        }

        let reference = cache.bound_input(neighbor.index, measure.envelope_constraint())?;
        let best = self.candidate.distance();
        if measure.lower_bound(query, &reference, best) >= best {
            stats.lower_bound_pruned += 1;
            return Ok(());
        }

        let extended = measure.distance_extended(query.series(), reference.series(), best)?;
        if extended.distance.is_finite() {
            stats.computed += 1;
            self.accept(
                position,
                extended.distance.value(),
                extended.validity_radius,
            );
        } else {
            stats.early_abandoned += 1;
        }
        Ok(())
    }

    /// Bring the candidate up to date for `window`.
    fn advance(
        &mut self,
        query_index: usize,
        window: usize,
        measure: &Measure,
        cache: &SequenceCache,
    ) -> Result<PruningStats, SweepError> {
        let mut stats = PruningStats::default();
        if self.candidate.is_confirmed() {
            return Ok(stats);
        }

        let query = cache.bound_input(query_index, measure.envelope_constraint())?;
        let previous = self.position;

        // The previous winner is usually still the winner; re-evaluating it
        // first gives the scan a tight cutoff.
        self.candidate = Candidate::new();
        self.position = None;
        if let Some(p) = previous {
            self.resolve(p, window, measure, &query, cache, &mut stats)?;
        }

        for position in 0..self.neighbors.len() {
            if self.neighbors[position].distance >= self.candidate.distance() {
                break;
            }
            if Some(position) == previous {
                continue;
            }
            self.resolve(position, window, measure, &query, cache, &mut stats)?;
        }

        if self.candidate.index().is_some() && self.candidate.distance() <= self.floor() {
            self.candidate.confirm();
        }
        Ok(stats)
    }
}

/// Distances from `query` to every other sequence at the widest window,
/// sorted ascending with ties by index.
fn max_window_table(
    query: usize,
    measure: &Measure,
    cache: &SequenceCache,
) -> Result<(Vec<Neighbor>, PruningStats), SweepError> {
    let mut stats = PruningStats::default();
    let a = cache.series(query)?.as_view();
    let mut neighbors = Vec::with_capacity(cache.len().saturating_sub(1));
    for index in (0..cache.len()).filter(|&i| i != query) {
        let b = cache.series(index)?.as_view();
        let extended = measure.distance_extended(a, b, f64::INFINITY)?;
        if extended.distance.is_finite() {
            stats.computed += 1;
        } else {
            stats.early_abandoned += 1;
        }
        neighbors.push(Neighbor {
            index,
            distance: extended.distance.value(),
            radius: extended.validity_radius,
        });
    }
    neighbors.sort_by(Neighbor::cmp_by_distance);
    Ok((neighbors, stats))
}

#[instrument(skip(measure, sequences, cache), fields(measure = measure.name(), n = sequences.len()))]
pub(crate) fn window_sweep(
    windows: &[usize],
    measure: Measure,
    sequences: &[Sequence],
    cache: &mut SequenceCache,
) -> Result<SweepResult, SweepError> {
    let n = sequences.len();
    if n == 0 {
        return Err(SweepError::EmptyTrainingSet);
    }
    if n < 2 {
        return Err(SweepError::TooFewSequences { n });
    }
    if cache.len() != n {
        return Err(SweepError::CacheSizeMismatch {
            sequences: n,
            cached: cache.len(),
        });
    }

    let Some(&widest) = windows.last() else {
        return Ok(SweepResult {
            scores: Vec::new(),
            n_sequences: n,
            precompute: PruningStats::default(),
        });
    };

    let table_measure = measure.with_window(widest);
    let (mut states, precompute) = {
        let cache = &*cache;
        let tables: Vec<(Vec<Neighbor>, PruningStats)> = (0..n)
            .into_par_iter()
            .map(|q| max_window_table(q, &table_measure, cache))
            .collect::<Result<_, _>>()?;
        let precompute = tables.iter().map(|(_, s)| *s).sum::<PruningStats>();
        let states: Vec<QueryState> = tables
            .into_iter()
            .map(|(neighbors, _)| QueryState::new(neighbors))
            .collect();
        (states, precompute)
    };
    debug!(widest, computed = precompute.computed, "max-window table built");

    let mut scores = Vec::with_capacity(windows.len());
    for &window in windows {
        let windowed = measure.with_window(window);
        if let Some(constraint) = windowed.envelope_constraint() {
            cache.prepare_envelopes(constraint);
        }

        let cache = &*cache;
        let stats = states
            .par_iter_mut()
            .enumerate()
            .map(|(q, state)| state.advance(q, window, &windowed, cache))
            .try_reduce(PruningStats::default, |a, b| Ok(a + b))?;

        let neighbors: Vec<Option<usize>> = states.iter().map(|s| s.candidate.index()).collect();
        let distances: Vec<f64> = states.iter().map(|s| s.candidate.distance()).collect();
        let correct = neighbors
            .iter()
            .zip(sequences)
            .filter(|(nn, seq)| nn.is_some_and(|i| sequences[i].label() == seq.label()))
            .count();
        let confirmed = states.iter().filter(|s| s.candidate.is_confirmed()).count();
        let accuracy = correct as f64 / n as f64;

        debug!(
            window,
            correct,
            confirmed,
            pruned = stats.lower_bound_pruned,
            abandoned = stats.early_abandoned,
            computed = stats.computed,
            reused = stats.reused,
            "window evaluated"
        );

        scores.push(WindowScore {
            window,
            correct,
            accuracy,
            confirmed,
            neighbors,
            distances,
            stats,
        });
    }

    let result = SweepResult {
        scores,
        n_sequences: n,
        precompute,
    };
    info!(
        windows = result.scores.len(),
        best_accuracy = result.best_accuracy().unwrap_or(0.0),
        avoided = result.total_stats().avoided_fraction(),
        "sweep complete"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use warpnn_distance::{BandConstraint, Dtw, TimeSeries};

    use crate::config::SweepConfig;
    use crate::error::SweepError;
    use crate::label::ClassLabel;
    use crate::sequence::Sequence;

    use super::*;

    fn seq(values: &[f64], label: usize) -> Sequence {
        Sequence::univariate(
            TimeSeries::new(values.to_vec()).unwrap(),
            ClassLabel::new(label),
        )
    }

    fn run(sequences: &[Sequence], min: usize, max: usize) -> Result<SweepResult, SweepError> {
        let mut cache = SequenceCache::new(sequences, BandConstraint::Unconstrained);
        SweepConfig::new(min, max)
            .unwrap()
            .run(Dtw::unconstrained().into(), sequences, &mut cache)
    }

    #[test]
    fn rejects_degenerate_sets() {
        assert_eq!(run(&[], 0, 1).unwrap_err(), SweepError::EmptyTrainingSet);
        assert_eq!(
            run(&[seq(&[1.0], 0)], 0, 1).unwrap_err(),
            SweepError::TooFewSequences { n: 1 }
        );
    }

    #[test]
    fn rejects_mismatched_cache() {
        let sequences = vec![seq(&[0.0, 1.0], 0), seq(&[1.0, 0.0], 1)];
        let mut cache = SequenceCache::new(&sequences[..1], BandConstraint::Unconstrained);
        let err = SweepConfig::new(0, 1)
            .unwrap()
            .run(Dtw::unconstrained().into(), &sequences, &mut cache)
            .unwrap_err();
        assert_eq!(
            err,
            SweepError::CacheSizeMismatch {
                sequences: 2,
                cached: 1
            }
        );
    }

    #[test]
    fn shifted_pulse_is_found_once_window_allows_it() {
        let sequences = vec![
            seq(&[0.0, 1.0, 0.0, 0.0], 0),
            seq(&[0.0, 0.0, 1.0, 0.0], 0),
            seq(&[0.0, 0.0, 0.0, 0.5], 1),
        ];
        let result = run(&sequences, 0, 2).unwrap();
        let w0 = &result.scores[0];
        let w1 = &result.scores[1];

        // At window 0 the pulse pair costs 2 and query 0 prefers the half pulse.
        assert_eq!(w0.distances[0], 1.25);
        assert_eq!(w0.neighbors[0], Some(2));
        assert_eq!(w1.distances[0], 0.0);
        assert_eq!(w1.neighbors[0], Some(1));
        assert!(w1.accuracy >= w0.accuracy);
    }

    #[test]
    fn confirmed_queries_cost_nothing_later() {
        let sequences = vec![
            seq(&[0.0, 0.0, 0.0], 0),
            seq(&[0.0, 0.0, 0.0], 0),
            seq(&[5.0, 5.0, 5.0], 1),
            seq(&[5.0, 5.0, 5.0], 1),
        ];
        let result = run(&sequences, 0, 3).unwrap();
        assert_eq!(result.scores[0].confirmed, 4);
        assert_eq!(result.scores[0].accuracy, 1.0);
        for score in &result.scores[1..] {
            assert_eq!(score.stats.total(), 0);
            assert_eq!(score.confirmed, 4);
        }
    }
}

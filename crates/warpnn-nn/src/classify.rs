//! 1-NN classification of a test set against a training set.

use rayon::prelude::*;
use tracing::{info, instrument};
use warpnn_distance::Measure;

use crate::cache::SequenceCache;
use crate::error::SweepError;
use crate::result::Classification;
use crate::search::{NearestNeighbor, PruningStats};
use crate::sequence::Sequence;

/// Predict a label for every test sequence from its nearest training sequence.
///
/// Both datasets keep their own cache. Training envelopes are brought up to
/// date for `measure` first; test queries are then searched in parallel.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`SweepError::EmptyTrainingSet`] | `train` is empty |
/// | [`SweepError::CacheSizeMismatch`] | A cache holds a different number of sequences than its dataset |
/// | [`SweepError::Distance`] | A kernel rejects a pair |
#[instrument(skip_all, fields(measure = measure.name(), train = train.len(), test = test.len()))]
pub fn classify(
    train: &[Sequence],
    train_cache: &mut SequenceCache,
    test: &[Sequence],
    test_cache: &SequenceCache,
    measure: Measure,
) -> Result<Classification, SweepError> {
    if train.is_empty() {
        return Err(SweepError::EmptyTrainingSet);
    }
    for (sequences, cache) in [(train, &*train_cache), (test, test_cache)] {
        if sequences.len() != cache.len() {
            return Err(SweepError::CacheSizeMismatch {
                sequences: sequences.len(),
                cached: cache.len(),
            });
        }
    }

    if let Some(constraint) = measure.envelope_constraint() {
        train_cache.prepare_envelopes(constraint);
    }
    let search = NearestNeighbor::new(measure, train_cache);

    let outcomes: Vec<(Option<usize>, PruningStats)> = (0..test.len())
        .into_par_iter()
        .map(|q| -> Result<_, SweepError> {
            let query = test_cache.bound_input(q, None)?;
            let (candidate, stats) = search.search(&query, None)?;
            Ok((candidate.index(), stats))
        })
        .collect::<Result<_, _>>()?;

    let neighbors: Vec<Option<usize>> = outcomes.iter().map(|(nn, _)| *nn).collect();
    let predictions: Vec<_> = neighbors
        .iter()
        .map(|nn| nn.map(|i| train[i].label()))
        .collect();
    let correct = predictions
        .iter()
        .zip(test)
        .filter(|(p, seq)| **p == Some(seq.label()))
        .count();
    let accuracy = if test.is_empty() {
        0.0
    } else {
        correct as f64 / test.len() as f64
    };
    let stats = outcomes.iter().map(|(_, s)| *s).sum::<PruningStats>();

    info!(correct, accuracy, avoided = stats.avoided_fraction(), "classification complete");
    Ok(Classification {
        predictions,
        neighbors,
        correct,
        accuracy,
        stats,
    })
}

//! Accuracy regression tests for warpnn-nn.
//!
//! The sweep reuses work across windows, so every window it reports must
//! agree with a plain pruned search run from scratch at that window.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use warpnn_distance::{
    BandConstraint, Dtw, ElasticDistance, Erp, Lcss, Measure, Msm, TimeSeries, Twe, Wdtw,
};
use warpnn_nn::{
    ClassLabel, NearestNeighbor, Sequence, SequenceCache, SweepConfig, SweepResult, classify,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn seq(values: Vec<f64>, label: usize) -> Sequence {
    Sequence::univariate(
        TimeSeries::new(values).expect("valid test series"),
        ClassLabel::new(label),
    )
}

fn random_dataset(seed: u64, n: usize, len: usize) -> Vec<Sequence> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let values = (0..len).map(|_| rng.gen_range(-2.0..2.0)).collect();
            seq(values, rng.gen_range(0..2))
        })
        .collect()
}

/// Two classes: a shifted sine bump and a rising ramp, with small noise.
fn shapes_dataset(seed: u64, per_class: usize) -> Vec<Sequence> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut out = Vec::new();
    for _ in 0..per_class {
        let shift = rng.gen_range(0..4) as f64;
        let bump = (0..24)
            .map(|i| ((i as f64 - 8.0 - shift) * 0.4).sin().max(0.0) * 3.0 + rng.gen_range(-0.1..0.1))
            .collect();
        out.push(seq(bump, 0));
        let ramp = (0..24)
            .map(|i| i as f64 * 0.15 + rng.gen_range(-0.1..0.1))
            .collect();
        out.push(seq(ramp, 1));
    }
    out
}

fn measures() -> Vec<Measure> {
    vec![
        Dtw::unconstrained().into(),
        Wdtw::new(0.1).unwrap().into(),
        Erp::new(0.0).unwrap().into(),
        Lcss::new(0.5).unwrap().into(),
        Msm::new(0.5).unwrap().into(),
        Twe::new(0.1, 0.5).unwrap().into(),
    ]
}

fn sweep(measure: Measure, sequences: &[Sequence], max_window: usize) -> SweepResult {
    let mut cache = SequenceCache::new(sequences, BandConstraint::Unconstrained);
    SweepConfig::new(0, max_window)
        .unwrap()
        .run(measure, sequences, &mut cache)
        .unwrap()
}

/// Leave-one-out nearest distances at one window, searched from scratch.
fn brute_force(measure: Measure, sequences: &[Sequence], window: usize) -> Vec<f64> {
    let measure = measure.with_window(window);
    let mut cache = SequenceCache::new(sequences, BandConstraint::Unconstrained);
    if let Some(c) = measure.envelope_constraint() {
        cache.prepare_envelopes(c);
    }
    let search = NearestNeighbor::new(measure, &cache);
    (0..sequences.len())
        .map(|q| {
            let query = cache.bound_input(q, None).unwrap();
            search.search(&query, Some(q)).unwrap().0.distance()
        })
        .collect()
}

/// Leave-one-out nearest distances at one window, with every pair computed
/// in full and no pruning.
fn exhaustive(measure: Measure, sequences: &[Sequence], window: usize) -> Vec<f64> {
    let measure = measure.with_window(window);
    (0..sequences.len())
        .map(|q| {
            (0..sequences.len())
                .filter(|&j| j != q)
                .map(|j| {
                    measure
                        .distance(sequences[q].primary().as_view(), sequences[j].primary().as_view())
                        .unwrap()
                        .value()
                })
                .fold(f64::INFINITY, f64::min)
        })
        .collect()
}

/// Checks every window of a sweep against both a pruned search and the
/// exhaustive minimum.
fn assert_sweep_exact(measure: Measure, sequences: &[Sequence], max_window: usize) {
    let result = sweep(measure, sequences, max_window);
    assert_eq!(result.scores.len(), max_window + 1);
    for score in &result.scores {
        let pruned = brute_force(measure, sequences, score.window);
        let full = exhaustive(measure, sequences, score.window);
        for q in 0..sequences.len() {
            let context = format!("{measure} w{} q{q}", score.window);
            assert_close(pruned[q], full[q], &format!("{context} pruned"));
            assert_close(score.distances[q], full[q], &format!("{context} sweep"));
        }
    }
}

fn assert_close(actual: f64, expected: f64, context: &str) {
    if expected.is_infinite() {
        assert!(actual.is_infinite(), "{context}: expected inf, got {actual}");
    } else {
        assert!(
            (actual - expected).abs() < 1e-9,
            "{context}: expected {expected}, got {actual}"
        );
    }
}

// ---------------------------------------------------------------------------
// a) sweep agrees with independent searches
// ---------------------------------------------------------------------------

#[test]
fn sweep_matches_brute_force_at_every_window() {
    let sequences = random_dataset(7, 12, 10);
    for measure in measures() {
        assert_sweep_exact(measure, &sequences, 5);
    }
}

#[test]
fn sweep_matches_brute_force_on_unequal_lengths() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let sequences: Vec<Sequence> = (0..10)
        .map(|i| {
            let len = rng.gen_range(6..10);
            seq((0..len).map(|_| rng.gen_range(-1.0..1.0)).collect(), i % 3)
        })
        .collect();
    let elastic: [Measure; 5] = [
        Dtw::unconstrained().into(),
        Erp::new(0.0).unwrap().into(),
        Lcss::new(0.3).unwrap().into(),
        Msm::new(0.2).unwrap().into(),
        Twe::new(0.05, 1.0).unwrap().into(),
    ];
    for measure in elastic {
        assert_sweep_exact(measure, &sequences, 4);
    }
}

#[test]
fn lcss_search_keeps_tail_match_of_shorter_reference() {
    let sequences = vec![
        seq(vec![5.0, 5.0, 1.0, 1.0, 1.0], 0),
        seq(vec![5.0, 9.0, 9.0, 9.0, 9.0], 1),
        seq(vec![1.0, 1.0, 1.0], 0),
    ];
    let measure: Measure = Lcss::new(0.0).unwrap().into();
    let measure = measure.with_window(2);
    let mut cache = SequenceCache::new(&sequences, BandConstraint::Unconstrained);
    cache.prepare_envelopes(BandConstraint::SakoeChibaRadius(2));
    let search = NearestNeighbor::new(measure, &cache);

    let query = cache.bound_input(0, None).unwrap();
    let (candidate, _) = search.search(&query, Some(0)).unwrap();
    assert_eq!(candidate.index(), Some(2));
    assert!((candidate.distance() - 0.4).abs() < 1e-12, "{}", candidate.distance());
}

// ---------------------------------------------------------------------------
// b) candidate monotonicity and confirmation
// ---------------------------------------------------------------------------

#[test]
fn best_distance_never_increases_with_window() {
    let sequences = random_dataset(3, 10, 12);
    for measure in measures() {
        let result = sweep(measure, &sequences, 6);
        for pair in result.scores.windows(2) {
            for q in 0..sequences.len() {
                assert!(
                    pair[1].distances[q] <= pair[0].distances[q],
                    "{measure} q{q}: w{} -> w{} increased",
                    pair[0].window,
                    pair[1].window
                );
            }
            assert!(pair[1].confirmed >= pair[0].confirmed);
        }
    }
}

#[test]
fn every_query_is_confirmed_at_the_widest_window() {
    let sequences = random_dataset(5, 8, 9);
    let result = sweep(Dtw::unconstrained().into(), &sequences, 9);
    let last = result.scores.last().unwrap();
    assert_eq!(last.confirmed, sequences.len());
    assert!(last.neighbors.iter().all(Option::is_some));
}

// ---------------------------------------------------------------------------
// c) cache behaviour during a sweep
// ---------------------------------------------------------------------------

#[test]
fn envelopes_rebuild_once_per_window() {
    let sequences = random_dataset(9, 6, 8);
    let mut cache = SequenceCache::new(&sequences, BandConstraint::Unconstrained);
    SweepConfig::new(0, 3)
        .unwrap()
        .run(Dtw::unconstrained().into(), &sequences, &mut cache)
        .unwrap();
    assert_eq!(cache.rebuild_count(), 6 * 4);
    assert_eq!(cache.constraint(), BandConstraint::SakoeChibaRadius(3));
}

#[test]
fn bound_only_measures_never_build_envelopes() {
    let sequences = random_dataset(9, 6, 8);
    let mut cache = SequenceCache::new(&sequences, BandConstraint::Unconstrained);
    SweepConfig::new(0, 3)
        .unwrap()
        .run(Msm::new(1.0).unwrap().into(), &sequences, &mut cache)
        .unwrap();
    assert_eq!(cache.rebuild_count(), 0);
}

// ---------------------------------------------------------------------------
// d) window selection and classification
// ---------------------------------------------------------------------------

#[test]
fn window_selection_is_reproducible() {
    let sequences = random_dataset(21, 14, 10);
    let config = SweepConfig::new(0, 4).unwrap().with_seed(1234);
    let mut cache = SequenceCache::new(&sequences, BandConstraint::Unconstrained);
    let result = config
        .run(Dtw::unconstrained().into(), &sequences, &mut cache)
        .unwrap();

    let first = config.select_window(&result).unwrap();
    assert_eq!(config.select_window(&result), Some(first));
    assert!(result.tied_best_windows().contains(&first));
}

#[test]
fn separated_shapes_classify_perfectly() {
    let train = shapes_dataset(1, 6);
    let test = shapes_dataset(2, 4);
    let mut train_cache = SequenceCache::new(&train, BandConstraint::Unconstrained);
    let test_cache = SequenceCache::new(&test, BandConstraint::Unconstrained);

    for measure in measures() {
        let measure = measure.with_window(3);
        let result = classify(&train, &mut train_cache, &test, &test_cache, measure).unwrap();
        assert_eq!(result.correct, test.len(), "{measure}");
        assert_eq!(result.accuracy, 1.0);
        assert_eq!(result.stats.total(), train.len() * test.len());
    }
}

#[test]
fn loocv_on_separated_shapes_is_perfect() {
    let sequences = shapes_dataset(4, 5);
    let result = sweep(Dtw::unconstrained().into(), &sequences, 4);
    assert_eq!(result.best_accuracy(), Some(1.0));
    assert_eq!(result.n_sequences, 10);
}

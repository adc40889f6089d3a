//! Criterion benchmarks for warpnn-nn: LOOCV window sweep and pruned 1-NN search.

use criterion::{Criterion, criterion_group, criterion_main};

use warpnn_distance::{BandConstraint, Dtw, Msm, TimeSeries};
use warpnn_nn::{ClassLabel, NearestNeighbor, Sequence, SequenceCache, SweepConfig};

fn make_dataset() -> Vec<Sequence> {
    let mut sequences = Vec::new();
    for class in 0..4 {
        for j in 0..15 {
            let values: Vec<f64> = (0..64)
                .map(|i| ((i + 3 * j) as f64 * 0.1 * (class + 1) as f64).sin() + j as f64 * 0.01)
                .collect();
            sequences.push(Sequence::univariate(
                TimeSeries::new(values).unwrap(),
                ClassLabel::new(class),
            ));
        }
    }
    sequences
}

fn bench_dtw_sweep(c: &mut Criterion) {
    let sequences = make_dataset();
    let config = SweepConfig::new(0, 10).unwrap();

    c.bench_function("dtw_sweep_60x64_w0_10", |b| {
        b.iter(|| {
            let mut cache = SequenceCache::new(&sequences, BandConstraint::Unconstrained);
            config
                .run(Dtw::unconstrained().into(), &sequences, &mut cache)
                .unwrap()
        });
    });
}

fn bench_msm_sweep(c: &mut Criterion) {
    let sequences = make_dataset();
    let config = SweepConfig::new(0, 10)
        .unwrap()
        .with_window_step(5)
        .unwrap();

    c.bench_function("msm_sweep_60x64_w0_10_step5", |b| {
        b.iter(|| {
            let mut cache = SequenceCache::new(&sequences, BandConstraint::Unconstrained);
            config
                .run(Msm::new(0.5).unwrap().into(), &sequences, &mut cache)
                .unwrap()
        });
    });
}

fn bench_nearest_neighbor(c: &mut Criterion) {
    let sequences = make_dataset();
    let measure = Dtw::with_sakoe_chiba(5).into();
    let mut cache = SequenceCache::new(&sequences, BandConstraint::Unconstrained);
    cache.prepare_envelopes(BandConstraint::SakoeChibaRadius(5));
    let search = NearestNeighbor::new(measure, &cache);
    let query = cache.bound_input(0, None).unwrap();

    c.bench_function("nearest_neighbor_dtw_r5_60x64", |b| {
        b.iter(|| search.search(&query, Some(0)).unwrap());
    });
}

criterion_group!(benches, bench_dtw_sweep, bench_msm_sweep, bench_nearest_neighbor);
criterion_main!(benches);

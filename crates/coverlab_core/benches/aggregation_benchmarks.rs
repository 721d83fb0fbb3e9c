//! Criterion benchmarks for coverlab_core report handling
//!
//! Run with: cargo bench -p coverlab_core

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use coverlab_core::model::{ParamValue, ParameterSpace};
use coverlab_core::report::{DerivedField, Report, aggregate};
use coverlab_core::sweep::{SweepMode, expand};
use coverlab_core::{decode_cells, geometry::RegionGenerator};
use serde_json::{Value, json};

fn legacy_trial(i: usize) -> Value {
    let scenes: Vec<Value> = (0..20)
        .map(|s| json!({"cost": (s * 3 + i) as f64, "cellIds": [s, s + 1]}))
        .collect();
    json!({
        "timestamp": {"t1": i as f64 * 0.1, "t2": i as f64 * 0.2},
        "coverageRatio": 0.9,
        "resultScenes": scenes,
        "possibleScenes": [1, 2, 3, 4],
    })
}

fn flat_report(trials: usize) -> Value {
    Value::Array((0..trials).map(legacy_trial).collect())
}

fn bench_aggregate_flat(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate_flat");
    let rules = DerivedField::defaults();

    for trials in [10, 100, 1000].iter() {
        let report = Report::from_value(flat_report(*trials)).unwrap();
        group.bench_with_input(BenchmarkId::new("trials", trials), trials, |b, _| {
            b.iter(|| aggregate(black_box(&report), black_box(&rules)))
        });
    }

    group.finish();
}

fn bench_normalize_and_aggregate(c: &mut Criterion) {
    let value = flat_report(100);
    let rules = DerivedField::defaults();

    c.bench_function("parse_normalize_aggregate_100", |b| {
        b.iter(|| {
            let report = Report::from_value(black_box(value.clone())).unwrap();
            aggregate(&report, &rules)
        })
    });
}

fn bench_sectioned(c: &mut Criterion) {
    let trials: Vec<Value> = (0..200).map(|i| json!({"x": i, "y": i * 2})).collect();
    let report = Report::from_value(json!({
        "discrete": trials.clone(),
        "continuous": trials,
    }))
    .unwrap();

    c.bench_function("aggregate_sectioned_2x200", |b| {
        b.iter(|| aggregate(black_box(&report), &[]))
    });
}

fn bench_expand_factorial(c: &mut Criterion) {
    let floats = |n: usize| -> Vec<ParamValue> {
        (0..n).map(|i| ParamValue::Float(i as f64 * 0.01)).collect()
    };
    let space = ParameterSpace::new([
        ("delta", floats(10)),
        ("n_regions", (1..=10).map(ParamValue::Int).collect()),
        ("region_size", floats(10)),
        ("archive_size", vec![ParamValue::Int(1000)]),
    ])
    .unwrap();

    c.bench_function("expand_factorial_1000", |b| {
        b.iter(|| expand(black_box(&space), SweepMode::Factorial))
    });
}

fn bench_decode_cells(c: &mut Criterion) {
    let ids: Vec<u64> = (0..10_000).collect();

    c.bench_function("decode_10k_cells", |b| {
        b.iter(|| decode_cells(black_box(&ids), black_box(0.0125)))
    });
}

fn bench_region_synthesis(c: &mut Criterion) {
    c.bench_function("synthesize_100_polygons", |b| {
        b.iter(|| {
            let mut generator = RegionGenerator::new(Default::default(), Default::default(), 42);
            generator.with_area(black_box(100), black_box(0.25))
        })
    });
}

criterion_group!(
    benches,
    bench_aggregate_flat,
    bench_normalize_and_aggregate,
    bench_sectioned,
    bench_expand_factorial,
    bench_decode_cells,
    bench_region_synthesis,
);
criterion_main!(benches);

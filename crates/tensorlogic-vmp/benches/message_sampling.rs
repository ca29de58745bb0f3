//! Benchmarks for Monte-Carlo parent messages
//!
//! This benchmark suite measures:
//! - Single-draw evaluation of a LogPdf message over growing plates
//! - Averaged estimates with a growing number of draws
//! - Mask propagation after a partial observation

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use scirs2_core::ndarray::{ArrayD, IxDyn};
use scirs2_core::random::{SeedableRng, StdRng};
use std::hint::black_box;
use tensorlogic_vmp::{
    Constant, DensitySource, Gaussian, LogPdfConfig, Mask, ModelGraph, NodeId,
};

/// Model x ~ exp(-(x - a - b)²) with `n` plate copies and b ~ N(0, 1)
fn create_model(n: usize, samples: usize) -> (ModelGraph, NodeId) {
    let mut graph = ModelGraph::new();
    let a = graph
        .add_node(Constant::new("a", ArrayD::zeros(IxDyn(&[n])), 0).unwrap())
        .unwrap();
    let b = graph
        .add_node(
            Gaussian::new(
                "b",
                ArrayD::zeros(IxDyn(&[n])),
                ArrayD::from_elem(IxDyn(&[n]), 1.0),
            )
            .unwrap(),
        )
        .unwrap();
    let x = graph
        .add_logpdf(
            "x",
            DensitySource::from_fn(|x: &ArrayD<f64>, p: &[ArrayD<f64>]| {
                Ok((x - &p[0] - &p[1]).mapv(|d| -d * d))
            }),
            vec![a, b],
            LogPdfConfig::new().with_samples(samples),
        )
        .unwrap();
    graph
        .observe(x, ArrayD::from_elem(IxDyn(&[n]), 0.5), vec![], Mask::all_active())
        .unwrap();
    (graph, x)
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");

    for n in [10, 100, 1_000, 10_000].iter() {
        let (graph, x) = create_model(*n, 1);
        let message = graph.message_to_parent(x, 0).unwrap();
        let candidate = ArrayD::zeros(IxDyn(&[*n]));
        let mut rng = StdRng::seed_from_u64(42);

        group.throughput(Throughput::Elements(*n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, _| {
            b.iter(|| {
                let value = message
                    .sampler
                    .evaluate(black_box(&candidate), &mut rng)
                    .unwrap();
                black_box(value);
            });
        });
    }

    group.finish();
}

fn bench_estimate(c: &mut Criterion) {
    let mut group = c.benchmark_group("estimate");

    for samples in [1, 10, 100].iter() {
        let (graph, x) = create_model(100, *samples);
        let message = graph.message_to_parent(x, 0).unwrap();
        let candidate = ArrayD::zeros(IxDyn(&[100]));
        let mut rng = StdRng::seed_from_u64(42);

        group.bench_with_input(BenchmarkId::from_parameter(samples), samples, |b, _| {
            b.iter(|| {
                let value = message
                    .sampler
                    .estimate(black_box(&candidate), &mut rng)
                    .unwrap();
                black_box(value);
            });
        });
    }

    group.finish();
}

fn bench_propagate_masks(c: &mut Criterion) {
    let mut group = c.benchmark_group("propagate_masks");

    for n in [10, 1_000].iter() {
        let (mut graph, x) = create_model(*n, 1);
        let values: Vec<bool> = (0..*n).map(|i| i % 3 == 0).collect();
        let mask = Mask::from_shape_vec(vec![*n], values).unwrap();
        graph
            .observe(x, ArrayD::zeros(IxDyn(&[*n])), vec![], mask)
            .unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, _| {
            b.iter(|| {
                graph.propagate_masks().unwrap();
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_evaluate, bench_estimate, bench_propagate_masks);
criterion_main!(benches);

mod common;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use urban_growth::prelude::*;

fn step_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation/run_step");

    for &side in &[64usize, 256] {
        let shape = GridShape::new(side, side);
        let store = common::default_store(shape, 0x12345678);
        let config = SimulationConfig::default();
        group.throughput(common::elements_throughput(shape.len()));

        group.bench_with_input(BenchmarkId::from_parameter(side), &side, |b, _| {
            b.iter(|| {
                let outcome = run_step(&store, RunState::new(250_000.0), &config, &mut ())
                    .expect("step");
                black_box(outcome);
            });
        });
    }

    group.finish();
}

fn run_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation/run");
    let shape = GridShape::new(128, 128);

    for &mode in &[DensityMode::Initial, DensityMode::Dynamic] {
        let config = SimulationConfig::default().with_density_mode(mode);
        group.throughput(common::elements_throughput(shape.len() * config.steps as usize));

        group.bench_with_input(
            BenchmarkId::new(format!("{mode:?}").to_lowercase(), 128),
            &mode,
            |b, _| {
                b.iter_batched(
                    || common::default_store(shape, 0x87654321),
                    |store| {
                        let output = run_simulation(config.clone(), store, None).expect("run");
                        black_box(output);
                    },
                    BatchSize::LargeInput,
                );
            },
        );
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = common::default_criterion();
    targets = step_benches, run_benches
}
criterion_main!(benches);

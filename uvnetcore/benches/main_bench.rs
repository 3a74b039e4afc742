use criterion::{Criterion, criterion_group, criterion_main};
use std::{hint::black_box, time::Duration};

use uvnetcore::connectivity::q_probability;
use uvnetcore::optimize::Objective;
use uvnetcore::optimize::sweep::{SweepConfig, SweepConstraints, run_sweep};
use uvnetcore::params::{ChannelConstants, LinkLimits};
use uvnetcore::units::{Area, Length};

pub fn criterion_benchmark(c: &mut Criterion) {
    let constants = ChannelConstants::default();
    let region = Area::from_square_metres(1e6);
    let config = SweepConfig::from_limits(&LinkLimits::default(), region);

    let mut group = c.benchmark_group("main");
    group.measurement_time(Duration::from_secs(15));

    group.bench_function("Grid Connectivity Average", |b| {
        b.iter(|| {
            black_box(q_probability(
                Length::from_metres(95.0),
                100,
                2,
                region,
                100,
            ));
        })
    });

    group.bench_function("Full Parameter Sweep", |b| {
        b.iter(|| {
            black_box(run_sweep(
                &constants,
                &config,
                SweepConstraints::default(),
                Objective::Balanced,
            ));
        })
    });

    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

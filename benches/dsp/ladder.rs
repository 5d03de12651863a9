//! Benchmarks for the ladder filter.

use std::hint::black_box;

use basic_synth::dsp::{FilterMode, LadderFilter};
use criterion::{BenchmarkId, Criterion};

use crate::BLOCK_SIZES;

pub fn bench_ladder(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/ladder");

    for &size in BLOCK_SIZES {
        // Generate a test signal (sawtooth-like ramp)
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        for mode in FilterMode::ALL {
            let mut filter = LadderFilter::new(48_000.0);
            filter.set_mode(mode);
            filter.set_cutoff_hz(1000.0);
            filter.set_resonance(0.5);
            let mut buffer = input.clone();
            group.bench_with_input(BenchmarkId::new(mode.name(), size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    filter.render(0, black_box(&mut buffer));
                })
            });
        }

        // Heavy drive near self-oscillation
        let mut filter = LadderFilter::new(48_000.0);
        filter.set_cutoff_hz(800.0);
        filter.set_resonance(0.95);
        filter.set_drive(8.0);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("driven_resonant", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                filter.render(0, black_box(&mut buffer));
            })
        });
    }

    group.finish();
}

//! Benchmarks for reverb processing.

use std::hint::black_box;

use basic_synth::dsp::{Reverb, ReverbParameters};
use criterion::{BenchmarkId, Criterion};

use crate::BLOCK_SIZES;

pub fn bench_reverb(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/reverb");

    let sample_rate = 48_000.0;
    let settings = [
        ("small_room", 0.3, 0.5, 0.0),
        ("large_room", 0.9, 0.3, 0.0),
        ("frozen", 0.5, 0.0, 1.0),
    ];

    for &size in BLOCK_SIZES {
        // Generate a test signal (impulse-like with some content)
        let input: Vec<f32> = (0..size)
            .map(|i| {
                if i < 10 {
                    1.0 - (i as f32 / 10.0) // Initial impulse
                } else {
                    (i as f32 * 0.05).sin() * 0.1 // Quiet tail
                }
            })
            .collect();

        for (name, room_size, damping, freeze) in settings {
            let mut reverb = Reverb::new(sample_rate);
            reverb.set_parameters(ReverbParameters {
                room_size,
                damping,
                width: 1.0,
                freeze,
                ..ReverbParameters::default()
            });
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    let mut sum = 0.0f32;
                    for &sample in &input {
                        let (l, r) = reverb.process_stereo(black_box(sample), black_box(sample));
                        sum += l + r;
                    }
                    sum
                })
            });
        }
    }

    group.finish();
}

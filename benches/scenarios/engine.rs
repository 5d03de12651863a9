//! Benchmarks for complete engine blocks: MIDI drain, voices, filter,
//! reverb and output gain.

use std::hint::black_box;

use basic_synth::{
    io::AudioBuffer, params::ParamId, synth::message::NoteEvent, EngineConfig, SynthEngine,
};
use criterion::{BenchmarkId, Criterion};

use crate::BLOCK_SIZES;

pub fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/engine");

    for &size in BLOCK_SIZES {
        let config = EngineConfig {
            sample_rate: 48_000.0,
            max_block_size: size,
            output_channels: 2,
        };
        let Ok((mut engine, mut handle)) = SynthEngine::build(config) else {
            continue;
        };

        handle.params.set(ParamId::FilterMode, 2.0);
        handle.params.set(ParamId::FilterResonance, 60.0);
        handle.params.set(ParamId::ReverbWidth, 100.0);
        for note in [48, 55, 60, 64] {
            let _ = handle.midi.push_now(NoteEvent::note_on(note, 0.8));
        }

        let mut buffer = AudioBuffer::new(2, size);
        group.bench_with_input(BenchmarkId::new("full_chord", size), &size, |b, _| {
            b.iter(|| engine.process_block(black_box(&mut buffer), 0))
        });
    }

    group.finish();
}

//! Benchmarks for the voice pool.

use std::hint::black_box;

use basic_synth::{
    io::AudioBuffer,
    synth::{
        message::{BlockEvent, NoteEvent},
        poly::VoicePool,
    },
};
use criterion::{BenchmarkId, Criterion};

use crate::BLOCK_SIZES;

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");

    let no_events: &[BlockEvent] = &[];

    for &size in BLOCK_SIZES {
        let mut buffer = AudioBuffer::new(2, size);

        // Single held note
        let mut pool = VoicePool::new(48_000.0);
        pool.note_on(57, 0.8);
        group.bench_with_input(BenchmarkId::new("one_voice", size), &size, |b, _| {
            b.iter(|| pool.render_block(black_box(no_events), black_box(&mut buffer)))
        });

        // Full pool: a chord on every voice
        let mut pool = VoicePool::new(48_000.0);
        for note in [48, 55, 60, 64] {
            pool.note_on(note, 0.8);
        }
        group.bench_with_input(BenchmarkId::new("full_chord", size), &size, |b, _| {
            b.iter(|| pool.render_block(black_box(no_events), black_box(&mut buffer)))
        });

        // Block split by an event in the middle
        let mut pool = VoicePool::new(48_000.0);
        let events = [BlockEvent {
            offset: size / 2,
            event: NoteEvent::note_on(69, 0.8),
        }];
        group.bench_with_input(BenchmarkId::new("split_block", size), &size, |b, _| {
            b.iter(|| {
                pool.all_notes_off(false);
                pool.render_block(black_box(&events), black_box(&mut buffer))
            })
        });
    }

    group.finish();
}

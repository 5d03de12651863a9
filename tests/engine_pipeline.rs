//! End-to-end rendering through the full engine: MIDI queue, voice pool,
//! ladder filter, reverb and output gain.

use std::f64::consts::TAU;

use approx::assert_abs_diff_eq;
use basic_synth::{
    io::AudioBuffer,
    params::ParamId,
    synth::{message::NoteEvent, poly::VOICE_COUNT},
    EngineConfig, EngineHandle, SynthEngine,
};

const SAMPLE_RATE: f32 = 44_100.0;
const BLOCK: usize = 512;

/// Engine configured so the voice mix passes through nearly untouched:
/// filter wide open, reverb fully dry, unity output gain.
fn transparent_engine() -> (SynthEngine, EngineHandle) {
    let config = EngineConfig {
        sample_rate: SAMPLE_RATE,
        max_block_size: BLOCK,
        output_channels: 2,
    };
    let (engine, handle) = SynthEngine::build(config).unwrap();

    handle.params.set(ParamId::FilterMode, 0.0);
    handle.params.set(ParamId::FilterCutoff, 20_000.0);
    handle.params.set(ParamId::FilterResonance, 0.0);
    handle.params.set(ParamId::ReverbWet, 0.0);
    handle.params.set(ParamId::ReverbDry, 100.0);
    handle.params.set(ParamId::Output, 0.0);

    (engine, handle)
}

fn first_audible(samples: &[f32]) -> Option<usize> {
    samples.iter().position(|s| s.abs() > 1e-6)
}

#[test]
fn a440_renders_a_quiet_sine() {
    let (mut engine, mut handle) = transparent_engine();
    handle.midi.push(NoteEvent::note_on(69, 1.0), 0).unwrap();

    let mut buffer = AudioBuffer::new(2, BLOCK);
    engine.process_block(&mut buffer, 0);

    let left = buffer.channel(0);
    assert_eq!(left[0], 0.0);
    for (n, &sample) in left.iter().enumerate() {
        let expected = 0.15 * (TAU * 440.0 * n as f64 / SAMPLE_RATE as f64).sin();
        assert_abs_diff_eq!(sample as f64, expected, epsilon = 0.012);
    }
    assert_eq!(buffer.channel(0), buffer.channel(1));
}

#[test]
fn events_land_at_their_timestamp_across_blocks() {
    let (mut engine, mut handle) = transparent_engine();
    // Pushed out of order; both land in the second block.
    handle.midi.push(NoteEvent::note_on(72, 1.0), 700).unwrap();
    handle.midi.push(NoteEvent::note_on(60, 1.0), 600).unwrap();

    let mut buffer = AudioBuffer::new(2, BLOCK);
    engine.process_block(&mut buffer, 0);
    assert!(buffer.channel(0).iter().all(|&s| s == 0.0));
    assert_eq!(engine.active_voices(), 0);

    engine.process_block(&mut buffer, 0);
    // The sine starts at zero phase, so the first non-zero sample follows the onset.
    assert_eq!(first_audible(buffer.channel(0)), Some(600 - BLOCK + 1));
    assert_eq!(engine.active_voices(), 2);
}

#[test]
fn fifth_note_is_dropped() {
    let (mut engine, mut handle) = transparent_engine();
    for note in [60, 62, 64, 65, 67] {
        handle.midi.push_now(NoteEvent::note_on(note, 0.5)).unwrap();
    }

    let mut buffer = AudioBuffer::new(2, BLOCK);
    engine.process_block(&mut buffer, 0);
    assert_eq!(engine.active_voices(), VOICE_COUNT);

    // Releasing the dropped pitch changes nothing
    handle.midi.push_now(NoteEvent::note_off(67, 0.0)).unwrap();
    engine.process_block(&mut buffer, 0);
    assert_eq!(engine.active_voices(), VOICE_COUNT);
}

#[test]
fn released_note_tails_out_within_a_block() {
    let (mut engine, mut handle) = transparent_engine();
    handle.midi.push_now(NoteEvent::note_on(69, 1.0)).unwrap();

    let mut buffer = AudioBuffer::new(2, BLOCK);
    engine.process_block(&mut buffer, 0);

    handle.midi.push_now(NoteEvent::note_off(69, 0.0)).unwrap();
    engine.process_block(&mut buffer, 0);
    assert_eq!(engine.active_voices(), 1);

    // The 528-sample tail finishes early in the following block
    engine.process_block(&mut buffer, 0);
    assert_eq!(engine.active_voices(), 0);
    assert!(buffer.channel(0)[32..].iter().all(|&s| s.abs() < 1e-3));
}

#[test]
fn mono_layout_renders_one_channel() {
    let config = EngineConfig {
        sample_rate: SAMPLE_RATE,
        max_block_size: BLOCK,
        output_channels: 1,
    };
    let (mut engine, mut handle) = SynthEngine::build(config).unwrap();
    handle.midi.push_now(NoteEvent::note_on(57, 1.0)).unwrap();

    let mut buffer = AudioBuffer::new(1, BLOCK);
    engine.process_block(&mut buffer, 0);

    assert!(buffer.channel(0).iter().all(|s| s.is_finite()));
    assert!(first_audible(buffer.channel(0)).is_some());
}

#[test]
fn output_never_exceeds_voice_sum_with_dry_path() {
    let (mut engine, mut handle) = transparent_engine();
    handle.params.set(ParamId::ReverbWet, 100.0);
    handle.params.set(ParamId::ReverbWidth, 100.0);
    handle.params.set(ParamId::ReverbRoomSize, 1.0);
    for note in [48, 55, 60, 64] {
        handle.midi.push_now(NoteEvent::note_on(note, 1.0)).unwrap();
    }

    let mut buffer = AudioBuffer::new(2, BLOCK);
    for _ in 0..200 {
        engine.process_block(&mut buffer, 0);
        for channel in 0..2 {
            assert!(buffer.channel(channel).iter().all(|s| s.is_finite() && s.abs() < 10.0));
        }
    }
}

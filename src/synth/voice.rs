use std::f64::consts::TAU;

use crate::io::{converter::midi_note_to_freq, AudioBuffer};

/// Fixed headroom so a full chord at full velocity stays below clipping.
pub const VOICE_HEADROOM: f64 = 0.15;
/// Per-sample multiplier applied to the tail-off gain while releasing.
pub const TAIL_DECAY: f64 = 0.99;
/// Tail gain at or below which a releasing voice goes idle.
pub const TAIL_FLOOR: f64 = 0.005;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Idle,      // Available for allocation
    Sounding,  // Key held, steady amplitude
    Releasing, // Key released, tail decaying
}

/// A single sine-tone voice with an exponential release tail.
pub struct SineVoice {
    note: u8,
    state: VoiceState,
    sample_rate: f64,
    angle: f64,
    angle_delta: f64,
    level: f64,
    tail_off: f64,
}

impl SineVoice {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            note: 0,
            state: VoiceState::Idle,
            sample_rate: sample_rate as f64,
            angle: 0.0,
            angle_delta: 0.0,
            level: 0.0,
            tail_off: 0.0,
        }
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate as f64;
    }

    /// Start a note. Returns `false` (and does nothing) unless the voice is idle.
    pub fn note_on(&mut self, note: u8, velocity: f32) -> bool {
        if self.state != VoiceState::Idle {
            return false;
        }

        let cycles_per_sample = midi_note_to_freq(note) / self.sample_rate;

        self.note = note;
        self.angle = 0.0;
        self.angle_delta = cycles_per_sample * TAU;
        self.level = velocity.clamp(0.0, 1.0) as f64 * VOICE_HEADROOM;
        self.tail_off = 0.0;
        self.state = VoiceState::Sounding;
        true
    }

    /// Release the note, either into a decaying tail or straight to idle.
    pub fn note_off(&mut self, allow_tail: bool) {
        match (self.state, allow_tail) {
            (VoiceState::Idle, _) => {}
            (VoiceState::Sounding, true) => {
                self.tail_off = 1.0;
                self.state = VoiceState::Releasing;
            }
            // Already tailing off; a second release keeps the current tail
            (VoiceState::Releasing, true) => {}
            (_, false) => self.clear(),
        }
    }

    /// Add `num_samples` samples starting at `start` into every channel.
    ///
    /// A releasing voice that crosses the tail floor goes idle mid-call and
    /// contributes silence for the rest of the range.
    pub fn render(&mut self, out: &mut AudioBuffer, start: usize, num_samples: usize) {
        let end = (start + num_samples).min(out.len());

        match self.state {
            VoiceState::Idle => {}
            VoiceState::Sounding => {
                for index in start..end {
                    let sample = (self.angle.sin() * self.level) as f32;
                    out.add_to_all(index, sample);
                    self.angle += self.angle_delta;
                }
            }
            VoiceState::Releasing => {
                for index in start..end {
                    let sample = (self.angle.sin() * self.level * self.tail_off) as f32;
                    out.add_to_all(index, sample);
                    self.angle += self.angle_delta;

                    self.tail_off *= TAIL_DECAY;
                    if self.tail_off <= TAIL_FLOOR {
                        self.clear();
                        break;
                    }
                }
            }
        }
    }

    fn clear(&mut self) {
        self.state = VoiceState::Idle;
        self.angle_delta = 0.0;
        self.tail_off = 0.0;
    }

    pub fn is_idle(&self) -> bool {
        self.state == VoiceState::Idle
    }

    /// Whether this voice holds `note` (sounding or releasing).
    pub fn is_playing_note(&self, note: u8) -> bool {
        !self.is_idle() && self.note == note
    }

    pub fn note(&self) -> u8 {
        self.note
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    /// Current amplitude envelope (level x tail), for metering.
    pub fn envelope(&self) -> f64 {
        match self.state {
            VoiceState::Idle => 0.0,
            VoiceState::Sounding => self.level,
            VoiceState::Releasing => self.level * self.tail_off,
        }
    }
}

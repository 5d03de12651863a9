/// Note-level events delivered to the voice pool.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum NoteEvent {
    /// Velocity is normalised to 0.0-1.0.
    NoteOn { note: u8, velocity: f32 },
    NoteOff { note: u8, velocity: f32 },
    /// Release every sounding voice, with or without tail-off.
    AllNotesOff { allow_tail: bool },
}

impl NoteEvent {
    /// Note-on with pitch clamped to 0-127 and velocity to 0.0-1.0.
    pub fn note_on(note: u8, velocity: f32) -> Self {
        Self::NoteOn {
            note: note.min(127),
            velocity: velocity.clamp(0.0, 1.0),
        }
    }

    pub fn note_off(note: u8, velocity: f32) -> Self {
        Self::NoteOff {
            note: note.min(127),
            velocity: velocity.clamp(0.0, 1.0),
        }
    }

    /// Convert a 0-127 MIDI velocity to the normalised form.
    pub fn from_midi_velocity(velocity: u8) -> f32 {
        velocity.min(127) as f32 / 127.0
    }
}

/// An event placed at a sample offset inside the current block.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BlockEvent {
    pub offset: usize,
    pub event: NoteEvent,
}

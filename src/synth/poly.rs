use crate::{
    io::AudioBuffer,
    synth::{
        message::{BlockEvent, NoteEvent},
        voice::{SineVoice, VoiceState},
    },
};

/// Number of voices in the pool.
pub const VOICE_COUNT: usize = 4;

/// Fixed pool of sine voices. Note-ons without an idle voice are dropped.
pub struct VoicePool {
    voices: [SineVoice; VOICE_COUNT],
}

impl VoicePool {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            voices: std::array::from_fn(|_| SineVoice::new(sample_rate)),
        }
    }

    /// Set the rate used by subsequent note-ons.
    pub fn prepare(&mut self, sample_rate: f32) {
        for voice in &mut self.voices {
            voice.set_sample_rate(sample_rate);
        }
    }

    /// Start `note` on the first idle voice. Returns `false` if the note was dropped.
    pub fn note_on(&mut self, note: u8, velocity: f32) -> bool {
        match self.voices.iter_mut().find(|v| v.is_idle()) {
            Some(voice) => voice.note_on(note, velocity),
            None => false,
        }
    }

    /// Release every voice holding `note` into its tail.
    pub fn note_off(&mut self, note: u8, _velocity: f32) {
        for voice in &mut self.voices {
            if voice.is_playing_note(note) {
                voice.note_off(true);
            }
        }
    }

    pub fn all_notes_off(&mut self, allow_tail: bool) {
        for voice in &mut self.voices {
            voice.note_off(allow_tail);
        }
    }

    /// Apply one event. A note-on with zero velocity is a note-off, as in MIDI
    /// running status.
    pub fn handle_event(&mut self, event: NoteEvent) {
        match event {
            NoteEvent::NoteOn { note, velocity } if velocity <= 0.0 => self.note_off(note, 0.0),
            NoteEvent::NoteOn { note, velocity } => {
                self.note_on(note, velocity);
            }
            NoteEvent::NoteOff { note, velocity } => self.note_off(note, velocity),
            NoteEvent::AllNotesOff { allow_tail } => self.all_notes_off(allow_tail),
        }
    }

    /// Overwrite `out` with the sum of all voices, applying each event at its offset.
    ///
    /// `events` must be ordered by offset. The block is rendered in runs
    /// between event offsets, which matches applying events per sample.
    pub fn render_block(&mut self, events: &[BlockEvent], out: &mut AudioBuffer) {
        out.clear();

        let len = out.len();
        let mut cursor = 0;

        for block_event in events {
            let offset = block_event.offset.min(len);
            if offset > cursor {
                self.render_range(out, cursor, offset - cursor);
                cursor = offset;
            }
            self.handle_event(block_event.event);
        }

        if cursor < len {
            self.render_range(out, cursor, len - cursor);
        }
    }

    fn render_range(&mut self, out: &mut AudioBuffer, start: usize, num_samples: usize) {
        for voice in &mut self.voices {
            if !voice.is_idle() {
                voice.render(out, start, num_samples);
            }
        }
    }

    /// Voices that are sounding or releasing.
    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| !v.is_idle()).count()
    }

    /// Notes currently held (not yet released), in voice order.
    pub fn sounding_notes(&self) -> impl Iterator<Item = u8> + '_ {
        self.voices
            .iter()
            .filter(|v| v.state() == VoiceState::Sounding)
            .map(SineVoice::note)
    }

    pub fn voices(&self) -> &[SineVoice] {
        &self.voices
    }
}

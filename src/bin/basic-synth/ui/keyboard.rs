//! Computer keyboard as a one-octave piano

use std::time::{Duration, Instant};

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use basic_synth::{error::Result, io::midi::MidiSender, synth::message::NoteEvent};

/// Home-row layout: white keys on `asdfghjk`, black keys on `wetyu`.
const KEY_MAP: [char; 13] = ['a', 'w', 's', 'e', 'd', 'f', 't', 'g', 'y', 'h', 'u', 'j', 'k'];
const BLACK_KEYS: [usize; 5] = [1, 3, 6, 8, 10];

const BASE_NOTE: i16 = 60;
const MAX_OCTAVE_SHIFT: i16 = 4;
const NOTE_VELOCITY: f32 = 0.8;
const NOTE_LENGTH_SECONDS: f32 = 0.5;

pub struct KeyboardState {
    octave: i16,
    note_frames: u64,
    lit: Vec<(usize, Instant)>,
}

impl KeyboardState {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            octave: 0,
            note_frames: (sample_rate * NOTE_LENGTH_SECONDS) as u64,
            lit: Vec::new(),
        }
    }

    /// Handle a character key. Keys outside the map are ignored.
    pub fn press(&mut self, c: char, midi: &mut MidiSender, now: Instant) -> Result<()> {
        match c {
            'z' => self.octave = (self.octave - 1).max(-MAX_OCTAVE_SHIFT),
            'x' => self.octave = (self.octave + 1).min(MAX_OCTAVE_SHIFT),
            _ => {
                let Some(semitone) = KEY_MAP.iter().position(|&k| k == c) else {
                    return Ok(());
                };
                let Some(note) = self.note_for(semitone) else {
                    return Ok(());
                };

                // Terminals only report presses, so each note gets a fixed length
                midi.push_now(NoteEvent::note_on(note, NOTE_VELOCITY))?;
                midi.push_after(NoteEvent::note_off(note, 0.0), self.note_frames)?;

                let until = now + Duration::from_secs_f32(NOTE_LENGTH_SECONDS);
                self.lit.retain(|(s, _)| *s != semitone);
                self.lit.push((semitone, until));
            }
        }
        Ok(())
    }

    pub fn expire(&mut self, now: Instant) {
        self.lit.retain(|(_, until)| *until > now);
    }

    fn note_for(&self, semitone: usize) -> Option<u8> {
        let note = BASE_NOTE + self.octave * 12 + semitone as i16;
        u8::try_from(note).ok().filter(|n| *n <= 127)
    }

    fn is_lit(&self, semitone: usize) -> bool {
        self.lit.iter().any(|(s, _)| *s == semitone)
    }
}

pub fn render_keyboard(frame: &mut Frame, area: Rect, keyboard: &KeyboardState) {
    let title = format!(" Keyboard  C{} ", 4 + keyboard.octave);
    let block = Block::default().title(title).borders(Borders::ALL);

    let rows = vec![key_row(keyboard, true), key_row(keyboard, false)];
    frame.render_widget(Paragraph::new(rows).block(block), area);
}

fn key_row(keyboard: &KeyboardState, black: bool) -> Line<'static> {
    let spans: Vec<Span<'static>> = KEY_MAP
        .iter()
        .enumerate()
        .map(|(semitone, key)| {
            if BLACK_KEYS.contains(&semitone) != black {
                return Span::raw("   ");
            }
            let style = if keyboard.is_lit(semitone) {
                Style::default().fg(Color::Black).bg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else if black {
                Style::default().fg(Color::White).bg(Color::DarkGray)
            } else {
                Style::default().fg(Color::Black).bg(Color::White)
            };
            Span::styled(format!(" {} ", key.to_ascii_uppercase()), style)
        })
        .collect();
    Line::from(spans)
}

//! TUI module for basic-synth
//!
//! A parameter panel driven from the keyboard, plus a one-octave computer
//! keyboard that injects notes through the engine's MIDI queue.

mod keyboard;
mod panel;
mod status;

use std::time::{Duration, Instant};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::Consumer;

use basic_synth::{
    params::{ParamId, ParameterStore},
    synth::message::NoteEvent,
    EngineHandle,
};

use keyboard::{render_keyboard, KeyboardState};
use panel::render_panel;
use status::render_status;

/// Fraction of a parameter's range moved per arrow key press.
const ADJUST_FRACTION: f32 = 0.02;

/// Level and voice count sent from the audio thread once per callback.
#[derive(Clone, Copy, Debug, Default)]
pub struct MeterUpdate {
    pub peak: f32,
    pub active_voices: u8,
}

/// UI application state
pub struct UiApp {
    handle: EngineHandle,
    meter_rx: Consumer<MeterUpdate>,
    meter: MeterUpdate,
    keyboard: KeyboardState,
    selected: usize,
    sample_rate: f32,
    status: String,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        handle: EngineHandle,
        meter_rx: Consumer<MeterUpdate>,
        sample_rate: f32,
        status: String,
    ) -> Self {
        Self {
            handle,
            meter_rx,
            meter: MeterUpdate::default(),
            keyboard: KeyboardState::new(sample_rate),
            selected: 0,
            sample_rate,
            status,
            should_quit: false,
        }
    }

    pub fn params(&self) -> &ParameterStore {
        &self.handle.params
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_meter();
            self.keyboard.expire(Instant::now());

            terminal.draw(|frame| self.render(frame))?;

            // Handle keyboard input (non-blocking, ~60fps)
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        // Let held notes ring out rather than cutting them when the stream stops
        let _ = self
            .handle
            .midi
            .push_now(NoteEvent::AllNotesOff { allow_tail: true });
        Ok(())
    }

    fn poll_meter(&mut self) {
        while let Ok(update) = self.meter_rx.pop() {
            self.meter = update;
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => self.selected = (self.selected + 1).min(ParamId::ALL.len() - 1),
            KeyCode::Left => self.adjust(-1.0),
            KeyCode::Right => self.adjust(1.0),
            KeyCode::Char('0') => {
                let id = ParamId::ALL[self.selected];
                self.handle.params.set(id, id.spec().default);
            }
            KeyCode::Char(' ') => {
                if let Err(err) = self
                    .handle
                    .midi
                    .push_now(NoteEvent::AllNotesOff { allow_tail: true })
                {
                    self.status = err.to_string();
                }
            }
            KeyCode::Char(c) => {
                if let Err(err) = self.keyboard.press(c, &mut self.handle.midi, Instant::now()) {
                    self.status = err.to_string();
                }
            }
            _ => {}
        }
    }

    fn adjust(&mut self, direction: f32) {
        let id = ParamId::ALL[self.selected];
        let spec = id.spec();
        let delta = spec
            .step
            .unwrap_or((spec.max - spec.min) * ADJUST_FRACTION);
        let current = self.handle.params.get(id);
        self.handle.params.set(id, current + direction * delta);
    }

    /// Render the UI
    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),  // Status bar
                Constraint::Min(13),    // Parameter panel
                Constraint::Length(5),  // Keyboard
                Constraint::Length(1),  // Help bar
            ])
            .split(frame.area());

        render_status(frame, chunks[0], self.sample_rate, &self.meter, &self.status);
        render_panel(frame, chunks[1], &self.handle.params, self.selected);
        render_keyboard(frame, chunks[2], &self.keyboard);

        let help = Paragraph::new(
            " [↑↓] Select  [←→] Adjust  [0] Default  [A-K] Play  [Z/X] Octave  [Space] Release  [Q] Quit",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }
}

//! Status bar widget - sample rate, voice count and output peak

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use basic_synth::synth::poly::VOICE_COUNT;

use super::MeterUpdate;

pub fn render_status(frame: &mut Frame, area: Rect, sample_rate: f32, meter: &MeterUpdate, message: &str) {
    let block = Block::default().title(" basic-synth ").borders(Borders::ALL);

    let peak_color = if meter.peak >= 1.0 { Color::Red } else { Color::Magenta };

    let line = Line::from(vec![
        Span::styled(
            format!(" {:.1}kHz  ", sample_rate / 1000.0),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("Voices: {}/{}  ", meter.active_voices, VOICE_COUNT),
            Style::default().fg(Color::Green),
        ),
        Span::styled(format!("Peak: {:.2}  ", meter.peak), Style::default().fg(peak_color)),
        Span::styled(message.to_string(), Style::default().fg(Color::DarkGray)),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}

//! Parameter panel widget - one row per catalog entry with a level bar

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use basic_synth::params::{ParamId, ParameterStore};

const BAR_WIDTH: usize = 24;

pub fn render_panel(frame: &mut Frame, area: Rect, params: &ParameterStore, selected: usize) {
    let block = Block::default().title(" Parameters ").borders(Borders::ALL);

    let lines: Vec<Line> = ParamId::ALL
        .iter()
        .enumerate()
        .map(|(row, &id)| {
            let filled = ((params.get_normalised(id) * BAR_WIDTH as f32).round() as usize).min(BAR_WIDTH);
            let bar = format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled));

            let style = if row == selected {
                Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };

            Line::from(vec![
                Span::styled(format!(" {:<18}", id.spec().name), style),
                Span::styled(bar, Style::default().fg(Color::Cyan)),
                Span::styled(format!("  {}", params.display_text(id)), Style::default().fg(Color::Yellow)),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

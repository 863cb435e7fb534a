use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::simulation::motion::TickOutcome;
use crate::ui::field::{GOAL_CHAR, OBSTACLE_CHAR};

/// Glyph used for the agent.
pub const AGENT_CHAR: char = 'B';

fn glyph_style(ch: char) -> Style {
    match ch {
        OBSTACLE_CHAR => Style::default().fg(Color::DarkGray),
        GOAL_CHAR => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        AGENT_CHAR => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        _ => Style::default().fg(Color::Cyan),
    }
}

/// Styled line with one span per run of identical glyphs.
fn styled_line(row: String) -> Line<'static> {
    let mut spans = Vec::new();
    let mut run = String::new();
    let mut current: Option<char> = None;
    for ch in row.chars() {
        if current.is_some_and(|c| c != ch) {
            let style = glyph_style(current.unwrap_or(ch));
            spans.push(Span::styled(std::mem::take(&mut run), style));
        }
        current = Some(ch);
        run.push(ch);
    }
    if let Some(c) = current {
        spans.push(Span::styled(run, glyph_style(c)));
    }
    Line::from(spans)
}

pub fn draw_ui(f: &mut Frame, grid_lines: Vec<String>, hud_info: &str, outcome: TickOutcome) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // HUD
            Constraint::Min(0),    // Field
        ])
        .split(f.area());

    // HUD
    let hud_style = match outcome {
        TickOutcome::Continue => Style::default().add_modifier(Modifier::REVERSED),
        TickOutcome::Collision => Style::default().fg(Color::White).bg(Color::Red),
        TickOutcome::GoalReached => Style::default().fg(Color::Black).bg(Color::Green),
    };
    f.render_widget(Paragraph::new(Span::styled(hud_info, hud_style)), chunks[0]);

    // Field
    let text: Vec<Line> = grid_lines.into_iter().map(styled_line).collect();

    let field = Paragraph::new(text)
        .block(Block::default().borders(Borders::NONE))
        .style(Style::default().bg(Color::Black));

    f.render_widget(field, chunks[1]);
}

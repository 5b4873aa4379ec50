use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::centered_rect;

/// Full-screen message with a single way back to the home screen.
pub fn draw_status(frame: &mut Frame, title: &str, message: &str, color: Color) {
    let area: Rect = centered_rect(60, 30, frame.area());

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "[Enter] Back to home",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let panel = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(format!(" {} ", title)),
        );
    frame.render_widget(panel, area);
}

pub fn draw_loading(frame: &mut Frame) {
    draw_status(frame, "Loading", "Loading room...", Color::Rgb(100, 200, 255));
}

pub fn draw_failed(frame: &mut Frame, error: &str) {
    draw_status(frame, "Error", error, Color::Red);
}

pub fn draw_missing(frame: &mut Frame) {
    draw_status(frame, "Not found", "Room not found", Color::Rgb(255, 150, 100));
}

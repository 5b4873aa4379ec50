use std::f64::consts::{FRAC_PI_2, TAU};

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use tapalavras_client::gate::Gate;

const CELL_WIDTH: u16 = 3;
const CELL_HEIGHT: u16 = 1;

/// Top-left corner of each letter cell, laid out clockwise on an ellipse
/// starting at twelve o'clock. Cells that would not fit are clamped inside
/// `area`.
pub fn letter_positions(count: usize, area: Rect) -> Vec<(u16, u16)> {
    if count == 0 || area.width < CELL_WIDTH || area.height < CELL_HEIGHT {
        return Vec::new();
    }

    let cx = area.x as f64 + area.width as f64 / 2.0;
    let cy = area.y as f64 + area.height as f64 / 2.0;
    // Terminal cells are roughly twice as tall as wide
    let rx = ((area.width as f64 - CELL_WIDTH as f64) / 2.0).max(0.0);
    let ry = ((area.height as f64 - CELL_HEIGHT as f64) / 2.0).max(0.0);

    let max_x = area.x + area.width - CELL_WIDTH;
    let max_y = area.y + area.height - CELL_HEIGHT;

    (0..count)
        .map(|i| {
            let angle = TAU * i as f64 / count as f64 - FRAC_PI_2;
            let x = (cx + rx * angle.cos() - CELL_WIDTH as f64 / 2.0).round();
            let y = (cy + ry * angle.sin() - CELL_HEIGHT as f64 / 2.0).round();
            let x = (x.max(area.x as f64) as u16).min(max_x);
            let y = (y.max(area.y as f64) as u16).min(max_y);
            (x, y)
        })
        .collect()
}

fn letter_style(gate: &Gate, letter: &str) -> Style {
    let room = gate.room();
    if room.selected_letter.as_deref() == Some(letter) {
        Style::default()
            .fg(Color::Rgb(30, 30, 40))
            .bg(Color::Rgb(253, 193, 29))
            .add_modifier(Modifier::BOLD)
    } else if room.is_letter_used(letter) {
        Style::default()
            .fg(Color::Rgb(80, 80, 95))
            .add_modifier(Modifier::CROSSED_OUT)
    } else if gate.can_select_letter(letter) {
        Style::default()
            .fg(Color::Rgb(100, 255, 150))
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Rgb(180, 180, 200))
    }
}

pub fn draw_letter_circle(frame: &mut Frame, area: Rect, gate: &Gate) {
    let room = gate.room();
    let theme = room.current_theme.as_deref().unwrap_or("");

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Rgb(100, 200, 255)))
        .title(format!(" Letters ({} left) ", gate.letters_remaining()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Theme card in the middle of the circle
    let card_width = (theme.chars().count() as u16 + 4).min(inner.width);
    if card_width > 0 && inner.height >= 3 {
        let card = Rect {
            x: inner.x + (inner.width - card_width) / 2,
            y: inner.y + inner.height / 2,
            width: card_width,
            height: 1,
        };
        let theme_text = Paragraph::new(format!("  {}  ", theme)).style(
            Style::default()
                .fg(Color::Rgb(253, 193, 29))
                .add_modifier(Modifier::BOLD),
        );
        frame.render_widget(theme_text, card);
    }

    let positions = letter_positions(room.letters.len(), inner);
    for (letter, (x, y)) in room.letters.iter().zip(positions) {
        let cell = Rect {
            x,
            y,
            width: CELL_WIDTH,
            height: CELL_HEIGHT,
        };
        let text = Paragraph::new(format!(" {} ", letter)).style(letter_style(gate, letter));
        frame.render_widget(text, cell);
    }
}

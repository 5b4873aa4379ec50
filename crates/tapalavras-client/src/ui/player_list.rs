use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use tapalavras_client::gate::Gate;

/// Player colors - each player gets a distinct color
const PLAYER_COLORS: [Color; 6] = [
    Color::Rgb(100, 200, 255), // Sky blue
    Color::Rgb(255, 150, 100), // Coral
    Color::Rgb(150, 255, 150), // Lime
    Color::Rgb(255, 200, 100), // Gold
    Color::Rgb(200, 150, 255), // Lavender
    Color::Rgb(255, 150, 200), // Pink
];

fn player_color(idx: usize) -> Color {
    PLAYER_COLORS[idx % PLAYER_COLORS.len()]
}

pub fn draw_player_list(frame: &mut Frame, area: Rect, gate: &Gate) {
    let room = gate.room();
    let me = gate.player();

    let lines: Vec<Line> = room
        .players
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let is_active = room.active_player_id.as_deref() == Some(p.id.as_str());
            let lost = room.game_over && room.loser.as_deref() == Some(p.id.as_str());

            let marker = if is_active && !room.game_over { "> " } else { "  " };
            let mut name_style = Style::default().fg(player_color(i));
            if is_active {
                name_style = name_style.add_modifier(Modifier::BOLD);
            }
            if lost {
                name_style = name_style.add_modifier(Modifier::CROSSED_OUT);
            }

            let mut spans = vec![
                Span::styled(marker, Style::default().fg(Color::Rgb(253, 193, 29))),
                Span::styled(p.name.clone(), name_style),
            ];
            if p.is_host {
                spans.push(Span::styled(
                    " (host)",
                    Style::default().fg(Color::Rgb(255, 220, 50)),
                ));
            }
            if p.id == me.id {
                spans.push(Span::styled(
                    " (you)",
                    Style::default().fg(Color::Rgb(120, 120, 140)),
                ));
            }
            Line::from(spans)
        })
        .collect();

    let list = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Rgb(100, 200, 255)))
            .title(format!(" Players ({}) ", room.players.len())),
    );
    frame.render_widget(list, area);
}

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::centered_rect;

pub fn draw_help_popup(frame: &mut Frame) {
    let popup_area = centered_rect(70, 70, frame.area());
    frame.render_widget(Clear, popup_area);

    let sections = vec![
        (
            "HOW TO PLAY",
            Color::Rgb(255, 220, 50),
            vec![
                ("Theme", "The host picks a theme, e.g. Animals"),
                ("Your turn", "Pick a letter and say a word for the theme"),
                ("Pass", "Confirm your word and hand the turn on"),
                ("Time out", "Run out of time and you lose the round"),
            ],
        ),
        (
            "CONTROLS",
            Color::Rgb(100, 255, 150),
            vec![
                ("[A]-[Z]", "Select a letter on your turn"),
                ("[Space]/[Enter]", "Pass the turn after selecting"),
                ("[Tab]", "Focus the theme input (host)"),
                ("[Enter]", "Start the round from the theme input"),
                ("[Del]", "Dismiss the debug note"),
                ("[?]", "Toggle this help screen"),
                ("[Esc]", "Leave the room"),
            ],
        ),
    ];

    let mut lines: Vec<Line> = vec![Line::from("")];
    for (title, color, items) in &sections {
        lines.push(Line::from(Span::styled(
            format!("  {}", title),
            Style::default().fg(*color).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));
        for (key, desc) in items {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("    {:<18}", key),
                    Style::default().fg(Color::Rgb(200, 200, 220)),
                ),
                Span::styled(*desc, Style::default().fg(Color::Rgb(150, 150, 170))),
            ]));
        }
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
        "  Press any key to close",
        Style::default().fg(Color::Rgb(100, 100, 120)),
    )));

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Rgb(100, 200, 255)))
            .title(" Help ")
            .title_style(
                Style::default()
                    .fg(Color::Rgb(255, 220, 50))
                    .add_modifier(Modifier::BOLD),
            ),
    );
    frame.render_widget(paragraph, popup_area);
}

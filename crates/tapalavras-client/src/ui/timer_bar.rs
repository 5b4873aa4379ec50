use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Gauge},
    Frame,
};

use tapalavras_client::countdown::Countdown;

pub fn draw_timer_bar(frame: &mut Frame, area: Rect, countdown: &Countdown, now_ms: i64) {
    let color = if countdown.is_low(now_ms) {
        Color::Rgb(255, 90, 90)
    } else {
        Color::Rgb(100, 255, 150)
    };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(" Your turn "),
        )
        .gauge_style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .ratio(countdown.fraction(now_ms).clamp(0.0, 1.0))
        .label(format!("{}s", countdown.seconds_left(now_ms)));
    frame.render_widget(gauge, area);
}

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use tapalavras_client::countdown::{now_millis, Countdown, CountdownTicker};
use tapalavras_client::gate::{Gate, Outcome, StartBlock, MIN_PLAYERS};
use tapalavras_client::network::Inbound;
use tapalavras_client::session::{RequestError, RoomEntry, Session};
use tapalavras_client::snapshot::RoomView;

use super::{help_popup, letter_circle, player_list, status, timer_bar};
use crate::event::{self, AppEvent};

/// Which part of the room screen receives key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Error, loading or not-found view
    Status,
    Theme,
    Board,
}

#[derive(Debug)]
pub struct RoomScreen {
    pub entry: RoomEntry,
    pub generation: u64,
    pub theme_input: String,
    pub theme_focused: bool,
    pub show_help: bool,
    session: Session,
    ticker: CountdownTicker<AppEvent>,
    forwarder: Option<JoinHandle<()>>,
    debug: bool,
}

impl RoomScreen {
    /// Connect, wire the inbound stream into the app channel under
    /// `generation`, and send the one create/join request.
    pub async fn open(
        entry: RoomEntry,
        server: &str,
        generation: u64,
        event_tx: mpsc::Sender<AppEvent>,
        debug: bool,
    ) -> Self {
        let mut session = Session::new();
        let mut forwarder = None;

        match session.connect(server).await {
            Ok(Some(inbound_rx)) => {
                forwarder = Some(event::forward_network(
                    inbound_rx,
                    event_tx.clone(),
                    generation,
                ));
                if let Err(e) = session.enter_room(&entry) {
                    tracing::warn!("Could not enter room {}: {}", entry.room_code, e);
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::error!("Connection to {} failed: {:#}", server, e);
                session.report_error(format!("Connection failed: {}", e));
            }
        }

        Self {
            entry,
            generation,
            theme_input: String::new(),
            theme_focused: false,
            show_help: false,
            session,
            ticker: CountdownTicker::new(event_tx, AppEvent::Countdown),
            forwarder,
            debug,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn focus(&self) -> Focus {
        match self.session.gate() {
            Some(gate) if matches!(self.session.view(), RoomView::Ready { .. }) => {
                if self.theme_focused && gate.shows_start_controls() {
                    Focus::Theme
                } else {
                    Focus::Board
                }
            }
            _ => Focus::Status,
        }
    }

    pub fn apply(&mut self, inbound: &Inbound) {
        self.session.apply(inbound);
        self.sync_countdown();

        // A running round hides the start controls
        if self.focus() != Focus::Theme {
            self.theme_focused = false;
        }
    }

    fn sync_countdown(&mut self) {
        match self.session.gate() {
            Some(gate) => self
                .ticker
                .sync(Countdown::for_viewer(gate.room(), gate.player())),
            None => self.ticker.stop(),
        }
    }

    fn countdown(&self) -> Option<Countdown> {
        self.session
            .gate()
            .map(|gate| Countdown::for_viewer(gate.room(), gate.player()))
    }

    // -- Actions --

    /// Map a typed key onto one of this round's letters, ignoring case.
    fn letter_for_key(&self, key: char) -> Option<String> {
        let typed: String = key.to_uppercase().collect();
        let room = self.session.snapshot().room.as_ref()?;
        room.letters
            .iter()
            .find(|letter| letter.to_uppercase() == typed)
            .cloned()
    }

    pub fn select_letter(&mut self, key: char) {
        let Some(letter) = self.letter_for_key(key) else {
            tracing::debug!("No letter on the board for key {:?}", key);
            return;
        };
        log_request("select-letter", self.session.select_letter(&letter));
    }

    pub fn pass_turn(&mut self) {
        log_request("pass-turn", self.session.pass_turn());
    }

    pub fn start_game(&mut self) {
        let theme = self.theme_input.trim().to_string();
        if log_request("start-game", self.session.start_game(&theme)) {
            self.theme_input.clear();
            self.theme_focused = false;
        }
    }

    pub fn toggle_theme_focus(&mut self) {
        let can_focus = self
            .session
            .gate()
            .is_some_and(|gate| gate.shows_start_controls());
        self.theme_focused = can_focus && !self.theme_focused;
    }

    pub fn type_char(&mut self, c: char) {
        if self.theme_focused {
            self.theme_input.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if self.theme_focused {
            self.theme_input.pop();
        }
    }

    pub fn clear_debug(&mut self) {
        self.session.clear_debug_message();
    }

    // -- Drawing --

    pub fn draw(&self, frame: &mut Frame) {
        let now = now_millis();
        match self.session.view() {
            RoomView::Failed(message) => status::draw_failed(frame, message),
            RoomView::Loading => status::draw_loading(frame),
            RoomView::Missing => status::draw_missing(frame),
            RoomView::Ready { room, player } => {
                self.draw_room(frame, &Gate::new(room, player), now)
            }
        }

        if self.debug {
            let snapshot = self.session.snapshot();
            draw_debug_overlay(
                frame,
                self.session.gate().as_ref(),
                snapshot.debug_note(now).map(|note| note.text.as_str()),
            );
        }

        if self.show_help {
            help_popup::draw_help_popup(frame);
        }
    }

    fn draw_room(&self, frame: &mut Frame, gate: &Gate, now_ms: i64) {
        let show_start = gate.shows_start_controls();
        let show_timer = gate.shows_timer();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Length(if show_start { 3 } else { 0 }), // Theme input
                Constraint::Min(8), // Board + players
                Constraint::Length(if show_timer { 3 } else { 0 }), // Timer
                Constraint::Length(3), // Prompt
                Constraint::Length(1), // Help bar
            ])
            .split(frame.area());

        self.draw_header(frame, chunks[0], gate);
        if show_start {
            self.draw_theme_input(frame, chunks[1], gate);
        }

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(chunks[2]);

        if gate.has_round() {
            letter_circle::draw_letter_circle(frame, body[0], gate);
        } else {
            draw_waiting_board(frame, body[0], gate);
        }
        player_list::draw_player_list(frame, body[1], gate);

        if show_timer {
            match self.countdown() {
                Some(countdown) if countdown.is_running() => {
                    timer_bar::draw_timer_bar(frame, chunks[3], &countdown, now_ms)
                }
                _ => {
                    let name = gate.active_player().map(|p| p.name.as_str()).unwrap_or("?");
                    let waiting = Paragraph::new(format!("  {} is on the clock...", name))
                        .style(Style::default().fg(Color::Rgb(150, 150, 170)))
                        .block(Block::default().borders(Borders::ALL));
                    frame.render_widget(waiting, chunks[3]);
                }
            }
        }

        draw_prompt(frame, chunks[4], gate);

        let help_text = match self.focus() {
            Focus::Theme => " [Enter] Start round  [Esc] Back to board",
            _ if show_start => " [A-Z] Letter  [Space] Pass  [Tab] Theme  [?] Help  [Esc] Leave",
            _ => " [A-Z] Letter  [Space] Pass  [?] Help  [Esc] Leave",
        };
        let help = Paragraph::new(help_text).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[5]);
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect, gate: &Gate) {
        let room = gate.room();
        let connected = self.session.snapshot().connected;

        let mut spans = vec![
            Span::styled(
                " Room ",
                Style::default().fg(Color::Rgb(150, 150, 170)),
            ),
            Span::styled(
                room.id.clone(),
                Style::default()
                    .fg(Color::Rgb(253, 193, 29))
                    .add_modifier(Modifier::BOLD),
            ),
        ];
        if let Some(theme) = room.current_theme.as_deref() {
            spans.push(Span::raw("  |  Theme: "));
            spans.push(Span::styled(
                theme.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ));
        }
        spans.push(Span::raw("  |  "));
        if connected {
            spans.push(Span::styled("online", Style::default().fg(Color::Green)));
        } else {
            spans.push(Span::styled("offline", Style::default().fg(Color::Red)));
        }

        let header = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Rgb(100, 200, 255)))
                .title(" TAPALAVRAS "),
        );
        frame.render_widget(header, area);
    }

    fn draw_theme_input(&self, frame: &mut Frame, area: Rect, gate: &Gate) {
        let border = if self.theme_focused {
            Color::Rgb(253, 193, 29)
        } else {
            Color::Rgb(120, 120, 140)
        };
        let title = match gate.start_block(&self.theme_input) {
            Some(StartBlock::WaitingForPlayers) => {
                format!(" Theme - waiting for players ({} needed) ", MIN_PLAYERS)
            }
            Some(StartBlock::MissingTheme) => " Theme - type one to start ".to_string(),
            Some(StartBlock::NotHost) | Some(StartBlock::RoundRunning) => " Theme ".to_string(),
            None if gate.is_game_over() => " Theme - [Enter] Start New Game ".to_string(),
            None => " Theme - [Enter] Start Game ".to_string(),
        };

        let input = Paragraph::new(self.theme_input.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(title),
        );
        frame.render_widget(input, area);

        if self.theme_focused {
            frame.set_cursor_position((
                area.x + self.theme_input.chars().count() as u16 + 1,
                area.y + 1,
            ));
        }
    }
}

impl Drop for RoomScreen {
    fn drop(&mut self) {
        if let Some(handle) = self.forwarder.take() {
            handle.abort();
        }
    }
}

/// Log why a gated request did not go out. Returns whether it was sent.
fn log_request(name: &str, result: Result<bool, RequestError>) -> bool {
    match result {
        Ok(sent) => {
            if !sent {
                tracing::debug!("{} not allowed right now", name);
            }
            sent
        }
        Err(e) => {
            tracing::warn!("{} failed: {}", name, e);
            false
        }
    }
}

fn draw_waiting_board(frame: &mut Frame, area: Rect, gate: &Gate) {
    let lines = if gate.player().is_host {
        vec![
            Line::from(""),
            Line::from("  Share the room code and pick a theme."),
            Line::from("  Press [Tab] to type it, [Enter] to start."),
        ]
    } else {
        vec![
            Line::from(""),
            Line::from("  Waiting for the host to start the game..."),
        ]
    };
    let board = Paragraph::new(lines)
        .style(Style::default().fg(Color::Rgb(180, 180, 200)))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Rgb(100, 200, 255)))
                .title(" Lobby "),
        );
    frame.render_widget(board, area);
}

fn draw_prompt(frame: &mut Frame, area: Rect, gate: &Gate) {
    let (mut text, color) = match gate.outcome() {
        Outcome::YouLost => (
            "You ran out of time! Game over.".to_string(),
            Color::Rgb(255, 90, 90),
        ),
        Outcome::Completed => (
            "All letters used! Everyone wins!".to_string(),
            Color::Rgb(100, 255, 150),
        ),
        Outcome::PlayerTimedOut(name) => (
            format!("{} ran out of time!", name.unwrap_or("A player")),
            Color::Rgb(255, 200, 100),
        ),
        Outcome::InProgress if !gate.has_round() => (
            "Waiting for the round to start".to_string(),
            Color::Rgb(150, 150, 170),
        ),
        Outcome::InProgress if gate.is_players_turn() => {
            match gate.room().selected_letter.as_deref() {
                Some(letter) => (
                    format!(
                        "Say a word starting with {}, then press [Space] to pass",
                        letter
                    ),
                    Color::Rgb(253, 193, 29),
                ),
                None => (
                    "Your turn! Pick a letter.".to_string(),
                    Color::Rgb(100, 255, 150),
                ),
            }
        }
        Outcome::InProgress => {
            let name = gate.active_player().map(|p| p.name.as_str()).unwrap_or("?");
            (
                format!("Waiting for {}...", name),
                Color::Rgb(150, 150, 170),
            )
        }
    };

    if gate.is_game_over() && gate.player().is_host {
        text.push_str("  Pick a new theme to play again.");
    }

    let prompt = Paragraph::new(Span::styled(
        text,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
    .wrap(Wrap { trim: true })
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(prompt, area);
}

fn debug_lines(gate: Option<&Gate>, note: Option<&str>) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(note) = note {
        lines.push(note.to_string());
    }
    if let Some(gate) = gate {
        let room = gate.room();
        let state = if gate.is_game_over() {
            "over"
        } else if gate.has_round() {
            "playing"
        } else {
            "lobby"
        };
        lines.push(format!("state: {}", state));
        lines.push(format!("letters left: {}", gate.letters_remaining()));
        lines.push(format!("used: {}", room.used_letters.join(", ")));
        lines.push(format!(
            "active: {}",
            gate.active_player().map(|p| p.name.as_str()).unwrap_or("-")
        ));
        lines.push(format!("you: {}", gate.player().id));
    }
    lines
}

fn draw_debug_overlay(frame: &mut Frame, gate: Option<&Gate>, note: Option<&str>) {
    let lines = debug_lines(gate, note);
    if lines.is_empty() {
        return;
    }

    let area = frame.area();
    let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u16;
    let width = (longest + 4).min(area.width);
    let height = (lines.len() as u16 + 2).min(area.height);
    let overlay = Rect {
        x: area.x + area.width - width,
        y: area.y,
        width,
        height,
    };
    frame.render_widget(Clear, overlay);

    let text: Vec<Line> = lines.into_iter().map(Line::from).collect();
    let panel = Paragraph::new(text)
        .style(Style::default().fg(Color::Rgb(200, 200, 220)))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Rgb(120, 120, 140)))
                .title(" debug [Del] "),
        );
    frame.render_widget(panel, overlay);
}

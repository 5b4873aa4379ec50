use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use tapalavras_common::room_code::{generate_room_code, normalize_room_code, ROOM_CODE_LENGTH};
use tapalavras_client::session::RoomEntry;

#[derive(Debug, Clone)]
pub struct HomeScreen {
    pub name: String,
    pub room_code: String,
    pub active_field: HomeField,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeField {
    Name,
    RoomCode,
}

impl HomeScreen {
    pub fn new(name: Option<String>) -> Self {
        Self {
            name: name.unwrap_or_default(),
            room_code: String::new(),
            active_field: HomeField::Name,
            error_message: None,
        }
    }

    pub fn switch_field(&mut self) {
        self.active_field = match self.active_field {
            HomeField::Name => HomeField::RoomCode,
            HomeField::RoomCode => HomeField::Name,
        };
    }

    pub fn type_char(&mut self, c: char) {
        match self.active_field {
            HomeField::Name => self.name.push(c),
            HomeField::RoomCode => {
                let typed = format!("{}{}", self.room_code, c);
                self.room_code = normalize_room_code(&typed);
            }
        }
    }

    pub fn backspace(&mut self) {
        match self.active_field {
            HomeField::Name => {
                self.name.pop();
            }
            HomeField::RoomCode => {
                self.room_code.pop();
            }
        }
    }

    /// Build the room entry: join when a code was typed, otherwise create a
    /// room under a freshly generated code.
    pub fn submit(&mut self) -> Option<RoomEntry> {
        let name = self.name.trim();
        if name.is_empty() {
            self.error_message = Some("Please enter a name".into());
            return None;
        }
        self.error_message = None;

        let entry = if self.room_code.is_empty() {
            RoomEntry {
                room_code: generate_room_code(&mut rand::thread_rng()),
                player_name: name.to_string(),
                host: true,
            }
        } else {
            RoomEntry {
                room_code: self.room_code.clone(),
                player_name: name.to_string(),
                host: false,
            }
        };
        Some(entry)
    }

    pub fn draw(&self, frame: &mut Frame) {
        let area = frame.area();

        // Center the form
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(25),
                Constraint::Length(15),
                Constraint::Percentage(25),
            ])
            .split(area);

        let horizontal = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(25),
                Constraint::Percentage(50),
                Constraint::Percentage(25),
            ])
            .split(vertical[1]);

        let form_area = horizontal[1];

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // Title
                Constraint::Length(3), // Name field
                Constraint::Length(3), // Room code field
                Constraint::Length(2), // Status/Error
                Constraint::Length(3), // Help
            ])
            .split(form_area);

        // Title
        let title = Paragraph::new(Line::from(vec![
            Span::styled(
                "  TAPALAVRAS ",
                Style::default()
                    .fg(Color::Rgb(253, 193, 29))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" - pick a letter, say a word"),
        ]));
        frame.render_widget(title, chunks[0]);

        let field_style = |field: HomeField| {
            if self.active_field == field {
                Style::default().fg(Color::Rgb(253, 193, 29))
            } else {
                Style::default().fg(Color::White)
            }
        };

        let name_input = Paragraph::new(self.name.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(field_style(HomeField::Name))
                .title(" Your Name "),
        );
        frame.render_widget(name_input, chunks[1]);

        let code_input = Paragraph::new(self.room_code.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(field_style(HomeField::RoomCode))
                .title(format!(
                    " Room Code ({} chars, empty to create) ",
                    ROOM_CODE_LENGTH
                )),
        );
        frame.render_widget(code_input, chunks[2]);

        if let Some(ref err) = self.error_message {
            let error = Paragraph::new(format!("  {}", err)).style(Style::default().fg(Color::Red));
            frame.render_widget(error, chunks[3]);
        }

        let submit_label = if self.room_code.is_empty() {
            "Create room"
        } else {
            "Join room"
        };
        let help = Paragraph::new(vec![
            Line::from(format!(
                "  [Enter] {}  [Tab] Switch field  [Esc] Quit",
                submit_label
            )),
            Line::from("  Share the room code with friends to play together!"),
        ])
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[4]);

        let (cursor_x, cursor_y) = match self.active_field {
            HomeField::Name => (chunks[1].x + self.name.len() as u16 + 1, chunks[1].y + 1),
            HomeField::RoomCode => (
                chunks[2].x + self.room_code.len() as u16 + 1,
                chunks[2].y + 1,
            ),
        };
        frame.set_cursor_position((cursor_x, cursor_y));
    }
}

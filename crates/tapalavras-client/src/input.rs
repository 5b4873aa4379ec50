use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::Screen;
use crate::ui::room::Focus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // Global
    Quit,
    ShowHelp,

    // Text input
    TypeChar(char),
    Backspace,
    Submit,

    // Home screen
    SwitchField,

    // Room
    SelectLetter(char),
    PassTurn,
    FocusTheme,
    StartGame,
    ClearDebug,
    LeaveRoom,
}

pub fn map_key(key: KeyEvent, screen: &Screen) -> Option<Action> {
    // Ctrl+C always quits
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }

    match screen {
        Screen::Home(_) => match key.code {
            KeyCode::Enter => Some(Action::Submit),
            KeyCode::Tab | KeyCode::BackTab => Some(Action::SwitchField),
            KeyCode::Char(c) => Some(Action::TypeChar(c)),
            KeyCode::Backspace => Some(Action::Backspace),
            KeyCode::Esc => Some(Action::Quit),
            _ => None,
        },

        Screen::Room(s) => match s.focus() {
            // Error, loading and not-found views only offer the way back
            Focus::Status => match key.code {
                KeyCode::Enter | KeyCode::Esc => Some(Action::LeaveRoom),
                _ => None,
            },

            Focus::Theme => match key.code {
                KeyCode::Enter => Some(Action::StartGame),
                KeyCode::Esc | KeyCode::Tab => Some(Action::FocusTheme),
                KeyCode::Char(c) => Some(Action::TypeChar(c)),
                KeyCode::Backspace => Some(Action::Backspace),
                _ => None,
            },

            Focus::Board => match key.code {
                KeyCode::Char(' ') | KeyCode::Enter => Some(Action::PassTurn),
                KeyCode::Char('?') => Some(Action::ShowHelp),
                KeyCode::Char(c) if c.is_alphanumeric() => Some(Action::SelectLetter(c)),
                KeyCode::Tab => Some(Action::FocusTheme),
                KeyCode::Delete => Some(Action::ClearDebug),
                KeyCode::Esc => Some(Action::LeaveRoom),
                _ => None,
            },
        },
    }
}

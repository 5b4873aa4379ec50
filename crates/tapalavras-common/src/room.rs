use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_host: bool,
}

impl Player {
    pub fn new(id: impl Into<String>, name: impl Into<String>, is_host: bool) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_host,
        }
    }
}

/// Room state as broadcast by the server.
///
/// `current_turn_start_time` is in milliseconds since the Unix epoch and
/// `time_limit` is in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_theme: Option<String>,
    #[serde(default)]
    pub letters: Vec<String>,
    #[serde(default)]
    pub used_letters: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_letter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_player_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_turn_start_time: Option<i64>,
    pub time_limit: u64,
    #[serde(default)]
    pub game_over: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loser: Option<String>,
}

impl Room {
    pub fn new(id: impl Into<String>, time_limit: u64) -> Self {
        Self {
            id: id.into(),
            players: Vec::new(),
            current_theme: None,
            letters: Vec::new(),
            used_letters: Vec::new(),
            selected_letter: None,
            active_player_id: None,
            current_turn_start_time: None,
            time_limit,
            game_over: false,
            loser: None,
        }
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_name(&self, id: &str) -> Option<&str> {
        self.player(id).map(|p| p.name.as_str())
    }

    pub fn host(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.is_host)
    }

    /// A round has been started at least once (it may be over).
    pub fn has_round(&self) -> bool {
        self.current_theme.is_some()
    }

    /// A round is running: started, not over, and someone holds the turn.
    pub fn is_turn_live(&self) -> bool {
        self.has_round() && !self.game_over && self.active_player_id.is_some()
    }

    pub fn has_letter(&self, letter: &str) -> bool {
        self.letters.iter().any(|l| l == letter)
    }

    pub fn is_letter_used(&self, letter: &str) -> bool {
        self.used_letters.iter().any(|l| l == letter)
    }

    /// Round letters not yet consumed, in round order.
    pub fn available_letters(&self) -> impl Iterator<Item = &str> {
        self.letters
            .iter()
            .filter(|l| !self.is_letter_used(l))
            .map(String::as_str)
    }

    pub fn remaining_letters(&self) -> usize {
        self.available_letters().count()
    }
}

//! Advisory permission checks derived from the current snapshot.
//!
//! Nothing here is cached; every check reads the room as it is now. The
//! server re-validates every request, so these only decide what this client
//! bothers to send.

use tapalavras_common::room::{Player, Room};

use crate::snapshot::Snapshot;

pub const MIN_PLAYERS: usize = 2;

/// Why the host cannot start a round right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartBlock {
    NotHost,
    RoundRunning,
    WaitingForPlayers,
    MissingTheme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome<'a> {
    InProgress,
    YouLost,
    /// Every letter was used; nobody lost.
    Completed,
    /// Another player ran out of time. The name is gone if they left.
    PlayerTimedOut(Option<&'a str>),
}

#[derive(Debug, Clone, Copy)]
pub struct Gate<'a> {
    room: &'a Room,
    player: &'a Player,
}

impl<'a> Gate<'a> {
    pub fn new(room: &'a Room, player: &'a Player) -> Self {
        Self { room, player }
    }

    pub fn from_snapshot(snapshot: &'a Snapshot) -> Option<Self> {
        match (&snapshot.room, &snapshot.player) {
            (Some(room), Some(player)) => Some(Self::new(room, player)),
            _ => None,
        }
    }

    pub fn room(&self) -> &'a Room {
        self.room
    }

    pub fn player(&self) -> &'a Player {
        self.player
    }

    pub fn is_players_turn(&self) -> bool {
        self.room.active_player_id.as_deref() == Some(self.player.id.as_str())
    }

    pub fn is_game_over(&self) -> bool {
        self.room.game_over
    }

    pub fn player_lost(&self) -> bool {
        self.is_game_over() && self.room.loser.as_deref() == Some(self.player.id.as_str())
    }

    pub fn won_cleanly(&self) -> bool {
        self.is_game_over() && self.room.loser.is_none()
    }

    pub fn has_round(&self) -> bool {
        self.room.has_round()
    }

    pub fn letters_remaining(&self) -> usize {
        self.room.remaining_letters()
    }

    /// One tentative letter per turn, and only an unused one from this round.
    pub fn can_select_letter(&self, letter: &str) -> bool {
        self.is_players_turn()
            && !self.is_game_over()
            && self.room.has_letter(letter)
            && !self.room.is_letter_used(letter)
            && self.room.selected_letter.is_none()
    }

    /// Passing confirms the spoken word, so a letter must be chosen first.
    pub fn can_pass_turn(&self) -> bool {
        self.is_players_turn() && !self.is_game_over() && self.room.selected_letter.is_some()
    }

    pub fn start_block(&self, theme: &str) -> Option<StartBlock> {
        if !self.player.is_host {
            Some(StartBlock::NotHost)
        } else if self.has_round() && !self.is_game_over() {
            Some(StartBlock::RoundRunning)
        } else if self.room.players.len() < MIN_PLAYERS {
            Some(StartBlock::WaitingForPlayers)
        } else if theme.trim().is_empty() {
            Some(StartBlock::MissingTheme)
        } else {
            None
        }
    }

    pub fn can_start_game(&self, theme: &str) -> bool {
        self.start_block(theme).is_none()
    }

    /// The host's start controls are shown between rounds.
    pub fn shows_start_controls(&self) -> bool {
        self.player.is_host && (!self.has_round() || self.is_game_over())
    }

    pub fn shows_timer(&self) -> bool {
        self.room.is_turn_live() && self.room.current_turn_start_time.is_some()
    }

    pub fn active_player(&self) -> Option<&'a Player> {
        self.room
            .active_player_id
            .as_deref()
            .and_then(|id| self.room.player(id))
    }

    pub fn outcome(&self) -> Outcome<'a> {
        if !self.is_game_over() {
            Outcome::InProgress
        } else if self.player_lost() {
            Outcome::YouLost
        } else {
            match self.room.loser.as_deref() {
                None => Outcome::Completed,
                Some(loser) => Outcome::PlayerTimedOut(self.room.player_name(loser)),
            }
        }
    }
}

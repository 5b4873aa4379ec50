//! The room session: one connection, one snapshot, one entry request.
//!
//! A `Session` is built when the room view is entered and dropped when it is
//! left. Dropping it tears the connection down, and a fresh session is the
//! only way to issue another create/join request.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use tapalavras_common::protocol::{ClientEvent, ServerEvent};

use crate::countdown::now_millis;
use crate::gate::Gate;
use crate::network::{self, Connection, Inbound};
use crate::snapshot::{RoomView, Snapshot};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("a name is required to enter a room")]
    EmptyName,
    #[error("a theme is required to start the game")]
    BlankTheme,
    #[error("not connected to the server")]
    NotConnected,
    #[error("too many requests waiting to be sent")]
    Backlogged,
}

/// Progress of the single create/join request a session may issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Pending,
    Done,
}

/// How the room view was reached: a room code, a display name, and whether
/// this client creates the room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomEntry {
    pub room_code: String,
    pub player_name: String,
    pub host: bool,
}

#[derive(Debug, Default)]
pub struct Session {
    connection: Option<Connection>,
    snapshot: Snapshot,
    entry: RequestState,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_connection(connection: Connection) -> Self {
        Self {
            connection: Some(connection),
            ..Self::default()
        }
    }

    /// Open the event channel. Returns `None` when a live channel already exists.
    pub async fn connect(&mut self, addr: &str) -> anyhow::Result<Option<mpsc::Receiver<Inbound>>> {
        if self.connection.as_ref().is_some_and(Connection::is_live) {
            tracing::debug!("connect() ignored: channel already live");
            return Ok(None);
        }
        let (connection, inbound) = network::connect(addr).await?;
        self.connection = Some(connection);
        Ok(Some(inbound))
    }

    pub fn disconnect(&mut self) {
        if let Some(connection) = self.connection.take() {
            tracing::info!("Closing connection");
            connection.close();
        }
        self.snapshot = Snapshot {
            connected: false,
            ..self.snapshot.clone()
        };
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn request_state(&self) -> RequestState {
        self.entry
    }

    pub fn gate(&self) -> Option<Gate<'_>> {
        Gate::from_snapshot(&self.snapshot)
    }

    pub fn view(&self) -> RoomView<'_> {
        self.snapshot.view(self.entry != RequestState::Idle)
    }

    pub fn apply(&mut self, inbound: &Inbound) {
        self.apply_at(inbound, now_millis());
    }

    /// Fold one inbound event into the snapshot at local time `now_ms`.
    pub fn apply_at(&mut self, inbound: &Inbound, now_ms: i64) {
        match inbound {
            Inbound::Server(event) => tracing::debug!("<- {}", event.name()),
            other => tracing::debug!("<- {:?}", other),
        }

        if self.entry == RequestState::Pending
            && matches!(
                inbound,
                Inbound::Server(
                    ServerEvent::RoomCreated { .. }
                        | ServerEvent::RoomJoined { .. }
                        | ServerEvent::Error { .. }
                )
            )
        {
            self.entry = RequestState::Done;
        }

        self.snapshot = self.snapshot.reduce(inbound, now_ms);
    }

    pub fn clear_debug_message(&mut self) {
        self.snapshot = self.snapshot.without_debug();
    }

    /// Surface a failure that happened outside the event stream, such as a
    /// refused connection.
    pub fn report_error(&mut self, message: impl Into<String>) {
        self.snapshot = Snapshot {
            loading: false,
            ..self.snapshot.with_error(message)
        };
    }

    // -- Room entry --

    pub fn enter_room(&mut self, entry: &RoomEntry) -> Result<(), RequestError> {
        if entry.host {
            self.request_create_room(&entry.player_name)
        } else {
            self.request_join_room(&entry.room_code, &entry.player_name)
        }
    }

    pub fn request_create_room(&mut self, player_name: &str) -> Result<(), RequestError> {
        if self.entry_closed("create-room") {
            return Ok(());
        }
        if player_name.is_empty() {
            return Err(self.reject(RequestError::EmptyName));
        }
        let note = format!("Creating room for player: {}", player_name);
        self.emit_entry(
            ClientEvent::CreateRoom {
                player_name: player_name.to_string(),
            },
            note,
        )
    }

    /// The room id is passed through untouched; the server decides whether it exists.
    pub fn request_join_room(
        &mut self,
        room_id: &str,
        player_name: &str,
    ) -> Result<(), RequestError> {
        if self.entry_closed("join-room") {
            return Ok(());
        }
        if player_name.is_empty() {
            return Err(self.reject(RequestError::EmptyName));
        }
        let note = format!("Joining room {} as {}", room_id, player_name);
        self.emit_entry(
            ClientEvent::JoinRoom {
                room_id: room_id.to_string(),
                player_name: player_name.to_string(),
            },
            note,
        )
    }

    /// Only the first create/join of a session goes out; later calls are
    /// no-ops, whatever their arguments.
    fn entry_closed(&self, name: &str) -> bool {
        if self.entry == RequestState::Idle {
            return false;
        }
        tracing::debug!("{} ignored: entry request already {:?}", name, self.entry);
        true
    }

    fn emit_entry(&mut self, event: ClientEvent, note: String) -> Result<(), RequestError> {
        self.emit(event)?;
        self.entry = RequestState::Pending;
        self.snapshot = self.snapshot.begin_request().with_note(note, now_millis());
        Ok(())
    }

    // -- Round actions --

    /// Host permission is not checked here; the server enforces it.
    pub fn request_start_game(&mut self, room_id: &str, theme: &str) -> Result<(), RequestError> {
        if theme.trim().is_empty() {
            return Err(self.reject(RequestError::BlankTheme));
        }
        self.emit(ClientEvent::StartGame {
            room_id: room_id.to_string(),
            theme: theme.to_string(),
        })?;
        self.note(format!("Starting game in room: {} with theme: {}", room_id, theme));
        Ok(())
    }

    pub fn request_select_letter(
        &mut self,
        room_id: &str,
        letter: &str,
    ) -> Result<(), RequestError> {
        self.emit(ClientEvent::SelectLetter {
            room_id: room_id.to_string(),
            letter: letter.to_string(),
        })?;
        self.note(format!("Selecting letter: {}", letter));
        Ok(())
    }

    pub fn request_pass_turn(&mut self, room_id: &str) -> Result<(), RequestError> {
        self.emit(ClientEvent::PassTurn {
            room_id: room_id.to_string(),
        })?;
        self.note(format!("Passing turn in room: {}", room_id));
        Ok(())
    }

    // -- Gated intents --

    /// Select `letter` if the gate allows it. Returns whether a request went out.
    pub fn select_letter(&mut self, letter: &str) -> Result<bool, RequestError> {
        let room_id = match self.gate() {
            Some(gate) if gate.can_select_letter(letter) => gate.room().id.clone(),
            _ => return Ok(false),
        };
        self.request_select_letter(&room_id, letter)?;
        Ok(true)
    }

    pub fn pass_turn(&mut self) -> Result<bool, RequestError> {
        let room_id = match self.gate() {
            Some(gate) if gate.can_pass_turn() => gate.room().id.clone(),
            _ => return Ok(false),
        };
        self.request_pass_turn(&room_id)?;
        Ok(true)
    }

    pub fn start_game(&mut self, theme: &str) -> Result<bool, RequestError> {
        let room_id = match self.gate() {
            Some(gate) if gate.can_start_game(theme) => gate.room().id.clone(),
            _ => return Ok(false),
        };
        self.request_start_game(&room_id, theme)?;
        Ok(true)
    }

    // -- Internal helpers --

    fn emit(&self, event: ClientEvent) -> Result<(), RequestError> {
        let connection = self
            .connection
            .as_ref()
            .filter(|c| c.is_live())
            .ok_or(RequestError::NotConnected)?;
        let name = event.name();
        connection.emit(event).map_err(|e| match e {
            TrySendError::Full(_) => {
                tracing::warn!("Outbound queue full, dropping {}", name);
                RequestError::Backlogged
            }
            TrySendError::Closed(_) => {
                tracing::warn!("Failed to queue {}: channel closed", name);
                RequestError::NotConnected
            }
        })
    }

    fn reject(&mut self, error: RequestError) -> RequestError {
        tracing::warn!("Request rejected locally: {}", error);
        self.snapshot = self.snapshot.with_error(error.to_string());
        error
    }

    fn note(&mut self, text: String) {
        self.snapshot = self.snapshot.with_note(text, now_millis());
    }
}

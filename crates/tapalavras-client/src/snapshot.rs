//! Room/player snapshot and the reducer that folds inbound events into it.
//!
//! A [`Snapshot`] is never mutated after construction: [`Snapshot::reduce`]
//! takes the previous value plus one event and returns the next value. The
//! local receipt time is passed in, which keeps the reducer deterministic.

use tapalavras_common::protocol::ServerEvent;
use tapalavras_common::room::{Player, Room};

use crate::network::Inbound;

/// How long a debug note stays visible in the overlay.
pub const DEBUG_NOTE_TTL_MS: i64 = 5_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugNote {
    pub text: String,
    pub at_ms: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub room: Option<Room>,
    pub player: Option<Player>,
    pub error: Option<String>,
    pub loading: bool,
    pub connected: bool,
    pub debug: Option<DebugNote>,
}

/// What the room screen should show for a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomView<'a> {
    Failed(&'a str),
    Loading,
    Missing,
    Ready { room: &'a Room, player: &'a Player },
}

impl Snapshot {
    pub fn reduce(&self, inbound: &Inbound, now_ms: i64) -> Snapshot {
        let mut next = self.clone();
        next.debug = Some(DebugNote {
            text: describe(inbound),
            at_ms: now_ms,
        });

        match inbound {
            Inbound::Connected => next.connected = true,
            Inbound::Disconnected => next.connected = false,
            Inbound::Server(event) => next.apply_server_event(event, now_ms),
        }

        next
    }

    fn apply_server_event(&mut self, event: &ServerEvent, now_ms: i64) {
        match event {
            ServerEvent::Error { message } => {
                self.error = Some(message.clone());
                self.loading = false;
            }

            ServerEvent::RoomCreated { room, player, .. }
            | ServerEvent::RoomJoined { room, player } => {
                let mut room = room.clone();
                // The server clock is not trusted: a turn already running is
                // anchored at local receipt.
                room.current_turn_start_time = room.is_turn_live().then_some(now_ms);
                self.room = Some(room);
                self.player = Some(player.clone());
                self.loading = false;
                self.error = None;
            }

            ServerEvent::PlayerJoined { players, .. } => {
                if let Some(room) = self.room.as_mut() {
                    room.players = players.clone();
                }
            }

            ServerEvent::PlayerLeft {
                players,
                new_host_id,
                ..
            } => {
                let Some(room) = self.room.as_mut() else {
                    return;
                };
                room.players = players.clone();

                if let Some(me) = self.player.as_mut() {
                    if let Some(listed) = room.player(&me.id) {
                        me.is_host = listed.is_host;
                    }
                    if new_host_id.as_deref() == Some(me.id.as_str()) {
                        me.is_host = true;
                    }
                }
            }

            ServerEvent::GameStarted {
                theme,
                active_player_id,
                letters,
            } => {
                if let Some(room) = self.room.as_mut() {
                    room.current_theme = Some(theme.clone());
                    room.active_player_id = Some(active_player_id.clone());
                    room.letters = dedup_letters(letters);
                    room.used_letters.clear();
                    room.selected_letter = None;
                    room.game_over = false;
                    room.loser = None;
                    room.current_turn_start_time = Some(now_ms);
                }
            }

            ServerEvent::LetterSelected { letter, player_id } => {
                if let Some(room) = self.room.as_mut() {
                    if room.has_letter(letter) && !room.is_letter_used(letter) {
                        room.selected_letter = Some(letter.clone());
                    } else {
                        tracing::warn!(
                            "Ignoring selection of unavailable letter {:?} by {}",
                            letter,
                            player_id
                        );
                    }
                }
            }

            ServerEvent::TurnChanged {
                active_player_id,
                used_letter,
                ..
            } => {
                if let Some(room) = self.room.as_mut() {
                    if !used_letter.is_empty() {
                        if room.has_letter(used_letter) && !room.is_letter_used(used_letter) {
                            room.used_letters.push(used_letter.clone());
                        } else {
                            tracing::warn!(
                                "Ignoring used letter {:?} outside the round",
                                used_letter
                            );
                        }
                    }
                    room.active_player_id = Some(active_player_id.clone());
                    room.selected_letter = None;
                    room.current_turn_start_time = Some(now_ms);
                }
            }

            ServerEvent::PlayerLost { player_id } => {
                if let Some(room) = self.room.as_mut() {
                    room.game_over = true;
                    room.loser = Some(player_id.clone());
                }
            }

            ServerEvent::GameComplete { all_letters_used } => {
                if let Some(room) = self.room.as_mut() {
                    room.game_over = true;
                    if *all_letters_used {
                        room.loser = None;
                    }
                }
            }
        }
    }

    /// A create/join request went out: loading, previous error cleared.
    pub fn begin_request(&self) -> Snapshot {
        Snapshot {
            loading: true,
            error: None,
            ..self.clone()
        }
    }

    pub fn with_error(&self, message: impl Into<String>) -> Snapshot {
        Snapshot {
            error: Some(message.into()),
            ..self.clone()
        }
    }

    pub fn with_note(&self, text: impl Into<String>, now_ms: i64) -> Snapshot {
        Snapshot {
            debug: Some(DebugNote {
                text: text.into(),
                at_ms: now_ms,
            }),
            ..self.clone()
        }
    }

    pub fn without_debug(&self) -> Snapshot {
        Snapshot {
            debug: None,
            ..self.clone()
        }
    }

    /// The latest debug note, if it is still fresh.
    pub fn debug_note(&self, now_ms: i64) -> Option<&DebugNote> {
        self.debug
            .as_ref()
            .filter(|note| now_ms.saturating_sub(note.at_ms) < DEBUG_NOTE_TTL_MS)
    }

    /// `ready` is false until the room entry request has been issued.
    pub fn view(&self, ready: bool) -> RoomView<'_> {
        if let Some(message) = self.error.as_deref() {
            return RoomView::Failed(message);
        }
        if self.loading || !ready {
            return RoomView::Loading;
        }
        match (&self.room, &self.player) {
            (Some(room), Some(player)) => RoomView::Ready { room, player },
            _ => RoomView::Missing,
        }
    }
}

fn dedup_letters(letters: &[String]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(letters.len());
    for letter in letters {
        if !unique.contains(letter) {
            unique.push(letter.clone());
        }
    }
    unique
}

fn describe(inbound: &Inbound) -> String {
    match inbound {
        Inbound::Connected => "Socket connected".to_string(),
        Inbound::Disconnected => "Socket disconnected".to_string(),
        Inbound::Server(event) => match event {
            ServerEvent::Error { message } => format!("Error: {}", message),
            ServerEvent::RoomCreated { room_id, .. } => format!("Room created: {}", room_id),
            ServerEvent::RoomJoined { room, .. } => format!("Joined room: {}", room.id),
            ServerEvent::PlayerJoined { player, .. } => format!("Player joined: {}", player.name),
            ServerEvent::PlayerLeft { player_id, .. } => format!("Player left: {}", player_id),
            ServerEvent::GameStarted { theme, .. } => format!("Game started, theme: {}", theme),
            ServerEvent::LetterSelected { player_id, letter } => {
                format!("Letter selected: {} by player {}", letter, player_id)
            }
            ServerEvent::TurnChanged {
                previous_player_id,
                active_player_id,
                used_letter,
            } => format!(
                "Turn changed from {} to {}, used letter: {}",
                previous_player_id, active_player_id, used_letter
            ),
            ServerEvent::PlayerLost { player_id } => {
                format!("Player lost: {} (timed out)", player_id)
            }
            ServerEvent::GameComplete { all_letters_used } => {
                format!("Game complete, all letters used: {}", all_letters_used)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letters(ls: &[&str]) -> Vec<String> {
        ls.iter().map(|l| l.to_string()).collect()
    }

    fn server(event: ServerEvent) -> Inbound {
        Inbound::Server(event)
    }

    fn joined() -> Snapshot {
        let mut room = Room::new("ABC123", 10_000);
        room.players = vec![
            Player::new("p1", "Ana", true),
            Player::new("p2", "Bruno", false),
            Player::new("p3", "Carla", false),
        ];
        Snapshot::default().reduce(
            &server(ServerEvent::RoomCreated {
                room_id: "ABC123".into(),
                player: Player::new("p1", "Ana", true),
                room,
            }),
            1_000,
        )
    }

    /// Round with letters A, B, C where A is already used and p1 holds the turn.
    fn mid_round() -> Snapshot {
        joined()
            .reduce(
                &server(ServerEvent::GameStarted {
                    theme: "Animals".into(),
                    active_player_id: "p2".into(),
                    letters: letters(&["A", "B", "C"]),
                }),
                2_000,
            )
            .reduce(
                &server(ServerEvent::TurnChanged {
                    previous_player_id: "p2".into(),
                    active_player_id: "p1".into(),
                    used_letter: "A".into(),
                }),
                3_000,
            )
    }

    fn room(s: &Snapshot) -> &Room {
        s.room.as_ref().unwrap()
    }

    #[test]
    fn test_room_created_replaces_snapshot() {
        let loading = Snapshot::default().begin_request();
        assert!(loading.loading);

        let s = loading.reduce(
            &server(ServerEvent::RoomCreated {
                room_id: "ABC123".into(),
                player: Player::new("p1", "Ana", true),
                room: Room::new("ABC123", 10_000),
            }),
            500,
        );
        assert_eq!(s.player.as_ref().unwrap().id, "p1");
        assert_eq!(room(&s).id, "ABC123");
        assert!(!s.loading);
        assert_eq!(s.error, None);
        assert_eq!(room(&s).current_turn_start_time, None);
    }

    #[test]
    fn test_reduce_leaves_previous_snapshot_untouched() {
        let before = mid_round();
        let copy = before.clone();
        let _after = before.reduce(
            &server(ServerEvent::PlayerLost {
                player_id: "p1".into(),
            }),
            9_000,
        );
        assert_eq!(before, copy);
    }

    #[test]
    fn test_events_before_room_are_ignored() {
        let s = Snapshot::default().reduce(
            &server(ServerEvent::GameStarted {
                theme: "Animals".into(),
                active_player_id: "p1".into(),
                letters: letters(&["A"]),
            }),
            100,
        );
        assert_eq!(s.room, None);
    }

    #[test]
    fn test_game_started_resets_round_state() {
        let over = mid_round()
            .reduce(
                &server(ServerEvent::LetterSelected {
                    player_id: "p1".into(),
                    letter: "B".into(),
                }),
                3_500,
            )
            .reduce(
                &server(ServerEvent::PlayerLost {
                    player_id: "p1".into(),
                }),
                4_000,
            );
        assert!(room(&over).game_over);

        let s = over.reduce(
            &server(ServerEvent::GameStarted {
                theme: "Cities".into(),
                active_player_id: "p3".into(),
                letters: letters(&["D", "E"]),
            }),
            5_000,
        );
        let r = room(&s);
        assert_eq!(r.current_theme.as_deref(), Some("Cities"));
        assert_eq!(r.active_player_id.as_deref(), Some("p3"));
        assert_eq!(r.letters, letters(&["D", "E"]));
        assert!(r.used_letters.is_empty());
        assert_eq!(r.selected_letter, None);
        assert!(!r.game_over);
        assert_eq!(r.loser, None);
        assert_eq!(r.current_turn_start_time, Some(5_000));
    }

    #[test]
    fn test_letter_selected_sets_selection() {
        let s = mid_round().reduce(
            &server(ServerEvent::LetterSelected {
                player_id: "p1".into(),
                letter: "B".into(),
            }),
            3_200,
        );
        assert_eq!(room(&s).selected_letter.as_deref(), Some("B"));
    }

    #[test]
    fn test_letter_selected_rejects_used_letter() {
        let s = mid_round().reduce(
            &server(ServerEvent::LetterSelected {
                player_id: "p1".into(),
                letter: "A".into(),
            }),
            3_200,
        );
        assert_eq!(room(&s).selected_letter, None);
    }

    #[test]
    fn test_turn_changed_consumes_letter_and_reanchors() {
        let s = mid_round()
            .reduce(
                &server(ServerEvent::LetterSelected {
                    player_id: "p1".into(),
                    letter: "B".into(),
                }),
                3_200,
            )
            .reduce(
                &server(ServerEvent::TurnChanged {
                    previous_player_id: "p1".into(),
                    active_player_id: "p2".into(),
                    used_letter: "B".into(),
                }),
                4_100,
            );
        let r = room(&s);
        assert_eq!(r.used_letters, letters(&["A", "B"]));
        assert_eq!(r.selected_letter, None);
        assert_eq!(r.active_player_id.as_deref(), Some("p2"));
        assert_eq!(r.current_turn_start_time, Some(4_100));
    }

    #[test]
    fn test_forced_pass_keeps_used_letters() {
        let before = mid_round();
        let s = before.reduce(
            &server(ServerEvent::TurnChanged {
                previous_player_id: "p1".into(),
                active_player_id: "p2".into(),
                used_letter: String::new(),
            }),
            4_000,
        );
        assert_eq!(room(&s).used_letters, room(&before).used_letters);
        assert_eq!(room(&s).active_player_id.as_deref(), Some("p2"));
        assert_eq!(room(&s).current_turn_start_time, Some(4_000));
    }

    #[test]
    fn test_used_letters_stay_a_unique_subset() {
        let mut s = mid_round();
        let replays = ["A", "B", "B", "Z", "", "C", "C"];
        for (i, letter) in replays.iter().enumerate() {
            s = s.reduce(
                &server(ServerEvent::TurnChanged {
                    previous_player_id: "p1".into(),
                    active_player_id: "p2".into(),
                    used_letter: letter.to_string(),
                }),
                5_000 + i as i64,
            );
            let r = room(&s);
            assert!(r.used_letters.iter().all(|l| r.letters.contains(l)));
            let mut sorted = r.used_letters.clone();
            sorted.sort();
            sorted.dedup();
            assert_eq!(sorted.len(), r.used_letters.len());
        }
        assert_eq!(room(&s).used_letters, letters(&["A", "B", "C"]));
    }

    #[test]
    fn test_player_lost_marks_loser() {
        let s = mid_round().reduce(
            &server(ServerEvent::PlayerLost {
                player_id: "p2".into(),
            }),
            6_000,
        );
        assert!(room(&s).game_over);
        assert_eq!(room(&s).loser.as_deref(), Some("p2"));
    }

    #[test]
    fn test_game_complete_clears_loser_only_when_all_letters_used() {
        let lost = mid_round().reduce(
            &server(ServerEvent::PlayerLost {
                player_id: "p2".into(),
            }),
            6_000,
        );

        let kept = lost.reduce(
            &server(ServerEvent::GameComplete {
                all_letters_used: false,
            }),
            6_100,
        );
        assert!(room(&kept).game_over);
        assert_eq!(room(&kept).loser.as_deref(), Some("p2"));

        let cleared = lost.reduce(
            &server(ServerEvent::GameComplete {
                all_letters_used: true,
            }),
            6_100,
        );
        assert!(room(&cleared).game_over);
        assert_eq!(room(&cleared).loser, None);
    }

    #[test]
    fn test_player_joined_replaces_players_only() {
        let before = mid_round();
        let players = vec![
            Player::new("p1", "Ana", true),
            Player::new("p2", "Bruno", false),
            Player::new("p3", "Carla", false),
            Player::new("p4", "Davi", false),
        ];
        let s = before.reduce(
            &server(ServerEvent::PlayerJoined {
                player: Player::new("p4", "Davi", false),
                players: players.clone(),
            }),
            7_000,
        );
        assert_eq!(room(&s).players, players);
        assert_eq!(room(&s).letters, room(&before).letters);
        assert_eq!(s.player, before.player);
    }

    #[test]
    fn test_player_left_promotes_local_player() {
        let mut room = Room::new("ABC123", 10_000);
        room.players = vec![
            Player::new("p1", "Ana", true),
            Player::new("p2", "Bruno", false),
        ];
        let s = Snapshot::default()
            .reduce(
                &server(ServerEvent::RoomJoined {
                    player: Player::new("p2", "Bruno", false),
                    room,
                }),
                100,
            )
            .reduce(
                &server(ServerEvent::PlayerLeft {
                    player_id: "p1".into(),
                    players: vec![Player::new("p2", "Bruno", false)],
                    new_host_id: Some("p2".into()),
                }),
                200,
            );
        assert!(s.player.as_ref().unwrap().is_host);
        assert_eq!(s.room.as_ref().unwrap().players.len(), 1);
    }

    #[test]
    fn test_player_left_host_flag_follows_players_list() {
        // p3 becomes host; p2 only observes it through the list.
        let mut start = room(&joined()).clone();
        start.players[0].is_host = true;
        let s = Snapshot::default()
            .reduce(
                &server(ServerEvent::RoomJoined {
                    player: Player::new("p2", "Bruno", false),
                    room: start,
                }),
                100,
            )
            .reduce(
                &server(ServerEvent::PlayerLeft {
                    player_id: "p1".into(),
                    players: vec![
                        Player::new("p2", "Bruno", false),
                        Player::new("p3", "Carla", true),
                    ],
                    new_host_id: Some("p3".into()),
                }),
                300,
            );
        let r = room(&s);
        assert_eq!(r.host().map(|p| p.id.as_str()), Some("p3"));
        assert!(!s.player.as_ref().unwrap().is_host);
    }

    #[test]
    fn test_error_clears_loading_but_keeps_room() {
        let before = mid_round().begin_request();
        let s = before.reduce(
            &server(ServerEvent::Error {
                message: "Room not found".into(),
            }),
            8_000,
        );
        assert_eq!(s.error.as_deref(), Some("Room not found"));
        assert!(!s.loading);
        assert_eq!(s.room, before.room);
        assert_eq!(s.player, before.player);
    }

    #[test]
    fn test_connection_flags() {
        let s = Snapshot::default().reduce(&Inbound::Connected, 10);
        assert!(s.connected);
        let s = s.reduce(&Inbound::Disconnected, 20);
        assert!(!s.connected);
        assert_eq!(s.debug.as_ref().unwrap().text, "Socket disconnected");
    }

    #[test]
    fn test_joining_live_turn_anchors_locally() {
        let mut room = Room::new("ABC123", 10_000);
        room.players = vec![Player::new("p1", "Ana", true)];
        room.current_theme = Some("Animals".into());
        room.letters = letters(&["A", "B"]);
        room.active_player_id = Some("p1".into());
        room.current_turn_start_time = Some(1);

        let s = Snapshot::default().reduce(
            &server(ServerEvent::RoomJoined {
                player: Player::new("p2", "Bruno", false),
                room,
            }),
            42_000,
        );
        assert_eq!(s.room.unwrap().current_turn_start_time, Some(42_000));
    }

    #[test]
    fn test_debug_note_expires() {
        let s = Snapshot::default().reduce(&Inbound::Connected, 1_000);
        assert!(s.debug_note(1_000 + DEBUG_NOTE_TTL_MS - 1).is_some());
        assert!(s.debug_note(1_000 + DEBUG_NOTE_TTL_MS).is_none());
        assert!(s.without_debug().debug_note(1_000).is_none());
    }

    #[test]
    fn test_view_classification() {
        assert_eq!(Snapshot::default().view(false), RoomView::Loading);
        assert_eq!(Snapshot::default().begin_request().view(true), RoomView::Loading);
        assert_eq!(Snapshot::default().view(true), RoomView::Missing);
        assert_eq!(
            Snapshot::default().with_error("boom").view(true),
            RoomView::Failed("boom")
        );
        assert!(matches!(joined().view(true), RoomView::Ready { .. }));
    }
}

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio_util::codec::{Framed, LengthDelimitedCodec};

use crate::room::{Player, Room};

// -- Framing --

pub const MAX_FRAME_LENGTH: usize = 64 * 1024;

pub type Transport = Framed<TcpStream, LengthDelimitedCodec>;

pub fn framed_transport(stream: TcpStream) -> Transport {
    LengthDelimitedCodec::builder()
        .max_frame_length(MAX_FRAME_LENGTH)
        .new_framed(stream)
}

// -- Client -> Server Events --

/// Action requests. The server re-validates every one of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ClientEvent {
    CreateRoom { player_name: String },
    JoinRoom { room_id: String, player_name: String },
    StartGame { room_id: String, theme: String },
    SelectLetter { room_id: String, letter: String },
    PassTurn { room_id: String },
}

impl ClientEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::CreateRoom { .. } => "create-room",
            ClientEvent::JoinRoom { .. } => "join-room",
            ClientEvent::StartGame { .. } => "start-game",
            ClientEvent::SelectLetter { .. } => "select-letter",
            ClientEvent::PassTurn { .. } => "pass-turn",
        }
    }
}

// -- Server -> Client Events --

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    Error {
        message: String,
    },

    // Room membership
    RoomCreated {
        room_id: String,
        player: Player,
        room: Room,
    },
    RoomJoined {
        player: Player,
        room: Room,
    },
    PlayerJoined {
        player: Player,
        players: Vec<Player>,
    },
    PlayerLeft {
        player_id: String,
        players: Vec<Player>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        new_host_id: Option<String>,
    },

    // Round
    GameStarted {
        theme: String,
        active_player_id: String,
        letters: Vec<String>,
    },
    LetterSelected {
        player_id: String,
        letter: String,
    },
    /// An empty `used_letter` marks a forced pass (the player disconnected).
    TurnChanged {
        previous_player_id: String,
        active_player_id: String,
        #[serde(default)]
        used_letter: String,
    },
    PlayerLost {
        player_id: String,
    },
    GameComplete {
        all_letters_used: bool,
    },
}

impl ServerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::Error { .. } => "error",
            ServerEvent::RoomCreated { .. } => "room-created",
            ServerEvent::RoomJoined { .. } => "room-joined",
            ServerEvent::PlayerJoined { .. } => "player-joined",
            ServerEvent::PlayerLeft { .. } => "player-left",
            ServerEvent::GameStarted { .. } => "game-started",
            ServerEvent::LetterSelected { .. } => "letter-selected",
            ServerEvent::TurnChanged { .. } => "turn-changed",
            ServerEvent::PlayerLost { .. } => "player-lost",
            ServerEvent::GameComplete { .. } => "game-complete",
        }
    }
}

// -- Serialization helpers --

pub fn serialize_message<T: Serialize>(msg: &T) -> Result<Bytes, serde_json::Error> {
    let json = serde_json::to_vec(msg)?;
    Ok(Bytes::from(json))
}

pub fn deserialize_message<T: for<'de> Deserialize<'de>>(
    data: &[u8],
) -> Result<T, serde_json::Error> {
    serde_json::from_slice(data)
}

// -- Transport helpers --

pub async fn send_message<T: Serialize>(
    transport: &mut Transport,
    msg: &T,
) -> anyhow::Result<()> {
    let bytes = serialize_message(msg).map_err(|e| anyhow::anyhow!("serialize error: {}", e))?;
    transport
        .send(bytes)
        .await
        .map_err(|e| anyhow::anyhow!("send error: {}", e))
}

pub async fn recv_message<T: for<'de> Deserialize<'de>>(
    transport: &mut Transport,
) -> anyhow::Result<Option<T>> {
    match transport.next().await {
        Some(Ok(frame)) => {
            let msg = deserialize_message(&frame)
                .map_err(|e| anyhow::anyhow!("deserialize error: {}", e))?;
            Ok(Some(msg))
        }
        Some(Err(e)) => Err(anyhow::anyhow!("recv error: {}", e)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_event_wire_shape() {
        let event = ClientEvent::JoinRoom {
            room_id: "ABC123".into(),
            player_name: "Ana".into(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({
                "event": "join-room",
                "data": { "roomId": "ABC123", "playerName": "Ana" }
            })
        );
        assert_eq!(event.name(), "join-room");
    }

    #[test]
    fn test_pass_turn_wire_shape() {
        let event = ClientEvent::PassTurn {
            room_id: "ABC123".into(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "pass-turn");
        assert_eq!(value["data"]["roomId"], "ABC123");
    }

    #[test]
    fn test_room_created_from_server_json() {
        let frame = json!({
            "event": "room-created",
            "data": {
                "roomId": "ABC123",
                "player": { "id": "p1", "name": "Ana", "isHost": true },
                "room": {
                    "id": "ABC123",
                    "players": [{ "id": "p1", "name": "Ana", "isHost": true }],
                    "letters": [],
                    "usedLetters": [],
                    "timeLimit": 15000
                }
            }
        });
        let bytes = serde_json::to_vec(&frame).unwrap();
        let event: ServerEvent = deserialize_message(&bytes).unwrap();
        match event {
            ServerEvent::RoomCreated {
                room_id,
                player,
                room,
            } => {
                assert_eq!(room_id, "ABC123");
                assert_eq!(player.id, "p1");
                assert!(player.is_host);
                assert_eq!(room.players.len(), 1);
            }
            other => panic!("wrong variant: {:?}", other),
        }
    }

    #[test]
    fn test_player_left_without_new_host() {
        let frame = json!({
            "event": "player-left",
            "data": { "playerId": "p2", "players": [] }
        });
        let event: ServerEvent = serde_json::from_value(frame).unwrap();
        assert_eq!(
            event,
            ServerEvent::PlayerLeft {
                player_id: "p2".into(),
                players: vec![],
                new_host_id: None,
            }
        );
    }

    #[test]
    fn test_turn_changed_with_empty_letter() {
        let frame = json!({
            "event": "turn-changed",
            "data": { "previousPlayerId": "p1", "activePlayerId": "p2", "usedLetter": "" }
        });
        let event: ServerEvent = serde_json::from_value(frame).unwrap();
        match event {
            ServerEvent::TurnChanged { used_letter, .. } => assert!(used_letter.is_empty()),
            other => panic!("wrong variant: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_event_is_rejected() {
        let bytes = br#"{"event":"chat","data":{"message":"hi"}}"#;
        assert!(deserialize_message::<ServerEvent>(bytes).is_err());
    }

    #[test]
    fn test_all_server_events_serialize() {
        let room = Room::new("ABC123", 15_000);
        let player = Player::new("p1", "Ana", true);
        let events = vec![
            ServerEvent::Error {
                message: "Room not found".into(),
            },
            ServerEvent::RoomCreated {
                room_id: "ABC123".into(),
                player: player.clone(),
                room: room.clone(),
            },
            ServerEvent::RoomJoined {
                player: player.clone(),
                room,
            },
            ServerEvent::PlayerJoined {
                player: player.clone(),
                players: vec![player.clone()],
            },
            ServerEvent::PlayerLeft {
                player_id: "p2".into(),
                players: vec![player],
                new_host_id: Some("p1".into()),
            },
            ServerEvent::GameStarted {
                theme: "Animals".into(),
                active_player_id: "p1".into(),
                letters: vec!["A".into(), "B".into()],
            },
            ServerEvent::LetterSelected {
                player_id: "p1".into(),
                letter: "A".into(),
            },
            ServerEvent::TurnChanged {
                previous_player_id: "p1".into(),
                active_player_id: "p2".into(),
                used_letter: "A".into(),
            },
            ServerEvent::PlayerLost {
                player_id: "p2".into(),
            },
            ServerEvent::GameComplete {
                all_letters_used: true,
            },
        ];

        for event in &events {
            let bytes = serialize_message(event).unwrap();
            let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(value["event"], event.name());
            let back: ServerEvent = deserialize_message(&bytes).unwrap();
            assert_eq!(&back, event);
        }
    }
}

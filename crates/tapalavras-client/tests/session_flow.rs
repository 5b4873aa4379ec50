use std::time::Duration;

use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use tapalavras_client::network::Inbound;
use tapalavras_client::session::{RequestState, RoomEntry, Session};
use tapalavras_client::snapshot::RoomView;
use tapalavras_common::protocol::{framed_transport, recv_message, send_message, ServerEvent};
use tapalavras_common::room::{Player, Room};

const WAIT: Duration = Duration::from_secs(5);

async fn next_inbound(rx: &mut mpsc::Receiver<Inbound>) -> Inbound {
    tokio::time::timeout(WAIT, rx.recv())
        .await
        .expect("timed out waiting for inbound event")
        .expect("inbound channel closed")
}

fn lobby(host: &Player) -> Room {
    let mut room = Room::new("ABC123", 15_000);
    room.players = vec![host.clone()];
    room
}

#[tokio::test]
async fn test_create_room_round_trip() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    // Fake server: answer exactly one create-room, then report what else arrived
    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut transport = framed_transport(stream);

        let request: serde_json::Value = recv_message(&mut transport).await.unwrap().unwrap();
        assert_eq!(
            request,
            json!({ "event": "create-room", "data": { "playerName": "Ana" } })
        );

        let host = Player::new("p1", "Ana", true);
        send_message(
            &mut transport,
            &ServerEvent::RoomCreated {
                room_id: "ABC123".into(),
                player: host.clone(),
                room: lobby(&host),
            },
        )
        .await
        .unwrap();

        // Anything sent after this is a duplicate request
        let extra = tokio::time::timeout(
            Duration::from_millis(300),
            recv_message::<serde_json::Value>(&mut transport),
        )
        .await;
        extra.ok().and_then(|r| r.ok()).flatten()
    });

    let mut session = Session::new();
    let mut rx = session.connect(&addr).await.unwrap().unwrap();
    assert!(session.connect(&addr).await.unwrap().is_none());

    let entry = RoomEntry {
        room_code: "ZZZZZZ".into(),
        player_name: "Ana".into(),
        host: true,
    };
    session.enter_room(&entry).unwrap();
    session.enter_room(&entry).unwrap();
    assert_eq!(session.request_state(), RequestState::Pending);
    assert_eq!(session.view(), RoomView::Loading);

    loop {
        let inbound = next_inbound(&mut rx).await;
        session.apply(&inbound);
        if session.request_state() == RequestState::Done {
            break;
        }
    }

    assert!(session.snapshot().connected);
    match session.view() {
        RoomView::Ready { room, player } => {
            assert_eq!(room.id, "ABC123");
            assert_eq!(player.id, "p1");
            assert!(player.is_host);
        }
        other => panic!("expected a ready room, got {:?}", other),
    }

    // A late retry after the reply must stay silent too
    session.request_create_room("Ana").unwrap();

    let extra = server.await.unwrap();
    assert_eq!(extra, None);
}

#[tokio::test]
async fn test_server_error_fails_the_view() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut transport = framed_transport(stream);
        let _: Option<serde_json::Value> = recv_message(&mut transport).await.unwrap();
        send_message(
            &mut transport,
            &ServerEvent::Error {
                message: "Room not found".into(),
            },
        )
        .await
        .unwrap();
    });

    let mut session = Session::new();
    let mut rx = session.connect(&addr).await.unwrap().unwrap();
    session.request_join_room("NOPE00", "Bruno").unwrap();

    while session.request_state() != RequestState::Done {
        let inbound = next_inbound(&mut rx).await;
        session.apply(&inbound);
    }
    server.await.unwrap();

    assert_eq!(session.view(), RoomView::Failed("Room not found"));
    assert!(!session.snapshot().loading);
}

#[tokio::test]
async fn test_server_close_marks_disconnected() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        drop(stream);
    });

    let mut session = Session::new();
    let mut rx = session.connect(&addr).await.unwrap().unwrap();
    server.await.unwrap();

    loop {
        let inbound = next_inbound(&mut rx).await;
        session.apply(&inbound);
        if inbound == Inbound::Disconnected {
            break;
        }
    }
    assert!(!session.snapshot().connected);
}

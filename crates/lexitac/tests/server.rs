//! Integration tests for the Lexitac server, handler, and full connection flow.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use lexitac::prelude::*;
use tokio_tungstenite::tungstenite::Message;

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// 5×5 board, 3-letter words, full-alphabet palettes, and rotation slow
/// enough to stay out of the way.
fn quiet_config() -> GameConfig {
    GameConfig {
        grid_size: 5,
        word_size: 3,
        palette_size: 26,
        palette_rotation_interval: Duration::from_secs(3600),
        max_steals: 5,
        steal_cooldown: Duration::ZERO,
        prefill_chance: 0.0,
    }
}

/// Starts a server on a random port and returns the address and store.
async fn start_server(config: GameConfig) -> (String, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let server = LexitacServer::builder()
        .bind("127.0.0.1:0")
        .game_config(config)
        .join_timeout(Duration::from_millis(500))
        .build(Arc::new(WordList::new(["cat", "dog"])), store.clone())
        .await
        .expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(10)).await;
    (addr, store)
}

async fn connect(addr: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");
    ws
}

async fn send(ws: &mut ClientWs, msg: &ClientMessage) {
    let json = serde_json::to_string(msg).expect("encode");
    ws.send(Message::text(json)).await.expect("send");
}

/// Next server message, or `None` once the server closes the socket.
async fn recv(ws: &mut ClientWs) -> Option<ServerMessage> {
    let next = tokio::time::timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("timed out waiting for server");
    match next {
        Some(Ok(Message::Text(text))) => Some(serde_json::from_str(&text).expect("decode")),
        Some(Ok(Message::Close(_))) | None | Some(Err(_)) => None,
        Some(Ok(other)) => panic!("unexpected frame {other:?}"),
    }
}

/// Waits for the next message matching `pred`, skipping others.
async fn recv_until(ws: &mut ClientWs, pred: impl Fn(&ServerMessage) -> bool) -> ServerMessage {
    loop {
        let msg = recv(ws).await.expect("connection closed while waiting");
        if pred(&msg) {
            return msg;
        }
    }
}

/// Joins `room` and returns the player name the server assigned.
async fn join(ws: &mut ClientWs, room: &str) -> PlayerName {
    send(
        ws,
        &ClientMessage::JoinRoom {
            room_id: RoomId::from(room),
        },
    )
    .await;
    match recv(ws).await {
        Some(ServerMessage::Joined { player, .. }) => player,
        other => panic!("expected Joined, got {other:?}"),
    }
}

/// Two connected players in `room`, with `GameStarted` already consumed.
async fn start_game(addr: &str, room: &str) -> (ClientWs, PlayerName, ClientWs, PlayerName) {
    let mut ws1 = connect(addr).await;
    let p1 = join(&mut ws1, room).await;
    let mut ws2 = connect(addr).await;
    let p2 = join(&mut ws2, room).await;

    for ws in [&mut ws1, &mut ws2] {
        recv_until(ws, |m| matches!(m, ServerMessage::GameStarted { .. })).await;
    }
    (ws1, p1, ws2, p2)
}

fn place(x: usize, y: usize, letter: char) -> ClientMessage {
    ClientMessage::PlaceLetter { x, y, letter }
}

// =========================================================================
// Joining
// =========================================================================

#[tokio::test]
async fn test_first_message_must_be_join() {
    let (addr, _) = start_server(quiet_config()).await;
    let mut ws = connect(&addr).await;

    send(&mut ws, &ClientMessage::LeaveRoom).await;

    match recv(&mut ws).await {
        Some(ServerMessage::Error { code, .. }) => assert_eq!(code, 400),
        other => panic!("expected Error, got {other:?}"),
    }
    assert!(recv(&mut ws).await.is_none());
}

#[tokio::test]
async fn test_silent_connection_times_out() {
    let (addr, _) = start_server(quiet_config()).await;
    let mut ws = connect(&addr).await;

    match recv(&mut ws).await {
        Some(ServerMessage::Error { code, .. }) => assert_eq!(code, 408),
        other => panic!("expected Error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_player_name_is_connection_id() {
    let (addr, _) = start_server(quiet_config()).await;
    let mut ws = connect(&addr).await;

    let player = join(&mut ws, "lobby").await;
    assert!(player.as_str().starts_with("conn-"), "got {player}");
}

#[tokio::test]
async fn test_two_players_start_a_game() {
    let (addr, _) = start_server(quiet_config()).await;
    let mut ws1 = connect(&addr).await;
    let p1 = join(&mut ws1, "r1").await;
    let mut ws2 = connect(&addr).await;
    let p2 = join(&mut ws2, "r1").await;
    assert_ne!(p1, p2);

    for ws in [&mut ws1, &mut ws2] {
        match recv(ws).await {
            Some(ServerMessage::GameStarted { game }) => {
                assert_eq!(game.grid.len(), 5);
                let names: Vec<_> = game.players.iter().map(|p| p.name.clone()).collect();
                assert_eq!(names, vec![p1.clone(), p2.clone()]);
            }
            other => panic!("expected GameStarted, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_third_player_is_refused() {
    let (addr, _) = start_server(quiet_config()).await;
    let (_ws1, _, _ws2, _) = start_game(&addr, "full").await;

    let mut ws3 = connect(&addr).await;
    send(
        &mut ws3,
        &ClientMessage::JoinRoom {
            room_id: RoomId::from("full"),
        },
    )
    .await;

    match recv(&mut ws3).await {
        Some(ServerMessage::Error { code, message }) => {
            assert_eq!(code, 409);
            assert!(message.contains("full"), "got {message}");
        }
        other => panic!("expected Error, got {other:?}"),
    }
    assert!(recv(&mut ws3).await.is_none());
}

// =========================================================================
// Playing
// =========================================================================

#[tokio::test]
async fn test_move_is_broadcast() {
    let (addr, _) = start_server(quiet_config()).await;
    let (mut ws1, _, mut ws2, _) = start_game(&addr, "r1").await;

    send(&mut ws1, &place(1, 2, 'q')).await;

    for ws in [&mut ws1, &mut ws2] {
        match recv(ws).await {
            Some(ServerMessage::GameStateSync { game }) => assert_eq!(game.grid[1][2], Some('Q')),
            other => panic!("expected GameStateSync, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_occupied_cell_is_rejected_for_mover_only() {
    let (addr, _) = start_server(quiet_config()).await;
    let (mut ws1, _, mut ws2, _) = start_game(&addr, "r1").await;

    send(&mut ws1, &place(0, 0, 'A')).await;
    recv_until(&mut ws2, |m| matches!(m, ServerMessage::GameStateSync { .. })).await;
    recv_until(&mut ws1, |m| matches!(m, ServerMessage::GameStateSync { .. })).await;

    send(&mut ws2, &place(0, 0, 'B')).await;
    match recv(&mut ws2).await {
        Some(ServerMessage::Rejected { reason }) => assert!(reason.contains("occupied"), "got {reason}"),
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn test_word_ends_game_and_is_persisted() {
    let (addr, store) = start_server(quiet_config()).await;
    let (mut ws1, _, mut ws2, p2) = start_game(&addr, "r1").await;

    send(&mut ws2, &place(3, 0, 'D')).await;
    send(&mut ws2, &place(3, 1, 'O')).await;
    send(&mut ws2, &place(3, 2, 'G')).await;

    for ws in [&mut ws1, &mut ws2] {
        let ended = recv_until(ws, |m| matches!(m, ServerMessage::GameEnded { .. })).await;
        assert_eq!(ended, ServerMessage::GameEnded { winner: p2.clone() });
    }

    // The record is written off the room's thread after the broadcast.
    tokio::time::timeout(Duration::from_secs(5), async {
        while store.is_empty() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("finished game should be saved");

    let games = store.games();
    assert_eq!(games.len(), 1);
    assert_eq!(games[0].winner, p2);
    assert_eq!(games[0].word.word, "dog");
}

#[tokio::test]
async fn test_steal_broadcasts_palettes() {
    let (addr, _) = start_server(quiet_config()).await;
    let (mut ws1, p1, mut ws2, p2) = start_game(&addr, "r1").await;

    send(&mut ws1, &ClientMessage::StealPalette { victim: p2.clone() }).await;

    let ServerMessage::PaletteSync { players } =
        recv_until(&mut ws2, |m| matches!(m, ServerMessage::PaletteSync { .. })).await
    else {
        unreachable!()
    };
    let thief = players.iter().find(|p| p.name == p1).unwrap();
    let victim = players.iter().find(|p| p.name == p2).unwrap();
    assert_eq!(thief.palette.len(), 52);
    assert!(victim.palette.is_empty());

    send(&mut ws2, &place(0, 0, 'A')).await;
    recv_until(&mut ws2, |m| matches!(m, ServerMessage::Rejected { .. })).await;
}

#[tokio::test]
async fn test_rotation_reaches_players() {
    let (addr, _) = start_server(GameConfig {
        palette_rotation_interval: Duration::from_millis(100),
        palette_size: 4,
        ..quiet_config()
    })
    .await;
    let (mut ws1, _, _ws2, _) = start_game(&addr, "r1").await;

    let ServerMessage::PaletteSync { players } =
        recv_until(&mut ws1, |m| matches!(m, ServerMessage::PaletteSync { .. })).await
    else {
        unreachable!()
    };
    assert!(players.iter().all(|p| p.palette.len() == 4));
}

#[tokio::test]
async fn test_malformed_message_keeps_connection_open() {
    let (addr, _) = start_server(quiet_config()).await;
    let (mut ws1, _, _ws2, _) = start_game(&addr, "r1").await;

    ws1.send(Message::text("{not json".to_string())).await.unwrap();
    match recv(&mut ws1).await {
        Some(ServerMessage::Error { code, .. }) => assert_eq!(code, 400),
        other => panic!("expected Error, got {other:?}"),
    }

    send(&mut ws1, &place(0, 0, '7')).await;
    match recv(&mut ws1).await {
        Some(ServerMessage::Error { code, .. }) => assert_eq!(code, 400),
        other => panic!("expected Error, got {other:?}"),
    }

    send(&mut ws1, &place(0, 0, 'A')).await;
    recv_until(&mut ws1, |m| matches!(m, ServerMessage::GameStateSync { .. })).await;
}

#[tokio::test]
async fn test_second_join_is_an_error() {
    let (addr, _) = start_server(quiet_config()).await;
    let mut ws = connect(&addr).await;
    join(&mut ws, "a").await;

    send(
        &mut ws,
        &ClientMessage::JoinRoom {
            room_id: RoomId::from("b"),
        },
    )
    .await;
    match recv(&mut ws).await {
        Some(ServerMessage::Error { code, .. }) => assert_eq!(code, 400),
        other => panic!("expected Error, got {other:?}"),
    }
}

// =========================================================================
// Leaving
// =========================================================================

#[tokio::test]
async fn test_disconnect_notifies_opponent() {
    let (addr, _) = start_server(quiet_config()).await;
    let (ws1, p1, mut ws2, _) = start_game(&addr, "r1").await;

    drop(ws1);

    let msg = recv_until(&mut ws2, |m| matches!(m, ServerMessage::PlayerDisconnected { .. })).await;
    assert_eq!(msg, ServerMessage::PlayerDisconnected { player: p1 });

    // Back in the lobby: moves are refused until someone else joins.
    send(&mut ws2, &place(0, 0, 'A')).await;
    match recv(&mut ws2).await {
        Some(ServerMessage::Rejected { reason }) => {
            assert!(reason.contains("IN_LOBBY"), "got {reason}")
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn test_leave_room_then_new_opponent_restarts_game() {
    let (addr, _) = start_server(quiet_config()).await;
    let (mut ws1, _, mut ws2, _) = start_game(&addr, "r1").await;

    send(&mut ws1, &ClientMessage::LeaveRoom).await;
    recv_until(&mut ws2, |m| matches!(m, ServerMessage::PlayerDisconnected { .. })).await;

    let mut ws3 = connect(&addr).await;
    join(&mut ws3, "r1").await;

    match recv_until(&mut ws2, |m| matches!(m, ServerMessage::GameStarted { .. })).await {
        ServerMessage::GameStarted { game } => {
            assert_eq!(game.players.len(), 2);
            assert!(game.grid.iter().flatten().all(Option::is_none));
        }
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn test_emptied_room_can_be_reused() {
    let (addr, _) = start_server(quiet_config()).await;
    let mut ws1 = connect(&addr).await;
    join(&mut ws1, "again").await;
    ws1.close(None).await.unwrap();
    drop(ws1);

    // The abandoned room is aborted and replaced on the next join.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let mut ws2 = connect(&addr).await;
    join(&mut ws2, "again").await;
    let mut ws3 = connect(&addr).await;
    join(&mut ws3, "again").await;

    recv_until(&mut ws2, |m| matches!(m, ServerMessage::GameStarted { .. })).await;
}

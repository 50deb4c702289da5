//! Per-connection handler: room join and message routing.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Receive `JoinRoom` → the connection id becomes the player name
//!   2. Seat the player in the room (created on first join)
//!   3. Loop: forward room broadcasts out, route moves and steals in
//!   4. On exit, a drop guard takes the player out of the room

use std::sync::Arc;

use lexitac_protocol::{ClientMessage, Codec, PlayerName, ProtocolError, RoomId, ServerMessage};
use lexitac_room::{PlayerSender, Rejection, RoomError, RoomHandle, RoomState, Verdict};
use lexitac_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::LexitacError;
use crate::server::ServerState;

/// Drop guard that takes a player out of their room when the handler
/// exits.
///
/// This ensures cleanup happens even if the handler panics. Since `Drop`
/// is synchronous, we spawn a fire-and-forget task for the leave.
struct SeatGuard<C: Codec> {
    room: RoomHandle,
    player: PlayerName,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Drop for SeatGuard<C> {
    fn drop(&mut self) {
        let room = self.room.clone();
        let player = self.player.clone();
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            if let Err(e) = state.registry.leave(&room, player.clone()).await {
                tracing::debug!(%player, error = %e, "leave on disconnect failed");
            }
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), LexitacError> {
    let conn_id = conn.id();
    let player = PlayerName::from(conn_id.to_string());
    tracing::debug!(%conn_id, peer = %conn.peer_addr(), "handling new connection");

    // --- Step 1: JoinRoom ---
    let room_id = await_join(&conn, &state).await?;

    // --- Step 2: Seat the player ---
    let (sender, mut outbound) = mpsc::unbounded_channel();
    let room = match seat_player(&state, &room_id, &player, sender).await? {
        Ok(room) => room,
        Err(reason) => {
            tracing::info!(%player, %room_id, %reason, "join refused");
            send_error(&conn, &state.codec, 409, &reason.to_string()).await?;
            let _ = conn.close().await;
            return Ok(());
        }
    };
    let _guard = SeatGuard {
        room: room.clone(),
        player: player.clone(),
        state: Arc::clone(&state),
    };

    // --- Step 3: Message loop ---
    loop {
        tokio::select! {
            incoming = conn.recv() => {
                let data = match incoming {
                    Ok(Some(data)) => data,
                    Ok(None) => {
                        tracing::info!(%player, "connection closed cleanly");
                        break;
                    }
                    Err(e) => {
                        tracing::debug!(%player, error = %e, "recv error");
                        break;
                    }
                };
                let keep_going = handle_client_message(&conn, &state, &room, &player, &data).await?;
                if !keep_going {
                    let _ = conn.close().await;
                    break;
                }
            }
            Some(msg) = outbound.recv() => {
                send_message(&conn, &state.codec, &msg).await?;
            }
        }
    }

    // _guard drops here → the player leaves the room.
    Ok(())
}

/// Waits for the first message, which must be `JoinRoom`.
async fn await_join<C: Codec>(
    conn: &WebSocketConnection,
    state: &Arc<ServerState<C>>,
) -> Result<RoomId, LexitacError> {
    let data = match tokio::time::timeout(state.join_timeout, conn.recv()).await {
        Ok(Ok(Some(data))) => data,
        Ok(Ok(None)) => {
            return Err(ProtocolError::InvalidMessage("connection closed before JoinRoom".into()).into());
        }
        Ok(Err(e)) => return Err(e.into()),
        Err(_) => {
            send_error(conn, &state.codec, 408, "timed out waiting for JoinRoom").await?;
            let _ = conn.close().await;
            return Err(ProtocolError::InvalidMessage("JoinRoom timed out".into()).into());
        }
    };

    let msg = state
        .codec
        .decode::<ClientMessage>(&data)
        .and_then(ClientMessage::normalized);

    match msg {
        Ok(ClientMessage::JoinRoom { room_id }) => Ok(room_id),
        Ok(_) => {
            send_error(conn, &state.codec, 400, "expected JoinRoom").await?;
            let _ = conn.close().await;
            Err(ProtocolError::InvalidMessage("first message must be JoinRoom".into()).into())
        }
        Err(e) => {
            send_error(conn, &state.codec, 400, &format!("invalid message: {e}")).await?;
            let _ = conn.close().await;
            Err(e.into())
        }
    }
}

/// Joins `player` to `room_id`, creating the room if needed.
///
/// A room that was aborted between lookup and join is replaced once.
/// Returns the rule that refused the join otherwise.
async fn seat_player<C: Codec>(
    state: &Arc<ServerState<C>>,
    room_id: &RoomId,
    player: &PlayerName,
    sender: PlayerSender,
) -> Result<Result<RoomHandle, Rejection>, LexitacError> {
    let mut retried = false;
    loop {
        let room = state.registry.get_or_create(room_id);
        let joined = room.join(player.clone(), sender.clone()).await;

        let stale = matches!(
            joined,
            Ok(Verdict::Rejected(Rejection::RoomClosed(RoomState::GameAborted)))
                | Err(RoomError::Unavailable(_))
        );
        if stale && !retried {
            state.registry.remove_room(&room);
            retried = true;
            continue;
        }

        return match joined {
            Ok(Verdict::Accepted(_)) => Ok(Ok(room)),
            Ok(Verdict::Rejected(reason)) => Ok(Err(reason)),
            Err(e) => Err(e.into()),
        };
    }
}

/// Handles one message from a seated player. Returns `false` when the
/// connection should close.
async fn handle_client_message<C: Codec>(
    conn: &WebSocketConnection,
    state: &Arc<ServerState<C>>,
    room: &RoomHandle,
    player: &PlayerName,
    data: &[u8],
) -> Result<bool, LexitacError> {
    let msg = match state
        .codec
        .decode::<ClientMessage>(data)
        .and_then(ClientMessage::normalized)
    {
        Ok(msg) => msg,
        Err(e) => {
            tracing::debug!(%player, error = %e, "failed to decode message");
            send_error(conn, &state.codec, 400, &format!("invalid message: {e}")).await?;
            return Ok(true);
        }
    };

    match msg {
        ClientMessage::PlaceLetter { x, y, letter } => {
            let result = room.place_letter(player.clone(), x, y, letter).await;
            answer(conn, &state.codec, result).await?;
        }
        ClientMessage::StealPalette { victim } => {
            let result = room.steal(player.clone(), victim).await;
            answer(conn, &state.codec, result).await?;
        }
        ClientMessage::JoinRoom { .. } => {
            send_error(conn, &state.codec, 400, "already in a room").await?;
        }
        ClientMessage::LeaveRoom => {
            tracing::info!(%player, room_id = %room.room_id(), "player asked to leave");
            return Ok(false);
        }
    }

    Ok(true)
}

/// Tells the player why their action was refused, if it was.
///
/// Accepted actions need no reply; the room's broadcast is the answer.
async fn answer<T>(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    result: Result<Verdict<T>, RoomError>,
) -> Result<(), LexitacError> {
    match result {
        Ok(Verdict::Accepted(_)) => Ok(()),
        Ok(Verdict::Rejected(reason)) => {
            let msg = ServerMessage::Rejected {
                reason: reason.to_string(),
            };
            send_message(conn, codec, &msg).await
        }
        Err(RoomError::Unavailable(room_id)) => Err(RoomError::Unavailable(room_id).into()),
        Err(e) => {
            tracing::warn!(error = %e, "room collaborator failed");
            send_error(conn, codec, 500, &e.to_string()).await
        }
    }
}

async fn send_message(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    msg: &ServerMessage,
) -> Result<(), LexitacError> {
    let bytes = codec.encode(msg)?;
    conn.send(&bytes).await?;
    Ok(())
}

/// Sends a `ServerMessage::Error` to the client.
async fn send_error(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    code: u16,
    message: &str,
) -> Result<(), LexitacError> {
    let msg = ServerMessage::Error {
        code,
        message: message.to_string(),
    };
    send_message(conn, codec, &msg).await
}

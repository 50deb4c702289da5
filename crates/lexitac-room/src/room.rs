//! Room actor: an isolated Tokio task that owns one game instance.
//!
//! Each room runs in its own task and talks to the outside world through
//! an mpsc channel. Every mutation of a room (joins, leaves, moves, steals
//! and rotation ticks) goes through that channel, so they are applied one
//! at a time, and rooms never wait on each other.

use std::collections::HashMap;
use std::sync::Arc;

use lexitac_protocol::{GameSnapshot, PlayerName, Recipient, RoomId, ServerMessage};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::dictionary::Dictionary;
use crate::game::Game;
use crate::player::Player;
use crate::rotation::{BackgroundTasks, TaskKind, spawn_rotation};
use crate::store::{FinishedGame, GameStore, StoreError};
use crate::words::WordMatch;
use crate::{GameConfig, RoomError, RoomState, Verdict};

/// Channel sender for delivering outbound messages to a player.
pub type PlayerSender = mpsc::UnboundedSender<ServerMessage>;

/// Commands sent to a room actor through its channel.
///
/// The `oneshot::Sender` in most variants is the reply channel: the caller
/// sends a command and waits for the answer on it.
pub(crate) enum RoomCommand {
    Join {
        player: PlayerName,
        sender: PlayerSender,
        reply: oneshot::Sender<Verdict<Player>>,
    },

    Leave {
        player: PlayerName,
        reply: oneshot::Sender<Departure>,
    },

    PlaceLetter {
        player: PlayerName,
        x: usize,
        y: usize,
        letter: char,
        reply: oneshot::Sender<Result<Verdict<MoveOutcome>, RoomError>>,
    },

    Steal {
        thief: PlayerName,
        victim: PlayerName,
        reply: oneshot::Sender<Verdict<()>>,
    },

    /// Sent by the rotation task of run `epoch`. The reply tells the task
    /// whether to keep going.
    RotatePalettes {
        epoch: u64,
        reply: oneshot::Sender<bool>,
    },

    Snapshot {
        reply: oneshot::Sender<GameSnapshot>,
    },

    GetInfo {
        reply: oneshot::Sender<RoomInfo>,
    },

    Shutdown,
}

/// What an accepted move led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The letter is on the board and the game goes on.
    Placed,
    /// The letter completed a word and ended the game.
    Won(WordMatch),
}

/// Result of a leave request.
#[derive(Debug, Clone)]
pub struct Departure {
    /// The removed player, or `None` if the name wasn't in the room.
    pub player: Option<Player>,
    /// The room's state after the departure.
    pub state: RoomState,
}

/// A snapshot of room metadata (not the game itself).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub room_id: RoomId,
    pub state: RoomState,
    pub player_count: usize,
}

/// Handle to a running room actor. Used to send commands to it.
///
/// Cheap to clone: it's an `mpsc::Sender` wrapper. The registry holds one
/// per room.
#[derive(Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Seats `player`; room messages for them go to `sender`.
    pub async fn join(&self, player: PlayerName, sender: PlayerSender) -> Result<Verdict<Player>, RoomError> {
        self.request(|reply| RoomCommand::Join {
            player,
            sender,
            reply,
        })
        .await
    }

    /// Removes `player`. Leaving twice is harmless.
    pub async fn leave(&self, player: PlayerName) -> Result<Departure, RoomError> {
        self.request(|reply| RoomCommand::Leave { player, reply }).await
    }

    /// Places a letter.
    ///
    /// # Errors
    /// [`RoomError::Dictionary`] or [`RoomError::Persistence`] when a
    /// collaborator fails after the letter was placed. The letter stays.
    pub async fn place_letter(
        &self,
        player: PlayerName,
        x: usize,
        y: usize,
        letter: char,
    ) -> Result<Verdict<MoveOutcome>, RoomError> {
        self.request(|reply| RoomCommand::PlaceLetter {
            player,
            x,
            y,
            letter,
            reply,
        })
        .await?
    }

    pub async fn steal(&self, thief: PlayerName, victim: PlayerName) -> Result<Verdict<()>, RoomError> {
        self.request(|reply| RoomCommand::Steal {
            thief,
            victim,
            reply,
        })
        .await
    }

    pub async fn snapshot(&self) -> Result<GameSnapshot, RoomError> {
        self.request(|reply| RoomCommand::Snapshot { reply }).await
    }

    pub async fn get_info(&self) -> Result<RoomInfo, RoomError> {
        self.request(|reply| RoomCommand::GetInfo { reply }).await
    }

    /// Tells the room to stop. Background tasks are cancelled with it.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }

    /// `true` once the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Whether both handles talk to the same actor.
    pub fn same_room(&self, other: &RoomHandle) -> bool {
        self.sender.same_channel(&other.sender)
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> RoomCommand,
    ) -> Result<T, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(command(reply_tx))
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    room_id: RoomId,
    game: Game,
    /// Per-player outbound channels.
    senders: HashMap<PlayerName, PlayerSender>,
    dictionary: Arc<dyn Dictionary>,
    store: Arc<dyn GameStore>,
    tasks: BackgroundTasks,
    /// Bumped every time a rotation run starts.
    rotation_epoch: u64,
    /// Handed to background tasks so they can reach the actor without
    /// keeping it alive.
    commands: mpsc::WeakSender<RoomCommand>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    /// Runs the actor loop until shutdown, until every handle is gone, or
    /// until the game is aborted.
    async fn run(mut self) {
        info!(room_id = %self.room_id, "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    player,
                    sender,
                    reply,
                } => {
                    let verdict = self.handle_join(player, sender);
                    let _ = reply.send(verdict);
                }
                RoomCommand::Leave { player, reply } => {
                    let departure = self.handle_leave(player);
                    let _ = reply.send(departure);
                }
                RoomCommand::PlaceLetter {
                    player,
                    x,
                    y,
                    letter,
                    reply,
                } => {
                    let result = self.handle_place(player, x, y, letter).await;
                    let _ = reply.send(result);
                }
                RoomCommand::Steal {
                    thief,
                    victim,
                    reply,
                } => {
                    let verdict = self.handle_steal(thief, victim);
                    let _ = reply.send(verdict);
                }
                RoomCommand::RotatePalettes { epoch, reply } => {
                    let rotated = self.handle_rotation(epoch);
                    let _ = reply.send(rotated);
                }
                RoomCommand::Snapshot { reply } => {
                    let _ = reply.send(self.game.snapshot());
                }
                RoomCommand::GetInfo { reply } => {
                    let _ = reply.send(self.info());
                }
                RoomCommand::Shutdown => {
                    info!(room_id = %self.room_id, "room shutting down");
                    break;
                }
            }

            self.sync_tasks();

            if self.game.state() == RoomState::GameAborted {
                info!(room_id = %self.room_id, "game aborted");
                break;
            }
        }

        self.tasks.cancel_all();
        info!(room_id = %self.room_id, "room actor stopped");
    }

    fn handle_join(&mut self, player: PlayerName, sender: PlayerSender) -> Verdict<Player> {
        let joined = match self.game.join(player.clone()) {
            Ok(joined) => joined,
            Err(reason) => {
                debug!(room_id = %self.room_id, %player, %reason, "join rejected");
                return Verdict::Rejected(reason);
            }
        };

        self.senders.insert(player.clone(), sender);
        info!(
            room_id = %self.room_id,
            %player,
            players = self.game.players().len(),
            "player joined"
        );

        self.dispatch(
            Recipient::Player(player.clone()),
            ServerMessage::Joined {
                player,
                palette: joined.palette().to_vec(),
            },
        );

        if self.game.state() == RoomState::GameInProgress {
            info!(room_id = %self.room_id, "game started");
            self.dispatch(
                Recipient::All,
                ServerMessage::GameStarted {
                    game: self.game.snapshot(),
                },
            );
        }

        Verdict::Accepted(joined)
    }

    fn handle_leave(&mut self, player: PlayerName) -> Departure {
        let left = self.game.leave(&player);
        self.senders.remove(&player);

        if left.is_some() {
            info!(
                room_id = %self.room_id,
                %player,
                players = self.game.players().len(),
                state = %self.game.state(),
                "player left"
            );
            self.dispatch(
                Recipient::AllExcept(player.clone()),
                ServerMessage::PlayerDisconnected { player },
            );
        }

        Departure {
            player: left,
            state: self.game.state(),
        }
    }

    async fn handle_place(
        &mut self,
        player: PlayerName,
        x: usize,
        y: usize,
        letter: char,
    ) -> Result<Verdict<MoveOutcome>, RoomError> {
        let placed = self
            .game
            .ensure_in_progress()
            .and_then(|()| self.game.apply_move(x, y, &player, letter));
        if let Err(reason) = placed {
            debug!(room_id = %self.room_id, %player, %reason, "move rejected");
            return Ok(Verdict::Rejected(reason));
        }

        self.dispatch(
            Recipient::All,
            ServerMessage::GameStateSync {
                game: self.game.snapshot(),
            },
        );

        let finished = self
            .game
            .check_finished(self.dictionary.as_ref())
            .inspect_err(|e| warn!(room_id = %self.room_id, error = %e, "word lookup failed"))?;
        let word = match self.game.winning_word() {
            Some(word) if finished => word.clone(),
            _ => return Ok(Verdict::Accepted(MoveOutcome::Placed)),
        };

        info!(room_id = %self.room_id, winner = %player, %word, "game ended");
        self.dispatch(
            Recipient::All,
            ServerMessage::GameEnded {
                winner: player.clone(),
            },
        );
        self.sync_tasks();

        let record = FinishedGame {
            room_id: self.room_id.clone(),
            grid: self.game.grid().to_rows(),
            players: self.game.player_views(),
            winner: player,
            word: word.clone(),
        };
        self.persist(record)
            .await
            .inspect_err(|e| warn!(room_id = %self.room_id, error = %e, "failed to save finished game"))?;

        Ok(Verdict::Accepted(MoveOutcome::Won(word)))
    }

    /// Saves on the blocking pool so a slow disk never parks the runtime
    /// thread other rooms are scheduled on.
    async fn persist(&self, record: FinishedGame) -> Result<(), StoreError> {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || store.save(&record))
            .await
            .map_err(|e| StoreError::Unavailable(format!("store task failed: {e}")))?
    }

    fn handle_steal(&mut self, thief: PlayerName, victim: PlayerName) -> Verdict<()> {
        let stolen = self
            .game
            .ensure_in_progress()
            .and_then(|()| self.game.steal(&thief, &victim));
        if let Err(reason) = stolen {
            debug!(room_id = %self.room_id, %thief, %victim, %reason, "steal rejected");
            return Verdict::Rejected(reason);
        }

        self.broadcast_palettes();
        Verdict::Accepted(())
    }

    fn handle_rotation(&mut self, epoch: u64) -> bool {
        let current = epoch == self.rotation_epoch && self.tasks.is_running(TaskKind::PaletteRotation);
        if !current || !self.game.rotate_palettes() {
            debug!(room_id = %self.room_id, epoch, "stale rotation ignored");
            return false;
        }
        self.broadcast_palettes();
        true
    }

    /// Starts or cancels background tasks to match the game state.
    fn sync_tasks(&mut self) {
        match self.game.state() {
            RoomState::GameInProgress => {
                if !self.tasks.is_running(TaskKind::PaletteRotation) {
                    self.start_rotation();
                }
            }
            RoomState::InLobby => {
                if self.tasks.cancel(TaskKind::PaletteRotation) {
                    info!(room_id = %self.room_id, "palette rotation cancelled");
                }
            }
            RoomState::GameEnded | RoomState::GameAborted => self.tasks.cancel_all(),
        }
    }

    fn start_rotation(&mut self) {
        self.rotation_epoch += 1;
        let token = CancellationToken::new();
        let handle = spawn_rotation(
            self.room_id.clone(),
            self.rotation_epoch,
            self.game.config().palette_rotation_interval,
            self.commands.clone(),
            token.clone(),
        );
        self.tasks.insert(TaskKind::PaletteRotation, token, handle);
    }

    fn broadcast_palettes(&self) {
        self.dispatch(
            Recipient::All,
            ServerMessage::PaletteSync {
                players: self.game.player_views(),
            },
        );
    }

    /// Sends `msg` to every connected player covered by `recipient`.
    /// Silently drops messages for players whose receiver is gone.
    fn dispatch(&self, recipient: Recipient, msg: ServerMessage) {
        for (player, sender) in &self.senders {
            if recipient.includes(player) {
                let _ = sender.send(msg.clone());
            }
        }
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            room_id: self.room_id.clone(),
            state: self.game.state(),
            player_count: self.game.players().len(),
        }
    }
}

/// Spawns a new room actor with a fresh game and returns its handle.
///
/// `channel_size` bounds the command queue; senders wait when it's full.
pub(crate) fn spawn_room(
    room_id: RoomId,
    config: GameConfig,
    dictionary: Arc<dyn Dictionary>,
    store: Arc<dyn GameStore>,
    channel_size: usize,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = RoomActor {
        room_id: room_id.clone(),
        game: Game::new(config),
        senders: HashMap::new(),
        dictionary,
        store,
        tasks: BackgroundTasks::default(),
        rotation_epoch: 0,
        commands: tx.downgrade(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle { room_id, sender: tx }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::dictionary::WordList;
    use crate::store::MemoryStore;

    type Inbox = mpsc::UnboundedReceiver<ServerMessage>;

    /// Rotation slow enough that only explicit requests rotate.
    fn room() -> RoomHandle {
        let config = GameConfig {
            palette_rotation_interval: Duration::from_secs(3600),
            ..GameConfig::default()
        };
        spawn_room(
            RoomId::from("r"),
            config,
            Arc::new(WordList::new(["cat"])),
            Arc::new(MemoryStore::new()),
            8,
        )
    }

    async fn join(handle: &RoomHandle, player: &str) -> Inbox {
        let (tx, rx) = mpsc::unbounded_channel();
        let verdict = handle.join(PlayerName::from(player), tx).await.unwrap();
        assert!(verdict.is_accepted());
        rx
    }

    async fn rotate(handle: &RoomHandle, epoch: u64) -> bool {
        handle
            .request(|reply| RoomCommand::RotatePalettes { epoch, reply })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_rotation_from_an_earlier_run_is_refused() {
        let handle = room();
        let _rx1 = join(&handle, "p1").await;
        let mut rx2 = join(&handle, "p2").await;

        // The first run (epoch 1) ends with p1's departure; p3 starts the
        // second.
        handle.leave(PlayerName::from("p1")).await.unwrap();
        let _rx3 = join(&handle, "p3").await;
        while rx2.try_recv().is_ok() {}
        let before = handle.snapshot().await.unwrap().players;

        assert!(!rotate(&handle, 1).await);
        assert!(rx2.try_recv().is_err());
        assert_eq!(handle.snapshot().await.unwrap().players, before);

        assert!(rotate(&handle, 2).await);
        assert!(matches!(rx2.try_recv(), Ok(ServerMessage::PaletteSync { .. })));
    }

    #[tokio::test]
    async fn test_rotation_in_lobby_is_refused() {
        let handle = room();
        let mut rx1 = join(&handle, "p1").await;
        let _rx2 = join(&handle, "p2").await;
        handle.leave(PlayerName::from("p2")).await.unwrap();
        while rx1.try_recv().is_ok() {}

        assert!(!rotate(&handle, 1).await);
        assert!(rx1.try_recv().is_err());
    }
}

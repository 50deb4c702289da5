//! Room registry: maps room ids to running room actors.
//!
//! The registry is an ordinary value, not process-wide state, so a server
//! (or a test) can run several isolated registries side by side.

use std::sync::Arc;

use dashmap::DashMap;
use lexitac_protocol::{PlayerName, RoomId};
use tracing::info;

use crate::dictionary::Dictionary;
use crate::room::{Departure, RoomHandle, spawn_room};
use crate::store::GameStore;
use crate::{GameConfig, RoomError, RoomState};

/// Default command channel size for room actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Creates rooms on first use and forgets them once they are aborted.
///
/// Lookups for different ids never block each other. Creation of a given
/// id happens under that id's map entry, so simultaneous first joins still
/// get one room.
pub struct RoomRegistry {
    rooms: DashMap<RoomId, RoomHandle>,
    config: GameConfig,
    dictionary: Arc<dyn Dictionary>,
    store: Arc<dyn GameStore>,
    channel_size: usize,
}

impl RoomRegistry {
    /// Every room created by this registry uses `config`, `dictionary`
    /// and `store`.
    pub fn new(config: GameConfig, dictionary: Arc<dyn Dictionary>, store: Arc<dyn GameStore>) -> Self {
        Self {
            rooms: DashMap::new(),
            config: config.validated(),
            dictionary,
            store,
            channel_size: DEFAULT_CHANNEL_SIZE,
        }
    }

    /// Sets the command queue size of rooms created from now on.
    pub fn with_channel_size(mut self, channel_size: usize) -> Self {
        self.channel_size = channel_size.max(1);
        self
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Returns the room for `room_id`, starting a fresh lobby if there is
    /// none or if the previous actor has stopped.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn get_or_create(&self, room_id: &RoomId) -> RoomHandle {
        let mut entry = self
            .rooms
            .entry(room_id.clone())
            .or_insert_with(|| self.spawn(room_id));
        if entry.is_closed() {
            *entry = self.spawn(room_id);
        }
        entry.value().clone()
    }

    pub fn get(&self, room_id: &RoomId) -> Option<RoomHandle> {
        self.rooms.get(room_id).map(|entry| entry.value().clone())
    }

    /// Forgets a room. The actor keeps running until its handles are gone.
    pub fn remove(&self, room_id: &RoomId) -> Option<RoomHandle> {
        self.rooms.remove(room_id).map(|(_, handle)| handle)
    }

    /// Removes `handle`'s room only if the registry still maps its id to
    /// that same actor; a newer room under the same id is left alone.
    pub fn remove_room(&self, handle: &RoomHandle) -> bool {
        let removed = self
            .rooms
            .remove_if(handle.room_id(), |_, current| current.same_room(handle))
            .is_some();
        if removed {
            info!(room_id = %handle.room_id(), "room removed");
        }
        removed
    }

    /// Removes `player` from the room behind `handle`, and drops the room
    /// from the registry if that left it empty.
    pub async fn leave(&self, handle: &RoomHandle, player: PlayerName) -> Result<Departure, RoomError> {
        let departure = handle.leave(player).await?;
        if departure.state == RoomState::GameAborted {
            self.remove_room(handle);
        }
        Ok(departure)
    }

    /// Stops every room and empties the registry.
    pub async fn shutdown_all(&self) {
        let handles: Vec<RoomHandle> = self.rooms.iter().map(|entry| entry.value().clone()).collect();
        self.rooms.clear();
        for handle in handles {
            let _ = handle.shutdown().await;
        }
    }

    /// Number of rooms currently tracked.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.iter().map(|entry| entry.key().clone()).collect()
    }

    fn spawn(&self, room_id: &RoomId) -> RoomHandle {
        info!(%room_id, "room created");
        spawn_room(
            room_id.clone(),
            self.config.clone(),
            Arc::clone(&self.dictionary),
            Arc::clone(&self.store),
            self.channel_size,
        )
    }
}

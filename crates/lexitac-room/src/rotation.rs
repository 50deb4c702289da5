//! Background tasks owned by a room, and the palette rotation loop.
//!
//! A room owns at most one task per [`TaskKind`]. Each task gets its own
//! [`CancellationToken`]; the room cancels it on state changes and the
//! task stops at its next suspension point.
//!
//! The rotation task never touches the game directly. Each tick it asks
//! the room actor to rotate, so the rotation is serialized with joins,
//! moves and steals, and it is applied to every player at once or not at
//! all.

use std::collections::HashMap;
use std::time::Duration;

use lexitac_protocol::RoomId;
use lexitac_tick::{TickConfig, TickScheduler};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use crate::room::RoomCommand;

/// The kinds of background work a room can own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    PaletteRotation,
}

struct BackgroundTask {
    token: CancellationToken,
    // Kept so the task is owned by the room; never awaited.
    _handle: JoinHandle<()>,
}

/// The running background tasks of one room, keyed by kind.
///
/// Dropping the set cancels everything in it.
#[derive(Default)]
pub(crate) struct BackgroundTasks {
    tasks: HashMap<TaskKind, BackgroundTask>,
}

impl BackgroundTasks {
    /// Whether a task of `kind` is registered and not cancelled.
    pub(crate) fn is_running(&self, kind: TaskKind) -> bool {
        self.tasks.contains_key(&kind)
    }

    /// Registers a task, cancelling any previous one of the same kind.
    pub(crate) fn insert(&mut self, kind: TaskKind, token: CancellationToken, handle: JoinHandle<()>) {
        let task = BackgroundTask {
            token,
            _handle: handle,
        };
        if let Some(old) = self.tasks.insert(kind, task) {
            old.token.cancel();
        }
    }

    /// Cancels the task of `kind`. Returns `false` if there was none.
    pub(crate) fn cancel(&mut self, kind: TaskKind) -> bool {
        match self.tasks.remove(&kind) {
            Some(task) => {
                task.token.cancel();
                true
            }
            None => false,
        }
    }

    pub(crate) fn cancel_all(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.token.cancel();
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.tasks.len()
    }
}

impl Drop for BackgroundTasks {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

/// Spawns the rotation loop for one game run.
///
/// `epoch` identifies the run: the actor refuses rotations carrying an
/// older epoch, so a tick that was already queued when the run was
/// cancelled is dropped. The loop holds only a weak sender and ends on its
/// own once the room actor is gone.
pub(crate) fn spawn_rotation(
    room_id: RoomId,
    epoch: u64,
    period: Duration,
    commands: mpsc::WeakSender<RoomCommand>,
    token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut scheduler = TickScheduler::new(TickConfig::with_period(period));
        if scheduler.is_disabled() {
            debug!(%room_id, "palette rotation disabled");
            return;
        }
        info!(%room_id, epoch, period_secs = period.as_secs_f64(), "palette rotation started");

        while let Some(tick) = scheduler.wait_or_cancelled(&token).await {
            let Some(commands) = commands.upgrade() else {
                break;
            };
            let (reply, rotated) = oneshot::channel();
            if commands
                .send(RoomCommand::RotatePalettes { epoch, reply })
                .await
                .is_err()
            {
                break;
            }
            drop(commands);

            // Once the request is queued the rotation is the actor's call;
            // cancellation is only observed at the next wait.
            match rotated.await {
                Ok(true) => trace!(%room_id, tick = tick.tick, "palettes rotated"),
                _ => break,
            }
        }

        info!(%room_id, epoch, "palette rotation stopped");
    })
}

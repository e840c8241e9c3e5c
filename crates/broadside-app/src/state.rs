//! State shared between the runner and the game loop thread.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use broadside_core::commands::PlayerCommand;
use broadside_core::state::GameStateSnapshot;

use crate::error::AppError;

/// Commands sent to the game loop thread.
#[derive(Debug)]
pub enum GameLoopCommand {
    /// A player command to forward to the simulation engine.
    PlayerCommand(PlayerCommand),
    /// Shut down the game loop thread gracefully.
    Shutdown,
}

/// Latest snapshot published by the game loop.
pub type SharedSnapshot = Arc<Mutex<Option<GameStateSnapshot>>>;

/// Handle the runner uses to talk to a running game loop.
pub struct AppState {
    command_tx: mpsc::Sender<GameLoopCommand>,
    latest_snapshot: SharedSnapshot,
}

impl AppState {
    pub fn new(command_tx: mpsc::Sender<GameLoopCommand>, latest_snapshot: SharedSnapshot) -> Self {
        Self {
            command_tx,
            latest_snapshot,
        }
    }

    pub fn send(&self, command: PlayerCommand) -> Result<(), AppError> {
        self.command_tx
            .send(GameLoopCommand::PlayerCommand(command))
            .map_err(|_| AppError::LoopGone)
    }

    pub fn shutdown(&self) {
        // A loop that already exited has nothing to shut down.
        let _ = self.command_tx.send(GameLoopCommand::Shutdown);
    }

    /// Clone of the most recent snapshot, if any tick has run.
    pub fn snapshot(&self) -> Option<GameStateSnapshot> {
        self.latest_snapshot
            .lock()
            .ok()
            .and_then(|snapshot| snapshot.clone())
    }
}

//! Errors surfaced by the runner.

use std::path::PathBuf;

use thiserror::Error;

use broadside_core::error::GameError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to start the game loop thread: {0}")]
    Thread(std::io::Error),
    #[error("the game loop stopped unexpectedly")]
    LoopGone,
}

//! Error taxonomy shared by the simulation crates.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// A model could not be loaded. The requesting spawn slot is skipped.
    #[error("failed to load asset {path}: {reason}")]
    AssetLoadFailure { path: String, reason: String },

    /// The loader dropped its channel without answering.
    #[error("asset loader hung up before delivering {path}")]
    AssetChannelClosed { path: String },

    /// Malformed aim-side text.
    #[error("invalid aim direction: {0:?}")]
    InvalidDirection(String),

    #[error("configuration error: {0}")]
    Config(String),
}

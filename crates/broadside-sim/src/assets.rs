//! Model assets and the load-or-get-cached asset service.
//!
//! Loaders answer asynchronously on an `mpsc` channel. `AssetCache` keeps one
//! load per path in flight, hands the same `Arc<ModelAsset>` to every caller
//! once it arrives, and is polled each tick without blocking the simulation.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::task::Poll;

use serde::{Deserialize, Serialize};

use broadside_core::error::GameError;

/// One animation clip shipped with a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationClip {
    pub name: String,
    pub duration_secs: f32,
}

/// Loaded model data shared by every instance of the same path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelAsset {
    pub path: String,
    #[serde(default)]
    pub clips: Vec<AnimationClip>,
}

impl ModelAsset {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            clips: Vec::new(),
        }
    }

    pub fn with_clip(mut self, name: impl Into<String>, duration_secs: f32) -> Self {
        self.clips.push(AnimationClip {
            name: name.into(),
            duration_secs,
        });
        self
    }

    /// Real-time length of the death animation at unit playback rate, if the
    /// model has one. The first two clips play together and the first to
    /// finish ends the animation.
    pub fn death_animation_secs(&self) -> Option<f32> {
        self.clips
            .iter()
            .take(2)
            .map(|clip| clip.duration_secs.max(0.0))
            .reduce(f32::min)
    }
}

pub type LoadResult = Result<ModelAsset, GameError>;

/// Source of model data. Must support independent concurrent loads.
pub trait AssetLoader: Send {
    /// Start loading `path`. The result arrives on the returned channel.
    fn request(&mut self, path: &str) -> Receiver<LoadResult>;
}

/// In-memory loader that answers immediately. Unknown paths fail.
#[derive(Debug, Default, Clone)]
pub struct MemoryLoader {
    models: HashMap<String, ModelAsset>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: ModelAsset) -> Self {
        self.models.insert(model.path.clone(), model);
        self
    }
}

impl AssetLoader for MemoryLoader {
    fn request(&mut self, path: &str) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();
        let result = self
            .models
            .get(path)
            .cloned()
            .ok_or_else(|| GameError::AssetLoadFailure {
                path: path.to_string(),
                reason: "not found".to_string(),
            });
        // The receiver is alive until we return it.
        let _ = tx.send(result);
        rx
    }
}

enum Slot {
    Loading(Receiver<LoadResult>),
    Ready(Arc<ModelAsset>),
}

/// Load-or-get-cached asset service.
pub struct AssetCache {
    loader: Box<dyn AssetLoader>,
    slots: HashMap<String, Slot>,
    loads_started: u32,
}

impl AssetCache {
    pub fn new(loader: Box<dyn AssetLoader>) -> Self {
        Self {
            loader,
            slots: HashMap::new(),
            loads_started: 0,
        }
    }

    /// Poll the model at `path`, starting a load if none is cached or in flight.
    ///
    /// A failure is reported once and forgotten, so a later poll starts a fresh load.
    pub fn poll(&mut self, path: &str) -> Poll<Result<Arc<ModelAsset>, GameError>> {
        let loader = &mut self.loader;
        let loads_started = &mut self.loads_started;
        let slot = self.slots.entry(path.to_string()).or_insert_with(|| {
            *loads_started += 1;
            Slot::Loading(loader.request(path))
        });

        let outcome = match slot {
            Slot::Ready(asset) => return Poll::Ready(Ok(Arc::clone(asset))),
            Slot::Loading(rx) => match rx.try_recv() {
                Ok(Ok(asset)) => Ok(Arc::new(asset)),
                Ok(Err(err)) => Err(err),
                Err(TryRecvError::Empty) => return Poll::Pending,
                Err(TryRecvError::Disconnected) => Err(GameError::AssetChannelClosed {
                    path: path.to_string(),
                }),
            },
        };

        match outcome {
            Ok(asset) => {
                *slot = Slot::Ready(Arc::clone(&asset));
                Poll::Ready(Ok(asset))
            }
            Err(err) => {
                self.slots.remove(path);
                Poll::Ready(Err(err))
            }
        }
    }

    pub fn is_cached(&self, path: &str) -> bool {
        matches!(self.slots.get(path), Some(Slot::Ready(_)))
    }

    /// Number of loads handed to the loader so far.
    pub fn loads_started(&self) -> u32 {
        self.loads_started
    }
}

//! Model loading for the runner.
//!
//! A manifest lists each model path with its animation clips. Loads run on a
//! worker thread per request and answer on the channel the asset cache polls.
//! A load succeeds when the model file exists under the asset root.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::thread;

use log::debug;
use serde::{Deserialize, Serialize};

use broadside_core::constants::{CANNON_BALL_MODEL, ENEMY_SHIP_MODEL, PLAYER_SHIP_MODEL};
use broadside_core::error::GameError;
use broadside_sim::assets::{AssetLoader, LoadResult, MemoryLoader, ModelAsset};

use crate::error::AppError;

/// On-disk description of the models a run may load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetManifest {
    /// Directory model paths are relative to. Defaults to the manifest's directory.
    #[serde(default)]
    pub root: Option<PathBuf>,
    pub models: Vec<ModelAsset>,
}

impl AssetManifest {
    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let text = fs::read_to_string(path).map_err(|source| AppError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|err| {
            GameError::Config(format!("invalid manifest {}: {err}", path.display())).into()
        })
    }
}

pub struct ManifestLoader {
    root: PathBuf,
    models: HashMap<String, ModelAsset>,
}

impl ManifestLoader {
    pub fn new(root: PathBuf, manifest: AssetManifest) -> Self {
        let root = manifest.root.clone().unwrap_or(root);
        let models = manifest
            .models
            .into_iter()
            .map(|model| (model.path.clone(), model))
            .collect();
        Self { root, models }
    }

    /// Load the manifest at `path`, resolving model files next to it unless it names a root.
    pub fn from_manifest(path: &Path) -> Result<Self, AppError> {
        let manifest = AssetManifest::from_file(path)?;
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(Self::new(dir, manifest))
    }
}

impl AssetLoader for ManifestLoader {
    fn request(&mut self, path: &str) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();
        let entry = self.models.get(path).cloned();
        let file = self.root.join(path);
        let requested = path.to_string();
        let path = path.to_string();
        let fallback = tx.clone();

        let spawned = thread::Builder::new()
            .name("broadside-asset-load".into())
            .spawn(move || {
                let result = match entry {
                    None => Err(GameError::AssetLoadFailure {
                        path,
                        reason: "not listed in the asset manifest".to_string(),
                    }),
                    Some(model) => match fs::metadata(&file) {
                        Ok(_) => {
                            debug!("loaded {}", file.display());
                            Ok(model)
                        }
                        Err(err) => Err(GameError::AssetLoadFailure {
                            path,
                            reason: err.to_string(),
                        }),
                    },
                };
                let _ = tx.send(result);
            });

        if let Err(err) = spawned {
            let _ = fallback.send(Err(GameError::AssetLoadFailure {
                path: requested,
                reason: err.to_string(),
            }));
        }
        rx
    }
}

/// Models used when no manifest is given. The enemy ship carries the two
/// sinking clips its death animation plays.
pub fn builtin_loader() -> MemoryLoader {
    MemoryLoader::new()
        .with_model(
            ModelAsset::new(ENEMY_SHIP_MODEL)
                .with_clip("Sink", 2.0)
                .with_clip("Capsize", 2.5),
        )
        .with_model(ModelAsset::new(PLAYER_SHIP_MODEL))
        .with_model(ModelAsset::new(CANNON_BALL_MODEL))
}

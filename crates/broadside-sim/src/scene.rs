//! Scene graph boundary and the stage that pairs it with the asset cache.

use std::collections::HashMap;
use std::sync::Arc;
use std::task::Poll;

use glam::Vec3;

use broadside_core::error::GameError;
use broadside_core::types::{ProxyId, Transform};

use crate::assets::{AssetCache, AssetLoader, ModelAsset};

/// Renderer-side scene graph. Proxies are created, moved, and removed by id.
pub trait SceneGraph: Send {
    fn add(&mut self, proxy: ProxyId, model: &Arc<ModelAsset>, transform: &Transform);
    fn update(&mut self, proxy: ProxyId, transform: &Transform);
    fn remove(&mut self, proxy: ProxyId);
    fn world_position(&self, proxy: ProxyId) -> Option<Vec3>;
    /// Number of proxies currently in the scene.
    fn proxy_count(&self) -> usize;
}

/// A proxy held by `HeadlessScene`.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub model: Arc<ModelAsset>,
    pub transform: Transform,
}

/// In-memory scene graph with no rendering.
#[derive(Debug, Default)]
pub struct HeadlessScene {
    nodes: HashMap<ProxyId, SceneNode>,
}

impl HeadlessScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, proxy: ProxyId) -> Option<&SceneNode> {
        self.nodes.get(&proxy)
    }
}

impl SceneGraph for HeadlessScene {
    fn add(&mut self, proxy: ProxyId, model: &Arc<ModelAsset>, transform: &Transform) {
        self.nodes.insert(
            proxy,
            SceneNode {
                model: Arc::clone(model),
                transform: *transform,
            },
        );
    }

    fn update(&mut self, proxy: ProxyId, transform: &Transform) {
        if let Some(node) = self.nodes.get_mut(&proxy) {
            node.transform = *transform;
        }
    }

    fn remove(&mut self, proxy: ProxyId) {
        self.nodes.remove(&proxy);
    }

    fn world_position(&self, proxy: ProxyId) -> Option<Vec3> {
        self.nodes.get(&proxy).map(|node| node.transform.position)
    }

    fn proxy_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Scene graph plus asset cache: everything needed to put a model on screen.
pub struct Stage {
    scene: Box<dyn SceneGraph>,
    assets: AssetCache,
    next_proxy: u64,
}

impl Stage {
    pub fn new(scene: Box<dyn SceneGraph>, loader: Box<dyn AssetLoader>) -> Self {
        Self {
            scene,
            assets: AssetCache::new(loader),
            next_proxy: 0,
        }
    }

    pub fn poll_model(&mut self, path: &str) -> Poll<Result<Arc<ModelAsset>, GameError>> {
        self.assets.poll(path)
    }

    /// Create a new proxy of a loaded model.
    pub fn instantiate(&mut self, model: &Arc<ModelAsset>, transform: &Transform) -> ProxyId {
        let proxy = ProxyId(self.next_proxy);
        self.next_proxy += 1;
        self.scene.add(proxy, model, transform);
        proxy
    }

    pub fn sync(&mut self, proxy: ProxyId, transform: &Transform) {
        self.scene.update(proxy, transform);
    }

    pub fn release(&mut self, proxy: ProxyId) {
        self.scene.remove(proxy);
    }

    /// Where the scene graph reports a proxy, after any parenting it applies.
    pub fn world_position(&self, proxy: ProxyId) -> Option<Vec3> {
        self.scene.world_position(proxy)
    }

    pub fn scene(&self) -> &dyn SceneGraph {
        self.scene.as_ref()
    }

    pub fn assets(&self) -> &AssetCache {
        &self.assets
    }
}

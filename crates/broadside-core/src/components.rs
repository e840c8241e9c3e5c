//! ECS components for hecs entities.
//!
//! Components are plain data. Behavior lives in the FSM and the systems,
//! apart from small invariant-keeping helpers on `Health`.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::constants::MAX_HEALTH;
use crate::types::{ProxyId, ShipId};

/// Marks an entity as an enemy ship and carries its stable id.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EnemyShip {
    pub id: ShipId,
}

/// Hit points. Starts at `MAX_HEALTH` and only ever decreases.
/// May drop below zero before the owner notices and starts dying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub current: i32,
}

impl Default for Health {
    fn default() -> Self {
        Self {
            current: MAX_HEALTH,
        }
    }
}

impl Health {
    /// Subtract `amount` (negative amounts are ignored) and return the new value.
    pub fn damage(&mut self, amount: i32) -> i32 {
        self.current -= amount.max(0);
        self.current
    }

    pub fn is_depleted(&self) -> bool {
        self.current <= 0
    }

    /// Remaining health in [0, 1] for health bars.
    pub fn fraction(&self) -> f32 {
        (self.current.max(0) as f32 / MAX_HEALTH as f32).min(1.0)
    }
}

/// Wander destination. `None` until the FSM samples one.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Navigation {
    pub destination: Option<Vec3>,
}

/// Seconds accumulated toward the next shot while in standoff range.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FireControl {
    pub since_last_shot: f32,
}

/// Eased translation applied after a collision.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PushBack {
    /// Total displacement over the whole ease. `y` is always zero.
    pub offset: Vec3,
    pub elapsed_secs: f32,
    pub duration_secs: f32,
}

/// Death animation playback. The entity leaves the fleet when `remaining_secs` hits zero.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeathAnimation {
    pub remaining_secs: f32,
}

/// Scene proxy of an entity whose model has finished loading.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Visual {
    pub proxy: ProxyId,
}

/// A spawn slot still waiting for its model to load.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PendingModel;

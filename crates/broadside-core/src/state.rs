//! Game state snapshot: the complete visible state sent to the frontend each tick.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::{AudioEvent, UiEvent};
use crate::types::{ShipId, SimTime};

/// Complete game state broadcast to the frontend after each tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    pub time: SimTime,
    pub phase: GamePhase,
    pub player: PlayerView,
    pub ships: Vec<ShipView>,
    pub projectiles: Vec<ProjectileView>,
    /// Whether the lead enemy sits in the middle of the camera view.
    pub crosshair_on_target: bool,
    pub audio_events: Vec<AudioEvent>,
    pub ui_events: Vec<UiEvent>,
}

/// Player ship and combat controller state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerView {
    pub position: Vec3,
    pub yaw: f32,
    pub health: i32,
    /// Health as a percentage for the health bar (clamped to 0..=100).
    pub health_percent: f32,
    pub model_loaded: bool,
    pub camera_mode: CameraMode,
    /// Regenerated aim preview polyline in world space (empty when not aiming).
    pub aim_preview: Vec<Vec3>,
}

/// An enemy ship on the display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipView {
    pub id: ShipId,
    /// `None` while the model is still loading.
    pub position: Option<Vec3>,
    pub rotation: Option<Quat>,
    pub behavior: ShipBehavior,
    pub health: i32,
    /// Health bar fill in [0, 1].
    pub health_fraction: f32,
}

/// A cannon ball in flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileView {
    pub shooter: Shooter,
    pub position: Vec3,
    /// Fraction of the flight completed, in [0, 1].
    pub progress: f32,
}

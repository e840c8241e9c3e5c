//! Events emitted by the simulation for audio and UI feedback.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::enums::Shooter;
use crate::types::ShipId;

/// Audio events for the frontend sound system. Fire-and-forget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AudioEvent {
    /// A cannon was fired.
    CannonFire { shooter: Shooter, position: Vec3 },
    /// A cannon ball struck something.
    Explosion { position: Vec3 },
}

impl AudioEvent {
    /// Sound file to play.
    pub fn path(&self) -> &'static str {
        match self {
            AudioEvent::CannonFire { .. } => CANNON_FIRE_SOUND,
            AudioEvent::Explosion { .. } => EXPLOSION_SOUND,
        }
    }

    pub fn volume(&self) -> f32 {
        match self {
            AudioEvent::CannonFire { .. } => CANNON_FIRE_VOLUME,
            AudioEvent::Explosion { .. } => EXPLOSION_VOLUME,
        }
    }
}

/// One-shot notifications for the player-facing UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UiEvent {
    /// Player health reached zero.
    GameOver,
    /// Every enemy ship has been sunk.
    Victory,
    /// An enemy ship started sinking.
    ShipSunk { id: ShipId },
}

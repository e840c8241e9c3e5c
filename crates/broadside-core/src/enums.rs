//! Enumeration types used throughout the simulation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::types::ShipId;

/// Enemy behavior state. Transitions only move forward:
/// Wandering -> Hostile -> Dying, or Wandering -> Dying.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShipBehavior {
    /// Roams between random destinations, never fires.
    #[default]
    Wandering,
    /// Closes on the player, holds standoff range and fires.
    Hostile,
    /// Health exhausted; waiting for the death animation to finish.
    Dying,
}

impl ShipBehavior {
    pub fn is_hostile(self) -> bool {
        self == ShipBehavior::Hostile
    }

    pub fn is_dying(self) -> bool {
        self == ShipBehavior::Dying
    }
}

/// Which broadside the player is aiming from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AimSide {
    Left,
    Right,
}

impl FromStr for AimSide {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(AimSide::Left),
            "right" => Ok(AimSide::Right),
            other => Err(GameError::InvalidDirection(other.to_string())),
        }
    }
}

impl TryFrom<String> for AimSide {
    type Error = GameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AimSide> for String {
    fn from(side: AimSide) -> Self {
        side.to_string()
    }
}

impl fmt::Display for AimSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AimSide::Left => f.write_str("left"),
            AimSide::Right => f.write_str("right"),
        }
    }
}

/// Camera/aim pose of the player combat controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraMode {
    #[default]
    Default,
    Attacking(AimSide),
}

/// Who fired a projectile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shooter {
    Player,
    Ship(ShipId),
}

/// Helm keys of the player ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HelmKey {
    /// W: sail forward.
    Forward,
    /// A: turn to port.
    TurnLeft,
    /// D: turn to starboard.
    TurnRight,
    /// Shift: double speed.
    Boost,
}

/// Game phase (top-level state).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    MainMenu,
    Active,
    Paused,
    GameOver,
    Victory,
}

impl GamePhase {
    /// Whether the mission has ended (no further simulation).
    pub fn is_finished(self) -> bool {
        matches!(self, GamePhase::GameOver | GamePhase::Victory)
    }
}

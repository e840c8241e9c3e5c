//! Player commands sent from the frontend to the simulation.
//!
//! Commands are queued and processed at the next tick boundary.

use serde::{Deserialize, Serialize};

use crate::enums::HelmKey;

/// All possible player actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    // --- Helm ---
    /// A helm key went down or up.
    Helm { key: HelmKey, pressed: bool },

    // --- Camera / aim ---
    /// Pointer movement in pixels while the pointer is locked.
    Look { dx: f32, dy: f32 },
    /// Pointer lock acquired or released.
    PointerLock { locked: bool },
    /// Right button down: enter the attack pose.
    AimPressed,
    /// Right button up: return to the default pose.
    AimReleased,
    /// Left button down: fire along the aim curve (only while attacking).
    Fire,

    // --- Simulation control ---
    /// Set time scale (1.0 = normal, 2.0 = double, 0.0 = paused).
    SetTimeScale { scale: f64 },
    /// Start a new mission.
    StartMission,
    /// Pause the simulation.
    Pause,
    /// Resume the simulation.
    Resume,
}

//! Player combat controller: camera look, attack mode, aiming, and firing.
//!
//! The camera rides on the player ship. Its yaw (azimuth) and pitch are kept
//! relative to the ship and constrained to a window that depends on the camera
//! mode. In attack mode an `AimCurve` follows the camera and firing launches a
//! broadside along it.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::{EulerRot, Mat4, Quat, Vec3, Vec4Swizzles};
use log::debug;

use broadside_core::constants::*;
use broadside_core::enums::{AimSide, CameraMode};
use broadside_core::types::Transform;

use crate::aim_curve::AimCurve;

const CAMERA_NEAR: f32 = 0.1;
const CAMERA_FAR: f32 = 1000.0;

/// Allowed camera azimuths for a camera mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AzimuthWindow {
    Range { min: f32, max: f32 },
    /// `[edge, π] ∪ [-π, -edge]`, straddling the ±π seam.
    Split { edge: f32 },
}

impl AzimuthWindow {
    pub fn for_mode(mode: CameraMode) -> Self {
        match mode {
            CameraMode::Default => AzimuthWindow::Range {
                min: DEFAULT_AZIMUTH_MIN,
                max: DEFAULT_AZIMUTH_MAX,
            },
            CameraMode::Attacking(AimSide::Left) => AzimuthWindow::Split {
                edge: LEFT_AZIMUTH_EDGE,
            },
            CameraMode::Attacking(AimSide::Right) => AzimuthWindow::Range {
                min: -RIGHT_AZIMUTH_HALF_WIDTH,
                max: RIGHT_AZIMUTH_HALF_WIDTH,
            },
        }
    }

    pub fn is_split(self) -> bool {
        matches!(self, AzimuthWindow::Split { .. })
    }

    /// Bring `azimuth` (in [-π, π]) into the window.
    pub fn constrain(self, azimuth: f32) -> f32 {
        match self {
            AzimuthWindow::Range { min, max } => azimuth.clamp(min, max),
            AzimuthWindow::Split { edge } => {
                if azimuth >= 0.0 {
                    azimuth.clamp(edge, PI)
                } else {
                    azimuth.clamp(-PI, -edge)
                }
            }
        }
    }
}

/// Camera position and orientation in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub rotation: Quat,
}

#[derive(Debug, Clone)]
pub struct CombatController {
    mode: CameraMode,
    azimuth: f32,
    pitch: f32,
    pointer_locked: bool,
    aim: Option<AimCurve>,
}

impl Default for CombatController {
    fn default() -> Self {
        Self::new()
    }
}

impl CombatController {
    pub fn new() -> Self {
        Self {
            mode: CameraMode::Default,
            azimuth: DEFAULT_CAMERA_YAW,
            pitch: DEFAULT_CAMERA_PITCH,
            pointer_locked: false,
            aim: None,
        }
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn is_attacking(&self) -> bool {
        matches!(self.mode, CameraMode::Attacking(_))
    }

    pub fn azimuth(&self) -> f32 {
        self.azimuth
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Angle from straight up to the view direction.
    pub fn polar_angle(&self) -> f32 {
        FRAC_PI_2 - self.pitch
    }

    pub fn aim_curve(&self) -> Option<&AimCurve> {
        self.aim.as_ref()
    }

    pub fn pointer_locked(&self) -> bool {
        self.pointer_locked
    }

    pub fn set_pointer_lock(&mut self, locked: bool) {
        self.pointer_locked = locked;
    }

    /// Mouse movement in pixels. Ignored unless the pointer is locked.
    pub fn look(&mut self, dx: f32, dy: f32) {
        if !self.pointer_locked {
            return;
        }
        self.azimuth = wrap_angle(self.azimuth - dx * LOOK_SENSITIVITY);
        self.pitch = (self.pitch - dy * LOOK_SENSITIVITY)
            .clamp(FRAC_PI_2 - MAX_POLAR_ANGLE, FRAC_PI_2 - MIN_POLAR_ANGLE);
    }

    /// Enter attack mode on the side the camera is facing. Returns whether the mode changed.
    pub fn press_aim(&mut self, ship_loaded: bool) -> bool {
        if self.is_attacking() || !ship_loaded {
            return false;
        }
        let side = if self.azimuth > FRAC_PI_2 {
            AimSide::Left
        } else if !AzimuthWindow::for_mode(self.mode).is_split() {
            AimSide::Right
        } else {
            return false;
        };
        self.mode = CameraMode::Attacking(side);
        self.aim = Some(AimCurve::preset(side));
        debug!("attack mode: {side} broadside");
        true
    }

    /// Leave attack mode and return the camera to its default pose.
    pub fn release_aim(&mut self) {
        if !self.is_attacking() {
            return;
        }
        self.mode = CameraMode::Default;
        self.azimuth = DEFAULT_CAMERA_YAW;
        self.pitch = DEFAULT_CAMERA_PITCH;
        self.aim = None;
        debug!("attack mode released");
    }

    /// Per-frame update: constrain the camera, then let the aim curve follow it.
    pub fn update(&mut self) {
        if !self.pointer_locked {
            return;
        }
        self.azimuth = AzimuthWindow::for_mode(self.mode).constrain(self.azimuth);
        let polar = self.polar_angle();
        if let Some(aim) = self.aim.as_mut() {
            aim.update(self.azimuth, polar);
        }
    }

    /// World-space broadside path, if the player is aiming.
    pub fn fire(&self, ship: &Transform) -> Option<Vec<Vec3>> {
        let aim = self.aim.as_ref()?;
        Some(
            aim.extended_points()
                .into_iter()
                .map(|p| ship.local_to_world(p, PLAYER_SHIP_SCALE))
                .collect(),
        )
    }

    /// Aim preview polyline in world space. Empty when not aiming.
    pub fn aim_preview(&self, ship: &Transform) -> Vec<Vec3> {
        self.aim
            .as_ref()
            .map(|aim| {
                aim.preview()
                    .iter()
                    .map(|&p| ship.local_to_world(p, PLAYER_SHIP_SCALE))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn camera_offset(&self) -> Vec3 {
        match self.mode {
            CameraMode::Default => DEFAULT_CAMERA_OFFSET,
            CameraMode::Attacking(AimSide::Left) => ATTACK_LEFT_CAMERA_OFFSET,
            CameraMode::Attacking(AimSide::Right) => ATTACK_RIGHT_CAMERA_OFFSET,
        }
    }

    pub fn camera_pose(&self, ship: &Transform) -> CameraPose {
        CameraPose {
            position: ship.local_to_world(self.camera_offset(), PLAYER_SHIP_SCALE),
            rotation: ship.rotation * Quat::from_euler(EulerRot::YXZ, self.azimuth, self.pitch, 0.0),
        }
    }

    /// Whether `target` projects onto the middle of the screen.
    pub fn is_centered(&self, ship: &Transform, target: Vec3) -> bool {
        let pose = self.camera_pose(ship);
        let view = Mat4::from_rotation_translation(pose.rotation, pose.position).inverse();
        let projection = Mat4::perspective_rh_gl(CAMERA_FOV_Y, CAMERA_ASPECT, CAMERA_NEAR, CAMERA_FAR);
        let clip = projection * view * target.extend(1.0);
        if clip.w <= 0.0 {
            return false;
        }
        let ndc = clip.xy() / clip.w;
        ndc.x.abs() < CROSSHAIR_NDC_THRESHOLD && ndc.y.abs() < CROSSHAIR_NDC_THRESHOLD
    }
}

/// Wrap an angle into [-π, π).
fn wrap_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(TAU) - PI
}

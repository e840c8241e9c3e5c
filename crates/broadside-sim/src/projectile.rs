//! Cannon balls in flight along a Catmull-Rom path.

use glam::Vec3;

use broadside_core::constants::MAX_FLIGHT_SECS;
use broadside_core::enums::Shooter;
use broadside_core::types::{ProxyId, ShipId};

use crate::curve::CatmullRomCurve;
use crate::scheduler::FrameHandle;

/// What a projectile can hit.
#[derive(Debug, Clone, PartialEq)]
pub enum Targeting {
    /// Enemy shot at the player. At most one hit per projectile.
    Player { hit: bool },
    /// Player broadside at the fleet. Each ship is hit at most once.
    Fleet { struck: Vec<ShipId> },
}

impl Targeting {
    pub fn player() -> Self {
        Targeting::Player { hit: false }
    }

    pub fn fleet() -> Self {
        Targeting::Fleet { struck: Vec::new() }
    }
}

/// Flight time for a path of `length` at `speed`, capped at `MAX_FLIGHT_SECS`.
pub fn flight_duration(length: f32, speed: f32) -> f32 {
    if speed <= 0.0 {
        return MAX_FLIGHT_SECS;
    }
    (length / speed).min(MAX_FLIGHT_SECS)
}

#[derive(Debug, Clone)]
pub struct Projectile {
    pub shooter: Shooter,
    pub targeting: Targeting,
    curve: CatmullRomCurve,
    duration_secs: f32,
    elapsed_secs: f32,
    position: Vec3,
    /// Cannon ball proxy, once the model has loaded.
    pub visual: Option<ProxyId>,
    /// Registration for the next frame. `None` once the flight has halted.
    pub frame: Option<FrameHandle>,
}

impl Projectile {
    /// Prepare a shot along `points` at `speed`. Needs at least two points.
    pub fn new(points: Vec<Vec3>, speed: f32, shooter: Shooter, targeting: Targeting) -> Option<Self> {
        let curve = CatmullRomCurve::new(points)?;
        let duration_secs = flight_duration(curve.length(), speed);
        let position = curve.point_at(0.0);
        Some(Self {
            shooter,
            targeting,
            curve,
            duration_secs,
            elapsed_secs: 0.0,
            position,
            visual: None,
            frame: None,
        })
    }

    /// The ship that fired this shot, if it came from the fleet.
    pub fn firing_ship(&self) -> Option<ShipId> {
        match self.shooter {
            Shooter::Ship(id) => Some(id),
            Shooter::Player => None,
        }
    }

    pub fn duration_secs(&self) -> f32 {
        self.duration_secs
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed_secs
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn path_length(&self) -> f32 {
        self.curve.length()
    }

    /// Fraction of the flight completed, in [0, 1].
    pub fn progress(&self) -> f32 {
        if self.duration_secs <= 0.0 {
            return 1.0;
        }
        (self.elapsed_secs / self.duration_secs).min(1.0)
    }

    pub fn is_complete(&self) -> bool {
        self.elapsed_secs >= self.duration_secs
    }

    /// Move to the current point of the flight, then advance the clock by `dt`.
    pub fn step(&mut self, dt: f32) -> Vec3 {
        self.position = self.curve.point_at(self.progress());
        self.elapsed_secs += dt;
        self.position
    }
}

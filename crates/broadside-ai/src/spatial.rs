//! Distance predicates and randomized position sampling.

use glam::{EulerRot, Quat, Vec3};
use rand::Rng;

use broadside_core::constants::*;

/// Result of spawn sampling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnPlacement {
    /// Satisfies every separation constraint.
    Exact(Vec3),
    /// Attempts ran out; the least-violating candidate seen.
    Relaxed(Vec3),
}

impl SpawnPlacement {
    pub fn position(self) -> Vec3 {
        match self {
            SpawnPlacement::Exact(p) | SpawnPlacement::Relaxed(p) => p,
        }
    }

    pub fn is_relaxed(self) -> bool {
        matches!(self, SpawnPlacement::Relaxed(_))
    }
}

/// Rejection-sample a spawn point on the water plane inside the spawn square.
///
/// A candidate is accepted when it is at least `min_separation` from every
/// position in `existing` and at least `center_exclusion` from the origin.
/// After `MAX_SPAWN_ATTEMPTS` rejections the constraints are relaxed and the
/// candidate with the largest worst-case margin is returned instead.
pub fn sample_spawn_position<R: Rng + ?Sized>(
    rng: &mut R,
    existing: &[Vec3],
    min_separation: f32,
    center_exclusion: f32,
) -> SpawnPlacement {
    let mut best: Option<(f32, Vec3)> = None;

    for _ in 0..MAX_SPAWN_ATTEMPTS {
        let candidate = Vec3::new(
            rng.gen_range(-SPAWN_HALF_EXTENT..SPAWN_HALF_EXTENT),
            0.0,
            rng.gen_range(-SPAWN_HALF_EXTENT..SPAWN_HALF_EXTENT),
        );
        let margin = spawn_margin(candidate, existing, min_separation, center_exclusion);
        if margin >= 0.0 {
            return SpawnPlacement::Exact(candidate);
        }
        if best.map_or(true, |(m, _)| margin > m) {
            best = Some((margin, candidate));
        }
    }

    SpawnPlacement::Relaxed(best.map_or(Vec3::ZERO, |(_, p)| p))
}

/// Smallest slack over all constraints; negative when any is violated.
fn spawn_margin(
    candidate: Vec3,
    existing: &[Vec3],
    min_separation: f32,
    center_exclusion: f32,
) -> f32 {
    existing
        .iter()
        .map(|p| candidate.distance(*p) - min_separation)
        .fold(candidate.length() - center_exclusion, f32::min)
}

/// Uniform wander destination on the water plane.
pub fn sample_destination<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    Vec3::new(
        rng.gen_range(WANDER_MIN_X..WANDER_MIN_X + WANDER_SPAN_X),
        0.0,
        rng.gen_range(WANDER_MIN_Z..WANDER_MIN_Z + WANDER_SPAN_Z),
    )
}

/// Random small X/Z tilt for a freshly spawned ship. Yaw stays zero.
pub fn sample_spawn_tilt<R: Rng + ?Sized>(rng: &mut R) -> Quat {
    Quat::from_euler(
        EulerRot::XYZ,
        rng.gen_range(-SPAWN_MAX_TILT..SPAWN_MAX_TILT),
        0.0,
        rng.gen_range(-SPAWN_MAX_TILT..SPAWN_MAX_TILT),
    )
}

/// Symmetric proximity test. No hysteresis.
pub fn is_colliding(a: Vec3, b: Vec3, threshold: f32) -> bool {
    a.distance(b) < threshold
}

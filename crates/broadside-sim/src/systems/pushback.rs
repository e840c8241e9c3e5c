//! Eased collision push-back.
//!
//! A push moves its entity `PUSHBACK_DISTANCE` horizontally away from the
//! collider over `PUSHBACK_DURATION_SECS` with a cubic ease-out. Each tick
//! applies only the increment since the previous tick, so other movement
//! (wandering, helm) composes with it.

use glam::Vec3;
use hecs::World;

use broadside_core::components::PushBack;
use broadside_core::constants::{PUSHBACK_DISTANCE, PUSHBACK_DURATION_SECS};
use broadside_core::types::Transform;

pub fn ease_out_cubic(t: f32) -> f32 {
    let inv = 1.0 - t.clamp(0.0, 1.0);
    1.0 - inv * inv * inv
}

/// Push for something at `position` hit by something at `source`.
/// `None` when the two are stacked vertically and there is no horizontal direction.
pub fn away_from(position: Vec3, source: Vec3) -> Option<PushBack> {
    let mut direction = position - source;
    direction.y = 0.0;
    let direction = direction.try_normalize()?;
    Some(PushBack {
        offset: direction * PUSHBACK_DISTANCE,
        elapsed_secs: 0.0,
        duration_secs: PUSHBACK_DURATION_SECS,
    })
}

/// Advance `push` by `dt` and return the translation to apply this tick.
pub fn advance(push: &mut PushBack, dt: f32) -> Vec3 {
    let duration = push.duration_secs.max(f32::EPSILON);
    let before = ease_out_cubic(push.elapsed_secs / duration);
    push.elapsed_secs += dt;
    let after = ease_out_cubic(push.elapsed_secs / duration);
    push.offset * (after - before)
}

pub fn is_finished(push: &PushBack) -> bool {
    push.elapsed_secs >= push.duration_secs
}

/// Apply push-back to every pushed entity and drop finished pushes.
pub fn run(world: &mut World, dt: f32) {
    let mut finished = Vec::new();
    for (entity, (transform, push)) in world.query_mut::<(&mut Transform, &mut PushBack)>() {
        transform.position += advance(push, dt);
        if is_finished(push) {
            finished.push(entity);
        }
    }
    for entity in finished {
        let _ = world.remove_one::<PushBack>(entity);
    }
}

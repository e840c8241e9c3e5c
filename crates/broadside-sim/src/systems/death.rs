//! Death animation playback.

use hecs::{Entity, World};

use broadside_core::components::DeathAnimation;
use broadside_core::constants::DEATH_ANIMATION_RATE;

/// Advance every death animation by `dt` of real time at the death playback rate.
/// Returns the entities whose animation finished this tick.
pub fn run(world: &mut World, dt: f32) -> Vec<Entity> {
    let mut finished = Vec::new();
    for (entity, animation) in world.query_mut::<&mut DeathAnimation>() {
        animation.remaining_secs -= dt * DEATH_ANIMATION_RATE;
        if animation.remaining_secs <= 0.0 {
            finished.push(entity);
        }
    }
    finished
}

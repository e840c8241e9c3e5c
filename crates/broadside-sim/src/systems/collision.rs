//! Collision resolution between the player and the fleet, and within the fleet.
//!
//! Positions are read after the behavior system has moved everything this tick.
//! Every pair is checked in both orders, so a pair of overlapping ships pushes
//! both apart.

use hecs::{Entity, World};
use rand_chacha::ChaCha8Rng;

use broadside_ai::spatial::{is_colliding, sample_destination};
use broadside_core::components::Navigation;
use broadside_core::constants::{COLLISION_DAMAGE, COLLISION_DISTANCE};
use broadside_core::enums::ShipBehavior;
use broadside_core::types::{ShipId, Transform};

use crate::player::PlayerShip;
use crate::systems::pushback;

/// Resolve collisions. Damages and pushes the player directly; returns the ships
/// that rammed the player so the fleet can apply their damage.
pub fn run(
    world: &mut World,
    order: &[(ShipId, Entity)],
    player: &mut PlayerShip,
    rng: &mut ChaCha8Rng,
) -> Vec<ShipId> {
    let ships: Vec<_> = order
        .iter()
        .filter_map(|&(id, entity)| {
            let behavior = *world.get::<&ShipBehavior>(entity).ok()?;
            if behavior.is_dying() {
                return None;
            }
            let position = world.get::<&Transform>(entity).ok()?.position;
            Some((id, entity, position))
        })
        .collect();

    let player_position = player.position();
    let mut rammed = Vec::new();

    for (i, &(id, entity, position)) in ships.iter().enumerate() {
        if is_colliding(position, player_position, COLLISION_DISTANCE) {
            player.damage(COLLISION_DAMAGE);
            player.push_away_from(position);
            if let Some(push) = pushback::away_from(position, player_position) {
                let _ = world.insert_one(entity, push);
            }
            rammed.push(id);
        }

        for (j, &(_, other, other_position)) in ships.iter().enumerate() {
            if i == j || !is_colliding(position, other_position, COLLISION_DISTANCE) {
                continue;
            }
            if let Some(push) = pushback::away_from(other_position, position) {
                let _ = world.insert_one(other, push);
            }
            if let Ok(mut nav) = world.get::<&mut Navigation>(other) {
                nav.destination = Some(sample_destination(rng));
            }
        }
    }

    rammed
}

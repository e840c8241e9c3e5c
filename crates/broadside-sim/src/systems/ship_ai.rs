//! Enemy behavior system.
//!
//! Runs the ship FSM for every placed, non-dying ship in fleet order and
//! writes the results back. Fire orders are returned for the engine to launch.

use glam::Vec3;
use hecs::{Entity, World};
use rand_chacha::ChaCha8Rng;

use broadside_ai::fsm::{self, FireOrder, ShipContext};
use broadside_core::components::{FireControl, Navigation};
use broadside_core::enums::ShipBehavior;
use broadside_core::types::{ShipId, Transform};

pub fn run(
    world: &mut World,
    order: &[(ShipId, Entity)],
    player_position: Vec3,
    dt: f32,
    rng: &mut ChaCha8Rng,
) -> Vec<(ShipId, FireOrder)> {
    let mut orders = Vec::new();

    for &(id, entity) in order {
        // Slots still loading have no transform yet.
        let Ok((behavior, transform, nav, fire_control)) = world
            .query_one_mut::<(&ShipBehavior, &mut Transform, &mut Navigation, &mut FireControl)>(
                entity,
            )
        else {
            continue;
        };
        if behavior.is_dying() {
            continue;
        }

        let ctx = ShipContext {
            behavior: *behavior,
            transform: *transform,
            destination: nav.destination,
            since_last_shot: fire_control.since_last_shot,
            player_position,
            dt,
        };
        let update = fsm::evaluate(&ctx, rng);

        *transform = update.transform;
        nav.destination = update.destination;
        fire_control.since_last_shot = update.since_last_shot;
        if let Some(fire) = update.fire {
            orders.push((id, fire));
        }
    }

    orders
}

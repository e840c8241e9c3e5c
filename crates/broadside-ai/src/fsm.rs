//! Enemy ship behavior finite state machine.
//!
//! Pure functions that compute movement, facing and firing decisions for one
//! ship based on its behavior state and the player's position.
//! No ECS dependency; operates on plain data.

use glam::{EulerRot, Quat, Vec3};
use rand::Rng;

use broadside_core::constants::*;
use broadside_core::enums::ShipBehavior;
use broadside_core::types::Transform;

use crate::spatial::sample_destination;

/// Input to the FSM for a single ship.
pub struct ShipContext {
    pub behavior: ShipBehavior,
    pub transform: Transform,
    pub destination: Option<Vec3>,
    pub since_last_shot: f32,
    pub player_position: Vec3,
    pub dt: f32,
}

/// A shot the ship wants fired this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireOrder {
    pub from: Vec3,
    pub to: Vec3,
}

/// Output from the FSM.
#[derive(Debug, Clone, Copy)]
pub struct ShipUpdate {
    pub transform: Transform,
    pub destination: Option<Vec3>,
    pub since_last_shot: f32,
    pub fire: Option<FireOrder>,
}

/// Evaluate the FSM for one ship for one tick.
pub fn evaluate<R: Rng + ?Sized>(ctx: &ShipContext, rng: &mut R) -> ShipUpdate {
    let unchanged = ShipUpdate {
        transform: ctx.transform,
        destination: ctx.destination,
        since_last_shot: ctx.since_last_shot,
        fire: None,
    };

    match ctx.behavior {
        ShipBehavior::Wandering => wander(ctx, rng),
        ShipBehavior::Hostile => engage(ctx),
        ShipBehavior::Dying => unchanged,
    }
}

/// Behavior after the ship takes damage.
/// Any damage makes a wandering ship hostile; depleted health means dying.
pub fn after_damage(behavior: ShipBehavior, depleted: bool) -> ShipBehavior {
    match behavior {
        ShipBehavior::Dying => ShipBehavior::Dying,
        _ if depleted => ShipBehavior::Dying,
        _ => ShipBehavior::Hostile,
    }
}

fn wander<R: Rng + ?Sized>(ctx: &ShipContext, rng: &mut R) -> ShipUpdate {
    let destination = ctx.destination.unwrap_or_else(|| sample_destination(rng));
    let position = ctx.transform.position;
    let to_destination = destination - position;
    let distance = to_destination.length();

    if distance < ARRIVAL_DISTANCE {
        // Arrived: pick the next leg, hold position this tick.
        return ShipUpdate {
            transform: ctx.transform,
            destination: Some(sample_destination(rng)),
            since_last_shot: ctx.since_last_shot,
            fire: None,
        };
    }

    let step = (ENEMY_SPEED * ctx.dt).min(distance);
    let transform = Transform::new(
        position + to_destination / distance * step,
        smooth_look_at(ctx.transform.rotation, position, destination, TURN_SLERP_FACTOR),
    );

    ShipUpdate {
        transform,
        destination: Some(destination),
        since_last_shot: ctx.since_last_shot,
        fire: None,
    }
}

fn engage(ctx: &ShipContext) -> ShipUpdate {
    let position = ctx.transform.position;
    let target = ctx.player_position;
    let to_player = target - position;
    let distance = to_player.length();
    let rotation = smooth_look_at(ctx.transform.rotation, position, target, TURN_SLERP_FACTOR);

    if distance > STANDOFF_DISTANCE {
        let step = ENEMY_SPEED * ctx.dt;
        return ShipUpdate {
            transform: Transform::new(position + to_player / distance * step, rotation),
            destination: ctx.destination,
            since_last_shot: ctx.since_last_shot,
            fire: None,
        };
    }

    let mut since_last_shot = ctx.since_last_shot + ctx.dt;
    let mut fire = None;
    if since_last_shot >= FIRE_COOLDOWN_SECS {
        let raise = Vec3::new(0.0, SHOT_RAISE, 0.0);
        fire = Some(FireOrder {
            from: position + raise,
            to: target + raise,
        });
        since_last_shot = 0.0;
    }

    ShipUpdate {
        transform: Transform::new(position, rotation),
        destination: ctx.destination,
        since_last_shot,
        fire,
    }
}

/// Orientation whose local +Z axis points from `from` toward `target`.
/// Returns `None` when the two points coincide.
pub fn look_rotation(from: Vec3, target: Vec3) -> Option<Quat> {
    let dir = target - from;
    let horizontal = (dir.x * dir.x + dir.z * dir.z).sqrt();
    if horizontal < 1e-6 && dir.y.abs() < 1e-6 {
        return None;
    }
    let yaw = dir.x.atan2(dir.z);
    let pitch = -dir.y.atan2(horizontal);
    Some(Quat::from_euler(EulerRot::YXZ, yaw, pitch, 0.0))
}

/// Turn part of the way from `current` toward facing `target`.
pub fn smooth_look_at(current: Quat, from: Vec3, target: Vec3, factor: f32) -> Quat {
    match look_rotation(from, target) {
        Some(goal) => current.slerp(goal, factor).normalize(),
        None => current,
    }
}

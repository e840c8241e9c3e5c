//! Cannon ball flight.
//!
//! Each projectile runs on its own frame registration. A projectile whose
//! registration was cancelled stops where it is. Otherwise one frame:
//! waits for the cannon ball model, drops the shot if its firing ship has left
//! the fleet, finishes once the flight time is used up, or moves along the path
//! and checks for hits against the ball's world position in the scene.

use std::task::Poll;

use log::{debug, warn};

use broadside_core::constants::{CANNON_BALL_MODEL, CANNON_DAMAGE, HIT_DISTANCE};
use broadside_core::events::AudioEvent;
use broadside_core::types::Transform;

use crate::feedback::Feedback;
use crate::fleet::Fleet;
use crate::player::PlayerShip;
use crate::projectile::{Projectile, Targeting};
use crate::scene::Stage;
use crate::scheduler::FrameScheduler;

enum Flight {
    Continue,
    Finished,
}

#[allow(clippy::too_many_arguments)]
pub fn run(
    projectiles: &mut Vec<Projectile>,
    scheduler: &mut FrameScheduler,
    stage: &mut Stage,
    fleet: &mut Fleet,
    player: &mut PlayerShip,
    dt: f32,
    feedback: &mut Feedback,
) {
    let mut in_flight = Vec::with_capacity(projectiles.len());

    for mut projectile in projectiles.drain(..) {
        let Some(handle) = projectile.frame.take() else {
            in_flight.push(projectile);
            continue;
        };
        if !scheduler.fire(handle) {
            in_flight.push(projectile);
            continue;
        }

        match advance(&mut projectile, stage, fleet, player, dt, feedback) {
            Flight::Continue => {
                projectile.frame = Some(scheduler.request());
                in_flight.push(projectile);
            }
            Flight::Finished => {
                if let Some(proxy) = projectile.visual.take() {
                    stage.release(proxy);
                }
            }
        }
    }

    *projectiles = in_flight;
}

fn advance(
    projectile: &mut Projectile,
    stage: &mut Stage,
    fleet: &mut Fleet,
    player: &mut PlayerShip,
    dt: f32,
    feedback: &mut Feedback,
) -> Flight {
    if projectile.visual.is_none() {
        match stage.poll_model(CANNON_BALL_MODEL) {
            Poll::Pending => return Flight::Continue,
            Poll::Ready(Err(err)) => {
                warn!("{err}; dropping cannon ball");
                return Flight::Finished;
            }
            Poll::Ready(Ok(model)) => {
                let transform = Transform::from_position(projectile.position());
                projectile.visual = Some(stage.instantiate(&model, &transform));
            }
        }
    }

    if let Some(id) = projectile.firing_ship() {
        if !fleet.exists(id) {
            debug!("{id} left the fleet; its shot is dropped");
            return Flight::Finished;
        }
    }

    if projectile.is_complete() {
        return Flight::Finished;
    }

    let mut position = projectile.step(dt);
    if let Some(proxy) = projectile.visual {
        stage.sync(proxy, &Transform::from_position(position));
        // Hits are measured where the scene placed the ball.
        position = stage.world_position(proxy).unwrap_or(position);
    }

    match &mut projectile.targeting {
        Targeting::Player { hit } => {
            if !*hit && position.distance(player.position()) < HIT_DISTANCE {
                *hit = true;
                let remaining = player.damage(CANNON_DAMAGE);
                feedback.audio.push(AudioEvent::Explosion { position });
                debug!("player hit, health {remaining}");
            }
        }
        Targeting::Fleet { struck } => {
            for (id, ship_position) in fleet.targets() {
                if struck.contains(&id) || position.distance(ship_position) >= HIT_DISTANCE {
                    continue;
                }
                struck.push(id);
                if let Some(remaining) = fleet.apply_damage(id, CANNON_DAMAGE, stage, feedback) {
                    debug!("{id} hit, health {remaining}");
                }
                feedback.audio.push(AudioEvent::Explosion { position });
            }
        }
    }

    Flight::Continue
}

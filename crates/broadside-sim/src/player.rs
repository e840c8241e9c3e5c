//! The player's ship: helm, health, and push-back.

use std::task::Poll;

use glam::{Quat, Vec3};
use log::{info, warn};

use broadside_core::components::{Health, PushBack};
use broadside_core::constants::*;
use broadside_core::enums::HelmKey;
use broadside_core::types::{ProxyId, Transform};

use crate::scene::Stage;
use crate::systems::pushback;

/// Keys currently held on the helm.
#[derive(Debug, Clone, Copy, Default)]
struct Helm {
    forward: bool,
    turn_left: bool,
    turn_right: bool,
    boost: bool,
}

#[derive(Debug, Clone)]
pub struct PlayerShip {
    pub transform: Transform,
    yaw: f32,
    pub health: Health,
    visual: Option<ProxyId>,
    model_failed: bool,
    helm: Helm,
    push_back: Option<PushBack>,
}

impl Default for PlayerShip {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerShip {
    pub fn new() -> Self {
        Self {
            transform: Transform::new(PLAYER_START, Quat::from_rotation_y(PLAYER_START_YAW)),
            yaw: PLAYER_START_YAW,
            health: Health::default(),
            visual: None,
            model_failed: false,
            helm: Helm::default(),
            push_back: None,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn is_loaded(&self) -> bool {
        self.visual.is_some()
    }

    pub fn is_sunk(&self) -> bool {
        self.health.is_depleted()
    }

    /// Apply damage and return the remaining health.
    pub fn damage(&mut self, amount: i32) -> i32 {
        self.health.damage(amount)
    }

    pub fn set_helm(&mut self, key: HelmKey, pressed: bool) {
        match key {
            HelmKey::Forward => self.helm.forward = pressed,
            HelmKey::TurnLeft => self.helm.turn_left = pressed,
            HelmKey::TurnRight => self.helm.turn_right = pressed,
            HelmKey::Boost => self.helm.boost = pressed,
        }
    }

    /// Start or finish loading the ship model and place its proxy.
    pub fn ensure_model(&mut self, stage: &mut Stage) {
        if self.visual.is_some() || self.model_failed {
            return;
        }
        match stage.poll_model(PLAYER_SHIP_MODEL) {
            Poll::Pending => {}
            Poll::Ready(Ok(model)) => {
                self.visual = Some(stage.instantiate(&model, &self.transform));
                info!("player ship ready at {}", self.transform.position);
            }
            Poll::Ready(Err(err)) => {
                warn!("{err}; player ship has no model and cannot steer");
                self.model_failed = true;
            }
        }
    }

    /// Steer for one tick. Inert until the model has loaded.
    pub fn update_helm(&mut self, dt: f32) {
        if self.visual.is_none() {
            return;
        }
        if self.helm.forward {
            let speed = if self.helm.boost {
                HELM_BOOST_SPEED
            } else {
                HELM_SPEED
            };
            let forward = self.transform.rotation * Vec3::NEG_X;
            self.transform.position += forward * speed * dt;
        }
        if self.helm.turn_left {
            self.yaw += HELM_TURN_PER_TICK;
        }
        if self.helm.turn_right {
            self.yaw -= HELM_TURN_PER_TICK;
        }
        self.transform.rotation = Quat::from_rotation_y(self.yaw);
    }

    /// Start a push-back away from `source`. Restarts any push already under way.
    pub fn push_away_from(&mut self, source: Vec3) {
        if let Some(push) = pushback::away_from(self.transform.position, source) {
            self.push_back = Some(push);
        }
    }

    pub fn is_pushed(&self) -> bool {
        self.push_back.is_some()
    }

    /// Advance the push-back ease by `dt`.
    pub fn advance_push_back(&mut self, dt: f32) {
        if let Some(push) = self.push_back.as_mut() {
            self.transform.position += pushback::advance(push, dt);
            if pushback::is_finished(push) {
                self.push_back = None;
            }
        }
    }

    /// Move the proxy to the current transform.
    pub fn sync(&self, stage: &mut Stage) {
        if let Some(proxy) = self.visual {
            stage.sync(proxy, &self.transform);
        }
    }
}

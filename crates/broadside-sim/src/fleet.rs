//! Fleet manager: owns the enemy ships from spawn to sinking.
//!
//! Ships live in a hecs world. The fleet keeps its own list of `(ShipId, Entity)`
//! pairs in creation order, which is the order the FSM and collision checks
//! visit them in.
//!
//! Spawning is sequential. A slot entity is created first (no transform, no
//! proxy), then the enemy model is requested through the asset cache. Only when
//! that resolves is the ship placed and the next slot opened. A failed load
//! abandons the slot and the sequence moves on.

use std::sync::Arc;
use std::task::Poll;

use glam::{Quat, Vec3};
use hecs::{Entity, World};
use log::{debug, info, warn};
use rand_chacha::ChaCha8Rng;

use broadside_ai::fsm::{self, FireOrder};
use broadside_ai::spatial::{sample_spawn_position, sample_spawn_tilt};
use broadside_core::components::*;
use broadside_core::constants::*;
use broadside_core::enums::ShipBehavior;
use broadside_core::events::UiEvent;
use broadside_core::types::{ShipId, Transform};

use crate::assets::ModelAsset;
use crate::feedback::Feedback;
use crate::player::PlayerShip;
use crate::scene::Stage;
use crate::systems;

/// Model data kept on a placed ship for its death animation.
struct ShipModel(Arc<ModelAsset>);

#[derive(Debug, Default)]
struct SpawnSequence {
    remaining: u32,
    current: Option<(ShipId, Entity)>,
    started: bool,
    placed: u32,
}

/// What one fleet tick produced.
#[derive(Debug, Default)]
pub struct FleetTick {
    pub fire_orders: Vec<(ShipId, FireOrder)>,
    /// Set on the single tick the last ship leaves a fully spawned fleet.
    pub victory: bool,
}

#[derive(Default)]
pub struct Fleet {
    world: World,
    order: Vec<(ShipId, Entity)>,
    next_id: u32,
    spawn: SpawnSequence,
    populated: bool,
    victory_signalled: bool,
}

impl Fleet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `count` ships for sequential spawning.
    pub fn spawn(&mut self, count: u32) {
        self.spawn.remaining += count;
        self.spawn.started = true;
        info!("spawning {count} enemy ships");
    }

    pub fn is_spawning(&self) -> bool {
        self.spawn.remaining > 0 || self.spawn.current.is_some()
    }

    /// Whether a spawn sequence has completed having placed at least one ship.
    pub fn is_populated(&self) -> bool {
        self.populated
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn exists(&self, id: ShipId) -> bool {
        self.entity(id).is_some()
    }

    pub fn ids(&self) -> Vec<ShipId> {
        self.order.iter().map(|&(id, _)| id).collect()
    }

    /// Ships in creation order.
    pub fn order(&self) -> &[(ShipId, Entity)] {
        &self.order
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// `None` while the ship is still waiting for its model.
    pub fn position(&self, id: ShipId) -> Option<Vec3> {
        let entity = self.entity(id)?;
        let transform = self.world.get::<&Transform>(entity).ok()?;
        Some(transform.position)
    }

    pub fn behavior(&self, id: ShipId) -> Option<ShipBehavior> {
        let entity = self.entity(id)?;
        let behavior = *self.world.get::<&ShipBehavior>(entity).ok()?;
        Some(behavior)
    }

    pub fn health(&self, id: ShipId) -> Option<i32> {
        let entity = self.entity(id)?;
        let health = self.world.get::<&Health>(entity).ok()?;
        Some(health.current)
    }

    /// Position of the first placed ship: the one the crosshair tracks.
    pub fn lead_position(&self) -> Option<Vec3> {
        self.order
            .iter()
            .find_map(|&(_, entity)| self.world.get::<&Transform>(entity).ok().map(|t| t.position))
    }

    /// Placed ships that can still be hit.
    pub fn targets(&self) -> Vec<(ShipId, Vec3)> {
        self.order
            .iter()
            .filter(|&&(id, _)| !self.behavior(id).is_some_and(ShipBehavior::is_dying))
            .filter_map(|&(id, entity)| {
                let transform = self.world.get::<&Transform>(entity).ok()?;
                Some((id, transform.position))
            })
            .collect()
    }

    /// Move a placed ship. Used for setting up engagements.
    pub fn set_position(&mut self, id: ShipId, position: Vec3) -> bool {
        let Some(entity) = self.entity(id) else {
            return false;
        };
        match self.world.get::<&mut Transform>(entity) {
            Ok(mut transform) => {
                transform.position = position;
                true
            }
            Err(_) => false,
        }
    }

    /// Damage a ship. A wandering ship turns hostile; a ship at zero health starts dying.
    /// Returns the remaining health, or `None` if the ship is gone or already dying.
    pub fn apply_damage(
        &mut self,
        id: ShipId,
        amount: i32,
        stage: &mut Stage,
        feedback: &mut Feedback,
    ) -> Option<i32> {
        let entity = self.entity(id)?;
        let behavior = *self.world.get::<&ShipBehavior>(entity).ok()?;
        if behavior.is_dying() {
            return None;
        }
        let (remaining, depleted) = {
            let mut health = self.world.get::<&mut Health>(entity).ok()?;
            let remaining = health.damage(amount);
            (remaining, health.is_depleted())
        };

        if depleted {
            self.remove(id, stage, feedback);
        } else {
            let next = fsm::after_damage(behavior, false);
            if next != behavior {
                let _ = self.world.insert_one(entity, next);
                debug!("{id} turned {next:?}");
            }
        }
        Some(remaining)
    }

    /// Start sinking a ship. With a death animation the ship stays in the fleet
    /// until playback completes; without one it leaves immediately.
    /// Calling this again for a dying or removed ship does nothing.
    pub fn remove(&mut self, id: ShipId, stage: &mut Stage, feedback: &mut Feedback) {
        let Some(entity) = self.entity(id) else {
            return;
        };
        let dying = self
            .world
            .get::<&ShipBehavior>(entity)
            .map(|behavior| behavior.is_dying())
            .unwrap_or(false);
        if dying {
            return;
        }

        let _ = self.world.insert_one(entity, ShipBehavior::Dying);
        let _ = self.world.remove_one::<PushBack>(entity);
        feedback.ui.push(UiEvent::ShipSunk { id });

        let animation_secs = self
            .world
            .get::<&ShipModel>(entity)
            .ok()
            .and_then(|model| model.0.death_animation_secs());
        match animation_secs {
            Some(secs) if secs > 0.0 => {
                let _ = self.world.insert_one(entity, DeathAnimation { remaining_secs: secs });
                debug!("{id} sinking");
            }
            _ => {
                self.despawn(id, entity, stage);
                debug!("{id} sunk");
            }
        }
    }

    /// One fleet tick: spawning, death animations, behavior, push-back, collisions.
    pub fn tick(
        &mut self,
        dt: f32,
        player: &mut PlayerShip,
        stage: &mut Stage,
        rng: &mut ChaCha8Rng,
        feedback: &mut Feedback,
    ) -> FleetTick {
        self.advance_spawns(stage, rng);

        for entity in systems::death::run(&mut self.world, dt) {
            if let Some(id) = self.id_of(entity) {
                self.despawn(id, entity, stage);
                debug!("{id} sunk");
            }
        }

        let fire_orders =
            systems::ship_ai::run(&mut self.world, &self.order, player.position(), dt, rng);
        systems::pushback::run(&mut self.world, dt);

        let rammed = systems::collision::run(&mut self.world, &self.order, player, rng);
        for id in rammed {
            self.apply_damage(id, COLLISION_DAMAGE, stage, feedback);
        }

        self.sync(stage);

        FleetTick {
            fire_orders,
            victory: self.check_victory(),
        }
    }

    fn check_victory(&mut self) -> bool {
        if self.populated && self.order.is_empty() && !self.victory_signalled {
            self.victory_signalled = true;
            info!("enemy fleet destroyed");
            return true;
        }
        false
    }

    fn advance_spawns(&mut self, stage: &mut Stage, rng: &mut ChaCha8Rng) {
        loop {
            let (id, entity) = match self.spawn.current {
                Some(slot) if self.world.contains(slot.1) => slot,
                Some(_) => {
                    // Slot removed while loading.
                    self.spawn.current = None;
                    continue;
                }
                None if self.spawn.remaining > 0 => {
                    self.spawn.remaining -= 1;
                    let slot = self.open_slot();
                    self.spawn.current = Some(slot);
                    slot
                }
                None => {
                    if self.spawn.started && !self.populated && self.spawn.placed > 0 {
                        self.populated = true;
                        info!("fleet ready: {} ships", self.order.len());
                    }
                    return;
                }
            };

            match stage.poll_model(ENEMY_SHIP_MODEL) {
                Poll::Pending => return,
                Poll::Ready(Ok(model)) => {
                    self.place(id, entity, model, stage, rng);
                    self.spawn.placed += 1;
                }
                Poll::Ready(Err(err)) => {
                    warn!("{err}; abandoning spawn slot {id}");
                    self.despawn(id, entity, stage);
                }
            }
            self.spawn.current = None;
        }
    }

    fn open_slot(&mut self) -> (ShipId, Entity) {
        let id = ShipId(self.next_id);
        self.next_id += 1;
        let entity = self.world.spawn((
            EnemyShip { id },
            Health::default(),
            ShipBehavior::Wandering,
            Navigation::default(),
            FireControl::default(),
            PendingModel,
        ));
        self.order.push((id, entity));
        (id, entity)
    }

    fn place(
        &mut self,
        id: ShipId,
        entity: Entity,
        model: Arc<ModelAsset>,
        stage: &mut Stage,
        rng: &mut ChaCha8Rng,
    ) {
        let existing: Vec<Vec3> = self
            .world
            .query_mut::<&Transform>()
            .into_iter()
            .map(|(_, transform)| transform.position)
            .collect();
        let placement =
            sample_spawn_position(rng, &existing, SPAWN_MIN_SEPARATION, SPAWN_CENTER_EXCLUSION);
        if placement.is_relaxed() {
            warn!("{id} placed without full spacing at {}", placement.position());
        }

        let tilt: Quat = sample_spawn_tilt(rng);
        let transform = Transform::new(placement.position(), tilt);
        let proxy = stage.instantiate(&model, &transform);
        let _ = self
            .world
            .insert(entity, (transform, Visual { proxy }, ShipModel(model)));
        let _ = self.world.remove_one::<PendingModel>(entity);
        debug!("{id} placed at {}", transform.position);
    }

    fn despawn(&mut self, id: ShipId, entity: Entity, stage: &mut Stage) {
        if let Ok(visual) = self.world.get::<&Visual>(entity).map(|v| *v) {
            stage.release(visual.proxy);
        }
        let _ = self.world.despawn(entity);
        self.order.retain(|&(other, _)| other != id);
    }

    fn sync(&mut self, stage: &mut Stage) {
        for (_entity, (transform, visual)) in self.world.query_mut::<(&Transform, &Visual)>() {
            stage.sync(visual.proxy, transform);
        }
    }

    fn entity(&self, id: ShipId) -> Option<Entity> {
        self.order
            .iter()
            .find(|&&(other, _)| other == id)
            .map(|&(_, entity)| entity)
    }

    fn id_of(&self, entity: Entity) -> Option<ShipId> {
        self.order
            .iter()
            .find(|&&(_, other)| other == entity)
            .map(|&(id, _)| id)
    }
}

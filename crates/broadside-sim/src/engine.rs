//! Simulation engine: the core of the game.
//!
//! `SimulationEngine` owns the fleet, the player, the projectiles in flight,
//! and the frame scheduler. It processes player commands at tick boundaries,
//! runs one frame per tick while the mission is active, and produces
//! `GameStateSnapshot`s. Rendering and asset I/O sit behind the `SceneGraph`
//! and `AssetLoader` traits, so the engine runs headless in tests.

use std::collections::VecDeque;

use glam::Vec3;
use log::{debug, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use broadside_core::commands::PlayerCommand;
use broadside_core::constants::*;
use broadside_core::enums::{GamePhase, Shooter};
use broadside_core::events::{AudioEvent, UiEvent};
use broadside_core::state::GameStateSnapshot;
use broadside_core::types::SimTime;

use crate::assets::AssetLoader;
use crate::combat::CombatController;
use crate::feedback::Feedback;
use crate::fleet::Fleet;
use crate::player::PlayerShip;
use crate::projectile::{Projectile, Targeting};
use crate::scene::{SceneGraph, Stage};
use crate::scheduler::{FrameHandle, FrameScheduler};
use crate::systems;

/// Configuration for starting a new simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    /// Initial time scale (1.0 = normal).
    pub time_scale: f64,
    /// Ships spawned when the mission starts.
    pub enemy_count: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            time_scale: 1.0,
            enemy_count: DEFAULT_ENEMY_COUNT,
        }
    }
}

/// A shot waiting to be put in flight at the end of the frame.
struct PendingShot {
    points: Vec<Vec3>,
    speed: f32,
    shooter: Shooter,
    targeting: Targeting,
}

/// The simulation engine. Owns all sim state.
pub struct SimulationEngine {
    time: SimTime,
    phase: GamePhase,
    time_scale: f64,
    enemy_count: u32,
    rng: ChaCha8Rng,
    command_queue: VecDeque<PlayerCommand>,
    scheduler: FrameScheduler,
    frame: Option<FrameHandle>,
    stage: Stage,
    fleet: Fleet,
    player: PlayerShip,
    combat: CombatController,
    projectiles: Vec<Projectile>,
    pending_shots: Vec<PendingShot>,
    feedback: Feedback,
    crosshair_on_target: bool,
}

impl SimulationEngine {
    /// Create a new simulation engine drawing into `scene` with models from `loader`.
    pub fn new(config: SimConfig, scene: Box<dyn SceneGraph>, loader: Box<dyn AssetLoader>) -> Self {
        Self {
            time: SimTime::default(),
            phase: GamePhase::default(),
            time_scale: config.time_scale,
            enemy_count: config.enemy_count,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            command_queue: VecDeque::new(),
            scheduler: FrameScheduler::new(),
            frame: None,
            stage: Stage::new(scene, loader),
            fleet: Fleet::new(),
            player: PlayerShip::new(),
            combat: CombatController::new(),
            projectiles: Vec::new(),
            pending_shots: Vec::new(),
            feedback: Feedback::default(),
            crosshair_on_target: false,
        }
    }

    /// Queue a player command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = PlayerCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the simulation by one tick and return the resulting snapshot.
    pub fn tick(&mut self) -> GameStateSnapshot {
        self.process_commands();

        if self.phase == GamePhase::Active {
            if let Some(handle) = self.frame.take() {
                if self.scheduler.fire(handle) {
                    self.run_frame();
                    self.time.advance();
                    if self.phase == GamePhase::Active {
                        self.frame = Some(self.scheduler.request());
                    }
                }
            }
        }

        let (audio_events, ui_events) = self.feedback.take();
        systems::snapshot::build_snapshot(
            &self.time,
            self.phase,
            &self.player,
            &self.combat,
            &self.fleet,
            &self.projectiles,
            self.crosshair_on_target,
            audio_events,
            ui_events,
        )
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    pub fn player(&self) -> &PlayerShip {
        &self.player
    }

    pub fn combat(&self) -> &CombatController {
        &self.combat
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// Put an enemy ship at a known position (for tests needing a fixed engagement).
    #[cfg(test)]
    pub fn place_ship(&mut self, id: broadside_core::types::ShipId, position: Vec3) -> bool {
        self.fleet.set_position(id, position)
    }

    /// Damage an enemy ship directly (for tests).
    #[cfg(test)]
    pub fn damage_ship(&mut self, id: broadside_core::types::ShipId, amount: i32) -> Option<i32> {
        self.fleet
            .apply_damage(id, amount, &mut self.stage, &mut self.feedback)
    }

    /// Queue an enemy shot from `from` to `to` (for tests).
    #[cfg(test)]
    pub fn queue_enemy_shot(&mut self, id: broadside_core::types::ShipId, from: Vec3, to: Vec3) {
        self.queue_shot(vec![from, to], ENEMY_SHOT_SPEED, Shooter::Ship(id), Targeting::player());
    }

    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    fn handle_command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::StartMission => {
                if self.phase == GamePhase::MainMenu {
                    self.fleet.spawn(self.enemy_count);
                    self.phase = GamePhase::Active;
                    self.time = SimTime::default();
                    self.frame = Some(self.scheduler.request());
                    info!("mission started");
                }
            }
            PlayerCommand::Pause => {
                if self.phase == GamePhase::Active {
                    self.phase = GamePhase::Paused;
                }
            }
            PlayerCommand::Resume => {
                if self.phase == GamePhase::Paused {
                    self.phase = GamePhase::Active;
                }
            }
            PlayerCommand::SetTimeScale { scale } => {
                self.time_scale = scale.clamp(0.0, 4.0);
            }
            PlayerCommand::Helm { key, pressed } => {
                self.player.set_helm(key, pressed);
            }
            PlayerCommand::Look { dx, dy } => {
                self.combat.look(dx, dy);
            }
            PlayerCommand::PointerLock { locked } => {
                self.combat.set_pointer_lock(locked);
            }
            PlayerCommand::AimPressed => {
                self.combat.press_aim(self.player.is_loaded());
            }
            PlayerCommand::AimReleased => {
                self.combat.release_aim();
            }
            PlayerCommand::Fire => {
                if self.phase != GamePhase::Active {
                    return;
                }
                if let Some(points) = self.combat.fire(&self.player.transform) {
                    debug!("broadside fired");
                    self.queue_shot(points, PLAYER_SHOT_SPEED, Shooter::Player, Targeting::fleet());
                }
            }
        }
    }

    fn queue_shot(&mut self, points: Vec<Vec3>, speed: f32, shooter: Shooter, targeting: Targeting) {
        self.pending_shots.push(PendingShot {
            points,
            speed,
            shooter,
            targeting,
        });
    }

    /// One frame of the game loop.
    fn run_frame(&mut self) {
        let dt = DT * self.time_scale as f32;

        // 1. Player ship
        self.player.ensure_model(&mut self.stage);
        self.player.update_helm(dt);
        self.player.advance_push_back(dt);

        // 2. Camera and aim
        self.combat.update();
        self.crosshair_on_target = self
            .fleet
            .lead_position()
            .is_some_and(|target| self.combat.is_centered(&self.player.transform, target));

        // 3. Fleet: spawning, behavior, collisions
        let outcome = self.fleet.tick(
            dt,
            &mut self.player,
            &mut self.stage,
            &mut self.rng,
            &mut self.feedback,
        );
        self.player.sync(&mut self.stage);
        for (id, order) in outcome.fire_orders {
            debug!("{id} fires");
            self.queue_shot(
                vec![order.from, order.to],
                ENEMY_SHOT_SPEED,
                Shooter::Ship(id),
                Targeting::player(),
            );
        }

        // 4. Projectiles already in flight
        systems::projectiles::run(
            &mut self.projectiles,
            &mut self.scheduler,
            &mut self.stage,
            &mut self.fleet,
            &mut self.player,
            dt,
            &mut self.feedback,
        );

        // 5. Shots fired this frame start flying next frame
        self.launch_pending_shots();

        if self.player.is_sunk() {
            self.end_mission(GamePhase::GameOver);
        } else if outcome.victory {
            self.end_mission(GamePhase::Victory);
        }
    }

    fn launch_pending_shots(&mut self) {
        for shot in std::mem::take(&mut self.pending_shots) {
            let Some(mut projectile) =
                Projectile::new(shot.points, shot.speed, shot.shooter, shot.targeting)
            else {
                continue;
            };
            projectile.frame = Some(self.scheduler.request());
            self.feedback.audio.push(AudioEvent::CannonFire {
                shooter: shot.shooter,
                position: projectile.position(),
            });
            self.projectiles.push(projectile);
        }
    }

    /// Stop the game: halt every frame continuation and tell the player.
    fn end_mission(&mut self, phase: GamePhase) {
        let halted = self.scheduler.cancel_all();
        self.frame = None;
        self.phase = phase;
        match phase {
            GamePhase::GameOver => {
                info!("game over at tick {}", self.time.tick);
                self.feedback.ui.push(UiEvent::GameOver);
            }
            GamePhase::Victory => {
                info!("victory at tick {}", self.time.tick);
                self.feedback.ui.push(UiEvent::Victory);
            }
            _ => {}
        }
        debug!("{halted} frame continuations cancelled");
    }
}

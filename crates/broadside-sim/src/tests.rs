//! Tests for the curve, projectiles, aiming, the fleet manager and the engine.

use std::f32::consts::FRAC_PI_2;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::task::Poll;

use glam::Vec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use broadside_core::commands::PlayerCommand;
use broadside_core::components::{Navigation, PushBack};
use broadside_core::constants::*;
use broadside_core::enums::*;
use broadside_core::error::GameError;
use broadside_core::events::{AudioEvent, UiEvent};
use broadside_core::state::GameStateSnapshot;
use broadside_core::types::{ProxyId, ShipId, Transform};

use crate::aim_curve::AimCurve;
use crate::assets::{AssetCache, AssetLoader, LoadResult, MemoryLoader, ModelAsset};
use crate::combat::{AzimuthWindow, CombatController};
use crate::curve::CatmullRomCurve;
use crate::engine::{SimConfig, SimulationEngine};
use crate::feedback::Feedback;
use crate::fleet::Fleet;
use crate::player::PlayerShip;
use crate::projectile::{flight_duration, Projectile, Targeting};
use crate::scene::{HeadlessScene, SceneGraph, Stage};
use crate::scheduler::FrameScheduler;
use crate::systems;

// ---- Helpers ----

/// Models for every path the game loads. Enemy ships carry death clips.
fn models() -> MemoryLoader {
    MemoryLoader::new()
        .with_model(
            ModelAsset::new(ENEMY_SHIP_MODEL)
                .with_clip("Sink", 2.0)
                .with_clip("Roll", 3.0),
        )
        .with_model(ModelAsset::new(PLAYER_SHIP_MODEL))
        .with_model(ModelAsset::new(CANNON_BALL_MODEL))
}

/// Same as `models()` but enemy ships have no animation, so they leave at once.
fn models_without_clips() -> MemoryLoader {
    MemoryLoader::new()
        .with_model(ModelAsset::new(ENEMY_SHIP_MODEL))
        .with_model(ModelAsset::new(PLAYER_SHIP_MODEL))
        .with_model(ModelAsset::new(CANNON_BALL_MODEL))
}

/// Loader whose requests stay pending until the test answers them.
#[derive(Clone, Default)]
struct DeferredLoader {
    requests: Arc<Mutex<Vec<(String, Sender<LoadResult>)>>>,
}

impl DeferredLoader {
    fn pending(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn complete_all(&self, answer: impl Fn(&str) -> LoadResult) {
        for (path, tx) in self.requests.lock().unwrap().drain(..) {
            let _ = tx.send(answer(&path));
        }
    }

    fn drop_all(&self) {
        self.requests.lock().unwrap().clear();
    }
}

impl AssetLoader for DeferredLoader {
    fn request(&mut self, path: &str) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();
        self.requests.lock().unwrap().push((path.to_string(), tx));
        rx
    }
}

fn load_ok(path: &str) -> LoadResult {
    Ok(ModelAsset::new(path))
}

fn load_err(path: &str) -> LoadResult {
    Err(GameError::AssetLoadFailure {
        path: path.to_string(),
        reason: "corrupt".to_string(),
    })
}

fn stage(loader: impl AssetLoader + 'static) -> Stage {
    Stage::new(Box::new(HeadlessScene::new()), Box::new(loader))
}

/// Player parked far from everything so fleet tests see no player collisions.
fn distant_player() -> PlayerShip {
    let mut player = PlayerShip::new();
    player.transform.position = Vec3::new(5000.0, 8.0, 5000.0);
    player
}

struct FleetRig {
    fleet: Fleet,
    stage: Stage,
    rng: ChaCha8Rng,
    player: PlayerShip,
    feedback: Feedback,
}

impl FleetRig {
    fn new(loader: impl AssetLoader + 'static) -> Self {
        Self {
            fleet: Fleet::new(),
            stage: stage(loader),
            rng: ChaCha8Rng::seed_from_u64(7),
            player: distant_player(),
            feedback: Feedback::default(),
        }
    }

    /// Spawn `count` ships and tick once so an immediate loader places them all.
    fn spawned(loader: impl AssetLoader + 'static, count: u32) -> Self {
        let mut rig = Self::new(loader);
        rig.fleet.spawn(count);
        rig.tick();
        rig
    }

    fn tick(&mut self) -> bool {
        self.fleet
            .tick(
                DT,
                &mut self.player,
                &mut self.stage,
                &mut self.rng,
                &mut self.feedback,
            )
            .victory
    }

    fn damage(&mut self, id: ShipId, amount: i32) -> Option<i32> {
        self.fleet
            .apply_damage(id, amount, &mut self.stage, &mut self.feedback)
    }

    fn remove(&mut self, id: ShipId) {
        self.fleet.remove(id, &mut self.stage, &mut self.feedback);
    }

    fn destination(&self, id: ShipId) -> Option<Vec3> {
        let &(_, entity) = self.fleet.order().iter().find(|(other, _)| *other == id)?;
        let navigation = self.fleet.world().get::<&Navigation>(entity).ok()?;
        navigation.destination
    }

    fn push_back(&self, id: ShipId) -> Option<PushBack> {
        let &(_, entity) = self.fleet.order().iter().find(|(other, _)| *other == id)?;
        let push = self.fleet.world().get::<&PushBack>(entity).ok()?;
        Some(*push)
    }
}

fn engine(config: SimConfig, loader: impl AssetLoader + 'static) -> SimulationEngine {
    SimulationEngine::new(config, Box::new(HeadlessScene::new()), Box::new(loader))
}

fn started_engine(enemy_count: u32, loader: impl AssetLoader + 'static) -> SimulationEngine {
    let mut engine = engine(
        SimConfig {
            enemy_count,
            ..Default::default()
        },
        loader,
    );
    engine.queue_command(PlayerCommand::StartMission);
    engine.tick();
    engine
}

fn run_ticks(engine: &mut SimulationEngine, ticks: usize) -> Vec<GameStateSnapshot> {
    (0..ticks).map(|_| engine.tick()).collect()
}

fn count_audio(snapshots: &[GameStateSnapshot], pred: impl Fn(&AudioEvent) -> bool) -> usize {
    snapshots
        .iter()
        .flat_map(|s| s.audio_events.iter())
        .filter(|e| pred(e))
        .count()
}

fn count_ui(snapshots: &[GameStateSnapshot], event: &UiEvent) -> usize {
    snapshots
        .iter()
        .flat_map(|s| s.ui_events.iter())
        .filter(|e| *e == event)
        .count()
}

fn approx(a: Vec3, b: Vec3, tolerance: f32) -> bool {
    a.distance(b) < tolerance
}

// ---- Frame scheduler ----

#[test]
fn test_scheduler_fire_consumes_handle() {
    let mut scheduler = FrameScheduler::new();
    let handle = scheduler.request();
    assert!(scheduler.is_pending(handle));
    assert!(scheduler.fire(handle));
    assert!(!scheduler.fire(handle), "A handle fires at most once");
    assert_eq!(scheduler.pending(), 0);
}

#[test]
fn test_scheduler_cancel_all_halts_everything() {
    let mut scheduler = FrameScheduler::new();
    let handles: Vec<_> = (0..5).map(|_| scheduler.request()).collect();
    assert_eq!(scheduler.cancel_all(), 5);
    for handle in handles {
        assert!(!scheduler.fire(handle));
    }
}

#[test]
fn test_scheduler_cancel_single() {
    let mut scheduler = FrameScheduler::new();
    let a = scheduler.request();
    let b = scheduler.request();
    assert!(scheduler.cancel(a));
    assert!(!scheduler.fire(a));
    assert!(scheduler.fire(b));
}

// ---- Asset cache ----

#[test]
fn test_asset_cache_shares_one_load() {
    let mut cache = AssetCache::new(Box::new(models()));
    let Poll::Ready(Ok(first)) = cache.poll(ENEMY_SHIP_MODEL) else {
        panic!("Memory loader answers immediately");
    };
    let Poll::Ready(Ok(second)) = cache.poll(ENEMY_SHIP_MODEL) else {
        panic!("Cached model is ready");
    };
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.loads_started(), 1);
    assert!(cache.is_cached(ENEMY_SHIP_MODEL));
}

#[test]
fn test_asset_cache_pending_until_loader_answers() {
    let loader = DeferredLoader::default();
    let mut cache = AssetCache::new(Box::new(loader.clone()));

    assert!(cache.poll(CANNON_BALL_MODEL).is_pending());
    assert!(cache.poll(CANNON_BALL_MODEL).is_pending());
    assert_eq!(loader.pending(), 1, "Second poll must not start another load");

    loader.complete_all(load_ok);
    assert!(matches!(cache.poll(CANNON_BALL_MODEL), Poll::Ready(Ok(_))));
}

#[test]
fn test_asset_failure_is_reported_then_retried_fresh() {
    let loader = DeferredLoader::default();
    let mut cache = AssetCache::new(Box::new(loader.clone()));

    assert!(cache.poll(PLAYER_SHIP_MODEL).is_pending());
    loader.complete_all(load_err);
    assert!(matches!(
        cache.poll(PLAYER_SHIP_MODEL),
        Poll::Ready(Err(GameError::AssetLoadFailure { .. }))
    ));

    // The failure is not cached.
    assert!(cache.poll(PLAYER_SHIP_MODEL).is_pending());
    assert_eq!(cache.loads_started(), 2);
}

#[test]
fn test_asset_channel_closed_is_an_error() {
    let loader = DeferredLoader::default();
    let mut cache = AssetCache::new(Box::new(loader.clone()));
    assert!(cache.poll(ENEMY_SHIP_MODEL).is_pending());
    loader.drop_all();
    assert_eq!(
        cache.poll(ENEMY_SHIP_MODEL),
        Poll::Ready(Err(GameError::AssetChannelClosed {
            path: ENEMY_SHIP_MODEL.to_string()
        }))
    );
}

#[test]
fn test_death_animation_uses_shortest_of_first_two_clips() {
    let model = ModelAsset::new("ship")
        .with_clip("a", 3.0)
        .with_clip("b", 2.0)
        .with_clip("c", 0.5);
    assert_eq!(model.death_animation_secs(), Some(2.0));
    assert_eq!(ModelAsset::new("plain").death_animation_secs(), None);
}

// ---- Curve ----

#[test]
fn test_curve_requires_two_points() {
    assert!(CatmullRomCurve::new(vec![]).is_none());
    assert!(CatmullRomCurve::new(vec![Vec3::ONE]).is_none());
}

#[test]
fn test_curve_two_points_is_straight_line() {
    let curve = CatmullRomCurve::new(vec![Vec3::ZERO, Vec3::new(300.0, 0.0, 0.0)]).unwrap();
    assert!((curve.length() - 300.0).abs() < 0.01);
    assert!(approx(curve.point_at(0.5), Vec3::new(150.0, 0.0, 0.0), 0.01));
    assert!(approx(curve.point_at(1.0), Vec3::new(300.0, 0.0, 0.0), 0.001));
}

#[test]
fn test_curve_passes_through_control_points() {
    let points = vec![
        Vec3::ZERO,
        Vec3::new(0.0, 10.0, 10.0),
        Vec3::new(-5.0, 0.0, 20.0),
    ];
    let curve = CatmullRomCurve::new(points.clone()).unwrap();
    assert!(approx(curve.point(0.0), points[0], 1e-4));
    assert!(approx(curve.point(0.5), points[1], 1e-4));
    assert!(approx(curve.point(1.0), points[2], 1e-4));
}

#[test]
fn test_curve_point_at_is_uniform_in_distance() {
    let curve = CatmullRomCurve::new(vec![
        Vec3::ZERO,
        Vec3::new(5.0, 40.0, 0.0),
        Vec3::new(200.0, 0.0, 0.0),
    ])
    .unwrap();
    let samples = curve.sample(10);
    assert_eq!(samples.len(), 11);
    assert!(approx(samples[3], curve.point_at(0.3), 1e-4));

    // Arc between consecutive samples, walked finely so the bend is followed.
    const FINE: usize = 200;
    let expected = curve.length() / 10.0;
    for segment in 0..10 {
        let arc: f32 = (0..FINE)
            .map(|j| {
                let start = (segment * FINE + j) as f32 / (10 * FINE) as f32;
                let end = (segment * FINE + j + 1) as f32 / (10 * FINE) as f32;
                curve.point_at(start).distance(curve.point_at(end))
            })
            .sum();
        assert!(
            (arc - expected).abs() / expected < 0.01,
            "segment {segment}: arc {arc} vs expected {expected}"
        );
    }
}

// ---- Projectiles ----

#[test]
fn test_flight_duration_is_capped() {
    assert!((flight_duration(100.0, 100.0) - 1.0).abs() < 1e-6);
    assert!((flight_duration(1000.0, 100.0) - MAX_FLIGHT_SECS).abs() < 1e-6);
}

#[test]
fn test_projectile_duration_matches_path_length() {
    let short = Projectile::new(
        vec![Vec3::ZERO, Vec3::new(300.0, 0.0, 0.0)],
        ENEMY_SHOT_SPEED,
        Shooter::Ship(ShipId(0)),
        Targeting::player(),
    )
    .unwrap();
    assert!((short.duration_secs() - 3.0).abs() < 1e-3);

    let long = Projectile::new(
        vec![Vec3::ZERO, Vec3::new(5000.0, 0.0, 0.0)],
        ENEMY_SHOT_SPEED,
        Shooter::Ship(ShipId(0)),
        Targeting::player(),
    )
    .unwrap();
    assert_eq!(long.duration_secs(), MAX_FLIGHT_SECS);
    assert_eq!(
        long.duration_secs(),
        (long.path_length() / ENEMY_SHOT_SPEED).min(MAX_FLIGHT_SECS)
    );
}

#[test]
fn test_projectile_steps_along_path_until_complete() {
    let mut projectile = Projectile::new(
        vec![Vec3::ZERO, Vec3::new(100.0, 0.0, 0.0)],
        100.0,
        Shooter::Player,
        Targeting::fleet(),
    )
    .unwrap();
    let mut ticks = 0;
    while !projectile.is_complete() {
        projectile.step(DT);
        ticks += 1;
        assert!(ticks <= 61);
    }
    assert!(projectile.position().x > 95.0);
    assert_eq!(projectile.progress(), 1.0);
}

/// Scene that draws every proxy shifted by a fixed parent offset.
struct OffsetScene {
    inner: HeadlessScene,
    offset: Vec3,
}

impl SceneGraph for OffsetScene {
    fn add(&mut self, proxy: ProxyId, model: &Arc<ModelAsset>, transform: &Transform) {
        self.inner.add(proxy, model, transform);
    }

    fn update(&mut self, proxy: ProxyId, transform: &Transform) {
        self.inner.update(proxy, transform);
    }

    fn remove(&mut self, proxy: ProxyId) {
        self.inner.remove(proxy);
    }

    fn world_position(&self, proxy: ProxyId) -> Option<Vec3> {
        self.inner.world_position(proxy).map(|p| p + self.offset)
    }

    fn proxy_count(&self) -> usize {
        self.inner.proxy_count()
    }
}

/// Fly a player-targeted shot that runs from 600 to 400 units short of the
/// player along -Z, and return the player's health afterwards.
fn fly_shot_past_player(scene: Box<dyn SceneGraph>) -> i32 {
    let mut stage = Stage::new(scene, Box::new(models()));
    let mut scheduler = FrameScheduler::new();
    let mut fleet = Fleet::new();
    let mut player = PlayerShip::new();
    let mut feedback = Feedback::default();
    let target = player.position();

    let mut projectile = Projectile::new(
        vec![target - Vec3::new(0.0, 0.0, 600.0), target - Vec3::new(0.0, 0.0, 400.0)],
        200.0,
        Shooter::Player,
        Targeting::player(),
    )
    .unwrap();
    projectile.frame = Some(scheduler.request());
    let mut projectiles = vec![projectile];

    for _ in 0..90 {
        systems::projectiles::run(
            &mut projectiles,
            &mut scheduler,
            &mut stage,
            &mut fleet,
            &mut player,
            DT,
            &mut feedback,
        );
    }
    assert!(projectiles.is_empty(), "shot finished its flight");
    player.health.current
}

#[test]
fn test_projectile_hits_use_scene_world_position() {
    assert_eq!(fly_shot_past_player(Box::new(HeadlessScene::new())), MAX_HEALTH);

    let shifted = OffsetScene {
        inner: HeadlessScene::new(),
        offset: Vec3::new(0.0, 0.0, 500.0),
    };
    assert_eq!(
        fly_shot_past_player(Box::new(shifted)),
        MAX_HEALTH - CANNON_DAMAGE
    );
}

// ---- Aim curve ----

#[test]
fn test_aim_presets_mirror_each_other() {
    let left = AimCurve::preset(AimSide::Left);
    let right = AimCurve::preset(AimSide::Right);
    assert_eq!(left.points()[1], Vec3::new(0.0, 10.0, 10.0));
    assert_eq!(left.points()[2], Vec3::new(-5.0, 0.0, 20.0));
    assert_eq!(right.points()[1], Vec3::new(0.0, 10.0, -10.0));
    assert_eq!(right.points()[2], Vec3::new(-5.0, 0.0, -20.0));
    assert_eq!(left.preview().len(), AIM_PREVIEW_SEGMENTS + 1);
}

#[test]
fn test_aim_first_update_only_records_view() {
    let mut aim = AimCurve::preset(AimSide::Left);
    aim.update(2.9, 1.6);
    assert_eq!(aim.points()[2], Vec3::new(-5.0, 0.0, 20.0));
}

#[test]
fn test_aim_azimuth_swings_last_point_around_pivot() {
    let mut aim = AimCurve::preset(AimSide::Left);
    aim.update(0.0, 1.6);
    aim.update(FRAC_PI_2, 1.6);
    // Relative (-5, -10, 10) rotated a quarter turn about +Y.
    assert!(approx(aim.points()[2], Vec3::new(10.0, 0.0, 15.0), 1e-4));
    assert_eq!(aim.points()[1], Vec3::new(0.0, 10.0, 10.0));
}

#[test]
fn test_aim_polar_change_scales_reach() {
    let mut aim = AimCurve::preset(AimSide::Left);
    aim.update(0.0, 1.5);
    aim.update(0.0, 1.6);
    assert!(approx(aim.points()[2], Vec3::new(-2.5, 5.0, 15.0), 1e-4));

    let mut aim = AimCurve::preset(AimSide::Left);
    aim.update(0.0, 1.4);
    aim.update(0.0, 1.8);
    let reach = aim.points()[2] - aim.points()[1];
    let original = Vec3::new(-5.0, -10.0, 10.0);
    assert!((reach.length() - original.length() * AIM_MIN_REACH).abs() < 1e-3);
}

#[test]
fn test_aim_extension_continues_exit_direction() {
    let aim = AimCurve::preset(AimSide::Right);
    let points = aim.extended_points();
    assert_eq!(points.len(), 3 + SHOT_EXTENSION_POINTS);

    let exit = points[2] - points[1];
    for i in 3..points.len() {
        assert!(approx(points[i] - points[i - 1], exit, 1e-3));
    }
}

// ---- Combat controller ----

#[test]
fn test_look_ignored_without_pointer_lock() {
    let mut combat = CombatController::new();
    combat.look(100.0, 100.0);
    assert_eq!(combat.azimuth(), DEFAULT_CAMERA_YAW);
    assert_eq!(combat.pitch(), DEFAULT_CAMERA_PITCH);
}

#[test]
fn test_pitch_limited_to_polar_range() {
    let mut combat = CombatController::new();
    combat.set_pointer_lock(true);
    combat.look(0.0, -1000.0);
    assert!((combat.polar_angle() - MIN_POLAR_ANGLE).abs() < 1e-5);
    combat.look(0.0, 1000.0);
    assert!((combat.polar_angle() - MAX_POLAR_ANGLE).abs() < 1e-5);
}

#[test]
fn test_default_window_clamps_azimuth() {
    let mut combat = CombatController::new();
    combat.set_pointer_lock(true);
    combat.look(-250.0, 0.0);
    combat.update();
    assert!((combat.azimuth() - DEFAULT_AZIMUTH_MAX).abs() < 1e-6);
}

#[test]
fn test_split_window_snaps_middle_to_edge_by_sign() {
    let window = AzimuthWindow::for_mode(CameraMode::Attacking(AimSide::Left));
    assert!(window.is_split());
    assert_eq!(window.constrain(1.0), LEFT_AZIMUTH_EDGE);
    assert_eq!(window.constrain(-0.5), -LEFT_AZIMUTH_EDGE);
    assert_eq!(window.constrain(3.0), 3.0);
    assert_eq!(window.constrain(-3.0), -3.0);

    let right = AzimuthWindow::for_mode(CameraMode::Attacking(AimSide::Right));
    assert_eq!(right.constrain(1.0), RIGHT_AZIMUTH_HALF_WIDTH);
}

#[test]
fn test_aim_press_picks_side_from_azimuth() {
    let mut combat = CombatController::new();
    assert!(combat.press_aim(true));
    assert_eq!(combat.mode(), CameraMode::Attacking(AimSide::Right));

    let mut combat = CombatController::new();
    combat.set_pointer_lock(true);
    combat.look(-100.0, 0.0);
    assert!(combat.press_aim(true));
    assert_eq!(combat.mode(), CameraMode::Attacking(AimSide::Left));
    assert!(!combat.press_aim(true), "Already attacking");
}

#[test]
fn test_aim_press_requires_loaded_ship() {
    let mut combat = CombatController::new();
    assert!(!combat.press_aim(false));
    assert_eq!(combat.mode(), CameraMode::Default);
    assert!(combat.aim_curve().is_none());
}

#[test]
fn test_release_restores_default_pose() {
    let mut combat = CombatController::new();
    combat.set_pointer_lock(true);
    combat.press_aim(true);
    combat.look(40.0, 20.0);
    combat.release_aim();
    assert_eq!(combat.mode(), CameraMode::Default);
    assert_eq!(combat.azimuth(), DEFAULT_CAMERA_YAW);
    assert_eq!(combat.pitch(), DEFAULT_CAMERA_PITCH);
    assert!(combat.aim_curve().is_none());
}

#[test]
fn test_fire_only_while_attacking() {
    let ship = Transform::from_position(Vec3::new(100.0, 0.0, 0.0));
    let mut combat = CombatController::new();
    assert!(combat.fire(&ship).is_none());

    combat.press_aim(true);
    let path = combat.fire(&ship).unwrap();
    assert_eq!(path.len(), 3 + SHOT_EXTENSION_POINTS);
    assert_eq!(path[0], ship.position);
    // Ship-local points are scaled by the ship model scale.
    assert!(approx(path[1], Vec3::new(100.0, 100.0, -100.0), 1e-3));
}

#[test]
fn test_crosshair_centered_only_on_target_ahead() {
    let ship = PlayerShip::new().transform;
    let combat = CombatController::new();
    let pose = combat.camera_pose(&ship);

    let ahead = pose.position + pose.rotation * Vec3::new(0.0, 0.0, -500.0);
    let aside = pose.position + pose.rotation * Vec3::new(200.0, 0.0, -500.0);
    let behind = pose.position + pose.rotation * Vec3::new(0.0, 0.0, 500.0);

    assert!(combat.is_centered(&ship, ahead));
    assert!(!combat.is_centered(&ship, aside));
    assert!(!combat.is_centered(&ship, behind));
}

// ---- Player ship ----

#[test]
fn test_helm_inert_until_model_loaded() {
    let mut player = PlayerShip::new();
    player.set_helm(HelmKey::Forward, true);
    player.update_helm(DT);
    assert_eq!(player.position(), PLAYER_START);
}

#[test]
fn test_helm_forward_runs_along_local_negative_x() {
    let mut stage = stage(models());
    let mut player = PlayerShip::new();
    player.ensure_model(&mut stage);
    assert!(player.is_loaded());

    player.set_helm(HelmKey::Forward, true);
    for _ in 0..TICK_RATE {
        player.update_helm(DT);
    }
    // Starting yaw of -π/2 points local -X along world -Z.
    assert!(approx(player.position(), PLAYER_START + Vec3::new(0.0, 0.0, -HELM_SPEED), 0.05));

    player.set_helm(HelmKey::Boost, true);
    let before = player.position();
    for _ in 0..TICK_RATE {
        player.update_helm(DT);
    }
    assert!((player.position().distance(before) - HELM_BOOST_SPEED).abs() < 0.05);
}

#[test]
fn test_helm_turns_per_tick() {
    let mut stage = stage(models());
    let mut player = PlayerShip::new();
    player.ensure_model(&mut stage);
    player.set_helm(HelmKey::TurnLeft, true);
    for _ in 0..10 {
        player.update_helm(DT);
    }
    assert!((player.yaw() - (PLAYER_START_YAW + 10.0 * HELM_TURN_PER_TICK)).abs() < 1e-5);
}

// ---- Fleet manager ----

#[test]
fn test_spawn_places_ships_with_spacing() {
    let rig = FleetRig::spawned(models(), 5);
    assert_eq!(rig.fleet.len(), 5);
    assert!(rig.fleet.is_populated());

    let positions: Vec<Vec3> = rig
        .fleet
        .ids()
        .into_iter()
        .map(|id| rig.fleet.position(id).unwrap())
        .collect();
    for (i, a) in positions.iter().enumerate() {
        // One wander step has run since placement.
        assert!(a.length() >= SPAWN_CENTER_EXCLUSION - 1.0);
        for b in &positions[i + 1..] {
            assert!(a.distance(*b) >= SPAWN_MIN_SEPARATION - 1.0);
        }
    }
    assert_eq!(rig.stage.scene().proxy_count(), 5);
}

#[test]
fn test_spawn_waits_for_each_model() {
    let loader = DeferredLoader::default();
    let mut rig = FleetRig::new(loader.clone());
    rig.fleet.spawn(3);

    rig.tick();
    assert_eq!(rig.fleet.len(), 1, "Only the first slot exists while it loads");
    assert_eq!(rig.fleet.position(ShipId(0)), None);
    assert!(rig.fleet.exists(ShipId(0)));
    assert!(rig.fleet.is_spawning());

    loader.complete_all(load_ok);
    rig.tick();
    assert_eq!(rig.fleet.len(), 3);
    assert!(rig.fleet.ids().iter().all(|&id| rig.fleet.position(id).is_some()));
    assert_eq!(rig.stage.assets().loads_started(), 1);
    assert!(!rig.fleet.is_spawning());
}

#[test]
fn test_failed_load_abandons_slot_and_continues() {
    let loader = DeferredLoader::default();
    let mut rig = FleetRig::new(loader.clone());
    rig.fleet.spawn(2);
    rig.tick();

    loader.complete_all(load_err);
    rig.tick();
    assert_eq!(rig.fleet.ids(), vec![ShipId(1)]);
    assert_eq!(loader.pending(), 1, "Next slot starts a fresh load");

    loader.complete_all(load_ok);
    rig.tick();
    assert!(rig.fleet.position(ShipId(1)).is_some());
    assert!(rig.fleet.is_populated());
}

#[test]
fn test_no_victory_when_every_load_fails() {
    let mut rig = FleetRig::spawned(MemoryLoader::new(), 3);
    assert!(rig.fleet.is_empty());
    assert!(!rig.fleet.is_populated());
    for _ in 0..10 {
        assert!(!rig.tick());
    }
}

#[test]
fn test_remove_is_idempotent() {
    let mut rig = FleetRig::spawned(models_without_clips(), 3);
    rig.remove(ShipId(1));
    assert_eq!(rig.fleet.len(), 2);
    assert!(!rig.fleet.exists(ShipId(1)));
    rig.remove(ShipId(1));
    assert_eq!(rig.fleet.len(), 2);
    rig.remove(ShipId(99));
    assert_eq!(rig.fleet.len(), 2);
    assert_eq!(rig.stage.scene().proxy_count(), 2);
}

#[test]
fn test_remove_with_animation_waits_for_playback() {
    let mut rig = FleetRig::spawned(models(), 2);
    rig.remove(ShipId(0));
    rig.remove(ShipId(0));
    assert!(rig.fleet.exists(ShipId(0)));
    assert_eq!(rig.fleet.behavior(ShipId(0)), Some(ShipBehavior::Dying));

    // Shortest clip is 2 s at quarter speed: 8 s of real time.
    for _ in 0..470 {
        rig.tick();
    }
    assert!(rig.fleet.exists(ShipId(0)));
    for _ in 0..30 {
        rig.tick();
    }
    assert!(!rig.fleet.exists(ShipId(0)));
    assert_eq!(rig.fleet.len(), 1);
}

#[test]
fn test_damage_turns_wandering_ship_hostile() {
    let mut rig = FleetRig::spawned(models(), 1);
    assert_eq!(rig.fleet.behavior(ShipId(0)), Some(ShipBehavior::Wandering));
    assert_eq!(rig.damage(ShipId(0), COLLISION_DAMAGE), Some(MAX_HEALTH - 1));
    assert_eq!(rig.fleet.behavior(ShipId(0)), Some(ShipBehavior::Hostile));
}

#[test]
fn test_ten_cannon_hits_sink_ship() {
    let mut rig = FleetRig::spawned(models(), 1);
    let id = ShipId(0);
    let mut last = MAX_HEALTH;
    for _ in 0..10 {
        let health = rig.damage(id, CANNON_DAMAGE).unwrap();
        assert!(health < last, "Health must strictly decrease");
        last = health;
    }
    assert_eq!(rig.fleet.health(id), Some(0));
    assert_eq!(rig.fleet.behavior(id), Some(ShipBehavior::Dying));
    assert!(rig.fleet.exists(id), "Ship stays until its animation completes");
    assert_eq!(rig.damage(id, CANNON_DAMAGE), None, "Dying ships take no damage");
    assert!(rig
        .feedback
        .ui
        .iter()
        .any(|e| *e == UiEvent::ShipSunk { id }));
}

#[test]
fn test_damage_to_missing_ship_is_noop() {
    let mut rig = FleetRig::spawned(models(), 1);
    assert_eq!(rig.damage(ShipId(42), CANNON_DAMAGE), None);
    assert_eq!(rig.fleet.len(), 1);
}

#[test]
fn test_victory_signalled_exactly_once() {
    let mut rig = FleetRig::spawned(models_without_clips(), 2);
    assert!(!rig.tick());
    rig.remove(ShipId(0));
    assert!(!rig.tick(), "One ship left");
    rig.remove(ShipId(1));
    assert!(rig.tick());
    for _ in 0..10 {
        assert!(!rig.tick());
    }
}

#[test]
fn test_victory_waits_for_death_animation() {
    let mut rig = FleetRig::spawned(models(), 1);
    rig.remove(ShipId(0));
    let victories = (0..600).filter(|_| rig.tick()).count();
    assert_eq!(victories, 1);
    assert!(rig.fleet.is_empty());
}

#[test]
fn test_player_collision_exchanges_damage() {
    let mut rig = FleetRig::spawned(models(), 1);
    rig.player.transform.position = PLAYER_START;
    assert!(rig.fleet.set_position(ShipId(0), Vec3::new(50.0, 0.0, 0.0)));

    rig.tick();
    assert_eq!(rig.player.health.current, MAX_HEALTH - COLLISION_DAMAGE);
    assert_eq!(rig.fleet.health(ShipId(0)), Some(MAX_HEALTH - COLLISION_DAMAGE));
    assert_eq!(rig.fleet.behavior(ShipId(0)), Some(ShipBehavior::Hostile));
    assert!(rig.player.is_pushed());

    let push = rig.push_back(ShipId(0)).unwrap();
    assert!(push.offset.x > 0.0, "Ship is pushed away from the player");
    assert_eq!(push.offset.y, 0.0);
}

#[test]
fn test_enemy_collision_pushes_apart_and_resets_destination() {
    let mut rig = FleetRig::spawned(models(), 2);
    rig.fleet.set_position(ShipId(0), Vec3::new(1000.0, 0.0, 1000.0));
    rig.fleet.set_position(ShipId(1), Vec3::new(1050.0, 0.0, 1000.0));
    let before = [rig.destination(ShipId(0)), rig.destination(ShipId(1))];
    assert!(before.iter().all(Option::is_some));

    rig.tick();
    for (id, old) in [ShipId(0), ShipId(1)].into_iter().zip(before) {
        let new = rig.destination(id);
        assert!(new.is_some());
        assert_ne!(new, old, "{id} keeps its old destination");
        assert_eq!(rig.fleet.behavior(id), Some(ShipBehavior::Wandering));
    }
    let a = rig.push_back(ShipId(0)).unwrap();
    let b = rig.push_back(ShipId(1)).unwrap();
    assert!(a.offset.x < 0.0);
    assert!(b.offset.x > 0.0);
    assert_eq!(a.offset.y, 0.0);
    assert!((b.offset.length() - PUSHBACK_DISTANCE).abs() < 1e-3);
    // Ship-on-ship contact does no damage.
    assert_eq!(rig.fleet.health(ShipId(0)), Some(MAX_HEALTH));
    assert_eq!(rig.fleet.health(ShipId(1)), Some(MAX_HEALTH));

    for _ in 0..60 {
        rig.tick();
    }
    let gap = rig
        .fleet
        .position(ShipId(0))
        .unwrap()
        .distance(rig.fleet.position(ShipId(1)).unwrap());
    assert!(gap > 80.0, "gap {gap}");
}

#[test]
fn test_dying_ship_ignores_collisions() {
    let mut rig = FleetRig::spawned(models(), 1);
    rig.player.transform.position = PLAYER_START;
    rig.fleet.set_position(ShipId(0), Vec3::new(50.0, 0.0, 0.0));
    rig.remove(ShipId(0));
    rig.tick();
    assert_eq!(rig.player.health.current, MAX_HEALTH);
    assert!(!rig.player.is_pushed());
}

// ---- Engine ----

#[test]
fn test_determinism_same_seed() {
    let mut engine_a = engine(
        SimConfig {
            seed: 12345,
            ..Default::default()
        },
        models(),
    );
    let mut engine_b = engine(
        SimConfig {
            seed: 12345,
            ..Default::default()
        },
        models(),
    );

    engine_a.queue_command(PlayerCommand::StartMission);
    engine_b.queue_command(PlayerCommand::StartMission);

    for _ in 0..300 {
        let json_a = serde_json::to_string(&engine_a.tick()).unwrap();
        let json_b = serde_json::to_string(&engine_b.tick()).unwrap();
        assert_eq!(json_a, json_b, "Snapshots diverged with same seed");
    }
}

#[test]
fn test_engine_idle_until_mission_start() {
    let mut engine = engine(SimConfig::default(), models());
    run_ticks(&mut engine, 10);
    assert_eq!(engine.time().tick, 0);
    assert_eq!(engine.phase(), GamePhase::MainMenu);
    assert!(engine.fleet().is_empty());
}

#[test]
fn test_mission_start_spawns_fleet_and_player() {
    let engine = started_engine(DEFAULT_ENEMY_COUNT, models());
    assert_eq!(engine.phase(), GamePhase::Active);
    assert_eq!(engine.fleet().len(), DEFAULT_ENEMY_COUNT as usize);
    assert!(engine.player().is_loaded());
    // Ten ships plus the player.
    assert_eq!(
        engine.stage().scene().proxy_count(),
        DEFAULT_ENEMY_COUNT as usize + 1
    );
    assert_eq!(engine.scheduler().pending(), 1, "Only the loop is registered");
}

#[test]
fn test_pause_and_resume() {
    let mut engine = started_engine(1, models());
    engine.queue_command(PlayerCommand::Pause);
    let snapshot = engine.tick();
    assert_eq!(snapshot.phase, GamePhase::Paused);
    let paused_at = engine.time().tick;
    run_ticks(&mut engine, 5);
    assert_eq!(engine.time().tick, paused_at);

    engine.queue_command(PlayerCommand::Resume);
    engine.tick();
    assert_eq!(engine.time().tick, paused_at + 1);
}

#[test]
fn test_time_scale_clamped() {
    let mut engine = engine(SimConfig::default(), models());
    engine.queue_command(PlayerCommand::SetTimeScale { scale: 10.0 });
    engine.tick();
    assert_eq!(engine.time_scale(), 4.0);
    engine.queue_command(PlayerCommand::SetTimeScale { scale: -1.0 });
    engine.tick();
    assert_eq!(engine.time_scale(), 0.0);
}

#[test]
fn test_enemy_shot_hits_player_once() {
    let mut engine = started_engine(1, models());
    let id = ShipId(0);
    engine.place_ship(id, Vec3::new(3000.0, 0.0, 3000.0));
    engine.queue_enemy_shot(
        id,
        Vec3::new(300.0, 18.0, 0.0),
        PLAYER_START + Vec3::new(0.0, SHOT_RAISE, 0.0),
    );

    let snapshots = run_ticks(&mut engine, 240);
    assert_eq!(engine.player().health.current, MAX_HEALTH - CANNON_DAMAGE);
    assert_eq!(
        count_audio(&snapshots, |e| matches!(e, AudioEvent::Explosion { .. })),
        1
    );
    assert_eq!(
        count_audio(&snapshots, |e| matches!(e, AudioEvent::CannonFire { .. })),
        1
    );
    assert!(engine.projectiles().is_empty(), "Shot cleaned up after its flight");
    assert_eq!(
        engine.stage().scene().proxy_count(),
        2,
        "Cannon ball proxy released"
    );
}

#[test]
fn test_shot_from_removed_ship_is_dropped() {
    let mut engine = started_engine(2, models_without_clips());
    let id = ShipId(0);
    engine.place_ship(id, Vec3::new(3000.0, 0.0, 3000.0));
    engine.queue_enemy_shot(id, Vec3::new(300.0, 18.0, 0.0), Vec3::new(0.0, 18.0, 0.0));
    run_ticks(&mut engine, 3);
    assert_eq!(engine.projectiles().len(), 1);

    engine.damage_ship(id, MAX_HEALTH);
    assert!(!engine.fleet().exists(id));
    run_ticks(&mut engine, 2);
    assert!(engine.projectiles().is_empty());
    assert_eq!(engine.player().health.current, MAX_HEALTH);
}

#[test]
fn test_hostile_ship_fires_after_cooldown() {
    let mut engine = started_engine(1, models());
    let id = ShipId(0);
    engine.place_ship(id, Vec3::new(150.0, 0.0, 0.0));
    engine.damage_ship(id, CANNON_DAMAGE);

    let before = run_ticks(&mut engine, (FIRE_COOLDOWN_SECS * TICK_RATE as f32) as usize - 10);
    assert_eq!(
        count_audio(&before, |e| matches!(e, AudioEvent::CannonFire { .. })),
        0
    );

    let after = run_ticks(&mut engine, 20);
    assert_eq!(
        count_audio(&after, |e| *e
            == AudioEvent::CannonFire {
                shooter: Shooter::Ship(id),
                position: Vec3::new(150.0, SHOT_RAISE, 0.0),
            }),
        1
    );

    run_ticks(&mut engine, 120);
    assert_eq!(engine.player().health.current, MAX_HEALTH - CANNON_DAMAGE);
}

#[test]
fn test_game_over_cancels_all_frames() {
    let mut engine = started_engine(1, models());
    let id = ShipId(0);
    engine.place_ship(id, Vec3::new(3000.0, 0.0, 3000.0));
    for _ in 0..10 {
        engine.queue_enemy_shot(id, Vec3::new(300.0, 18.0, 0.0), Vec3::new(0.0, 18.0, 0.0));
    }

    let snapshots = run_ticks(&mut engine, 240);
    assert_eq!(engine.phase(), GamePhase::GameOver);
    assert!(engine.player().is_sunk());
    assert_eq!(count_ui(&snapshots, &UiEvent::GameOver), 1);
    assert_eq!(engine.scheduler().pending(), 0);

    let frozen_tick = engine.time().tick;
    let frozen = serde_json::to_string(&engine.tick().projectiles).unwrap();
    run_ticks(&mut engine, 30);
    assert_eq!(engine.time().tick, frozen_tick);
    assert_eq!(
        serde_json::to_string(&engine.tick().projectiles).unwrap(),
        frozen
    );
}

#[test]
fn test_victory_through_engine() {
    let mut engine = started_engine(2, models_without_clips());
    engine.damage_ship(ShipId(0), MAX_HEALTH);
    engine.damage_ship(ShipId(1), MAX_HEALTH);

    let snapshots = run_ticks(&mut engine, 30);
    assert_eq!(engine.phase(), GamePhase::Victory);
    assert_eq!(count_ui(&snapshots, &UiEvent::Victory), 1);
    assert_eq!(engine.scheduler().pending(), 0);
}

#[test]
fn test_fire_without_aim_does_nothing() {
    let mut engine = started_engine(1, models());
    engine.queue_command(PlayerCommand::Fire);
    let snapshots = run_ticks(&mut engine, 2);
    assert!(engine.projectiles().is_empty());
    assert_eq!(
        count_audio(&snapshots, |e| matches!(e, AudioEvent::CannonFire { .. })),
        0
    );
}

#[test]
fn test_broadside_hits_each_ship_once() {
    let mut engine = started_engine(2, models());

    // The engine aims exactly like a fresh controller while the pointer is free.
    let mut combat = CombatController::new();
    combat.press_aim(true);
    let path = combat.fire(&engine.player().transform).unwrap();
    let curve = CatmullRomCurve::new(path).unwrap();
    engine.place_ship(ShipId(0), curve.point_at(0.05));
    engine.place_ship(ShipId(1), curve.point_at(0.12));

    engine.queue_commands([PlayerCommand::AimPressed, PlayerCommand::Fire]);
    let snapshots = run_ticks(&mut engine, (MAX_FLIGHT_SECS * TICK_RATE as f32) as usize + 10);

    assert_eq!(
        snapshots[0].player.camera_mode,
        CameraMode::Attacking(AimSide::Right)
    );
    assert_eq!(engine.fleet().health(ShipId(0)), Some(MAX_HEALTH - CANNON_DAMAGE));
    assert_eq!(engine.fleet().health(ShipId(1)), Some(MAX_HEALTH - CANNON_DAMAGE));
    assert_eq!(
        count_audio(&snapshots, |e| *e
            == AudioEvent::CannonFire {
                shooter: Shooter::Player,
                position: engine.player().position(),
            }),
        1
    );
}

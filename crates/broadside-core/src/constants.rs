//! Simulation constants and tuning parameters.

use std::f32::consts::PI;

use glam::Vec3;

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 60;

/// Seconds per tick.
pub const DT: f32 = 1.0 / TICK_RATE as f32;

// --- Fleet ---

/// Number of enemy ships in a default mission.
pub const DEFAULT_ENEMY_COUNT: u32 = 10;

/// Health every ship (enemy or player) starts with. Also the ceiling.
pub const MAX_HEALTH: i32 = 100;

// --- Spawn sampling ---

/// Half-extent of the square spawn region centered on the origin.
pub const SPAWN_HALF_EXTENT: f32 = 400.0;

/// Minimum distance between two spawned enemies.
pub const SPAWN_MIN_SEPARATION: f32 = 200.0;

/// Minimum distance between a spawned enemy and the origin (player start).
pub const SPAWN_CENTER_EXCLUSION: f32 = 200.0;

/// Attempts before the spawn sampler relaxes its constraints.
pub const MAX_SPAWN_ATTEMPTS: u32 = 1000;

/// Maximum random X/Z tilt of a freshly spawned enemy (radians).
pub const SPAWN_MAX_TILT: f32 = PI * 0.1;

// --- Wandering ---

/// Wander destination region: x in [MIN_X, MIN_X + SPAN_X).
pub const WANDER_MIN_X: f32 = -200.0;
pub const WANDER_SPAN_X: f32 = 800.0;

/// Wander destination region: z in [MIN_Z, MIN_Z + SPAN_Z).
pub const WANDER_MIN_Z: f32 = -200.0;
pub const WANDER_SPAN_Z: f32 = 200.0;

/// Distance under which a wander destination counts as reached.
pub const ARRIVAL_DISTANCE: f32 = 0.1;

// --- Enemy behavior ---

/// Enemy cruise speed (units/s), both wandering and closing on the player.
pub const ENEMY_SPEED: f32 = 10.0;

/// Range a hostile enemy holds before it stops closing and starts firing.
pub const STANDOFF_DISTANCE: f32 = 200.0;

/// Seconds between enemy shots once in standoff range.
pub const FIRE_COOLDOWN_SECS: f32 = 4.0;

/// Per-tick slerp factor used when an enemy turns to face something.
pub const TURN_SLERP_FACTOR: f32 = 0.1;

/// Vertical offset applied to both ends of an enemy shot.
pub const SHOT_RAISE: f32 = 10.0;

// --- Collisions ---

/// Distance under which two ships are colliding.
pub const COLLISION_DISTANCE: f32 = 100.0;

/// Health lost by each side per tick of a player/enemy collision.
pub const COLLISION_DAMAGE: i32 = 1;

/// Length of the push-back translation applied after a collision.
pub const PUSHBACK_DISTANCE: f32 = 30.0;

/// Duration of the push-back ease (seconds).
pub const PUSHBACK_DURATION_SECS: f32 = 0.3;

// --- Projectiles ---

/// Upper bound on any projectile flight time (seconds).
pub const MAX_FLIGHT_SECS: f32 = 6.0;

/// Distance under which a projectile counts as a hit.
pub const HIT_DISTANCE: f32 = 50.0;

/// Damage dealt by one cannon ball.
pub const CANNON_DAMAGE: i32 = 10;

/// Enemy cannon ball speed (world units/s).
pub const ENEMY_SHOT_SPEED: f32 = 100.0;

/// Player cannon ball speed (world units/s): 20 ship-local units/s at ship scale 10.
pub const PLAYER_SHOT_SPEED: f32 = 200.0;

/// Number of straight-line points appended after the aim curve's last point.
pub const SHOT_EXTENSION_POINTS: usize = 20;

/// Arc-length table resolution for curve evaluation.
pub const CURVE_ARC_DIVISIONS: usize = 200;

/// Segments used when regenerating the aim preview geometry.
pub const AIM_PREVIEW_SEGMENTS: usize = 50;

// --- Death ---

/// Playback rate of death animation clips relative to real time.
pub const DEATH_ANIMATION_RATE: f32 = 0.25;

// --- Player ship ---

/// Player ship spawn position.
pub const PLAYER_START: Vec3 = Vec3::new(0.0, 8.0, 0.0);

/// Player ship spawn yaw (radians).
pub const PLAYER_START_YAW: f32 = -PI / 2.0;

/// Uniform scale of the player ship model. Aim curves are authored in its local frame.
pub const PLAYER_SHIP_SCALE: f32 = 10.0;

/// Helm speed (units/s) without and with the boost key.
pub const HELM_SPEED: f32 = 50.0;
pub const HELM_BOOST_SPEED: f32 = 100.0;

/// Helm yaw change per tick while a turn key is held (radians).
pub const HELM_TURN_PER_TICK: f32 = 0.02;

// --- Camera ---

/// Radians of camera rotation per pixel of pointer movement.
pub const LOOK_SENSITIVITY: f32 = 0.002;

/// Polar angle limits of the camera (radians from straight up).
pub const MIN_POLAR_ANGLE: f32 = 1.4;
pub const MAX_POLAR_ANGLE: f32 = 1.8;

/// Default (non-attacking) azimuth window.
pub const DEFAULT_AZIMUTH_MIN: f32 = 1.0;
pub const DEFAULT_AZIMUTH_MAX: f32 = 2.0;

/// Inner edge of the split left-side azimuth window: [EDGE, PI] and [-PI, -EDGE].
pub const LEFT_AZIMUTH_EDGE: f32 = 2.8;

/// Half-width of the right-side azimuth window around zero.
pub const RIGHT_AZIMUTH_HALF_WIDTH: f32 = 0.4;

/// Camera yaw/pitch of the default pose.
pub const DEFAULT_CAMERA_YAW: f32 = PI / 2.0;
pub const DEFAULT_CAMERA_PITCH: f32 = -0.1213;

/// Camera offsets in ship-local coordinates.
pub const DEFAULT_CAMERA_OFFSET: Vec3 = Vec3::new(10.0, 5.0, 0.0);
pub const ATTACK_LEFT_CAMERA_OFFSET: Vec3 = Vec3::new(0.0, 7.0, -10.0);
pub const ATTACK_RIGHT_CAMERA_OFFSET: Vec3 = Vec3::new(0.0, 7.0, 10.0);

/// Vertical field of view of the camera (radians).
pub const CAMERA_FOV_Y: f32 = 75.0 * PI / 180.0;

/// Default aspect ratio for the headless camera.
pub const CAMERA_ASPECT: f32 = 16.0 / 9.0;

/// Normalized-device-coordinate radius inside which a target counts as centered.
pub const CROSSHAIR_NDC_THRESHOLD: f32 = 0.05;

/// Multiplier applied to polar-angle deltas when reshaping the aim curve.
pub const AIM_POLAR_SCALE: f32 = 5.0;

/// Floor of the per-update aim reach multiplier.
pub const AIM_MIN_REACH: f32 = 0.1;

// --- Assets ---

pub const ENEMY_SHIP_MODEL: &str = "assets/models/animated-enemy-ship.glb";
pub const PLAYER_SHIP_MODEL: &str = "assets/models/Ship.glb";
pub const CANNON_BALL_MODEL: &str = "assets/models/cannon-ball.glb";

pub const CANNON_FIRE_SOUND: &str = "assets/sounds/cannon-fire.mp3";
pub const EXPLOSION_SOUND: &str = "assets/sounds/explosion.mp3";

pub const CANNON_FIRE_VOLUME: f32 = 0.7;
pub const EXPLOSION_VOLUME: f32 = 0.3;

//! Simulation engine for BROADSIDE.
//!
//! Owns the enemy fleet (a hecs world), the player ship, the projectiles in
//! flight and the frame scheduler, and produces `GameStateSnapshot`s for the
//! frontend. Scene graph and asset loading are traits, so everything here
//! runs headless.

pub mod aim_curve;
pub mod assets;
pub mod combat;
pub mod curve;
pub mod engine;
pub mod feedback;
pub mod fleet;
pub mod player;
pub mod projectile;
pub mod scene;
pub mod scheduler;
pub mod systems;

pub use broadside_core as core;
pub use engine::{SimConfig, SimulationEngine};

#[cfg(test)]
mod tests;

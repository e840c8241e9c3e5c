//! BROADSIDE headless runner.
//!
//! Wires the simulation engine to a game loop thread, a model loader, an
//! audio sink and the command line.

pub mod audio;
pub mod config;
pub mod error;
pub mod game_loop;
pub mod loader;
pub mod logging;
pub mod state;

pub use broadside_core as core;

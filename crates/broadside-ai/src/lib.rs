//! Enemy AI for BROADSIDE.
//!
//! Implements the enemy ship behavior state machine and the spatial
//! sampling helpers it relies on. Pure functions over plain data.

pub mod fsm;
pub mod spatial;

pub use broadside_core as core;

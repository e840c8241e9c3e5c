//! Systems that operate on the fleet world and the projectiles each tick.
//!
//! Systems are free functions over the state they are handed. They keep no
//! state of their own.

pub mod collision;
pub mod death;
pub mod projectiles;
pub mod pushback;
pub mod ship_ai;
pub mod snapshot;

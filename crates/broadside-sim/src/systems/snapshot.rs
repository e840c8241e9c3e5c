//! Snapshot builder: assembles the visible state after a tick.

use broadside_core::components::Health;
use broadside_core::enums::{GamePhase, ShipBehavior};
use broadside_core::events::{AudioEvent, UiEvent};
use broadside_core::state::*;
use broadside_core::types::{SimTime, Transform};

use crate::combat::CombatController;
use crate::fleet::Fleet;
use crate::player::PlayerShip;
use crate::projectile::Projectile;

#[allow(clippy::too_many_arguments)]
pub fn build_snapshot(
    time: &SimTime,
    phase: GamePhase,
    player: &PlayerShip,
    combat: &CombatController,
    fleet: &Fleet,
    projectiles: &[Projectile],
    crosshair_on_target: bool,
    audio_events: Vec<AudioEvent>,
    ui_events: Vec<UiEvent>,
) -> GameStateSnapshot {
    GameStateSnapshot {
        time: *time,
        phase,
        player: build_player_view(player, combat),
        ships: build_ship_views(fleet),
        projectiles: projectiles
            .iter()
            .map(|p| ProjectileView {
                shooter: p.shooter,
                position: p.position(),
                progress: p.progress(),
            })
            .collect(),
        crosshair_on_target,
        audio_events,
        ui_events,
    }
}

fn build_player_view(player: &PlayerShip, combat: &CombatController) -> PlayerView {
    PlayerView {
        position: player.position(),
        yaw: player.yaw(),
        health: player.health.current,
        health_percent: player.health.fraction() * 100.0,
        model_loaded: player.is_loaded(),
        camera_mode: combat.mode(),
        aim_preview: combat.aim_preview(&player.transform),
    }
}

fn build_ship_views(fleet: &Fleet) -> Vec<ShipView> {
    let world = fleet.world();
    fleet
        .order()
        .iter()
        .map(|&(id, entity)| {
            let transform = world.get::<&Transform>(entity).ok().map(|t| *t);
            let behavior = world
                .get::<&ShipBehavior>(entity)
                .map(|b| *b)
                .unwrap_or_default();
            let health = world.get::<&Health>(entity).map(|h| *h).unwrap_or_default();
            ShipView {
                id,
                position: transform.map(|t| t.position),
                rotation: transform.map(|t| t.rotation),
                behavior,
                health: health.current,
                health_fraction: health.fraction(),
            }
        })
        .collect()
}

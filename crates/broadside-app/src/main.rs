use std::process::ExitCode;

use clap::Parser;
use log::{error, info};
use serde::Serialize;

use broadside_app::audio::AudioSink;
use broadside_app::config::{load_script, AppConfig, Cli, ScriptedCommand};
use broadside_app::error::AppError;
use broadside_app::game_loop::{spawn_game_loop, LoopSettings};
use broadside_app::loader::{builtin_loader, ManifestLoader};
use broadside_app::logging;
use broadside_core::commands::PlayerCommand;
use broadside_core::enums::GamePhase;
use broadside_core::events::UiEvent;
use broadside_sim::assets::AssetLoader;
use broadside_sim::scene::HeadlessScene;
use broadside_sim::SimulationEngine;

/// Printed to stdout when the run ends.
#[derive(Debug, Serialize)]
struct RunSummary {
    ticks: u64,
    phase: GamePhase,
    player_health: i32,
    ships_remaining: usize,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), AppError> {
    let config = AppConfig::resolve(cli)?;
    let loader: Box<dyn AssetLoader> = match &config.asset_manifest {
        Some(path) => Box::new(ManifestLoader::from_manifest(path)?),
        None => Box::new(builtin_loader()),
    };
    let mut script = match &cli.script {
        Some(path) => load_script(path)?,
        None => Vec::new(),
    };
    script.insert(
        0,
        ScriptedCommand {
            tick: 0,
            command: PlayerCommand::StartMission,
        },
    );

    let engine = SimulationEngine::new(config.sim.clone(), Box::new(HeadlessScene::new()), loader);
    let settings = LoopSettings {
        tick_rate_hz: config.tick_rate_hz,
        max_ticks: config.ticks,
        script,
    };

    let mut audio = AudioSink::new();
    let mut last_health = None;
    let game_loop = spawn_game_loop(engine, settings, move |snapshot| {
        audio.play_all(&snapshot.audio_events);
        for event in &snapshot.ui_events {
            if let UiEvent::ShipSunk { id } = event {
                info!("{id} is going down");
            }
        }
        let health = snapshot.player.health_percent.round() as i32;
        if last_health.is_some_and(|last| last != health) {
            info!("hull at {health}%");
        }
        last_health = Some(health);
    })?;

    info!(
        "seed {}, {} enemy ships",
        config.sim.seed, config.sim.enemy_count
    );
    let outcome = game_loop.join()?;

    if let Some(snapshot) = outcome.final_snapshot {
        let summary = RunSummary {
            ticks: outcome.ticks_run,
            phase: snapshot.phase,
            player_health: snapshot.player.health,
            ships_remaining: snapshot.ships.len(),
        };
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{json}"),
            Err(err) => error!("failed to encode run summary: {err}"),
        }
    }
    Ok(())
}

//! Runner configuration: command line, JSON config file and command scripts.
//!
//! A config file supplies the base settings; any flag given on the command
//! line overrides the matching field.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};

use broadside_core::commands::PlayerCommand;
use broadside_core::constants::TICK_RATE;
use broadside_core::error::GameError;
use broadside_sim::engine::SimConfig;

use crate::error::AppError;

/// Headless BROADSIDE naval combat simulation
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// RNG seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of enemy ships to spawn
    #[arg(long)]
    pub enemies: Option<u32>,

    /// Stop after this many ticks
    #[arg(long)]
    pub ticks: Option<u64>,

    /// Loop rate in Hz (0 runs unthrottled)
    #[arg(long)]
    pub tick_rate: Option<u32>,

    /// Asset manifest listing model files and their animation clips
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// JSON file of player commands to replay at given loop ticks
    #[arg(long)]
    pub script: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub sim: SimConfig,
    pub asset_manifest: Option<PathBuf>,
    /// `None` runs until the mission ends.
    pub ticks: Option<u64>,
    pub tick_rate_hz: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sim: SimConfig::default(),
            asset_manifest: None,
            ticks: Some(TICK_RATE as u64 * 60),
            tick_rate_hz: TICK_RATE,
        }
    }
}

impl AppConfig {
    pub fn from_json(text: &str) -> Result<Self, GameError> {
        serde_json::from_str(text).map_err(|err| GameError::Config(err.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        Ok(Self::from_json(&read(path)?)?)
    }

    /// Config file (if any) with command line overrides applied.
    pub fn resolve(cli: &Cli) -> Result<Self, AppError> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(seed) = cli.seed {
            config.sim.seed = seed;
        }
        if let Some(enemies) = cli.enemies {
            config.sim.enemy_count = enemies;
        }
        if let Some(ticks) = cli.ticks {
            config.ticks = Some(ticks);
        }
        if let Some(rate) = cli.tick_rate {
            config.tick_rate_hz = rate;
        }
        if let Some(manifest) = &cli.manifest {
            config.asset_manifest = Some(manifest.clone());
        }
        Ok(config)
    }
}

/// A player command replayed when the loop reaches `tick`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptedCommand {
    pub tick: u64,
    pub command: PlayerCommand,
}

/// Read a command script, ordered by tick.
pub fn load_script(path: &Path) -> Result<Vec<ScriptedCommand>, AppError> {
    let mut script: Vec<ScriptedCommand> = serde_json::from_str(&read(path)?)
        .map_err(|err| GameError::Config(format!("invalid script {}: {err}", path.display())))?;
    script.sort_by_key(|entry| entry.tick);
    Ok(script)
}

fn read(path: &Path) -> Result<String, AppError> {
    fs::read_to_string(path).map_err(|source| AppError::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config = AppConfig::from_json(r#"{ "sim": { "seed": 7 }, "ticks": null }"#).unwrap();
        assert_eq!(config.sim.seed, 7);
        assert_eq!(config.sim.enemy_count, 10);
        assert_eq!(config.sim.time_scale, 1.0);
        assert_eq!(config.ticks, None);
        assert_eq!(config.tick_rate_hz, TICK_RATE);
    }

    #[test]
    fn test_malformed_config_is_config_error() {
        let err = AppConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, GameError::Config(_)));
    }

    #[test]
    fn test_cli_overrides_defaults() {
        let cli = Cli::try_parse_from([
            "broadside",
            "--seed",
            "99",
            "--enemies",
            "3",
            "--tick-rate",
            "0",
            "-v",
        ])
        .unwrap();
        let config = AppConfig::resolve(&cli).unwrap();
        assert_eq!(config.sim.seed, 99);
        assert_eq!(config.sim.enemy_count, 3);
        assert_eq!(config.tick_rate_hz, 0);
        assert!(cli.verbose);
        assert_eq!(config.ticks, AppConfig::default().ticks);
    }

    #[test]
    fn test_missing_config_file_is_read_error() {
        let cli = Cli::try_parse_from(["broadside", "--config", "/nonexistent/broadside.json"])
            .unwrap();
        assert!(matches!(
            AppConfig::resolve(&cli),
            Err(AppError::Read { .. })
        ));
    }

    #[test]
    fn test_script_entries_parse() {
        let json = r#"[
            { "tick": 30, "command": { "type": "Fire" } },
            { "tick": 5, "command": { "type": "AimPressed" } }
        ]"#;
        let mut script: Vec<ScriptedCommand> = serde_json::from_str(json).unwrap();
        script.sort_by_key(|entry| entry.tick);
        assert_eq!(script[0].command, PlayerCommand::AimPressed);
        assert_eq!(script[1].tick, 30);
    }
}

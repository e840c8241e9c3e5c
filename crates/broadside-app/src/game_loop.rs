//! Game loop thread: runs the simulation engine at a fixed rate.
//!
//! The engine is moved into the thread. Commands arrive over an `mpsc`
//! channel, scripted commands are queued when their tick comes up, and each
//! snapshot is handed to a callback and stored for polling.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use broadside_core::state::GameStateSnapshot;
use broadside_sim::engine::SimulationEngine;

use crate::config::ScriptedCommand;
use crate::error::AppError;
use crate::state::{AppState, GameLoopCommand, SharedSnapshot};

/// How the loop paces itself and when it stops.
#[derive(Debug, Clone, Default)]
pub struct LoopSettings {
    /// Ticks per second at 1x speed. 0 runs unthrottled.
    pub tick_rate_hz: u32,
    /// Stop after this many ticks. `None` runs until the mission ends.
    pub max_ticks: Option<u64>,
    /// Commands to replay, ordered by tick.
    pub script: Vec<ScriptedCommand>,
}

/// Result of a finished loop.
#[derive(Debug)]
pub struct LoopOutcome {
    pub ticks_run: u64,
    pub final_snapshot: Option<GameStateSnapshot>,
}

/// A running game loop.
pub struct GameLoop {
    pub state: AppState,
    thread: JoinHandle<LoopOutcome>,
}

impl GameLoop {
    /// Wait for the loop to stop.
    pub fn join(self) -> Result<LoopOutcome, AppError> {
        self.thread.join().map_err(|_| AppError::LoopGone)
    }
}

/// Nominal duration of one tick at 1x speed.
pub fn tick_duration(tick_rate_hz: u32) -> Option<Duration> {
    (tick_rate_hz > 0).then(|| Duration::from_nanos(1_000_000_000 / tick_rate_hz as u64))
}

/// Spawns the game loop in a new thread.
pub fn spawn_game_loop<F>(
    engine: SimulationEngine,
    settings: LoopSettings,
    on_snapshot: F,
) -> Result<GameLoop, AppError>
where
    F: FnMut(&GameStateSnapshot) + Send + 'static,
{
    let (cmd_tx, cmd_rx) = mpsc::channel::<GameLoopCommand>();
    let latest_snapshot: SharedSnapshot = Arc::new(Mutex::new(None));
    let shared = Arc::clone(&latest_snapshot);

    let thread = std::thread::Builder::new()
        .name("broadside-game-loop".into())
        .spawn(move || run_game_loop(engine, cmd_rx, settings, &shared, on_snapshot))
        .map_err(AppError::Thread)?;

    Ok(GameLoop {
        state: AppState::new(cmd_tx, latest_snapshot),
        thread,
    })
}

/// The game loop. Runs until the mission ends, the tick budget is spent,
/// a Shutdown command arrives or the channel disconnects.
fn run_game_loop<F>(
    mut engine: SimulationEngine,
    cmd_rx: mpsc::Receiver<GameLoopCommand>,
    settings: LoopSettings,
    latest_snapshot: &Mutex<Option<GameStateSnapshot>>,
    mut on_snapshot: F,
) -> LoopOutcome
where
    F: FnMut(&GameStateSnapshot),
{
    let base_tick = tick_duration(settings.tick_rate_hz);
    let mut script = settings.script.into_iter().peekable();
    let mut ticks_run = 0u64;
    let mut next_tick_time = Instant::now();

    let finish = |ticks_run: u64| LoopOutcome {
        ticks_run,
        final_snapshot: latest_snapshot.lock().ok().and_then(|s| s.clone()),
    };

    loop {
        // 1. Drain all pending commands
        loop {
            match cmd_rx.try_recv() {
                Ok(GameLoopCommand::PlayerCommand(cmd)) => engine.queue_command(cmd),
                Ok(GameLoopCommand::Shutdown) => return finish(ticks_run),
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => return finish(ticks_run),
            }
        }

        // 2. Scripted commands due this tick
        while let Some(entry) = script.next_if(|entry| entry.tick <= ticks_run) {
            engine.queue_command(entry.command);
        }

        // 3. Advance one tick (engine handles pause semantics internally)
        let snapshot = engine.tick();
        ticks_run += 1;
        on_snapshot(&snapshot);
        let finished = snapshot.phase.is_finished();

        // 4. Store latest snapshot for polling
        if let Ok(mut lock) = latest_snapshot.lock() {
            *lock = Some(snapshot);
        }

        if finished || settings.max_ticks.is_some_and(|max| ticks_run >= max) {
            return finish(ticks_run);
        }

        // 5. Sleep until next tick, adjusting for time_scale
        let Some(base_tick) = base_tick else {
            continue;
        };
        let time_scale = engine.time_scale();
        let effective_tick_duration = if time_scale > 0.001 {
            base_tick.div_f64(time_scale)
        } else {
            base_tick
        };

        next_tick_time += effective_tick_duration;
        let now = Instant::now();
        if next_tick_time > now {
            std::thread::sleep(next_tick_time - now);
        } else if now - next_tick_time > effective_tick_duration * 2 {
            // Too far behind: reset to avoid a catch-up spiral
            next_tick_time = now;
        }
    }
}

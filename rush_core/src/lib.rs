//! Core engine for the Order Rush clicker game.
//!
//! Builds a headless Bevy [`App`] whose chained systems resolve one fixed
//! simulation step each time [`run_tick`] is invoked.

mod board;
pub mod config;
mod events;
mod ledger;
pub mod metrics;
pub mod network;
mod queue;
mod resources;
mod scheduler;
mod session;
pub mod spawner;
mod systems;

use std::sync::Arc;

use bevy::prelude::*;

pub use board::{BoardTask, ClickOutcome, TaskBoard, TaskPosition};
pub use config::{
    load_game_config_from_env, GameConfig, GameConfigError, GameConfigHandle, LedgerConfig,
    QueueConfig, SessionConfig, SpawnConfig,
};
pub use events::{BoardRemoval, GameEvent, PlayerCommand, QueueRemoval};
pub use ledger::{Ledger, LedgerChange, LedgerTransition};
pub use metrics::SessionMetrics;
pub use queue::{QueueError, QueuedTask, TaskQueue};
pub use resources::{GameClock, SessionRng, TaskIdAllocator};
pub use scheduler::{TimerKey, TimerPurpose, TimerSchedule};
pub use session::{DayOutcome, DaySession, GameOverReason, SessionPhase};
pub use systems::inject_task;

/// Construct an [`App`] using the builtin game configuration.
pub fn build_headless_app() -> App {
    build_app_with_config(GameConfig::builtin())
}

/// Construct an [`App`] configured with the Order Rush tick pipeline.
pub fn build_app_with_config(config: GameConfig) -> App {
    let mut app = App::new();

    let rng = SessionRng::from_seed(config.seed);

    app.insert_resource(GameConfigHandle::new(Arc::new(config)))
        .insert_resource(GameClock::default())
        .insert_resource(rng)
        .insert_resource(TaskIdAllocator::default())
        .insert_resource(TimerSchedule::default())
        .insert_resource(TaskBoard::default())
        .insert_resource(TaskQueue::default())
        .insert_resource(Ledger::default())
        .insert_resource(DaySession::default())
        .insert_resource(SessionMetrics::default())
        .add_event::<PlayerCommand>()
        .add_event::<GameEvent>()
        .add_plugins(MinimalPlugins)
        .add_systems(
            Update,
            (
                systems::apply_player_commands,
                systems::advance_day_phase,
                systems::advance_clock,
                systems::expire_timers,
                systems::end_day_when_elapsed,
                systems::spawn_tasks,
                metrics::collect_metrics,
            )
                .chain(),
        );

    app
}

/// Execute a single simulation step.
///
/// Each call processes the chained systems configured in
/// [`build_app_with_config`] (commands → day phase → clock → timers →
/// day end → spawn → metrics). Callers drain [`GameEvent`]s afterwards.
pub fn run_tick(app: &mut App) {
    app.update();
}

/// Queue a player command for the next tick.
pub fn submit_command(app: &mut App, command: impl Into<PlayerCommand>) {
    app.world.send_event(command.into());
}

/// Take every game event emitted since the last drain.
pub fn drain_game_events(app: &mut App) -> Vec<GameEvent> {
    app.world
        .resource_mut::<Events<GameEvent>>()
        .drain()
        .collect()
}

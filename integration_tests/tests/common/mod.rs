use std::path::PathBuf;

use bevy::prelude::App;
use rush_core::{build_app_with_config, drain_game_events, run_tick, GameConfig, GameEvent};

/// Builtin rules with the random spawner switched off, so each test
/// places exactly the tasks it needs.
pub fn quiet_config() -> GameConfig {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("quiet_game_config.json");
    GameConfig::from_file(&config_path).expect("quiet test config should load")
}

pub fn quiet_app() -> App {
    build_app_with_config(quiet_config())
}

/// Runs `ticks` steps, collecting every event emitted along the way.
pub fn run_ticks(app: &mut App, ticks: usize) -> Vec<GameEvent> {
    let mut events = Vec::new();
    for _ in 0..ticks {
        run_tick(app);
        events.extend(drain_game_events(app));
    }
    events
}

pub fn count<F: Fn(&GameEvent) -> bool>(events: &[GameEvent], predicate: F) -> usize {
    events.iter().filter(|event| predicate(event)).count()
}

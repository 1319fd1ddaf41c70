use std::fs;
use std::path::PathBuf;

use rush_core::config::{BUILTIN_GAME_CONFIG, GAME_CONFIG_PATH_ENV};
use rush_core::{load_game_config_from_env, GameConfig};

fn scratch_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("order_rush_{}_{name}", std::process::id()));
    fs::write(&path, contents).expect("scratch config written");
    path
}

// Both cases share one test so the process-wide variable is never raced.
#[test]
fn env_override_is_used_and_bad_files_fall_back() {
    let good = scratch_file(
        "good.json",
        r#"{ "seed": 99, "session": { "max_days": 3 }, "queue": { "time_limit_secs": 6.0 } }"#,
    );
    std::env::set_var(GAME_CONFIG_PATH_ENV, &good);
    let config = load_game_config_from_env();
    assert_eq!(config.seed, 99);
    assert_eq!(config.session.max_days, 3);
    assert_eq!(config.session.day_duration_secs, 90);
    assert_eq!(config.queue.time_limit_secs, 6.0);

    let invalid = scratch_file("invalid.json", r#"{ "clock": { "tick_ms": 0 } }"#);
    std::env::set_var(GAME_CONFIG_PATH_ENV, &invalid);
    assert_eq!(*load_game_config_from_env(), GameConfig::builtin());

    std::env::set_var(GAME_CONFIG_PATH_ENV, "/nonexistent/order_rush.json");
    assert_eq!(*load_game_config_from_env(), GameConfig::builtin());

    std::env::remove_var(GAME_CONFIG_PATH_ENV);
    let _ = fs::remove_file(good);
    let _ = fs::remove_file(invalid);
}

#[test]
fn builtin_config_matches_defaults() {
    let parsed = GameConfig::from_json_str(BUILTIN_GAME_CONFIG).expect("builtin parses");
    assert_eq!(parsed, GameConfig::default());
}

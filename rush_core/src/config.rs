use std::{
    env, fs, io,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
    sync::Arc,
};

use bevy::prelude::Resource;
use serde::Deserialize;
use thiserror::Error;

pub const BUILTIN_GAME_CONFIG: &str = include_str!("data/game_config.json");
pub const GAME_CONFIG_PATH_ENV: &str = "ORDER_RUSH_CONFIG_PATH";

/// Tuning constants for a session. The builtin values are the game's fixed
/// rules; overriding them is meant for tests and tooling.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub seed: u64,
    pub clock: ClockConfig,
    pub session: SessionConfig,
    pub spawn: SpawnConfig,
    pub queue: QueueConfig,
    pub ledger: LedgerConfig,
    pub server: ServerConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 20240611,
            clock: ClockConfig::default(),
            session: SessionConfig::default(),
            spawn: SpawnConfig::default(),
            queue: QueueConfig::default(),
            ledger: LedgerConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Fixed simulation step; also the spawn-check period.
    pub tick_ms: u64,
    pub day_tick_ms: u64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            tick_ms: 100,
            day_tick_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub day_duration_secs: u32,
    pub max_days: u32,
    pub chaos_fraction: f32,
    pub game_over_delay_ms: u64,
    pub next_day_delay_ms: u64,
}

impl SessionConfig {
    pub fn chaos_starts_at_secs(&self) -> u32 {
        // Nudge before flooring so 90 * 0.7 lands on 63 despite f32 rounding.
        (self.day_duration_secs as f32 * self.chaos_fraction + 1e-4).floor() as u32
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            day_duration_secs: 90,
            max_days: 90,
            chaos_fraction: 0.7,
            game_over_delay_ms: 1400,
            next_day_delay_ms: 3000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub base_rate: f32,
    pub chaos_base_rate: f32,
    pub rate_floor: f32,
    pub chaos_rate_floor: f32,
    pub rate_decay_per_sec: f32,
    pub spawn_threshold: f32,
    pub urgent_chance: f64,
    pub chaos_urgent_chance: f64,
    pub time_limit_min_secs: f32,
    pub time_limit_max_secs: f32,
    pub urgent_time_multiplier: f32,
    pub chaos_time_multiplier: f32,
    pub position_margin: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            base_rate: 1600.0,
            chaos_base_rate: 800.0,
            rate_floor: 800.0,
            chaos_rate_floor: 400.0,
            rate_decay_per_sec: 10.0,
            spawn_threshold: 100.0,
            urgent_chance: 0.1,
            chaos_urgent_chance: 0.3,
            time_limit_min_secs: 3.0,
            time_limit_max_secs: 8.0,
            urgent_time_multiplier: 0.7,
            chaos_time_multiplier: 0.8,
            position_margin: 15.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    pub time_limit_secs: f32,
    pub resolution_time_limit_secs: f32,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            time_limit_secs: 12.0,
            resolution_time_limit_secs: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub stress_max: f32,
    pub board_timeout_stress: f32,
    pub severe_board_timeout_stress: f32,
    pub success_score: i64,
    pub success_stress_relief: f32,
    pub failure_score_penalty: i64,
    pub failure_stress: f32,
    pub queue_timeout_score_penalty: i64,
    pub queue_timeout_stress: f32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            stress_max: 100.0,
            board_timeout_stress: 15.0,
            severe_board_timeout_stress: 25.0,
            success_score: 1,
            success_stress_relief: 2.0,
            failure_score_penalty: 2,
            failure_stress: 8.0,
            queue_timeout_score_penalty: 2,
            queue_timeout_stress: 8.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub command_bind: SocketAddr,
    pub event_bind: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            command_bind: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 42001),
            event_bind: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 42002),
        }
    }
}

#[derive(Debug, Error)]
pub enum GameConfigError {
    #[error("failed to parse game config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read game config from {path:?}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid game config: {0}")]
    Invalid(String),
}

impl GameConfig {
    pub fn builtin() -> Self {
        serde_json::from_str(BUILTIN_GAME_CONFIG).expect("builtin game config should parse")
    }

    pub fn from_json_str(json: &str) -> Result<Self, GameConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, GameConfigError> {
        let contents =
            fs::read_to_string(path).map_err(|source| GameConfigError::ReadFailed {
                path: path.to_path_buf(),
                source,
            })?;
        GameConfig::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<(), GameConfigError> {
        let invalid = |msg: &str| Err(GameConfigError::Invalid(msg.to_string()));
        if self.clock.tick_ms == 0 {
            return invalid("clock.tick_ms must be positive");
        }
        if self.clock.day_tick_ms < self.clock.tick_ms {
            return invalid("clock.day_tick_ms must be at least one tick");
        }
        if self.session.max_days == 0 || self.session.day_duration_secs == 0 {
            return invalid("session needs at least one day of positive length");
        }
        if !(0.0..=1.0).contains(&self.session.chaos_fraction) {
            return invalid("session.chaos_fraction must be within [0, 1]");
        }
        if self.spawn.rate_floor <= 0.0 || self.spawn.chaos_rate_floor <= 0.0 {
            return invalid("spawn rate floors must be positive");
        }
        if self.spawn.time_limit_min_secs <= 0.0
            || self.spawn.time_limit_min_secs >= self.spawn.time_limit_max_secs
        {
            return invalid("spawn time limits must satisfy 0 < min < max");
        }
        if !(0.0..50.0).contains(&self.spawn.position_margin) {
            return invalid("spawn.position_margin must be within [0, 50)");
        }
        if self.queue.time_limit_secs <= 0.0 || self.queue.resolution_time_limit_secs <= 0.0 {
            return invalid("queue time limits must be positive");
        }
        if self.ledger.stress_max <= 0.0 {
            return invalid("ledger.stress_max must be positive");
        }
        Ok(())
    }
}

/// Shared, immutable configuration for the running app.
#[derive(Resource, Debug, Clone)]
pub struct GameConfigHandle(Arc<GameConfig>);

impl GameConfigHandle {
    pub fn new(config: Arc<GameConfig>) -> Self {
        Self(config)
    }

    pub fn get(&self) -> Arc<GameConfig> {
        self.0.clone()
    }
}

impl Default for GameConfigHandle {
    fn default() -> Self {
        Self::new(Arc::new(GameConfig::builtin()))
    }
}

pub fn load_game_config_from_env() -> Arc<GameConfig> {
    if let Some(path) = env::var(GAME_CONFIG_PATH_ENV).ok().map(PathBuf::from) {
        match GameConfig::from_file(&path) {
            Ok(config) => {
                tracing::info!(
                    target: "order_rush::config",
                    path = %path.display(),
                    "game_config.loaded"
                );
                return Arc::new(config);
            }
            Err(err) => {
                tracing::warn!(
                    target: "order_rush::config",
                    path = %path.display(),
                    error = %err,
                    "game_config.load_failed"
                );
            }
        }
    }

    Arc::new(GameConfig::builtin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_matches_defaults() {
        let builtin = GameConfig::builtin();
        assert_eq!(builtin, GameConfig::default());
        assert!(builtin.validate().is_ok());
        assert_eq!(builtin.session.chaos_starts_at_secs(), 63);
    }

    #[test]
    fn partial_override_keeps_remaining_defaults() {
        let config = GameConfig::from_json_str(r#"{"session": {"max_days": 3}}"#)
            .expect("partial config should parse");
        assert_eq!(config.session.max_days, 3);
        assert_eq!(config.session.day_duration_secs, 90);
        assert_eq!(config.queue.time_limit_secs, 12.0);
    }

    #[test]
    fn rejects_inverted_time_limits() {
        let err = GameConfig::from_json_str(
            r#"{"spawn": {"time_limit_min_secs": 9.0, "time_limit_max_secs": 4.0}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, GameConfigError::Invalid(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = GameConfig::from_file(Path::new("/nonexistent/order_rush.json")).unwrap_err();
        match err {
            GameConfigError::ReadFailed { path, .. } => {
                assert!(path.ends_with("order_rush.json"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

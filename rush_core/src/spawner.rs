//! Spawn-rate curve and randomized task attributes.

use rand::Rng;
use rush_runtime::{TaskCategory, TaskId};

use crate::{
    board::{BoardTask, TaskPosition},
    config::SpawnConfig,
};

/// Denominator of the spawn roll. Shrinks as the day goes on and in chaos
/// mode, never below the configured floor.
pub fn adjusted_rate(config: &SpawnConfig, day_elapsed_secs: u32, chaos_mode: bool) -> f32 {
    let (base, floor) = if chaos_mode {
        (config.chaos_base_rate, config.chaos_rate_floor)
    } else {
        (config.base_rate, config.rate_floor)
    };
    (base - day_elapsed_secs as f32 * config.rate_decay_per_sec).max(floor)
}

/// Probability that a single check spawns a task.
pub fn spawn_probability(config: &SpawnConfig, day_elapsed_secs: u32, chaos_mode: bool) -> f32 {
    let rate = adjusted_rate(config, day_elapsed_secs, chaos_mode);
    (config.spawn_threshold / rate).clamp(0.0, 1.0)
}

pub fn should_spawn<R: Rng + ?Sized>(
    rng: &mut R,
    config: &SpawnConfig,
    day_elapsed_secs: u32,
    chaos_mode: bool,
) -> bool {
    let rate = adjusted_rate(config, day_elapsed_secs, chaos_mode);
    rng.gen_range(0.0..rate) < config.spawn_threshold
}

pub fn time_limit_secs(config: &SpawnConfig, rolled: f32, urgent: bool, chaos_mode: bool) -> f32 {
    let mut limit = rolled;
    if urgent {
        limit *= config.urgent_time_multiplier;
    }
    if chaos_mode {
        limit *= config.chaos_time_multiplier;
    }
    limit
}

pub fn roll_task<R: Rng + ?Sized>(
    rng: &mut R,
    config: &SpawnConfig,
    id: TaskId,
    now_ms: u64,
    chaos_mode: bool,
) -> BoardTask {
    let category = TaskCategory::ALL[rng.gen_range(0..TaskCategory::COUNT)];
    let urgent_chance = if chaos_mode {
        config.chaos_urgent_chance
    } else {
        config.urgent_chance
    };
    let urgent = rng.gen_bool(urgent_chance.clamp(0.0, 1.0));
    let rolled = rng.gen_range(config.time_limit_min_secs..config.time_limit_max_secs);
    let margin = config.position_margin;
    let position = TaskPosition {
        x: rng.gen_range(margin..=100.0 - margin),
        y: rng.gen_range(margin..=100.0 - margin),
    };

    BoardTask::new(
        id,
        category,
        position,
        time_limit_secs(config, rolled, urgent, chaos_mode),
        urgent,
        now_ms,
    )
}

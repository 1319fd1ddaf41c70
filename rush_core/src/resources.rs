use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rush_runtime::TaskId;

/// Gameplay clock. Only advances while a day is running and the session is
/// not paused, so every task timer measured against it freezes with it.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameClock {
    play_ms: u64,
    ticks: u64,
}

impl GameClock {
    pub fn now_ms(&self) -> u64 {
        self.play_ms
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn advance(&mut self, step_ms: u64) {
        self.play_ms = self.play_ms.saturating_add(step_ms);
        self.ticks = self.ticks.wrapping_add(1);
    }
}

/// Deterministic random source for spawn decisions.
#[derive(Resource, Debug, Clone)]
pub struct SessionRng(pub ChaCha8Rng);

impl SessionRng {
    pub fn from_seed(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }
}

/// Hands out monotonic task ids; never reset within a process so ids stay
/// unique across days and restarted sessions.
#[derive(Resource, Default, Debug, Clone)]
pub struct TaskIdAllocator {
    next: u64,
}

impl TaskIdAllocator {
    pub fn allocate(&mut self) -> TaskId {
        let id = TaskId(self.next);
        self.next += 1;
        id
    }
}

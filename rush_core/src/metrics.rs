use bevy::prelude::*;
use serde::Serialize;

use crate::events::{BoardRemoval, GameEvent, QueueRemoval};

#[derive(Resource, Default, Debug, Clone, PartialEq, Serialize)]
pub struct SessionMetrics {
    pub tasks_spawned: u32,
    pub board_timeouts: u32,
    pub tasks_queued: u32,
    pub resolutions_succeeded: u32,
    pub resolutions_failed: u32,
    pub queue_timeouts: u32,
    pub days_completed: u32,
    pub peak_stress: f32,
}

impl SessionMetrics {
    fn observe(&mut self, event: &GameEvent) {
        match event {
            GameEvent::TaskSpawned { .. } => self.tasks_spawned += 1,
            GameEvent::BoardTaskRemoved {
                reason: BoardRemoval::TimedOut,
                ..
            } => self.board_timeouts += 1,
            GameEvent::TaskQueued { .. } => self.tasks_queued += 1,
            GameEvent::QueueTaskRemoved { reason, .. } => match reason {
                QueueRemoval::Resolved => self.resolutions_succeeded += 1,
                QueueRemoval::Failed => self.resolutions_failed += 1,
                QueueRemoval::TimedOut => self.queue_timeouts += 1,
                QueueRemoval::Cleared => {}
            },
            GameEvent::LedgerChanged { stress, .. } => {
                self.peak_stress = self.peak_stress.max(*stress);
            }
            GameEvent::DayCompleted { .. } => self.days_completed += 1,
            // A fresh day one means a restarted session.
            GameEvent::DayStarted { day: 1 } => *self = SessionMetrics::default(),
            _ => {}
        }
    }
}

pub fn collect_metrics(mut events: EventReader<GameEvent>, mut metrics: ResMut<SessionMetrics>) {
    for event in events.read() {
        metrics.observe(event);
    }
}

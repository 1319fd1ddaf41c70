use std::collections::BTreeMap;

use bevy::prelude::Resource;
use rush_runtime::{TaskCategory, TaskId};
use serde::Serialize;

/// Placement on the play area as percentages of its width and height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TaskPosition {
    pub x: f32,
    pub y: f32,
}

/// A clickable task on the board.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardTask {
    pub id: TaskId,
    pub category: TaskCategory,
    pub position: TaskPosition,
    pub time_limit_secs: f32,
    pub urgent: bool,
    pub clicks_required: u8,
    pub clicks: u8,
    pub created_at_ms: u64,
}

impl BoardTask {
    pub fn new(
        id: TaskId,
        category: TaskCategory,
        position: TaskPosition,
        time_limit_secs: f32,
        urgent: bool,
        created_at_ms: u64,
    ) -> Self {
        Self {
            id,
            category,
            position,
            time_limit_secs,
            urgent,
            clicks_required: category.clicks_required(),
            clicks: 0,
            created_at_ms,
        }
    }

    pub fn expires_at_ms(&self) -> u64 {
        self.created_at_ms + secs_to_ms(self.time_limit_secs)
    }

    pub fn time_left_secs(&self, now_ms: u64) -> f32 {
        let remaining = self.expires_at_ms().saturating_sub(now_ms);
        remaining as f32 / 1000.0
    }
}

pub(crate) fn secs_to_ms(secs: f32) -> u64 {
    (secs.max(0.0) * 1000.0).round() as u64
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// Click registered but more are required.
    Counted { clicks: u8, clicks_required: u8 },
    /// Click threshold reached; the task has left the board.
    Completed(BoardTask),
}

/// Tasks currently visible on the board, ordered by id.
#[derive(Resource, Default, Debug, Clone)]
pub struct TaskBoard {
    tasks: BTreeMap<TaskId, BoardTask>,
}

impl TaskBoard {
    /// Returns `false` without replacing anything when the id is already live.
    pub fn insert(&mut self, task: BoardTask) -> bool {
        if self.tasks.contains_key(&task.id) {
            return false;
        }
        self.tasks.insert(task.id, task);
        true
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.tasks.contains_key(&id)
    }

    pub fn get(&self, id: TaskId) -> Option<&BoardTask> {
        self.tasks.get(&id)
    }

    pub fn remove(&mut self, id: TaskId) -> Option<BoardTask> {
        self.tasks.remove(&id)
    }

    pub fn click(&mut self, id: TaskId) -> Option<ClickOutcome> {
        let task = self.tasks.get_mut(&id)?;
        task.clicks = task.clicks.saturating_add(1);
        if task.clicks < task.clicks_required {
            return Some(ClickOutcome::Counted {
                clicks: task.clicks,
                clicks_required: task.clicks_required,
            });
        }
        self.tasks.remove(&id).map(ClickOutcome::Completed)
    }

    /// Empties the board, returning the removed tasks in id order.
    pub fn clear(&mut self) -> Vec<BoardTask> {
        std::mem::take(&mut self.tasks).into_values().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoardTask> {
        self.tasks.values()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

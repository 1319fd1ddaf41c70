use bevy::prelude::Resource;
use rush_runtime::{TaskCategory, TaskId};
use serde::Serialize;
use thiserror::Error;

use crate::board::secs_to_ms;

/// A task waiting for its resolution mini-interaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueuedTask {
    pub id: TaskId,
    pub category: TaskCategory,
    pub time_limit_secs: f32,
    pub enqueued_at_ms: u64,
}

impl QueuedTask {
    pub fn new(id: TaskId, category: TaskCategory, time_limit_secs: f32, now_ms: u64) -> Self {
        Self {
            id,
            category,
            time_limit_secs,
            enqueued_at_ms: now_ms,
        }
    }

    pub fn expires_at_ms(&self) -> u64 {
        self.enqueued_at_ms + secs_to_ms(self.time_limit_secs)
    }

    /// Recomputed from the enqueue time on every call.
    pub fn time_left_secs(&self, now_ms: u64) -> f32 {
        let elapsed = now_ms.saturating_sub(self.enqueued_at_ms) as f32 / 1000.0;
        (self.time_limit_secs - elapsed).max(0.0)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("task {0} is already queued")]
    Duplicate(TaskId),
    #[error("task {0} is not queued")]
    NotQueued(TaskId),
    #[error("task {open} is already open for resolution (requested {requested})")]
    ResolutionBusy { open: TaskId, requested: TaskId },
    #[error("task {0} has no open resolution")]
    NotOpen(TaskId),
}

/// Tasks moved off the board, in arrival order.
///
/// At most one task across the whole queue is open for resolution.
#[derive(Resource, Default, Debug, Clone)]
pub struct TaskQueue {
    tasks: Vec<QueuedTask>,
    open: Option<TaskId>,
}

impl TaskQueue {
    pub fn enqueue(&mut self, task: QueuedTask) -> Result<(), QueueError> {
        if self.contains(task.id) {
            return Err(QueueError::Duplicate(task.id));
        }
        self.tasks.push(task);
        Ok(())
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.tasks.iter().any(|task| task.id == id)
    }

    pub fn get(&self, id: TaskId) -> Option<&QueuedTask> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn time_left_secs(&self, id: TaskId, now_ms: u64) -> Option<f32> {
        self.get(id).map(|task| task.time_left_secs(now_ms))
    }

    pub fn open_task(&self) -> Option<TaskId> {
        self.open
    }

    pub fn open(&mut self, id: TaskId) -> Result<&QueuedTask, QueueError> {
        if let Some(open) = self.open {
            return Err(QueueError::ResolutionBusy {
                open,
                requested: id,
            });
        }
        let index = self.index_of(id).ok_or(QueueError::NotQueued(id))?;
        self.open = Some(id);
        Ok(&self.tasks[index])
    }

    /// Removes a task whose resolution produced an outcome.
    ///
    /// Only the open task can be resolved.
    pub fn resolve(&mut self, id: TaskId) -> Result<QueuedTask, QueueError> {
        let index = self.index_of(id).ok_or(QueueError::NotQueued(id))?;
        match self.open {
            None => return Err(QueueError::NotOpen(id)),
            Some(open) if open != id => {
                return Err(QueueError::ResolutionBusy {
                    open,
                    requested: id,
                })
            }
            Some(_) => {}
        }
        self.open = None;
        Ok(self.tasks.remove(index))
    }

    /// Removes a task regardless of the open marker. The flag reports
    /// whether it was the open one, in which case the marker is cleared.
    pub fn remove(&mut self, id: TaskId) -> Option<(QueuedTask, bool)> {
        let index = self.index_of(id)?;
        let was_open = self.open == Some(id);
        if was_open {
            self.open = None;
        }
        Some((self.tasks.remove(index), was_open))
    }

    pub fn clear(&mut self) -> Vec<QueuedTask> {
        self.open = None;
        std::mem::take(&mut self.tasks)
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueuedTask> {
        self.tasks.iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    fn index_of(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }
}

//! Single timer table for every per-task countdown.
//!
//! Each live countdown is one `(TaskId, TimerPurpose) -> expires_at` entry.
//! Removing a task from its collection must cancel its entries; draining
//! removes fired entries in the same step so a timer can fire at most once.

use std::collections::BTreeMap;

use bevy::prelude::Resource;
use rush_runtime::TaskId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerPurpose {
    BoardExpiry,
    QueueExpiry,
    ResolutionExpiry,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerKey {
    pub task: TaskId,
    pub purpose: TimerPurpose,
}

impl TimerKey {
    pub fn new(task: TaskId, purpose: TimerPurpose) -> Self {
        Self { task, purpose }
    }
}

#[derive(Resource, Default, Debug, Clone)]
pub struct TimerSchedule {
    entries: BTreeMap<TimerKey, u64>,
}

impl TimerSchedule {
    /// Arms (or re-arms) a timer.
    pub fn schedule(&mut self, task: TaskId, purpose: TimerPurpose, expires_at_ms: u64) {
        self.entries
            .insert(TimerKey::new(task, purpose), expires_at_ms);
    }

    pub fn cancel(&mut self, task: TaskId, purpose: TimerPurpose) -> bool {
        self.entries
            .remove(&TimerKey::new(task, purpose))
            .is_some()
    }

    /// Cancels every timer owned by `task`.
    pub fn cancel_task(&mut self, task: TaskId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| key.task != task);
        before - self.entries.len()
    }

    pub fn cancel_purpose(&mut self, purpose: TimerPurpose) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| key.purpose != purpose);
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn expires_at(&self, task: TaskId, purpose: TimerPurpose) -> Option<u64> {
        self.entries.get(&TimerKey::new(task, purpose)).copied()
    }

    pub fn is_armed(&self, task: TaskId, purpose: TimerPurpose) -> bool {
        self.entries.contains_key(&TimerKey::new(task, purpose))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes and returns every entry due at `now_ms`, earliest first.
    pub fn drain_expired(&mut self, now_ms: u64) -> Vec<TimerKey> {
        let mut fired: Vec<(u64, TimerKey)> = self
            .entries
            .iter()
            .filter(|(_, expires_at)| **expires_at <= now_ms)
            .map(|(key, &expires_at)| (expires_at, *key))
            .collect();
        fired.sort_unstable();
        for (_, key) in &fired {
            self.entries.remove(key);
        }
        fired.into_iter().map(|(_, key)| key).collect()
    }
}

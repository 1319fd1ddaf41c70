use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const TASK_PREFIX: &str = "task-";

/// Identifier shared by a task on the board and its queued successor.
///
/// Ids are allocated monotonically for the lifetime of a session and are
/// rendered as `task-N` on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct TaskId(pub u64);

impl TaskId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", TASK_PREFIX, self.0)
    }
}

#[derive(Debug, Error)]
#[error("invalid task id '{value}': {source}")]
pub struct TaskIdParseError {
    value: String,
    #[source]
    source: ParseIntError,
}

impl FromStr for TaskId {
    type Err = TaskIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix(TASK_PREFIX).unwrap_or(trimmed);
        digits
            .parse::<u64>()
            .map(TaskId)
            .map_err(|source| TaskIdParseError {
                value: s.to_string(),
                source,
            })
    }
}

impl From<TaskId> for String {
    fn from(id: TaskId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for TaskId {
    type Error = TaskIdParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

use bevy::prelude::Event;
use rush_runtime::{CommandPayload, ResolutionKind, TaskCategory, TaskId};
use serde::Serialize;

use crate::{
    board::BoardTask,
    ledger::LedgerTransition,
    session::{DayOutcome, GameOverReason},
};

/// Input from the presentation layer, applied at the start of the next tick.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    /// Clicks a board task, or opens a queued one.
    Click(TaskId),
    Open(TaskId),
    Resolve { task: TaskId, success: bool },
    Pause,
    Resume,
    AdvanceDay,
    QuitToMenu,
    Restart,
}

impl From<CommandPayload> for PlayerCommand {
    fn from(payload: CommandPayload) -> Self {
        match payload {
            CommandPayload::Click { task } => PlayerCommand::Click(task),
            CommandPayload::Open { task } => PlayerCommand::Open(task),
            CommandPayload::Resolve { task, success } => PlayerCommand::Resolve { task, success },
            CommandPayload::Pause => PlayerCommand::Pause,
            CommandPayload::Resume => PlayerCommand::Resume,
            CommandPayload::AdvanceDay => PlayerCommand::AdvanceDay,
            CommandPayload::QuitToMenu => PlayerCommand::QuitToMenu,
            CommandPayload::Restart => PlayerCommand::Restart,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardRemoval {
    Clicked,
    TimedOut,
    Cleared,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueRemoval {
    Resolved,
    Failed,
    TimedOut,
    Cleared,
}

/// Everything observable about a session, in the order it happened.
#[derive(Event, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    TaskSpawned {
        task: BoardTask,
    },
    BoardTaskClicked {
        id: TaskId,
        clicks: u8,
        clicks_required: u8,
    },
    BoardTaskRemoved {
        id: TaskId,
        category: TaskCategory,
        reason: BoardRemoval,
    },
    TaskQueued {
        id: TaskId,
        category: TaskCategory,
        time_limit_secs: f32,
    },
    QueueTaskRemoved {
        id: TaskId,
        category: TaskCategory,
        reason: QueueRemoval,
    },
    ResolutionOpened {
        id: TaskId,
        kind: ResolutionKind,
        time_limit_secs: f32,
    },
    ResolutionClosed {
        id: TaskId,
        success: bool,
        forced: bool,
    },
    LedgerChanged {
        transition: LedgerTransition,
        score: i64,
        stress: f32,
        score_delta: i64,
        stress_delta: f32,
    },
    DayTick {
        day: u32,
        elapsed_secs: u32,
    },
    ChaosModeActivated {
        day: u32,
    },
    DayCompleted {
        day: u32,
        day_score: i64,
        outcome: DayOutcome,
    },
    DayStarted {
        day: u32,
    },
    Paused,
    Resumed,
    GameOver {
        final_score: i64,
        reason: GameOverReason,
    },
}

use thiserror::Error;

use crate::ids::{TaskId, TaskIdParseError};

/// Commands accepted from the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandPayload {
    Click { task: TaskId },
    Open { task: TaskId },
    Resolve { task: TaskId, success: bool },
    Pause,
    Resume,
    AdvanceDay,
    QuitToMenu,
    Restart,
}

#[derive(Debug, Error)]
pub enum CommandParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),
    #[error(transparent)]
    InvalidTask(#[from] TaskIdParseError),
    #[error("invalid resolution outcome '{0}'")]
    InvalidOutcome(String),
}

pub fn parse_command_line(input: &str) -> Result<CommandPayload, CommandParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CommandParseError::Empty);
    }

    let mut parts = trimmed.split_whitespace();
    let verb = parts
        .next()
        .map(|v| v.to_ascii_lowercase())
        .ok_or(CommandParseError::Empty)?;

    match verb.as_str() {
        "click" | "tap" => {
            let task_str = parts
                .next()
                .ok_or(CommandParseError::MissingArgument("task"))?;
            Ok(CommandPayload::Click {
                task: task_str.parse::<TaskId>()?,
            })
        }
        "open" => {
            let task_str = parts
                .next()
                .ok_or(CommandParseError::MissingArgument("task"))?;
            Ok(CommandPayload::Open {
                task: task_str.parse::<TaskId>()?,
            })
        }
        "resolve" => {
            let task_str = parts
                .next()
                .ok_or(CommandParseError::MissingArgument("task"))?;
            let outcome_str = parts
                .next()
                .ok_or(CommandParseError::MissingArgument("outcome"))?;
            let task: TaskId = task_str.parse()?;
            let success = parse_outcome(outcome_str)?;
            Ok(CommandPayload::Resolve { task, success })
        }
        "pause" => Ok(CommandPayload::Pause),
        "resume" | "unpause" => Ok(CommandPayload::Resume),
        "advance" | "next_day" => Ok(CommandPayload::AdvanceDay),
        "quit" | "menu" => Ok(CommandPayload::QuitToMenu),
        "restart" | "new_game" => Ok(CommandPayload::Restart),
        other => Err(CommandParseError::UnknownCommand(other.to_string())),
    }
}

fn parse_outcome(token: &str) -> Result<bool, CommandParseError> {
    match token.to_ascii_lowercase().as_str() {
        "ok" | "success" | "true" | "pass" => Ok(true),
        "fail" | "failure" | "false" => Ok(false),
        other => Err(CommandParseError::InvalidOutcome(other.to_string())),
    }
}

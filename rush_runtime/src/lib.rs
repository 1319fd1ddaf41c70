//! Shared vocabulary for Order Rush.
//!
//! Holds the task identifiers, the category descriptor table and the text
//! command protocol without depending on the Bevy runtime in `rush_core`.

mod category;
mod command_text;
mod ids;

pub use category::{CategoryDescriptor, PenaltyTier, ResolutionKind, TaskCategory};
pub use command_text::{parse_command_line, CommandParseError, CommandPayload};
pub use ids::{TaskId, TaskIdParseError};

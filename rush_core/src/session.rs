use bevy::prelude::Resource;
use serde::Serialize;

use crate::config::SessionConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOverReason {
    StressMaxed,
    NegativeDayScore,
    SessionComplete,
    Quit,
}

impl GameOverReason {
    pub fn as_str(self) -> &'static str {
        match self {
            GameOverReason::StressMaxed => "stress_maxed",
            GameOverReason::NegativeDayScore => "negative_day_score",
            GameOverReason::SessionComplete => "session_complete",
            GameOverReason::Quit => "quit",
        }
    }
}

/// What happens once the day-complete screen has been shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DayOutcome {
    NextDay,
    GameOver(GameOverReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Running,
    DayComplete { outcome: DayOutcome, remaining_ms: u64 },
    GameOver { reason: GameOverReason },
}

/// Day progression and session phase.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct DaySession {
    pub current_day: u32,
    pub day_elapsed_ms: u64,
    pub day_elapsed_secs: u32,
    pub chaos_mode: bool,
    pub day_score_snapshot: i64,
    pub phase: SessionPhase,
    pub paused: bool,
}

impl Default for DaySession {
    fn default() -> Self {
        Self {
            current_day: 1,
            day_elapsed_ms: 0,
            day_elapsed_secs: 0,
            chaos_mode: false,
            day_score_snapshot: 0,
            phase: SessionPhase::Running,
            paused: false,
        }
    }
}

impl DaySession {
    pub fn is_running(&self) -> bool {
        matches!(self.phase, SessionPhase::Running)
    }

    /// Running and not paused: the only state in which gameplay timers move.
    pub fn is_live(&self) -> bool {
        self.is_running() && !self.paused
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, SessionPhase::GameOver { .. })
    }

    pub fn game_over_reason(&self) -> Option<GameOverReason> {
        match self.phase {
            SessionPhase::GameOver { reason } => Some(reason),
            _ => None,
        }
    }

    pub fn day_finished(&self, config: &SessionConfig) -> bool {
        self.day_elapsed_secs >= config.day_duration_secs
    }

    /// Decides the follow-up of a finished day from its score snapshot.
    pub fn outcome_for(&self, config: &SessionConfig) -> DayOutcome {
        if self.day_score_snapshot < 0 {
            DayOutcome::GameOver(GameOverReason::NegativeDayScore)
        } else if self.current_day >= config.max_days {
            DayOutcome::GameOver(GameOverReason::SessionComplete)
        } else {
            DayOutcome::NextDay
        }
    }

    pub fn delay_for(outcome: DayOutcome, config: &SessionConfig) -> u64 {
        match outcome {
            DayOutcome::GameOver(GameOverReason::NegativeDayScore) => config.game_over_delay_ms,
            _ => config.next_day_delay_ms,
        }
    }

    pub fn reset_day_clock(&mut self) {
        self.day_elapsed_ms = 0;
        self.day_elapsed_secs = 0;
        self.chaos_mode = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_snapshot_ends_session_even_mid_campaign() {
        let config = SessionConfig::default();
        let session = DaySession {
            current_day: 4,
            day_score_snapshot: -3,
            ..Default::default()
        };
        let outcome = session.outcome_for(&config);
        assert_eq!(
            outcome,
            DayOutcome::GameOver(GameOverReason::NegativeDayScore)
        );
        assert_eq!(DaySession::delay_for(outcome, &config), 1_400);
    }

    #[test]
    fn last_day_completes_session() {
        let config = SessionConfig::default();
        let session = DaySession {
            current_day: config.max_days,
            day_score_snapshot: 12,
            ..Default::default()
        };
        let outcome = session.outcome_for(&config);
        assert_eq!(
            outcome,
            DayOutcome::GameOver(GameOverReason::SessionComplete)
        );
        assert_eq!(DaySession::delay_for(outcome, &config), 3_000);
    }

    #[test]
    fn zero_score_advances() {
        let config = SessionConfig::default();
        let session = DaySession::default();
        assert_eq!(session.outcome_for(&config), DayOutcome::NextDay);
    }
}

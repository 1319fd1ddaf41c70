use bevy::prelude::Resource;
use rush_runtime::PenaltyTier;
use serde::Serialize;

use crate::config::LedgerConfig;

/// Events that move score or stress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerTransition {
    BoardTimeout { tier: PenaltyTier },
    ResolutionSucceeded,
    ResolutionFailed,
    QueueTimeout,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedgerChange {
    pub transition: LedgerTransition,
    pub score_delta: i64,
    /// Applied delta after clamping, not the nominal rule value.
    pub stress_delta: f32,
    pub score: i64,
    pub stress: f32,
    pub saturated: bool,
}

/// Score and stress for the session.
///
/// Stress is held in `[0, stress_max]`. Once it saturates the ledger locks
/// and every later transition is ignored.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    score: i64,
    stress: f32,
    locked: bool,
}

impl Ledger {
    pub fn new(score: i64, stress: f32) -> Self {
        Self {
            score,
            stress: stress.max(0.0),
            locked: false,
        }
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn stress(&self) -> f32 {
        self.stress
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn apply(
        &mut self,
        transition: LedgerTransition,
        rules: &LedgerConfig,
    ) -> Option<LedgerChange> {
        if self.locked {
            return None;
        }
        let (score_delta, stress_delta) = nominal_deltas(transition, rules);

        let previous_stress = self.stress;
        self.score += score_delta;
        self.stress = (self.stress + stress_delta).clamp(0.0, rules.stress_max);
        let saturated = self.stress >= rules.stress_max;
        if saturated {
            self.locked = true;
        }

        Some(LedgerChange {
            transition,
            score_delta,
            stress_delta: self.stress - previous_stress,
            score: self.score,
            stress: self.stress,
            saturated,
        })
    }
}

fn nominal_deltas(transition: LedgerTransition, rules: &LedgerConfig) -> (i64, f32) {
    match transition {
        LedgerTransition::BoardTimeout {
            tier: PenaltyTier::Standard,
        } => (0, rules.board_timeout_stress),
        LedgerTransition::BoardTimeout {
            tier: PenaltyTier::Severe,
        } => (0, rules.severe_board_timeout_stress),
        LedgerTransition::ResolutionSucceeded => {
            (rules.success_score, -rules.success_stress_relief)
        }
        LedgerTransition::ResolutionFailed => {
            (-rules.failure_score_penalty, rules.failure_stress)
        }
        LedgerTransition::QueueTimeout => (
            -rules.queue_timeout_score_penalty,
            rules.queue_timeout_stress,
        ),
    }
}

use thiserror::Error;

use crate::scoring::traits::{Base, PlayId, RunnerSlot};

/// Every way the engine refuses to produce a game state. None of these are
/// retried; they are surfaced to whoever handed us the input.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum ScoringError {
    #[error("Unrecognized outcome: {0:?}")]
    InvalidOutcome(String),

    #[error("No runner decision supplied for {slot}")]
    MissingRunnerDecision { slot: RunnerSlot },

    #[error("Illegal decision for {slot}: {reason}")]
    IllegalRunnerDecision {
        slot: RunnerSlot,
        reason: &'static str,
    },

    #[error("Runner decisions put two runners on {base}")]
    ConflictingRunnerDecision { base: Base },

    #[error("Inconsistent play log at play {play_id}: {reason}")]
    InconsistentLog { play_id: PlayId, reason: String },

    #[error("Cannot derive a batting order from an empty roster")]
    RosterEmpty,
}

impl ScoringError {
    pub(crate) fn inconsistent(play_id: PlayId, reason: impl Into<String>) -> Self {
        Self::InconsistentLog {
            play_id,
            reason: reason.into(),
        }
    }
}

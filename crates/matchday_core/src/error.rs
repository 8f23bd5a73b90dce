use thiserror::Error;

use crate::models::{MatchId, MatchStatus};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Reference data problem that the engine can work around (uniform
    /// weights, neutral outcome set, generic commentary).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Broken reference data or state that makes the current match
    /// unplayable. The match is moved to `Error`.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Persisted seed/turn/draw counters disagree with the stored event log.
    #[error("Resume mismatch for match {match_id}: {reason}")]
    ResumeMismatch { match_id: MatchId, reason: String },

    /// Stats and standings were already applied for this match.
    #[error("Match {0} has already been finalized")]
    AlreadyFinalized(MatchId),

    #[error("Invalid transition for match {match_id}: {from:?} cannot {action}")]
    InvalidTransition { match_id: MatchId, from: MatchStatus, action: &'static str },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Worker pool error: {0}")]
    WorkerPool(String),
}

impl EngineError {
    /// Whether the engine can keep simulating after this error.
    pub fn is_recoverable(&self) -> bool {
        match self {
            EngineError::Config(_) => true,
            EngineError::InvalidInput(_) => true,
            EngineError::WorkerPool(_) => true,
            EngineError::InvariantViolation(_) => false,
            EngineError::ResumeMismatch { .. } => false,
            EngineError::AlreadyFinalized(_) => false,
            EngineError::InvalidTransition { .. } => false,
        }
    }

    /// Errors that put the affected match into `MatchStatus::Error`.
    pub fn is_fatal_for_match(&self) -> bool {
        matches!(self, EngineError::InvariantViolation(_) | EngineError::ResumeMismatch { .. })
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

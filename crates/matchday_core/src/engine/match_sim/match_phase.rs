//! Period flow: regulation, extra time, penalty shootout.

use crate::engine::config::EngineConfig;
use crate::models::{Fixture, MatchRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    Regulation,
    ExtraTime,
    PenaltyShootout,
    Finished,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PhaseConfig {
    pub allow_extra_time: bool,
    pub allow_penalty_shootout: bool,
}

impl PhaseConfig {
    /// Elimination ties (and second legs) need a winner; first legs and
    /// league fixtures never go past regulation.
    pub fn for_fixture(fixture: &Fixture, config: &EngineConfig) -> Self {
        let decider = fixture.needs_decider();
        Self {
            allow_extra_time: decider && config.extra_time_minutes > 0,
            allow_penalty_shootout: decider,
        }
    }
}

/// Phase the record is currently playing.
pub fn current_phase(record: &MatchRecord) -> MatchPhase {
    if record.shootout.is_some() || record.status.is_terminal() {
        MatchPhase::Finished
    } else if record.granted_extra_minutes > 0 {
        MatchPhase::ExtraTime
    } else {
        MatchPhase::Regulation
    }
}

/// Advance to the next phase after a period ends.
///
/// `is_level` should reflect the deciding score (aggregate for second legs).
pub fn next_phase(current: MatchPhase, config: PhaseConfig, is_level: bool) -> MatchPhase {
    match current {
        MatchPhase::Regulation => {
            if !is_level {
                MatchPhase::Finished
            } else if config.allow_extra_time {
                MatchPhase::ExtraTime
            } else if config.allow_penalty_shootout {
                MatchPhase::PenaltyShootout
            } else {
                MatchPhase::Finished
            }
        }
        MatchPhase::ExtraTime => {
            if is_level && config.allow_penalty_shootout {
                MatchPhase::PenaltyShootout
            } else {
                MatchPhase::Finished
            }
        }
        MatchPhase::PenaltyShootout => MatchPhase::Finished,
        MatchPhase::Finished => MatchPhase::Finished,
    }
}

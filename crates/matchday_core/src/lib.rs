//! # matchday_core - Turn-Based Football Match Simulation Engine
//!
//! Takes a scheduled fixture and two frozen team sheets and plays the match
//! out as a sequence of probabilistically selected events, then folds the
//! result into player statistics and competition standings.
//!
//! ## Features
//! - Deterministic: the same seed always produces the same event log
//! - Resumable after any turn, from any process (`MatchRecord` is plain data)
//! - Attribute-weighted event selection driven by YAML reference tables
//! - Extra time and penalty shootouts for elimination ties
//! - Exactly-once stats and standings finalization
//!
//! ## Flow
//!
//! ```text
//! Fixture + TeamSheets
//!      │
//!      ▼
//! MatchEngine::kick_off ──► MatchSession::advance_turn (EventSelector → Outcome → Commentary)
//!      │                        │ period end: extra time / shootout
//!      ▼                        ▼
//! MatchRecord (Finished) ──► Ledgers::apply_result (player stats + standings)
//! ```

// Engine APIs pass whole contexts around; splitting them hurts readability.
#![allow(clippy::too_many_arguments)]

pub mod data;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod models;
pub mod runner;
pub mod save;

pub use data::SimulationTables;
pub use engine::config::EngineConfig;
pub use engine::match_sim::{
    CancelFlag, MatchEngine, MatchSession, PhaseChange, RunOutcome, TurnReport,
};
pub use error::{EngineError, Result};
pub use ledger::{FinalizationReport, Ledgers};
pub use models::{
    Attribute, AttributeSet, CompetitionId, CompetitionScope, EventKind, Fixture, Leg,
    MatchEvent, MatchId, MatchRecord, MatchSheets, MatchStatus, Outcome, Penalty, PlayerId,
    PlayerSnapshot, Position, Score, SeasonId, Side, TeamId, TeamSheet,
};
pub use runner::{DayRunner, MatchRunReport, MatchRunStatus, ScheduledMatch};

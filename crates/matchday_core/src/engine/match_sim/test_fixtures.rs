//! Test Fixtures Module
//!
//! Shared builders for match engine tests.
//!
//! ## Usage
//! ```rust,ignore
//! #[cfg(test)]
//! use crate::engine::match_sim::test_fixtures::*;
//! ```

use chrono::NaiveDate;

use crate::data::SimulationTables;
use crate::engine::config::EngineConfig;
use crate::engine::match_sim::MatchEngine;
use crate::models::{
    Attribute, AttributeSet, CompetitionId, CompetitionScope, Fixture, Leg, MatchId, MatchRecord,
    MatchSheets, PlayerId, PlayerSnapshot, Position, SeasonId, TeamId, TeamSheet,
};

// =============================================================================
// Team Sheet Helpers
// =============================================================================

/// Starting eleven in a 4-4-2, then a bench of seven.
const SQUAD_POSITIONS: [Position; 18] = [
    Position::GK,
    Position::DF,
    Position::DF,
    Position::DF,
    Position::DF,
    Position::MF,
    Position::MF,
    Position::MF,
    Position::MF,
    Position::FW,
    Position::FW,
    // bench
    Position::DF,
    Position::DF,
    Position::MF,
    Position::MF,
    Position::FW,
    Position::FW,
    Position::GK,
];

/// Attributes around `base`, with the usual strengths per position.
pub fn position_attributes(position: Position, base: u8) -> AttributeSet {
    let up = |delta: u8| base.saturating_add(delta).min(100);
    let down = |delta: u8| base.saturating_sub(delta);
    let set = AttributeSet::uniform(base);
    match position {
        Position::GK => set
            .with(Attribute::Goalkeeping, up(25))
            .with(Attribute::Finishing, down(30))
            .with(Attribute::Dribbling, down(30)),
        Position::DF => set
            .with(Attribute::Tackling, up(15))
            .with(Attribute::Marking, up(15))
            .with(Attribute::Heading, up(10))
            .with(Attribute::Goalkeeping, down(40)),
        Position::MF => set
            .with(Attribute::Passing, up(15))
            .with(Attribute::Vision, up(10))
            .with(Attribute::Goalkeeping, down(40)),
        Position::FW => set
            .with(Attribute::Finishing, up(15))
            .with(Attribute::Composure, up(10))
            .with(Attribute::Pace, up(10))
            .with(Attribute::Goalkeeping, down(40)),
    }
}

/// 18-man squad with ids `team_id * 100 + i`.
///
/// Starters are indices 0..11 (0 = GK), the bench starts with an
/// outfielder and ends with the reserve goalkeeper.
pub fn create_test_sheet(team_id: TeamId, name: &str, base: u8) -> TeamSheet {
    let players: Vec<PlayerSnapshot> = SQUAD_POSITIONS
        .iter()
        .enumerate()
        .map(|(i, &position)| {
            PlayerSnapshot::new(
                PlayerId(team_id.0 * 100 + i as u32),
                format!("{} Player {}", name, i + 1),
                position,
            )
            .with_attributes(position_attributes(position, base))
        })
        .collect();

    let starting: Vec<PlayerId> = players[..11].iter().map(|p| p.id).collect();
    let bench: Vec<PlayerId> = players[11..].iter().map(|p| p.id).collect();
    let penalty_order = vec![starting[9], starting[10], starting[5], starting[6]];

    TeamSheet { team_id, name: name.to_string(), players, starting, bench, penalty_order }
}

pub fn create_test_sheets() -> MatchSheets {
    MatchSheets::new(
        create_test_sheet(TeamId(1), "Home", 60),
        create_test_sheet(TeamId(2), "Away", 60),
    )
}

// =============================================================================
// Fixture / Record Helpers
// =============================================================================

pub fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 22).unwrap()
}

pub fn create_league_fixture(match_id: u64, home: TeamId, away: TeamId) -> Fixture {
    Fixture {
        match_id: MatchId(match_id),
        home,
        away,
        competition: CompetitionId(1),
        season: SeasonId(2026),
        scope: CompetitionScope::League,
        scheduled: test_date(),
        is_elimination: false,
        leg: Leg::Single,
        stadium_capacity: 30_000,
    }
}

pub fn create_cup_fixture(match_id: u64, home: TeamId, away: TeamId, leg: Leg) -> Fixture {
    Fixture {
        competition: CompetitionId(2),
        scope: CompetitionScope::Cup,
        is_elimination: true,
        leg,
        ..create_league_fixture(match_id, home, away)
    }
}

pub fn create_test_record(seed: u64) -> MatchRecord {
    MatchRecord::new(create_league_fixture(1, TeamId(1), TeamId(2)), seed)
}

/// Plays `record` from `Scheduled` to a terminal status with the embedded
/// tables and default config.
pub fn play_out(record: &mut MatchRecord, sheets: &MatchSheets) {
    let config = EngineConfig::default();
    let engine = MatchEngine::new(SimulationTables::embedded(), &config);
    engine.kick_off(record, sheets).unwrap();
    engine.session(record, sheets).unwrap().run_to_completion().unwrap();
}

/// First seed (from `start`) whose league fixture ends level.
pub fn find_drawn_seed(sheets: &MatchSheets, start: u64) -> u64 {
    (start..start + 10_000)
        .find(|&seed| {
            let mut record = create_test_record(seed);
            play_out(&mut record, sheets);
            record.score.is_level()
        })
        .unwrap()
}

//! Competition standings.
//!
//! Rows store raw counters only; points and goal difference are derived, so
//! a table rebuilt from stored rows always ranks the same way.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::{CompetitionId, CompetitionScope, Score, SeasonId, TeamId};

pub const POINTS_FOR_WIN: u32 = 3;
pub const POINTS_FOR_DRAW: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StandingsKey {
    pub competition: CompetitionId,
    pub season: SeasonId,
    pub scope: CompetitionScope,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingsRow {
    pub team: TeamId,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
}

impl StandingsRow {
    pub fn new(team: TeamId) -> Self {
        Self { team, ..Default::default() }
    }

    pub fn points(&self) -> u32 {
        self.won * POINTS_FOR_WIN + self.drawn * POINTS_FOR_DRAW
    }

    pub fn goal_difference(&self) -> i64 {
        self.goals_for as i64 - self.goals_against as i64
    }

    fn record(&mut self, scored: u8, conceded: u8) {
        self.played += 1;
        self.goals_for += scored as u32;
        self.goals_against += conceded as u32;
        match scored.cmp(&conceded) {
            Ordering::Greater => self.won += 1,
            Ordering::Equal => self.drawn += 1,
            Ordering::Less => self.lost += 1,
        }
    }
}

/// Ranking order: points, goal difference, goals for, wins (all
/// descending), then team id ascending.
pub fn compare_rows(a: &StandingsRow, b: &StandingsRow) -> Ordering {
    b.points()
        .cmp(&a.points())
        .then_with(|| b.goal_difference().cmp(&a.goal_difference()))
        .then_with(|| b.goals_for.cmp(&a.goals_for))
        .then_with(|| b.won.cmp(&a.won))
        .then_with(|| a.team.cmp(&b.team))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingsTable {
    pub key: StandingsKey,
    rows: HashMap<TeamId, StandingsRow>,
}

impl StandingsTable {
    pub fn new(key: StandingsKey) -> Self {
        Self { key, rows: HashMap::new() }
    }

    /// Records a result by scoreline. A shootout does not change the
    /// scoreline, so a tie decided on penalties counts as a draw here.
    pub fn record_result(&mut self, home: TeamId, away: TeamId, score: Score) -> (StandingsRow, StandingsRow) {
        let home_row = self.rows.entry(home).or_insert_with(|| StandingsRow::new(home));
        home_row.record(score.home, score.away);
        let home_row = *home_row;
        let away_row = self.rows.entry(away).or_insert_with(|| StandingsRow::new(away));
        away_row.record(score.away, score.home);
        (home_row, *away_row)
    }

    pub fn row(&self, team: TeamId) -> Option<&StandingsRow> {
        self.rows.get(&team)
    }

    pub fn ranked(&self) -> Vec<StandingsRow> {
        let mut rows: Vec<StandingsRow> = self.rows.values().copied().collect();
        rows.sort_by(compare_rows);
        rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

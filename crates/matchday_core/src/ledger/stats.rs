//! Player statistics: per-match deltas folded from the event log, and the
//! season / competition aggregates they are added into.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{
    CompetitionId, EventKind, MatchId, MatchRecord, MatchSheets, Outcome, PlayerId, SeasonId, Side,
    TeamId,
};

pub const BASE_RATING: f32 = 6.0;
pub const MIN_RATING: f32 = 3.0;
pub const MAX_RATING: f32 = 10.0;

/// One player's counters for one match. Doubles as the delta added to the
/// season and competition aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerMatchStats {
    pub match_id: MatchId,
    pub player: PlayerId,
    pub team: TeamId,
    pub goals: u16,
    pub shots: u16,
    pub shots_on_target: u16,
    pub key_passes: u16,
    pub dribbles_completed: u16,
    pub tackles_won: u16,
    pub interceptions: u16,
    pub fouls: u16,
    pub yellow_cards: u16,
    pub red_cards: u16,
    pub saves: u16,
    pub sent_off: bool,
    pub rating: f32,
}

impl PlayerMatchStats {
    fn new(match_id: MatchId, player: PlayerId, team: TeamId) -> Self {
        Self {
            match_id,
            player,
            team,
            goals: 0,
            shots: 0,
            shots_on_target: 0,
            key_passes: 0,
            dribbles_completed: 0,
            tackles_won: 0,
            interceptions: 0,
            fouls: 0,
            yellow_cards: 0,
            red_cards: 0,
            saves: 0,
            sent_off: false,
            rating: BASE_RATING,
        }
    }
}

/// Rating contribution of an event to the acting player.
fn event_rating(kind: EventKind, outcome: Outcome) -> f32 {
    match (kind, outcome) {
        (_, Outcome::Goal) => 1.0,
        (_, Outcome::YellowCard) => -0.3,
        (_, Outcome::RedCard) => -1.5,
        (EventKind::Shot | EventKind::Header, Outcome::Saved) => 0.2,
        (EventKind::Shot | EventKind::Header, Outcome::OffTarget) => -0.05,
        (EventKind::Shot, Outcome::Woodwork) => 0.1,
        (EventKind::KeyPass, Outcome::Completed) => 0.15,
        (EventKind::KeyPass, Outcome::Intercepted | Outcome::Overhit) => -0.05,
        (EventKind::Dribble, Outcome::Beaten) => 0.1,
        (EventKind::Dribble, Outcome::Dispossessed) => -0.05,
        (EventKind::Cross, Outcome::Completed) => 0.1,
        (EventKind::Tackle | EventKind::Interception, Outcome::Won) => 0.15,
        (EventKind::Foul, Outcome::NoCard) => -0.1,
        _ => 0.0,
    }
}

/// Folds a finished match into one row per starter of either side.
///
/// Goalkeepers are credited with saves and debited with goals conceded;
/// every starter gets a small result bonus or malus.
pub fn fold_match(record: &MatchRecord, sheets: &MatchSheets) -> Vec<PlayerMatchStats> {
    let match_id = record.id();
    let mut rows: Vec<PlayerMatchStats> = Vec::new();
    let mut index: HashMap<(Side, PlayerId), usize> = HashMap::new();

    for side in [Side::Home, Side::Away] {
        let team = record.team(side);
        for player in sheets.side(side).starters() {
            index.insert((side, player.id), rows.len());
            rows.push(PlayerMatchStats::new(match_id, player.id, team));
        }
    }

    let keeper = |side: Side| -> Option<usize> {
        sheets
            .side(side)
            .starters()
            .find(|p| p.position.is_goalkeeper())
            .and_then(|p| index.get(&(side, p.id)).copied())
    };
    let home_keeper = keeper(Side::Home);
    let away_keeper = keeper(Side::Away);
    let keeper_of = |side: Side| match side {
        Side::Home => home_keeper,
        Side::Away => away_keeper,
    };

    for event in &record.events {
        let Some(&i) = index.get(&(event.side, event.player)) else {
            continue;
        };
        let row = &mut rows[i];
        row.rating += event_rating(event.kind, event.outcome);
        if event.outcome.is_goal() {
            row.goals += 1;
        }
        if event.kind.is_attempt() {
            row.shots += 1;
            if event.outcome.is_on_target() {
                row.shots_on_target += 1;
            }
        }
        match (event.kind, event.outcome) {
            (EventKind::KeyPass, Outcome::Completed) => row.key_passes += 1,
            (EventKind::Dribble, Outcome::Beaten) => row.dribbles_completed += 1,
            (EventKind::Tackle, Outcome::Won) => row.tackles_won += 1,
            (EventKind::Interception, Outcome::Won) => row.interceptions += 1,
            _ => {}
        }
        if event.kind == EventKind::Foul {
            row.fouls += 1;
        }
        match event.outcome {
            Outcome::YellowCard => row.yellow_cards += 1,
            Outcome::RedCard => row.red_cards += 1,
            _ => {}
        }
        if event.sends_off {
            row.sent_off = true;
            if event.outcome == Outcome::YellowCard {
                // Second booking.
                row.rating -= 1.0;
            }
        }

        if let Some(k) = keeper_of(event.side.opposite()) {
            if event.kind.is_attempt() && event.outcome == Outcome::Saved {
                rows[k].saves += 1;
                rows[k].rating += 0.25;
            } else if event.outcome.is_goal() {
                rows[k].rating -= 0.2;
            }
        }
    }

    let result_bonus = |team: TeamId| match record.score.leader() {
        Some(side) if record.team(side) == team => 0.3,
        Some(_) => -0.3,
        None => 0.0,
    };
    for row in &mut rows {
        row.rating = (row.rating + result_bonus(row.team)).clamp(MIN_RATING, MAX_RATING);
    }
    rows
}

/// Running totals for a player in one scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerAggregate {
    pub appearances: u32,
    pub goals: u32,
    pub shots: u32,
    pub shots_on_target: u32,
    pub key_passes: u32,
    pub dribbles_completed: u32,
    pub tackles_won: u32,
    pub interceptions: u32,
    pub fouls: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
    pub saves: u32,
    pub dismissals: u32,
    pub rating_total: f64,
}

impl PlayerAggregate {
    pub fn add(&mut self, delta: &PlayerMatchStats) {
        self.appearances += 1;
        self.goals += delta.goals as u32;
        self.shots += delta.shots as u32;
        self.shots_on_target += delta.shots_on_target as u32;
        self.key_passes += delta.key_passes as u32;
        self.dribbles_completed += delta.dribbles_completed as u32;
        self.tackles_won += delta.tackles_won as u32;
        self.interceptions += delta.interceptions as u32;
        self.fouls += delta.fouls as u32;
        self.yellow_cards += delta.yellow_cards as u32;
        self.red_cards += delta.red_cards as u32;
        self.saves += delta.saves as u32;
        self.dismissals += delta.sent_off as u32;
        self.rating_total += delta.rating as f64;
    }

    pub fn average_rating(&self) -> Option<f64> {
        (self.appearances > 0).then(|| self.rating_total / self.appearances as f64)
    }
}

/// Player stats across all finalized matches.
#[derive(Debug, Clone, Default)]
pub struct StatsBook {
    by_match: HashMap<MatchId, Vec<PlayerMatchStats>>,
    season: HashMap<(PlayerId, SeasonId), PlayerAggregate>,
    competition: HashMap<(PlayerId, CompetitionId, SeasonId), PlayerAggregate>,
}

impl StatsBook {
    pub fn apply(
        &mut self,
        match_id: MatchId,
        competition: CompetitionId,
        season: SeasonId,
        rows: Vec<PlayerMatchStats>,
    ) {
        for row in &rows {
            self.season.entry((row.player, season)).or_default().add(row);
            self.competition.entry((row.player, competition, season)).or_default().add(row);
        }
        self.by_match.insert(match_id, rows);
    }

    pub fn match_rows(&self, match_id: MatchId) -> Option<&[PlayerMatchStats]> {
        self.by_match.get(&match_id).map(Vec::as_slice)
    }

    pub fn season(&self, player: PlayerId, season: SeasonId) -> Option<&PlayerAggregate> {
        self.season.get(&(player, season))
    }

    pub fn competition(
        &self,
        player: PlayerId,
        competition: CompetitionId,
        season: SeasonId,
    ) -> Option<&PlayerAggregate> {
        self.competition.get(&(player, competition, season))
    }
}

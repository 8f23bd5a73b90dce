//! Match Record
//!
//! The persisted state of one match. Everything the engine needs to resume a
//! match lives here: counters, running score, possession, the seed and the
//! number of draws already consumed, plus the append-only event log.

use serde::{Deserialize, Serialize};

use super::{Actor, EventKind, Fixture, MatchEvent, MatchId, Outcome, PlayerId, Side, TeamId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Scheduled,
    InProgress,
    Paused,
    Finished,
    Error,
}

impl MatchStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, MatchStatus::Finished | MatchStatus::Error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Score {
    pub home: u8,
    pub away: u8,
}

impl Score {
    pub fn new(home: u8, away: u8) -> Self {
        Self { home, away }
    }

    pub fn get(&self, side: Side) -> u8 {
        match side {
            Side::Home => self.home,
            Side::Away => self.away,
        }
    }

    pub fn add_goal(&mut self, side: Side) {
        match side {
            Side::Home => self.home = self.home.saturating_add(1),
            Side::Away => self.away = self.away.saturating_add(1),
        }
    }

    pub fn is_level(&self) -> bool {
        self.home == self.away
    }

    pub fn leader(&self) -> Option<Side> {
        match self.home.cmp(&self.away) {
            std::cmp::Ordering::Greater => Some(Side::Home),
            std::cmp::Ordering::Less => Some(Side::Away),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn combined(&self, other: Score) -> Score {
        Score {
            home: self.home.saturating_add(other.home),
            away: self.away.saturating_add(other.away),
        }
    }
}

/// One shootout kick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Penalty {
    pub match_id: MatchId,
    pub team: TeamId,
    pub side: Side,
    pub player: PlayerId,
    /// 1-based position in the whole shootout.
    pub order: u16,
    pub is_scored: bool,
}

/// Shootout outcome. Does not change the match score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShootoutSummary {
    pub home_scored: u8,
    pub away_scored: u8,
    pub winner: Side,
    /// Sudden death hit its round cap and the tie was settled by lot.
    #[serde(default)]
    pub decided_by_lot: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchRecord {
    pub fixture: Fixture,
    pub status: MatchStatus,
    pub current_minute: u16,
    pub current_turn: u32,
    /// Extra time granted on top of regulation (0 until a level elimination
    /// tie reaches the end of regulation).
    pub granted_extra_minutes: u16,
    pub score: Score,
    pub possession: Side,
    #[serde(default)]
    pub attendance: Option<u32>,
    pub seed: u64,
    pub draws_consumed: u64,
    pub events: Vec<MatchEvent>,
    #[serde(default)]
    pub penalties: Vec<Penalty>,
    #[serde(default)]
    pub shootout: Option<ShootoutSummary>,
    #[serde(default)]
    pub winner: Option<TeamId>,
    /// Why the match ended in `Error`.
    #[serde(default)]
    pub failure: Option<String>,
    /// Set once the stats aggregator has folded this match.
    #[serde(default)]
    pub stats_applied: bool,
}

impl MatchRecord {
    /// Home kicks off; status starts `Scheduled`.
    pub fn new(fixture: Fixture, seed: u64) -> Self {
        Self {
            fixture,
            status: MatchStatus::Scheduled,
            current_minute: 0,
            current_turn: 0,
            granted_extra_minutes: 0,
            score: Score::default(),
            possession: Side::Home,
            attendance: None,
            seed,
            draws_consumed: 0,
            events: Vec::new(),
            penalties: Vec::new(),
            shootout: None,
            winner: None,
            failure: None,
            stats_applied: false,
        }
    }

    pub fn id(&self) -> MatchId {
        self.fixture.match_id
    }

    pub fn team(&self, side: Side) -> TeamId {
        match side {
            Side::Home => self.fixture.home,
            Side::Away => self.fixture.away,
        }
    }

    /// Score including goals carried from a first leg.
    pub fn aggregate_score(&self) -> Score {
        self.score.combined(self.fixture.carried_score())
    }

    /// Goals per side recounted from the event log.
    pub fn goals_from_log(&self) -> Score {
        let mut score = Score::default();
        for event in self.events.iter().filter(|e| e.is_goal()) {
            score.add_goal(event.side);
        }
        score
    }

    pub fn statistics(&self) -> MatchStatistics {
        MatchStatistics::from_record(self)
    }
}

/// Per-side counter pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidePair {
    pub home: u16,
    pub away: u16,
}

impl SidePair {
    fn bump(&mut self, side: Side) {
        match side {
            Side::Home => self.home += 1,
            Side::Away => self.away += 1,
        }
    }
}

/// Aggregated team statistics derived from the event log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchStatistics {
    pub match_id: MatchId,
    pub goals: SidePair,
    pub shots: SidePair,
    pub shots_on_target: SidePair,
    pub corners: SidePair,
    pub fouls: SidePair,
    pub offsides: SidePair,
    pub yellow_cards: SidePair,
    pub red_cards: SidePair,
    /// Share of turns that started with the home side in possession (0-1).
    pub possession_home: f32,
}

impl MatchStatistics {
    pub fn from_record(record: &MatchRecord) -> Self {
        let mut stats = MatchStatistics { match_id: record.id(), ..Default::default() };
        let mut home_turns = 0u32;

        for event in &record.events {
            let in_possession = match event.kind.actor() {
                Actor::Possession => event.side,
                Actor::Defence => event.side.opposite(),
            };
            if in_possession.is_home() {
                home_turns += 1;
            }

            if event.outcome.is_goal() {
                stats.goals.bump(event.side);
            }
            if event.kind.is_attempt() {
                stats.shots.bump(event.side);
                if event.outcome.is_on_target() {
                    stats.shots_on_target.bump(event.side);
                }
            }
            match event.kind {
                EventKind::Corner => stats.corners.bump(event.side),
                EventKind::Foul => stats.fouls.bump(event.side),
                EventKind::Offside => stats.offsides.bump(event.side),
                _ => {}
            }
            match event.outcome {
                Outcome::YellowCard => stats.yellow_cards.bump(event.side),
                Outcome::RedCard => stats.red_cards.bump(event.side),
                _ => {}
            }
        }

        if !record.events.is_empty() {
            stats.possession_home = home_turns as f32 / record.events.len() as f32;
        }
        stats
    }
}

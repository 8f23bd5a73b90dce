use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{CompetitionId, MatchId, Score, SeasonId, TeamId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompetitionScope {
    League,
    Cup,
    EuropeanCup,
}

/// Position of a fixture inside a (possibly two-legged) tie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "leg")]
pub enum Leg {
    #[default]
    Single,
    /// First leg of a two-legged tie. Never goes to extra time.
    First,
    /// Second leg. `first_leg` holds the goals each of *this* fixture's teams
    /// scored in the first leg (home = this fixture's home team).
    Second { first_leg: Score },
}

/// A scheduled pairing handed over by the season calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub match_id: MatchId,
    pub home: TeamId,
    pub away: TeamId,
    pub competition: CompetitionId,
    pub season: SeasonId,
    pub scope: CompetitionScope,
    pub scheduled: NaiveDate,
    #[serde(default)]
    pub is_elimination: bool,
    #[serde(default)]
    pub leg: Leg,
    #[serde(default)]
    pub stadium_capacity: u32,
}

impl Fixture {
    /// Whether a level tie at the end of regulation goes to extra time and,
    /// if still level, penalties.
    pub fn needs_decider(&self) -> bool {
        self.is_elimination && !matches!(self.leg, Leg::First)
    }

    /// Goals carried into this match from an earlier leg.
    pub fn carried_score(&self) -> Score {
        match self.leg {
            Leg::Second { first_leg } => first_leg,
            Leg::Single | Leg::First => Score::default(),
        }
    }
}

pub mod events;
pub mod fixture;
pub mod ids;
pub mod match_record;
pub mod player;
pub mod team;

pub use events::{Actor, EventKind, MatchEvent, Outcome};
pub use fixture::{CompetitionScope, Fixture, Leg};
pub use ids::{CompetitionId, MatchId, PlayerId, SeasonId, TeamId};
pub use match_record::{
    MatchRecord, MatchStatistics, MatchStatus, Penalty, Score, ShootoutSummary, SidePair,
};
pub use player::{Attribute, AttributeSet, PlayerSnapshot, Position, DEFAULT_ATTRIBUTE_VALUE};
pub use team::{LineupStatus, MatchSheets, Side, TeamSheet, STARTING_ELEVEN};

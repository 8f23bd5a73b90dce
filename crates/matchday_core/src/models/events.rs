use serde::{Deserialize, Serialize};

use super::{PlayerId, Side, TeamId};

/// Event types the selector can draw each turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    KeyPass,
    Dribble,
    Cross,
    Shot,
    Header,
    Tackle,
    Interception,
    Foul,
    Corner,
    Offside,
}

/// Which side performs an event relative to the side in possession.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Possession,
    Defence,
}

impl EventKind {
    pub const ALL: [EventKind; 10] = [
        EventKind::KeyPass,
        EventKind::Dribble,
        EventKind::Cross,
        EventKind::Shot,
        EventKind::Header,
        EventKind::Tackle,
        EventKind::Interception,
        EventKind::Foul,
        EventKind::Corner,
        EventKind::Offside,
    ];

    pub fn code(self) -> &'static str {
        match self {
            EventKind::KeyPass => "key_pass",
            EventKind::Dribble => "dribble",
            EventKind::Cross => "cross",
            EventKind::Shot => "shot",
            EventKind::Header => "header",
            EventKind::Tackle => "tackle",
            EventKind::Interception => "interception",
            EventKind::Foul => "foul",
            EventKind::Corner => "corner",
            EventKind::Offside => "offside",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            EventKind::KeyPass => "Key pass",
            EventKind::Dribble => "Dribble",
            EventKind::Cross => "Cross",
            EventKind::Shot => "Shot",
            EventKind::Header => "Header",
            EventKind::Tackle => "Tackle",
            EventKind::Interception => "Interception",
            EventKind::Foul => "Foul",
            EventKind::Corner => "Corner",
            EventKind::Offside => "Offside",
        }
    }

    pub fn actor(self) -> Actor {
        match self {
            EventKind::Tackle | EventKind::Interception | EventKind::Foul => Actor::Defence,
            EventKind::KeyPass
            | EventKind::Dribble
            | EventKind::Cross
            | EventKind::Shot
            | EventKind::Header
            | EventKind::Corner
            | EventKind::Offside => Actor::Possession,
        }
    }

    /// Attempts on goal, for shot counters.
    pub fn is_attempt(self) -> bool {
        matches!(self, EventKind::Shot | EventKind::Header)
    }
}

/// Resolved result of an event. Which outcomes a kind can produce is
/// decided by the outcome table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Completed,
    Intercepted,
    Overhit,
    Beaten,
    Dispossessed,
    Cleared,
    Goal,
    Saved,
    OffTarget,
    Blocked,
    Woodwork,
    Won,
    Missed,
    NoCard,
    YellowCard,
    RedCard,
    Flagged,
}

impl Outcome {
    pub fn is_goal(self) -> bool {
        matches!(self, Outcome::Goal)
    }

    pub fn is_on_target(self) -> bool {
        matches!(self, Outcome::Goal | Outcome::Saved)
    }

    pub fn code(self) -> &'static str {
        match self {
            Outcome::Completed => "completed",
            Outcome::Intercepted => "intercepted",
            Outcome::Overhit => "overhit",
            Outcome::Beaten => "beaten",
            Outcome::Dispossessed => "dispossessed",
            Outcome::Cleared => "cleared",
            Outcome::Goal => "goal",
            Outcome::Saved => "saved",
            Outcome::OffTarget => "off_target",
            Outcome::Blocked => "blocked",
            Outcome::Woodwork => "woodwork",
            Outcome::Won => "won",
            Outcome::Missed => "missed",
            Outcome::NoCard => "no_card",
            Outcome::YellowCard => "yellow_card",
            Outcome::RedCard => "red_card",
            Outcome::Flagged => "flagged",
        }
    }
}

/// One turn of a match. Append-only: never mutated once logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEvent {
    pub turn: u32,
    pub minute: u16,
    pub side: Side,
    pub team: TeamId,
    pub player: PlayerId,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub outcome: Outcome,
    pub changes_possession: bool,
    /// Set when this event dismissed the acting player (straight red or a
    /// second yellow).
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub sends_off: bool,
    pub commentary: String,
}

impl MatchEvent {
    pub fn is_goal(&self) -> bool {
        self.outcome.is_goal()
    }
}

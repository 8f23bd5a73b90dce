use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{PlayerId, PlayerSnapshot, TeamId};
use crate::error::{EngineError, Result};

pub const STARTING_ELEVEN: usize = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }

    pub fn is_home(self) -> bool {
        matches!(self, Side::Home)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineupStatus {
    OnPitch,
    Bench,
    /// Dismissed during the match. The player stays in the sheet.
    SentOff,
}

/// Roster/tactics snapshot for one side, frozen at kick-off.
///
/// `players` is the arena; lineup lists refer to it by [`PlayerId`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamSheet {
    pub team_id: TeamId,
    pub name: String,
    pub players: Vec<PlayerSnapshot>,
    pub starting: Vec<PlayerId>,
    #[serde(default)]
    pub bench: Vec<PlayerId>,
    /// Preferred shootout order. Players not listed are appended by the
    /// shootout resolver.
    #[serde(default)]
    pub penalty_order: Vec<PlayerId>,
}

impl TeamSheet {
    pub fn player(&self, id: PlayerId) -> Option<&PlayerSnapshot> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn starters(&self) -> impl Iterator<Item = &PlayerSnapshot> + '_ {
        self.starting.iter().filter_map(move |id| self.player(*id))
    }

    pub fn initial_status(&self, id: PlayerId) -> Option<LineupStatus> {
        if self.starting.contains(&id) {
            Some(LineupStatus::OnPitch)
        } else if self.player(id).is_some() {
            Some(LineupStatus::Bench)
        } else {
            None
        }
    }

    pub fn validate(&self) -> Result<()> {
        let mut arena_ids = HashSet::new();
        for player in &self.players {
            if !arena_ids.insert(player.id) {
                return Err(EngineError::InvalidInput(format!(
                    "team {}: duplicate player id {}",
                    self.team_id, player.id
                )));
            }
        }

        if self.starting.len() != STARTING_ELEVEN {
            return Err(EngineError::InvalidInput(format!(
                "team {}: expected {} starters, found {}",
                self.team_id,
                STARTING_ELEVEN,
                self.starting.len()
            )));
        }

        let mut selected = HashSet::new();
        for id in self.starting.iter().chain(self.bench.iter()) {
            if !arena_ids.contains(id) {
                return Err(EngineError::InvalidInput(format!(
                    "team {}: player {} is not in the squad",
                    self.team_id, id
                )));
            }
            if !selected.insert(*id) {
                return Err(EngineError::InvalidInput(format!(
                    "team {}: player {} selected twice",
                    self.team_id, id
                )));
            }
        }

        if !self.starters().any(|p| p.position.is_goalkeeper()) {
            return Err(EngineError::InvalidInput(format!(
                "team {}: no goalkeeper in the starting eleven",
                self.team_id
            )));
        }

        if let Some(unknown) = self.penalty_order.iter().find(|id| !arena_ids.contains(id)) {
            return Err(EngineError::InvalidInput(format!(
                "team {}: penalty taker {} is not in the squad",
                self.team_id, unknown
            )));
        }

        Ok(())
    }
}

/// Both team sheets for one fixture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSheets {
    pub home: TeamSheet,
    pub away: TeamSheet,
}

impl MatchSheets {
    pub fn new(home: TeamSheet, away: TeamSheet) -> Self {
        Self { home, away }
    }

    pub fn side(&self, side: Side) -> &TeamSheet {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.home.validate()?;
        self.away.validate()?;
        if self.home.team_id == self.away.team_id {
            return Err(EngineError::InvalidInput(format!(
                "team {} cannot play itself",
                self.home.team_id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::match_sim::test_fixtures::create_test_sheet;

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Home.opposite(), Side::Away);
        assert_eq!(Side::Away.opposite().opposite(), Side::Away);
    }

    #[test]
    fn test_valid_sheet() {
        let sheet = create_test_sheet(TeamId(1), "Rovers", 60);
        assert!(sheet.validate().is_ok());
        assert_eq!(sheet.starters().count(), STARTING_ELEVEN);
        assert_eq!(sheet.initial_status(sheet.bench[0]), Some(LineupStatus::Bench));
        assert_eq!(sheet.initial_status(PlayerId(999_999)), None);
    }

    #[test]
    fn test_sheet_rejects_short_lineup() {
        let mut sheet = create_test_sheet(TeamId(1), "Rovers", 60);
        sheet.starting.pop();
        assert!(matches!(sheet.validate(), Err(EngineError::InvalidInput(_))));
    }

    #[test]
    fn test_sheet_rejects_missing_goalkeeper() {
        let mut sheet = create_test_sheet(TeamId(1), "Rovers", 60);
        let keeper = sheet.starting[0];
        let bench_player = sheet.bench.remove(0);
        sheet.starting[0] = bench_player;
        sheet.bench.push(keeper);
        // Bench player 0 in the fixture is an outfielder.
        assert!(sheet.validate().is_err());
    }

    #[test]
    fn test_sheets_reject_same_team() {
        let sheets = MatchSheets::new(
            create_test_sheet(TeamId(4), "A", 60),
            create_test_sheet(TeamId(4), "B", 60),
        );
        assert!(sheets.validate().is_err());
    }
}

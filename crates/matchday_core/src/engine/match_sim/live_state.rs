//! In-memory lineup state of a match in progress.
//!
//! Nothing here is persisted: dismissals are rebuilt by replaying the cards
//! in the event log, so a record loaded in another process yields the same
//! on-pitch players.

use std::collections::HashMap;

use super::card_system::{CardResult, CardSystem, CardType};
use crate::error::{EngineError, Result};
use crate::models::{
    LineupStatus, MatchRecord, MatchSheets, Outcome, PlayerId, PlayerSnapshot, Side, TeamSheet,
};

#[derive(Debug, Clone)]
struct SideLineup {
    statuses: HashMap<PlayerId, LineupStatus>,
    cards: CardSystem,
}

impl SideLineup {
    fn from_sheet(sheet: &TeamSheet) -> Self {
        let statuses = sheet
            .players
            .iter()
            .filter_map(|p| sheet.initial_status(p.id).map(|s| (p.id, s)))
            .collect();
        Self { statuses, cards: CardSystem::new() }
    }
}

#[derive(Debug, Clone)]
pub struct LiveState {
    home: SideLineup,
    away: SideLineup,
}

impl LiveState {
    pub fn kick_off(sheets: &MatchSheets) -> Self {
        Self {
            home: SideLineup::from_sheet(&sheets.home),
            away: SideLineup::from_sheet(&sheets.away),
        }
    }

    /// Replays the event log. Fails when an event names a player who could
    /// not have been on the pitch, or when its dismissal flag disagrees with
    /// the replayed cards.
    pub fn replay(record: &MatchRecord, sheets: &MatchSheets) -> Result<Self> {
        let mut state = Self::kick_off(sheets);
        for event in &record.events {
            let mismatch = |reason: String| EngineError::ResumeMismatch {
                match_id: record.id(),
                reason: format!("turn {}: {reason}", event.turn),
            };
            if event.team != record.team(event.side) {
                return Err(mismatch(format!("team {} does not play {:?}", event.team, event.side)));
            }
            if state.status(event.side, event.player) != Some(LineupStatus::OnPitch) {
                return Err(mismatch(format!("player {} was not on the pitch", event.player)));
            }
            let sends_off = state.book(event.side, event.player, event.outcome);
            if sends_off != event.sends_off {
                return Err(mismatch(format!(
                    "dismissal flag for player {} disagrees with the card log",
                    event.player
                )));
            }
        }
        Ok(state)
    }

    fn lineup(&self, side: Side) -> &SideLineup {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    fn lineup_mut(&mut self, side: Side) -> &mut SideLineup {
        match side {
            Side::Home => &mut self.home,
            Side::Away => &mut self.away,
        }
    }

    pub fn status(&self, side: Side, player: PlayerId) -> Option<LineupStatus> {
        self.lineup(side).statuses.get(&player).copied()
    }

    /// Applies a card outcome; returns whether the player was sent off.
    pub fn book(&mut self, side: Side, player: PlayerId, outcome: Outcome) -> bool {
        let Some(card) = CardType::from_outcome(outcome) else {
            return false;
        };
        let lineup = self.lineup_mut(side);
        let (result, _) = lineup.cards.issue_card(player, card);
        match result {
            CardResult::SentOff => {
                lineup.statuses.insert(player, LineupStatus::SentOff);
                true
            }
            CardResult::Booked => false,
        }
    }

    /// On-pitch players of `side` in starting-lineup order.
    pub fn on_pitch<'s>(&self, side: Side, sheets: &'s MatchSheets) -> Vec<&'s PlayerSnapshot> {
        let lineup = self.lineup(side);
        sheets
            .side(side)
            .starters()
            .filter(|p| lineup.statuses.get(&p.id) == Some(&LineupStatus::OnPitch))
            .collect()
    }

    pub fn dismissals(&self, side: Side) -> usize {
        self.lineup(side).cards.sent_off_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::match_sim::test_fixtures::create_test_sheets;

    #[test]
    fn test_dismissal_removes_player_from_pitch() {
        let sheets = create_test_sheets();
        let mut state = LiveState::kick_off(&sheets);
        let defender = sheets.home.starting[2];
        assert_eq!(state.on_pitch(Side::Home, &sheets).len(), 11);

        assert!(!state.book(Side::Home, defender, Outcome::YellowCard));
        assert!(state.book(Side::Home, defender, Outcome::YellowCard));
        assert_eq!(state.status(Side::Home, defender), Some(LineupStatus::SentOff));
        let on_pitch = state.on_pitch(Side::Home, &sheets);
        assert_eq!(on_pitch.len(), 10);
        assert!(on_pitch.iter().all(|p| p.id != defender));
        assert_eq!(state.dismissals(Side::Home), 1);
        assert_eq!(state.on_pitch(Side::Away, &sheets).len(), 11);
    }

    #[test]
    fn test_bench_players_are_not_on_pitch() {
        let sheets = create_test_sheets();
        let mut state = LiveState::kick_off(&sheets);
        assert_eq!(state.status(Side::Away, sheets.away.bench[0]), Some(LineupStatus::Bench));
        assert!(!state.book(Side::Away, sheets.away.bench[0], Outcome::NoCard));
    }
}

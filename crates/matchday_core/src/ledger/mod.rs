//! Stats Aggregator & Standings Updater
//!
//! [`Ledgers::apply_result`] folds a finished match into player stats and
//! the standings of its competition, exactly once per match. Each standings
//! table has its own lock, so matches of different competitions finalize
//! concurrently.

pub mod standings;
pub mod stats;

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::info;

pub use standings::{compare_rows, StandingsKey, StandingsRow, StandingsTable};
pub use stats::{fold_match, PlayerAggregate, PlayerMatchStats, StatsBook};

use crate::engine::match_sim::check_sheets_match_fixture;
use crate::error::{EngineError, Result};
use crate::models::{
    CompetitionId, MatchId, MatchRecord, MatchSheets, MatchStatus, PlayerId, SeasonId,
};

#[derive(Debug, Clone, PartialEq)]
pub struct FinalizationReport {
    pub match_id: MatchId,
    pub player_stats: Vec<PlayerMatchStats>,
    pub home_row: StandingsRow,
    pub away_row: StandingsRow,
}

#[derive(Debug, Default)]
pub struct Ledgers {
    stats: Mutex<StatsBook>,
    standings: RwLock<HashMap<StandingsKey, Arc<Mutex<StandingsTable>>>>,
    applied: Mutex<HashSet<MatchId>>,
}

impl Ledgers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a `Finished` match. A second application of the same match
    /// is rejected with [`EngineError::AlreadyFinalized`] and changes nothing.
    pub fn apply_result(&self, record: &mut MatchRecord, sheets: &MatchSheets) -> Result<FinalizationReport> {
        let match_id = record.id();
        if record.status != MatchStatus::Finished {
            return Err(EngineError::InvalidTransition {
                match_id,
                from: record.status,
                action: "finalize",
            });
        }
        if record.stats_applied {
            return Err(EngineError::AlreadyFinalized(match_id));
        }
        check_sheets_match_fixture(record, sheets)?;
        // Claim the match before touching any ledger.
        if !self.applied.lock().unwrap_or_else(PoisonError::into_inner).insert(match_id) {
            return Err(EngineError::AlreadyFinalized(match_id));
        }

        let fixture = &record.fixture;
        let player_stats = fold_match(record, sheets);
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .apply(match_id, fixture.competition, fixture.season, player_stats.clone());

        let key = StandingsKey {
            competition: fixture.competition,
            season: fixture.season,
            scope: fixture.scope,
        };
        let table = self.table_handle(key);
        let (home_row, away_row) = table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record_result(fixture.home, fixture.away, record.score);

        record.stats_applied = true;
        info!(
            match_id = %match_id,
            competition = %key.competition,
            home_points = home_row.points(),
            away_points = away_row.points(),
            "result finalized"
        );
        Ok(FinalizationReport { match_id, player_stats, home_row, away_row })
    }

    fn table_handle(&self, key: StandingsKey) -> Arc<Mutex<StandingsTable>> {
        if let Some(table) = self.standings.read().unwrap_or_else(PoisonError::into_inner).get(&key) {
            return Arc::clone(table);
        }
        let mut tables = self.standings.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            tables.entry(key).or_insert_with(|| Arc::new(Mutex::new(StandingsTable::new(key)))),
        )
    }

    pub fn is_applied(&self, match_id: MatchId) -> bool {
        self.applied.lock().unwrap_or_else(PoisonError::into_inner).contains(&match_id)
    }

    /// Snapshot of one standings table.
    pub fn standings(&self, key: StandingsKey) -> Option<StandingsTable> {
        let tables = self.standings.read().unwrap_or_else(PoisonError::into_inner);
        tables.get(&key).map(|t| t.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    pub fn standings_keys(&self) -> Vec<StandingsKey> {
        self.standings.read().unwrap_or_else(PoisonError::into_inner).keys().copied().collect()
    }

    pub fn season_stats(&self, player: PlayerId, season: SeasonId) -> Option<PlayerAggregate> {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner).season(player, season).cloned()
    }

    pub fn competition_stats(
        &self,
        player: PlayerId,
        competition: CompetitionId,
        season: SeasonId,
    ) -> Option<PlayerAggregate> {
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .competition(player, competition, season)
            .cloned()
    }

    pub fn match_stats(&self, match_id: MatchId) -> Option<Vec<PlayerMatchStats>> {
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .match_rows(match_id)
            .map(<[PlayerMatchStats]>::to_vec)
    }
}

//! Day runner: simulates a slate of matches in parallel and finalizes the
//! finished ones into shared ledgers.
//!
//! Matches are independent; one failing match is reported as failed and
//! never stops the others.

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::data::SimulationTables;
use crate::engine::config::EngineConfig;
use crate::engine::match_sim::{CancelFlag, MatchEngine, RunOutcome};
use crate::error::{EngineError, Result};
use crate::ledger::{FinalizationReport, Ledgers};
use crate::models::{MatchId, MatchRecord, MatchSheets, MatchStatus, Score, TeamId};

/// A match due today together with its frozen team sheets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledMatch {
    pub record: MatchRecord,
    pub sheets: MatchSheets,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum MatchRunStatus {
    Finished,
    /// Stopped by cancellation or turn budget; resumable.
    Paused,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchRunReport {
    pub match_id: MatchId,
    pub status: MatchRunStatus,
    pub score: Score,
    pub winner: Option<TeamId>,
    pub turns_played: u32,
    pub finalization: Option<FinalizationReport>,
}

pub struct DayRunner<'a> {
    tables: &'a SimulationTables,
    config: &'a EngineConfig,
    /// Worker threads; 0 uses the global rayon pool.
    workers: usize,
    /// Turns per match in this run; `None` plays to the end.
    turn_budget: Option<u32>,
    cancel: CancelFlag,
}

impl<'a> DayRunner<'a> {
    pub fn new(tables: &'a SimulationTables, config: &'a EngineConfig) -> Self {
        Self { tables, config, workers: 0, turn_budget: None, cancel: CancelFlag::new() }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_turn_budget(mut self, budget: u32) -> Self {
        self.turn_budget = Some(budget);
        self
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub fn run(&self, slate: &mut [ScheduledMatch], ledgers: &Ledgers) -> Result<Vec<MatchRunReport>> {
        info!(matches = slate.len(), workers = self.workers, "running match day");
        let reports = if self.workers == 0 {
            self.run_slate(slate, ledgers)
        } else {
            let pool = ThreadPoolBuilder::new()
                .num_threads(self.workers)
                .build()
                .map_err(|e| EngineError::WorkerPool(e.to_string()))?;
            pool.install(|| self.run_slate(slate, ledgers))
        };

        let finished = reports.iter().filter(|r| r.status == MatchRunStatus::Finished).count();
        let failed = reports.iter().filter(|r| matches!(r.status, MatchRunStatus::Failed(_))).count();
        info!(finished, paused = reports.len() - finished - failed, failed, "match day done");
        Ok(reports)
    }

    fn run_slate(&self, slate: &mut [ScheduledMatch], ledgers: &Ledgers) -> Vec<MatchRunReport> {
        slate.par_iter_mut().map(|m| self.run_one(m, ledgers)).collect()
    }

    fn run_one(&self, scheduled: &mut ScheduledMatch, ledgers: &Ledgers) -> MatchRunReport {
        let ScheduledMatch { record, sheets } = scheduled;
        let start_turn = record.current_turn;

        let status = match self.play(record, sheets) {
            Ok(RunOutcome::Finished) => MatchRunStatus::Finished,
            Ok(RunOutcome::BudgetExhausted | RunOutcome::Cancelled) => MatchRunStatus::Paused,
            Err(e) => {
                warn!(match_id = %record.id(), error = %e, "simulation failed");
                MatchRunStatus::Failed(e.to_string())
            }
        };

        let mut finalization = None;
        let status = match status {
            MatchRunStatus::Finished if !record.stats_applied => {
                match ledgers.apply_result(record, sheets) {
                    Ok(report) => {
                        finalization = Some(report);
                        MatchRunStatus::Finished
                    }
                    Err(e) => MatchRunStatus::Failed(e.to_string()),
                }
            }
            other => other,
        };

        MatchRunReport {
            match_id: record.id(),
            status,
            score: record.score,
            winner: record.winner,
            turns_played: record.current_turn - start_turn,
            finalization,
        }
    }

    fn play(&self, record: &mut MatchRecord, sheets: &MatchSheets) -> Result<RunOutcome> {
        let engine = MatchEngine::new(self.tables, self.config);
        match record.status {
            MatchStatus::Scheduled => engine.kick_off(record, sheets)?,
            MatchStatus::Paused => engine.resume(record, sheets)?,
            MatchStatus::InProgress => {}
            MatchStatus::Finished => return Ok(RunOutcome::Finished),
            MatchStatus::Error => {
                return Err(EngineError::InvalidTransition {
                    match_id: record.id(),
                    from: record.status,
                    action: "simulate",
                })
            }
        }

        let budget = self.turn_budget.unwrap_or(u32::MAX);
        let outcome = engine.session(record, sheets)?.run_turns(budget, Some(&self.cancel))?;
        if outcome == RunOutcome::BudgetExhausted {
            engine.pause(record)?;
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::match_sim::test_fixtures::{create_league_fixture, create_test_sheet};
    use crate::ledger::StandingsKey;
    use crate::models::{CompetitionId, CompetitionScope, SeasonId};

    fn slate(teams: u32) -> Vec<ScheduledMatch> {
        (0..teams / 2)
            .map(|i| {
                let home = TeamId(2 * i + 1);
                let away = TeamId(2 * i + 2);
                let fixture = create_league_fixture(100 + i as u64, home, away);
                ScheduledMatch {
                    record: MatchRecord::new(fixture, 1_000 + i as u64),
                    sheets: MatchSheets::new(
                        create_test_sheet(home, &format!("Team {}", home), 55 + (i % 3) as u8 * 5),
                        create_test_sheet(away, &format!("Team {}", away), 60),
                    ),
                }
            })
            .collect()
    }

    fn league_key() -> StandingsKey {
        StandingsKey {
            competition: CompetitionId(1),
            season: SeasonId(2026),
            scope: CompetitionScope::League,
        }
    }

    #[test]
    fn test_full_day_finalizes_every_match() {
        let config = EngineConfig::default();
        let runner = DayRunner::new(SimulationTables::embedded(), &config).with_workers(2);
        let ledgers = Ledgers::new();
        let mut matches = slate(8);

        let reports = runner.run(&mut matches, &ledgers).unwrap();
        assert_eq!(reports.len(), 4);
        assert!(reports.iter().all(|r| r.status == MatchRunStatus::Finished));
        assert!(reports.iter().all(|r| r.finalization.is_some() && r.turns_played == 90));

        let table = ledgers.standings(league_key()).unwrap();
        assert_eq!(table.len(), 8);
        assert!(table.ranked().iter().all(|r| r.played == 1));
    }

    #[test]
    fn test_parallel_run_matches_sequential_run() {
        let config = EngineConfig::default();
        let tables = SimulationTables::embedded();
        let mut parallel = slate(6);
        let mut sequential = slate(6);

        DayRunner::new(tables, &config).with_workers(3).run(&mut parallel, &Ledgers::new()).unwrap();
        DayRunner::new(tables, &config).with_workers(1).run(&mut sequential, &Ledgers::new()).unwrap();
        for (a, b) in parallel.iter().zip(&sequential) {
            assert_eq!(a.record, b.record);
        }
    }

    #[test]
    fn test_budget_pauses_and_next_run_resumes() {
        let config = EngineConfig::default();
        let tables = SimulationTables::embedded();
        let ledgers = Ledgers::new();
        let mut matches = slate(4);

        let first = DayRunner::new(tables, &config).with_turn_budget(30);
        let reports = first.run(&mut matches, &ledgers).unwrap();
        assert!(reports.iter().all(|r| r.status == MatchRunStatus::Paused && r.turns_played == 30));
        assert!(matches.iter().all(|m| m.record.status == MatchStatus::Paused));
        assert!(ledgers.standings(league_key()).is_none());

        let reports = DayRunner::new(tables, &config).run(&mut matches, &ledgers).unwrap();
        assert!(reports.iter().all(|r| r.status == MatchRunStatus::Finished && r.turns_played == 60));
        assert_eq!(ledgers.standings(league_key()).unwrap().len(), 4);
    }

    #[test]
    fn test_cancelled_day_leaves_matches_paused() {
        let config = EngineConfig::default();
        let flag = CancelFlag::new();
        flag.cancel();
        let runner = DayRunner::new(SimulationTables::embedded(), &config).with_cancel_flag(flag);
        let mut matches = slate(4);

        let reports = runner.run(&mut matches, &Ledgers::new()).unwrap();
        assert!(reports.iter().all(|r| r.status == MatchRunStatus::Paused && r.turns_played == 0));
        assert!(matches.iter().all(|m| m.record.status == MatchStatus::Paused));
    }

    #[test]
    fn test_failed_match_does_not_block_the_others() {
        let config = EngineConfig::default();
        let runner = DayRunner::new(SimulationTables::embedded(), &config);
        let mut matches = slate(6);
        matches[1].sheets.away.starting.pop();

        let reports = runner.run(&mut matches, &Ledgers::new()).unwrap();
        assert!(matches!(reports[1].status, MatchRunStatus::Failed(_)));
        assert_eq!(reports[0].status, MatchRunStatus::Finished);
        assert_eq!(reports[2].status, MatchRunStatus::Finished);
    }
}

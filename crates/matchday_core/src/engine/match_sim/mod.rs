//! Match State Machine
//!
//! `Scheduled → InProgress → {Paused ⇄ InProgress} → Finished`, with
//! `InProgress → Error` when a match hits an invariant violation.
//!
//! [`MatchEngine`] owns the status transitions that work on a bare record
//! (kick-off, pause, resume, cancel, fail). A [`MatchSession`] wraps an
//! `InProgress` record together with the state that is rebuilt rather than
//! persisted (PRNG position, dismissals) and plays turns.

pub mod card_system;
pub mod live_state;
pub mod match_phase;

#[cfg(test)]
pub mod test_fixtures;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info};

use self::live_state::LiveState;
use self::match_phase::{current_phase, next_phase, MatchPhase, PhaseConfig};
use super::commentary::CommentaryContext;
use super::config::{EngineConfig, DRAWS_PER_TURN};
use super::deterministic;
use super::rng::MatchRng;
use super::selector::EventSelector;
use super::shootout::{self, ShootoutSide};
use crate::data::SimulationTables;
use crate::error::{EngineError, Result};
use crate::models::{
    Leg, MatchEvent, MatchRecord, MatchSheets, MatchStatus, Penalty, Side, TeamId,
};

/// Shared cancellation flag, checked at turn boundaries.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// What happened at the end of a turn besides the event itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseChange {
    Continue,
    ExtraTimeGranted,
    ShootoutPlayed,
    Finished,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TurnReport {
    pub event: MatchEvent,
    pub phase: PhaseChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Finished,
    /// Budget used up; the match is still `InProgress`.
    BudgetExhausted,
    /// Cancellation observed at a turn boundary; the match is `Paused`.
    Cancelled,
}

pub struct MatchEngine<'a> {
    tables: &'a SimulationTables,
    config: &'a EngineConfig,
}

impl<'a> MatchEngine<'a> {
    pub fn new(tables: &'a SimulationTables, config: &'a EngineConfig) -> Self {
        Self { tables, config }
    }

    pub fn config(&self) -> &EngineConfig {
        self.config
    }

    /// `Scheduled → InProgress`. Validates the sheets and computes attendance.
    pub fn kick_off(&self, record: &mut MatchRecord, sheets: &MatchSheets) -> Result<()> {
        expect_status(record, MatchStatus::Scheduled, "kick off")?;
        sheets.validate()?;
        check_sheets_match_fixture(record, sheets)?;

        let crowd = deterministic::attendance(&record.fixture, record.seed);
        record.attendance = Some(crowd);
        record.status = MatchStatus::InProgress;
        info!(
            match_id = %record.id(),
            home = %sheets.home.name,
            away = %sheets.away.name,
            attendance = crowd,
            "kick-off"
        );
        Ok(())
    }

    /// `InProgress → Paused`.
    pub fn pause(&self, record: &mut MatchRecord) -> Result<()> {
        expect_status(record, MatchStatus::InProgress, "pause")?;
        record.status = MatchStatus::Paused;
        debug!(match_id = %record.id(), turn = record.current_turn, "paused");
        Ok(())
    }

    /// `Paused → InProgress` after checking the record against its own log.
    /// A record that fails the check is moved to `Error`.
    pub fn resume(&self, record: &mut MatchRecord, sheets: &MatchSheets) -> Result<()> {
        expect_status(record, MatchStatus::Paused, "resume")?;
        check_sheets_match_fixture(record, sheets)?;
        if let Err(e) = verify_integrity(record, sheets, self.config) {
            return Err(mark_failed(record, e));
        }
        record.status = MatchStatus::InProgress;
        debug!(match_id = %record.id(), turn = record.current_turn, "resumed");
        Ok(())
    }

    /// External cancellation. An in-progress match is parked as `Paused`,
    /// never discarded; cancelling a paused match is a no-op.
    pub fn cancel(&self, record: &mut MatchRecord) -> Result<()> {
        match record.status {
            MatchStatus::Paused => Ok(()),
            MatchStatus::InProgress => {
                record.status = MatchStatus::Paused;
                info!(match_id = %record.id(), turn = record.current_turn, "cancelled, match parked");
                Ok(())
            }
            from => Err(EngineError::InvalidTransition { match_id: record.id(), from, action: "cancel" }),
        }
    }

    /// Moves a non-terminal match to `Error`.
    pub fn fail(&self, record: &mut MatchRecord, reason: impl Into<String>) -> Result<()> {
        if record.status.is_terminal() {
            return Err(EngineError::InvalidTransition {
                match_id: record.id(),
                from: record.status,
                action: "fail",
            });
        }
        let reason = reason.into();
        error!(match_id = %record.id(), reason = %reason, "simulation failed");
        record.status = MatchStatus::Error;
        record.failure = Some(reason);
        Ok(())
    }

    /// Opens a session on an `InProgress` record, replaying its log.
    pub fn session<'r>(
        &self,
        record: &'r mut MatchRecord,
        sheets: &'r MatchSheets,
    ) -> Result<MatchSession<'a, 'r>> {
        expect_status(record, MatchStatus::InProgress, "simulate")?;
        check_sheets_match_fixture(record, sheets)?;
        let live = match verify_integrity(record, sheets, self.config) {
            Ok(live) => live,
            Err(e) => return Err(mark_failed(record, e)),
        };
        let rng = MatchRng::resume(record.seed, record.draws_consumed);
        Ok(MatchSession { tables: self.tables, config: self.config, record, sheets, live, rng })
    }

    /// Single turn without keeping a session around.
    pub fn advance_turn(&self, record: &mut MatchRecord, sheets: &MatchSheets) -> Result<TurnReport> {
        self.session(record, sheets)?.advance_turn()
    }
}

pub struct MatchSession<'a, 'r> {
    tables: &'a SimulationTables,
    config: &'a EngineConfig,
    record: &'r mut MatchRecord,
    sheets: &'r MatchSheets,
    live: LiveState,
    rng: MatchRng,
}

impl<'a, 'r> MatchSession<'a, 'r> {
    pub fn record(&self) -> &MatchRecord {
        self.record
    }

    /// Minute at which the current period ends.
    fn period_limit(&self) -> u16 {
        self.config.regulation_minutes + self.record.granted_extra_minutes
    }

    pub fn advance_turn(&mut self) -> Result<TurnReport> {
        expect_status(self.record, MatchStatus::InProgress, "advance a turn")?;
        let limit = self.period_limit();
        if self.record.current_minute >= limit {
            let e = EngineError::InvariantViolation(format!(
                "match clock at {} but the period ended at {}",
                self.record.current_minute, limit
            ));
            return Err(mark_failed(self.record, e));
        }

        let home = self.live.on_pitch(Side::Home, self.sheets);
        let away = self.live.on_pitch(Side::Away, self.sheets);
        let selector = EventSelector::new(&self.tables.weights, &self.tables.outcomes);
        let selection = match selector.select(&mut self.rng, self.record.possession, &home, &away) {
            Ok(selection) => selection,
            Err(e) => return Err(mark_failed(self.record, e)),
        };

        let turn = self.record.current_turn + 1;
        let minute = (self.record.current_minute + self.config.minutes_per_turn).min(limit);
        let side = selection.side;
        let outcome = selection.range.outcome;
        let sends_off = self.live.book(side, selection.player, outcome);

        let own = self.sheets.side(side);
        let opponent = self.sheets.side(side.opposite());
        let player_name = own.player(selection.player).map_or("Unknown", |p| p.name.as_str());
        let commentary = self.tables.commentary.render(
            selection.kind,
            outcome,
            turn,
            &CommentaryContext { minute, player: player_name, team: &own.name, opponent: &opponent.name },
        );

        let event = MatchEvent {
            turn,
            minute,
            side,
            team: self.record.team(side),
            player: selection.player,
            kind: selection.kind,
            outcome,
            changes_possession: selection.range.changes_possession,
            sends_off,
            commentary,
        };
        self.record.events.push(event.clone());

        if outcome.is_goal() {
            self.record.score.add_goal(side);
            info!(
                match_id = %self.record.id(),
                minute,
                scorer = %selection.player,
                home = self.record.score.home,
                away = self.record.score.away,
                "goal"
            );
        }
        if selection.range.changes_possession {
            self.record.possession = self.record.possession.opposite();
        }
        if sends_off {
            info!(match_id = %self.record.id(), minute, player = %selection.player, "sent off");
        }

        self.record.current_turn = turn;
        self.record.current_minute = minute;
        self.record.draws_consumed = self.rng.draws();
        debug!(
            match_id = %self.record.id(),
            turn,
            minute,
            kind = selection.kind.code(),
            outcome = outcome.code(),
            "turn"
        );

        let phase = if minute >= limit { self.end_period()? } else { PhaseChange::Continue };
        Ok(TurnReport { event, phase })
    }

    fn end_period(&mut self) -> Result<PhaseChange> {
        let level = self.record.aggregate_score().is_level();
        let phase_config = PhaseConfig::for_fixture(&self.record.fixture, self.config);

        match next_phase(current_phase(self.record), phase_config, level) {
            MatchPhase::ExtraTime => {
                self.record.granted_extra_minutes = self.config.extra_time_minutes;
                self.record.possession = Side::Away;
                info!(
                    match_id = %self.record.id(),
                    minutes = self.config.extra_time_minutes,
                    "level after regulation, extra time"
                );
                Ok(PhaseChange::ExtraTimeGranted)
            }
            MatchPhase::PenaltyShootout => {
                self.play_shootout()?;
                self.finish();
                Ok(PhaseChange::ShootoutPlayed)
            }
            MatchPhase::Regulation | MatchPhase::Finished => {
                self.finish();
                Ok(PhaseChange::Finished)
            }
        }
    }

    fn play_shootout(&mut self) -> Result<()> {
        let home_on = self.live.on_pitch(Side::Home, self.sheets);
        let away_on = self.live.on_pitch(Side::Away, self.sheets);
        let sides = ShootoutSide::from_lineup(Side::Home, &self.sheets.home.penalty_order, &home_on)
            .and_then(|home| {
                ShootoutSide::from_lineup(Side::Away, &self.sheets.away.penalty_order, &away_on)
                    .map(|away| (home, away))
            });
        let (home, away) = match sides {
            Ok(sides) => sides,
            Err(e) => return Err(mark_failed(self.record, e)),
        };

        let result = shootout::resolve(&mut self.rng, self.config, &home, &away);
        let match_id = self.record.id();
        for (i, kick) in result.kicks.iter().enumerate() {
            self.record.penalties.push(Penalty {
                match_id,
                team: self.record.team(kick.side),
                side: kick.side,
                player: kick.player,
                order: (i + 1) as u16,
                is_scored: kick.is_scored,
            });
        }
        self.record.shootout = Some(result.summary);
        self.record.draws_consumed = self.rng.draws();
        info!(
            match_id = %match_id,
            home = result.summary.home_scored,
            away = result.summary.away_scored,
            winner = ?result.summary.winner,
            "penalty shootout"
        );
        Ok(())
    }

    fn finish(&mut self) {
        self.record.winner = decide_winner(self.record);
        self.record.status = MatchStatus::Finished;
        info!(
            match_id = %self.record.id(),
            home = self.record.score.home,
            away = self.record.score.away,
            winner = ?self.record.winner,
            turns = self.record.current_turn,
            "full time"
        );
    }

    /// Plays at most `budget` turns, honouring `cancel` at each boundary.
    pub fn run_turns(&mut self, budget: u32, cancel: Option<&CancelFlag>) -> Result<RunOutcome> {
        for _ in 0..budget {
            if self.record.status == MatchStatus::Finished {
                return Ok(RunOutcome::Finished);
            }
            if cancel.is_some_and(CancelFlag::is_cancelled) {
                self.record.status = MatchStatus::Paused;
                info!(match_id = %self.record.id(), turn = self.record.current_turn, "cancelled, match parked");
                return Ok(RunOutcome::Cancelled);
            }
            self.advance_turn()?;
        }
        Ok(if self.record.status == MatchStatus::Finished {
            RunOutcome::Finished
        } else {
            RunOutcome::BudgetExhausted
        })
    }

    pub fn run_to_completion(&mut self) -> Result<()> {
        while self.record.status == MatchStatus::InProgress {
            self.advance_turn()?;
        }
        Ok(())
    }
}

/// Winning team of a finished match. First legs have none; level league
/// matches have none; a shootout decides otherwise level ties.
pub fn decide_winner(record: &MatchRecord) -> Option<TeamId> {
    if matches!(record.fixture.leg, Leg::First) {
        return None;
    }
    if let Some(shootout) = record.shootout {
        return Some(record.team(shootout.winner));
    }
    record.aggregate_score().leader().map(|side| record.team(side))
}

/// Checks that the persisted counters agree with the event and penalty logs
/// and rebuilds the lineup state.
pub fn verify_integrity(
    record: &MatchRecord,
    sheets: &MatchSheets,
    config: &EngineConfig,
) -> Result<LiveState> {
    let match_id = record.id();
    let mismatch = |reason: String| EngineError::ResumeMismatch { match_id, reason };

    if record.events.len() as u64 != record.current_turn as u64 {
        return Err(mismatch(format!(
            "{} events logged but the turn counter is {}",
            record.events.len(),
            record.current_turn
        )));
    }
    if let Some((i, event)) =
        record.events.iter().enumerate().find(|(i, e)| e.turn as usize != i + 1)
    {
        return Err(mismatch(format!("event {} carries turn {}", i + 1, event.turn)));
    }

    let lot = record.shootout.map_or(0, |s| s.decided_by_lot as u64);
    let expected_draws =
        record.current_turn as u64 * DRAWS_PER_TURN + record.penalties.len() as u64 + lot;
    if record.draws_consumed != expected_draws {
        return Err(mismatch(format!(
            "{} draws recorded, the logs account for {}",
            record.draws_consumed, expected_draws
        )));
    }

    let logged = record.goals_from_log();
    if record.score != logged {
        return Err(mismatch(format!(
            "score {}-{} but the log has {}-{}",
            record.score.home, record.score.away, logged.home, logged.away
        )));
    }

    let limit = config.regulation_minutes + record.granted_extra_minutes;
    if record.current_minute > limit {
        return Err(mismatch(format!("minute {} beyond the period end {}", record.current_minute, limit)));
    }
    if let Some(last) = record.events.last() {
        if last.minute != record.current_minute {
            return Err(mismatch(format!(
                "clock at {} but the last event is at {}",
                record.current_minute, last.minute
            )));
        }
    }

    LiveState::replay(record, sheets)
}

fn expect_status(record: &MatchRecord, expected: MatchStatus, action: &'static str) -> Result<()> {
    if record.status == expected {
        Ok(())
    } else {
        Err(EngineError::InvalidTransition { match_id: record.id(), from: record.status, action })
    }
}

pub(crate) fn check_sheets_match_fixture(record: &MatchRecord, sheets: &MatchSheets) -> Result<()> {
    if sheets.home.team_id != record.fixture.home || sheets.away.team_id != record.fixture.away {
        return Err(EngineError::InvalidInput(format!(
            "match {}: sheets for {} v {} do not match fixture {} v {}",
            record.id(),
            sheets.home.team_id,
            sheets.away.team_id,
            record.fixture.home,
            record.fixture.away
        )));
    }
    Ok(())
}

/// Moves the record to `Error` when `e` is fatal for the match; returns `e`.
fn mark_failed(record: &mut MatchRecord, e: EngineError) -> EngineError {
    if e.is_fatal_for_match() && !record.status.is_terminal() {
        error!(match_id = %record.id(), error = %e, "simulation failed");
        record.status = MatchStatus::Error;
        record.failure = Some(e.to_string());
    }
    e
}

//! Event selector.
//!
//! One turn = three draws, always in this order and always all three:
//! 1. event kind, roulette wheel over the kind masses,
//! 2. outcome slot in the draw space,
//! 3. acting player among the acting side's on-pitch players.

use tracing::{debug, warn};

use super::config::DRAW_SPACE;
use super::outcomes::{OutcomeRange, OutcomeTable};
use super::rng::MatchRng;
use super::weights::{TeamProfile, WeightTable};
use crate::error::{EngineError, Result};
use crate::models::{Actor, EventKind, PlayerId, PlayerSnapshot, Position, Side};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    pub kind: EventKind,
    /// Side performing the event (the defending side for tackles,
    /// interceptions and fouls).
    pub side: Side,
    pub player: PlayerId,
    pub slot: u8,
    pub range: OutcomeRange,
    /// The kind was drawn uniformly because the weights gave no usable mass.
    pub uniform_fallback: bool,
}

pub struct EventSelector<'a> {
    weights: &'a WeightTable,
    outcomes: &'a OutcomeTable,
}

impl<'a> EventSelector<'a> {
    pub fn new(weights: &'a WeightTable, outcomes: &'a OutcomeTable) -> Self {
        Self { weights, outcomes }
    }

    pub fn select(
        &self,
        rng: &mut MatchRng,
        possession: Side,
        home: &[&PlayerSnapshot],
        away: &[&PlayerSnapshot],
    ) -> Result<Selection> {
        let u_kind = rng.next_unit();
        let u_outcome = rng.next_unit();
        let u_actor = rng.next_unit();

        let home_profile = TeamProfile::from_players(home.iter().copied());
        let away_profile = TeamProfile::from_players(away.iter().copied());
        let masses = self.kind_masses(possession, &home_profile, &away_profile);
        let (kind, uniform_fallback) = match masses {
            Some(masses) => match pick_weighted(&masses, u_kind) {
                Some(idx) => (EventKind::ALL[idx], false),
                None => {
                    warn!("all event masses are zero, drawing the event kind uniformly");
                    (uniform_kind(u_kind), true)
                }
            },
            None => {
                debug!("event weights incomplete, drawing the event kind uniformly");
                (uniform_kind(u_kind), true)
            }
        };

        let side = acting_side(kind, possession);
        let slot = ((u_outcome * DRAW_SPACE as f64) as u16).min(DRAW_SPACE - 1) as u8;
        let range = self.outcomes.resolve(kind, slot)?;

        let candidates = match side {
            Side::Home => home,
            Side::Away => away,
        };
        let player = self.pick_actor(kind, candidates, u_actor).ok_or_else(|| {
            EngineError::InvariantViolation(format!("{side:?} has no players on the pitch"))
        })?;

        Ok(Selection { kind, side, player, slot, range, uniform_fallback })
    }

    /// Mass per kind in `EventKind::ALL` order, `None` if any kind is
    /// unconfigured.
    fn kind_masses(&self, possession: Side, home: &TeamProfile, away: &TeamProfile) -> Option<Vec<f64>> {
        EventKind::ALL
            .iter()
            .map(|&kind| {
                let (acting, opponent) = match acting_side(kind, possession) {
                    Side::Home => (home, away),
                    Side::Away => (away, home),
                };
                self.weights.mass(kind, acting, opponent)
            })
            .collect()
    }

    fn pick_actor(&self, kind: EventKind, candidates: &[&PlayerSnapshot], u: f64) -> Option<PlayerId> {
        if candidates.is_empty() {
            return None;
        }
        let weights: Vec<f64> = candidates
            .iter()
            .map(|p| {
                let skill = match self.weights.weights(kind) {
                    Some(ws) if ws.iter().any(|w| w.attack > 0.0) => ws
                        .iter()
                        .map(|w| w.attack.max(0.0) * p.attribute(w.attribute) as f64)
                        .sum(),
                    _ => 1.0,
                };
                skill * position_affinity(kind, p.position)
            })
            .collect();

        let idx = pick_weighted(&weights, u).unwrap_or_else(|| {
            ((u * candidates.len() as f64) as usize).min(candidates.len() - 1)
        });
        Some(candidates[idx].id)
    }
}

pub fn acting_side(kind: EventKind, possession: Side) -> Side {
    match kind.actor() {
        Actor::Possession => possession,
        Actor::Defence => possession.opposite(),
    }
}

fn uniform_kind(u: f64) -> EventKind {
    let n = EventKind::ALL.len();
    EventKind::ALL[((u * n as f64) as usize).min(n - 1)]
}

/// Roulette-wheel pick with a unit draw. `None` when no weight is positive.
fn pick_weighted(weights: &[f64], u: f64) -> Option<usize> {
    let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
    if !(total > 0.0 && total.is_finite()) {
        return None;
    }
    let mut r = u * total;
    let mut last = None;
    for (i, w) in weights.iter().enumerate() {
        if *w <= 0.0 {
            continue;
        }
        r -= *w;
        if r < 0.0 {
            return Some(i);
        }
        last = Some(i);
    }
    last
}

/// How likely a player in `position` is to be the one performing `kind`.
fn position_affinity(kind: EventKind, position: Position) -> f64 {
    // GK, DF, MF, FW
    let row: [f64; 4] = match kind {
        EventKind::KeyPass => [0.1, 0.6, 1.4, 1.0],
        EventKind::Dribble => [0.02, 0.5, 1.2, 1.4],
        EventKind::Cross => [0.0, 1.0, 1.2, 0.6],
        EventKind::Shot => [0.0, 0.3, 0.8, 1.6],
        EventKind::Header => [0.0, 0.8, 0.5, 1.5],
        EventKind::Tackle => [0.1, 1.5, 1.0, 0.3],
        EventKind::Interception => [0.2, 1.4, 1.1, 0.3],
        EventKind::Foul => [0.1, 1.3, 1.0, 0.5],
        EventKind::Corner => [0.0, 0.3, 1.2, 0.8],
        EventKind::Offside => [0.0, 0.1, 0.5, 1.6],
    };
    let col = match position {
        Position::GK => 0,
        Position::DF => 1,
        Position::MF => 2,
        Position::FW => 3,
    };
    row[col]
}

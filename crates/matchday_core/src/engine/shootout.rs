//! Penalty shootout resolver.
//!
//! Sides alternate kicks, home first. In the regular rounds the shootout
//! stops as soon as one side can no longer be caught. Level after the
//! regular rounds goes to sudden-death pairs, and a tie that survives the
//! sudden-death cap is settled by lot. Each kick and the lot cost one draw.

use tracing::{debug, info};

use super::config::EngineConfig;
use super::rng::MatchRng;
use crate::error::{EngineError, Result};
use crate::models::{Attribute, PlayerId, PlayerSnapshot, ShootoutSummary, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kick {
    pub side: Side,
    pub player: PlayerId,
    pub is_scored: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShootoutResult {
    pub kicks: Vec<Kick>,
    pub summary: ShootoutSummary,
}

/// Kicker rotation and goalkeeper for one side.
#[derive(Debug, Clone)]
pub struct ShootoutSide<'a> {
    pub kickers: Vec<&'a PlayerSnapshot>,
    pub keeper: &'a PlayerSnapshot,
}

impl<'a> ShootoutSide<'a> {
    /// Builds the rotation from the preferred order, keeping only players
    /// still on the pitch, then the rest of the on-pitch players by penalty
    /// skill with goalkeepers last.
    pub fn from_lineup(
        side: Side,
        preferred: &[PlayerId],
        on_pitch: &[&'a PlayerSnapshot],
    ) -> Result<Self> {
        if on_pitch.is_empty() {
            return Err(EngineError::InvariantViolation(format!(
                "{side:?} has no players left for the shootout"
            )));
        }

        let mut kickers: Vec<&PlayerSnapshot> = preferred
            .iter()
            .filter_map(|id| on_pitch.iter().copied().find(|p| p.id == *id))
            .collect();

        let mut rest: Vec<&PlayerSnapshot> = on_pitch
            .iter()
            .copied()
            .filter(|p| !kickers.iter().any(|k| k.id == p.id))
            .collect();
        rest.sort_by(|a, b| {
            a.position
                .is_goalkeeper()
                .cmp(&b.position.is_goalkeeper())
                .then_with(|| kicker_skill(b).total_cmp(&kicker_skill(a)))
                .then_with(|| a.id.cmp(&b.id))
        });
        kickers.extend(rest);

        let keeper = on_pitch
            .iter()
            .copied()
            .find(|p| p.position.is_goalkeeper())
            .or_else(|| {
                on_pitch.iter().copied().max_by_key(|p| (p.attribute(Attribute::Goalkeeping), std::cmp::Reverse(p.id)))
            })
            .ok_or_else(|| {
                EngineError::InvariantViolation(format!("{side:?} has no goalkeeper"))
            })?;

        Ok(Self { kickers, keeper })
    }
}

fn kicker_skill(player: &PlayerSnapshot) -> f64 {
    (player.attribute(Attribute::Finishing) as f64 + player.attribute(Attribute::Composure) as f64)
        / 2.0
}

/// Scoring probability of one kick.
pub fn kick_probability(config: &EngineConfig, kicker: &PlayerSnapshot, keeper: &PlayerSnapshot) -> f64 {
    let model = config.penalty;
    let diff = kicker_skill(kicker) - keeper.attribute(Attribute::Goalkeeping) as f64;
    (model.base + diff * model.per_point).clamp(model.min, model.max)
}

struct Tally {
    taken: u16,
    scored: u16,
    next: usize,
}

/// Either side is ahead by more than the other's remaining regular kicks.
fn is_decided(home: &Tally, away: &Tally, rounds: u16) -> bool {
    home.scored > away.scored + (rounds - away.taken)
        || away.scored > home.scored + (rounds - home.taken)
}

pub fn resolve(
    rng: &mut MatchRng,
    config: &EngineConfig,
    home: &ShootoutSide<'_>,
    away: &ShootoutSide<'_>,
) -> ShootoutResult {
    let rounds = config.shootout_rounds as u16;
    let mut kicks = Vec::new();
    let mut home_tally = Tally { taken: 0, scored: 0, next: 0 };
    let mut away_tally = Tally { taken: 0, scored: 0, next: 0 };

    let mut take_kick = |side: Side, tally: &mut Tally, kicks: &mut Vec<Kick>| {
        let (shooters, keeper) = match side {
            Side::Home => (home, away.keeper),
            Side::Away => (away, home.keeper),
        };
        let kicker = shooters.kickers[tally.next % shooters.kickers.len()];
        tally.next += 1;
        tally.taken += 1;
        let is_scored = rng.next_unit() < kick_probability(config, kicker, keeper);
        if is_scored {
            tally.scored += 1;
        }
        kicks.push(Kick { side, player: kicker.id, is_scored });
    };

    'regular: for _round in 0..rounds {
        take_kick(Side::Home, &mut home_tally, &mut kicks);
        if is_decided(&home_tally, &away_tally, rounds) {
            break 'regular;
        }
        take_kick(Side::Away, &mut away_tally, &mut kicks);
        if is_decided(&home_tally, &away_tally, rounds) {
            break 'regular;
        }
    }

    if home_tally.scored == away_tally.scored {
        debug!("shootout level after regular rounds, sudden death");
        for _round in 0..config.sudden_death_round_cap {
            take_kick(Side::Home, &mut home_tally, &mut kicks);
            take_kick(Side::Away, &mut away_tally, &mut kicks);
            if home_tally.scored != away_tally.scored {
                break;
            }
        }
    }

    let (winner, decided_by_lot) = match home_tally.scored.cmp(&away_tally.scored) {
        std::cmp::Ordering::Greater => (Side::Home, false),
        std::cmp::Ordering::Less => (Side::Away, false),
        std::cmp::Ordering::Equal => {
            let lot = if rng.next_unit() < 0.5 { Side::Home } else { Side::Away };
            info!(winner = ?lot, "shootout settled by drawing of lots");
            (lot, true)
        }
    };

    ShootoutResult {
        kicks,
        summary: ShootoutSummary {
            home_scored: home_tally.scored.min(u8::MAX as u16) as u8,
            away_scored: away_tally.scored.min(u8::MAX as u16) as u8,
            winner,
            decided_by_lot,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::match_sim::test_fixtures::create_test_sheet;
    use crate::models::{AttributeSet, Position, TeamId};

    fn sides<'a>(
        home: &'a [&'a PlayerSnapshot],
        away: &'a [&'a PlayerSnapshot],
    ) -> (ShootoutSide<'a>, ShootoutSide<'a>) {
        (
            ShootoutSide::from_lineup(Side::Home, &[], home).unwrap(),
            ShootoutSide::from_lineup(Side::Away, &[], away).unwrap(),
        )
    }

    #[test]
    fn test_always_produces_a_strict_winner() {
        let home_sheet = create_test_sheet(TeamId(1), "H", 60);
        let away_sheet = create_test_sheet(TeamId(2), "A", 60);
        let h: Vec<&PlayerSnapshot> = home_sheet.starters().collect();
        let a: Vec<&PlayerSnapshot> = away_sheet.starters().collect();
        let (home, away) = sides(&h, &a);
        let config = EngineConfig::default();

        for seed in 0..300u64 {
            let mut rng = MatchRng::new(seed);
            let result = resolve(&mut rng, &config, &home, &away);
            let s = result.summary;
            assert!(s.decided_by_lot || s.home_scored != s.away_scored);
            let expected = if s.decided_by_lot {
                s.winner
            } else if s.home_scored > s.away_scored {
                Side::Home
            } else {
                Side::Away
            };
            assert_eq!(s.winner, expected);
            assert_eq!(rng.draws(), result.kicks.len() as u64 + s.decided_by_lot as u64);
            let max_per_side = config.shootout_rounds as usize + config.sudden_death_round_cap as usize;
            assert!(result.kicks.len() <= 2 * max_per_side);
        }
    }

    #[test]
    fn test_early_termination_when_uncatchable() {
        let home_sheet = create_test_sheet(TeamId(1), "H", 60);
        let away_sheet = create_test_sheet(TeamId(2), "A", 60);
        let h: Vec<&PlayerSnapshot> = home_sheet.starters().collect();
        let a: Vec<&PlayerSnapshot> = away_sheet.starters().collect();
        let (home, away) = sides(&h, &a);
        let config = EngineConfig::default();

        for seed in 0..300u64 {
            let mut rng = MatchRng::new(seed);
            let result = resolve(&mut rng, &config, &home, &away);
            let regular = 2 * config.shootout_rounds as usize;
            if result.kicks.len() < regular {
                let (mut hs, mut as_, mut ht, mut at) = (0u16, 0u16, 0u16, 0u16);
                for kick in &result.kicks {
                    match kick.side {
                        Side::Home => {
                            ht += 1;
                            hs += kick.is_scored as u16;
                        }
                        Side::Away => {
                            at += 1;
                            as_ += kick.is_scored as u16;
                        }
                    }
                }
                let rounds = config.shootout_rounds as u16;
                assert!(hs > as_ + (rounds - at) || as_ > hs + (rounds - ht));
            }
        }
    }

    #[test]
    fn test_no_kick_is_taken_once_the_tie_is_decided() {
        let home_sheet = create_test_sheet(TeamId(1), "H", 60);
        let away_sheet = create_test_sheet(TeamId(2), "A", 60);
        let h: Vec<&PlayerSnapshot> = home_sheet.starters().collect();
        let a: Vec<&PlayerSnapshot> = away_sheet.starters().collect();
        let (home, away) = sides(&h, &a);
        let config = EngineConfig::default();
        let rounds = config.shootout_rounds as u16;

        for seed in 0..5_000u64 {
            let mut rng = MatchRng::new(seed);
            let result = resolve(&mut rng, &config, &home, &away);
            let mut home_tally = Tally { taken: 0, scored: 0, next: 0 };
            let mut away_tally = Tally { taken: 0, scored: 0, next: 0 };

            for (i, kick) in result.kicks.iter().enumerate() {
                let expected_side = if i % 2 == 0 { Side::Home } else { Side::Away };
                assert_eq!(kick.side, expected_side, "seed {seed}: kick {i} out of turn");
                let in_regular = home_tally.taken < rounds || away_tally.taken < rounds;
                if in_regular {
                    assert!(
                        !is_decided(&home_tally, &away_tally, rounds),
                        "seed {seed}: kick {i} taken after the tie was decided"
                    );
                }
                let tally = match kick.side {
                    Side::Home => &mut home_tally,
                    Side::Away => &mut away_tally,
                };
                tally.taken += 1;
                tally.scored += kick.is_scored as u16;
            }

            // A shootout that stopped inside the regular rounds stopped because it was decided.
            if home_tally.taken < rounds || away_tally.taken < rounds {
                assert!(is_decided(&home_tally, &away_tally, rounds), "seed {seed}: stopped early");
            }
        }
    }

    #[test]
    fn test_home_miss_that_leaves_away_out_of_reach_ends_the_shootout() {
        // Home 1/4, away 3/3: home can reach at most 2, so away's fourth kick is never taken.
        let home = Tally { taken: 4, scored: 1, next: 4 };
        let away = Tally { taken: 3, scored: 3, next: 3 };
        assert!(is_decided(&home, &away, 5));

        let level = Tally { taken: 3, scored: 2, next: 3 };
        assert!(!is_decided(&home, &level, 5));
    }

    #[test]
    fn test_sent_off_players_do_not_kick_and_order_is_respected() {
        let sheet = create_test_sheet(TeamId(1), "H", 60);
        let mut on_pitch: Vec<&PlayerSnapshot> = sheet.starters().collect();
        let dismissed = on_pitch.remove(3).id;
        let preferred = vec![sheet.starting[10], dismissed, sheet.starting[9]];

        let side = ShootoutSide::from_lineup(Side::Home, &preferred, &on_pitch).unwrap();
        assert_eq!(side.kickers[0].id, sheet.starting[10]);
        assert_eq!(side.kickers[1].id, sheet.starting[9]);
        assert_eq!(side.kickers.len(), on_pitch.len());
        assert!(side.kickers.iter().all(|k| k.id != dismissed));
        assert!(side.kickers.last().unwrap().position.is_goalkeeper());
        assert!(side.keeper.position.is_goalkeeper());
    }

    #[test]
    fn test_probability_is_clamped() {
        let config = EngineConfig::default();
        let ace = PlayerSnapshot::new(PlayerId(1), "Ace", Position::FW)
            .with_attributes(AttributeSet::uniform(100));
        let wall = PlayerSnapshot::new(PlayerId(2), "Wall", Position::GK)
            .with_attributes(AttributeSet::uniform(100));
        let weak = PlayerSnapshot::new(PlayerId(3), "Weak", Position::GK)
            .with_attributes(AttributeSet::uniform(0));
        assert_eq!(kick_probability(&config, &ace, &weak), config.penalty.max);
        assert_eq!(kick_probability(&config, &weak, &wall), config.penalty.min);
        assert!((kick_probability(&config, &ace, &wall) - config.penalty.base).abs() < 1e-9);
    }

    #[test]
    fn test_no_players_is_an_invariant_violation() {
        assert!(matches!(
            ShootoutSide::from_lineup(Side::Away, &[], &[]),
            Err(EngineError::InvariantViolation(_))
        ));
    }
}

//! Hash-based deterministic values
//!
//! Values that must be stable for a given (seed, subcase) but must not
//! consume draws from the match stream. FxHash is used because
//! `DefaultHasher` output is not stable across Rust releases.

use fxhash::FxHasher;
use std::hash::{Hash, Hasher};

use crate::models::{CompetitionScope, Fixture, MatchId};

/// Subcase constants, one per derived value.
pub mod subcase {
    pub const MATCH_SEED: u32 = 0x0100;
    pub const ATTENDANCE: u32 = 0x0200;
}

#[inline]
fn hash_parts(seed: u64, subcase: u32, salt: u64) -> u64 {
    let mut hasher = FxHasher::default();
    seed.hash(&mut hasher);
    subcase.hash(&mut hasher);
    salt.hash(&mut hasher);
    hasher.finish()
}

/// Value in `[0, 1)` for the given seed and subcase.
#[inline]
pub fn deterministic_unit(seed: u64, subcase: u32, salt: u64) -> f64 {
    (hash_parts(seed, subcase, salt) >> 11) as f64 / (1u64 << 53) as f64
}

/// Per-match seed derived from the game-save seed.
pub fn derive_match_seed(save_seed: u64, match_id: MatchId) -> u64 {
    hash_parts(save_seed, subcase::MATCH_SEED, match_id.0)
}

/// Crowd for a fixture: a base fill rate per competition scope plus up to
/// 25% seed-dependent variation, capped at capacity.
pub fn attendance(fixture: &Fixture, seed: u64) -> u32 {
    if fixture.stadium_capacity == 0 {
        return 0;
    }
    let base_fill = match fixture.scope {
        CompetitionScope::League => 0.70,
        CompetitionScope::Cup => 0.65,
        CompetitionScope::EuropeanCup => 0.85,
    };
    let elimination_bonus = if fixture.is_elimination { 0.05 } else { 0.0 };
    let variation = deterministic_unit(seed, subcase::ATTENDANCE, fixture.match_id.0) * 0.25;
    let fill = (base_fill + elimination_bonus + variation).min(1.0);
    (fixture.stadium_capacity as f64 * fill).round() as u32
}

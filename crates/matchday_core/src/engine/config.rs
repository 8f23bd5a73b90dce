//! Engine Configuration
//!
//! Timing and shootout parameters. The defaults are the named constants
//! below; a YAML document can override any subset of them.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Outcome ranges tile `0..DRAW_SPACE`.
pub const DRAW_SPACE: u16 = 100;

/// Each turn consumes exactly this many draws (event type, outcome, actor),
/// whichever branch the selector takes.
pub const DRAWS_PER_TURN: u64 = 3;

// === Defaults ===
pub const MINUTES_PER_TURN: u16 = 1;
pub const REGULATION_MINUTES: u16 = 90;
pub const EXTRA_TIME_MINUTES: u16 = 30;
pub const SHOOTOUT_ROUNDS: u8 = 5;
pub const SUDDEN_DEATH_ROUND_CAP: u16 = 40;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Match clock advance per simulated turn.
    pub minutes_per_turn: u16,
    pub regulation_minutes: u16,
    /// Extra time granted to level elimination ties (one block, both halves).
    pub extra_time_minutes: u16,
    /// Kicks per side before sudden death.
    pub shootout_rounds: u8,
    /// Sudden-death pairs before the tie is settled by lot.
    pub sudden_death_round_cap: u16,
    pub penalty: PenaltyModel,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            minutes_per_turn: MINUTES_PER_TURN,
            regulation_minutes: REGULATION_MINUTES,
            extra_time_minutes: EXTRA_TIME_MINUTES,
            shootout_rounds: SHOOTOUT_ROUNDS,
            sudden_death_round_cap: SUDDEN_DEATH_ROUND_CAP,
            penalty: PenaltyModel::default(),
        }
    }
}

/// Scoring probability of a shootout kick:
/// `clamp(base + (kicker - keeper) * per_point, min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenaltyModel {
    pub base: f64,
    pub per_point: f64,
    pub min: f64,
    pub max: f64,
}

impl Default for PenaltyModel {
    fn default() -> Self {
        Self { base: 0.75, per_point: 0.004, min: 0.55, max: 0.92 }
    }
}

impl EngineConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: EngineConfig = serde_yaml::from_str(text)
            .map_err(|e| EngineError::Config(format!("engine config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.minutes_per_turn == 0 {
            return Err(EngineError::Config("minutes_per_turn must be positive".into()));
        }
        if self.regulation_minutes == 0 {
            return Err(EngineError::Config("regulation_minutes must be positive".into()));
        }
        if self.shootout_rounds == 0 {
            return Err(EngineError::Config("shootout_rounds must be positive".into()));
        }
        let p = self.penalty;
        // A certain kick (or a certain miss) would make sudden death endless.
        if !(p.min > 0.0 && p.min <= p.max && p.max < 1.0) {
            return Err(EngineError::Config(format!(
                "penalty probability bounds must satisfy 0 < min <= max < 1 (got {} / {})",
                p.min, p.max
            )));
        }
        Ok(())
    }

    /// Turns needed to play out a period of `minutes`.
    pub fn turns_for(&self, minutes: u16) -> u32 {
        let per = self.minutes_per_turn.max(1) as u32;
        (minutes as u32).div_ceil(per)
    }
}

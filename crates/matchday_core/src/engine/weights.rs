//! Event weight table and team attribute profiles.
//!
//! Each event kind carries a list of (attribute, attack, defence) weights.
//! The selection mass of a kind is
//! `max(0, Σ acting_profile[a] * attack[a] - Σ opponent_profile[a] * defence[a])`.

use serde::Deserialize;
use std::collections::HashMap;
use tracing::warn;

use crate::error::{EngineError, Result};
use crate::models::{Attribute, EventKind, PlayerSnapshot, STARTING_ELEVEN};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct AttributeWeight {
    pub attribute: Attribute,
    #[serde(default)]
    pub attack: f64,
    #[serde(default)]
    pub defence: f64,
}

#[derive(Debug, Clone, Default)]
pub struct WeightTable {
    entries: HashMap<EventKind, Vec<AttributeWeight>>,
}

impl WeightTable {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let entries: HashMap<EventKind, Vec<AttributeWeight>> = serde_yaml::from_str(text)
            .map_err(|e| EngineError::Config(format!("event weights: {e}")))?;
        Self::from_entries(entries)
    }

    pub fn from_entries(entries: HashMap<EventKind, Vec<AttributeWeight>>) -> Result<Self> {
        for (kind, weights) in &entries {
            if let Some(bad) =
                weights.iter().find(|w| !w.attack.is_finite() || !w.defence.is_finite())
            {
                return Err(EngineError::Config(format!(
                    "event weights: {} has a non-finite weight for {:?}",
                    kind.code(),
                    bad.attribute
                )));
            }
        }

        let table = Self { entries };
        let missing = table.missing_kinds();
        if !missing.is_empty() {
            warn!(
                missing = ?missing,
                "event weights incomplete, event selection will fall back to uniform"
            );
        }
        Ok(table)
    }

    pub fn weights(&self, kind: EventKind) -> Option<&[AttributeWeight]> {
        self.entries.get(&kind).map(Vec::as_slice)
    }

    /// Kinds with no configured weights at all.
    pub fn missing_kinds(&self) -> Vec<EventKind> {
        EventKind::ALL
            .iter()
            .copied()
            .filter(|kind| self.entries.get(kind).map_or(true, Vec::is_empty))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_kinds().is_empty()
    }

    /// Selection mass of `kind`, or `None` when the kind is unconfigured.
    pub fn mass(&self, kind: EventKind, acting: &TeamProfile, opponent: &TeamProfile) -> Option<f64> {
        let weights = self.weights(kind).filter(|w| !w.is_empty())?;
        let attack: f64 = weights.iter().map(|w| acting.get(w.attribute) * w.attack).sum();
        let defence: f64 = weights.iter().map(|w| opponent.get(w.attribute) * w.defence).sum();
        Some((attack - defence).max(0.0))
    }
}

/// Per-attribute team strength: sum over on-pitch players divided by a full
/// eleven, so a dismissal lowers every attribute of the side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeamProfile {
    values: [f64; Attribute::COUNT],
}

impl TeamProfile {
    pub fn from_players<'a>(players: impl IntoIterator<Item = &'a PlayerSnapshot>) -> Self {
        let mut values = [0.0; Attribute::COUNT];
        for player in players {
            for attribute in Attribute::ALL {
                values[attribute.index()] += player.attribute(attribute) as f64;
            }
        }
        for value in &mut values {
            *value /= STARTING_ELEVEN as f64;
        }
        Self { values }
    }

    pub fn get(&self, attribute: Attribute) -> f64 {
        self.values[attribute.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AttributeSet, PlayerId, Position};

    fn eleven(value: u8) -> Vec<PlayerSnapshot> {
        (0..11)
            .map(|i| {
                PlayerSnapshot::new(PlayerId(i), format!("P{i}"), Position::MF)
                    .with_attributes(AttributeSet::uniform(value))
            })
            .collect()
    }

    #[test]
    fn test_profile_divides_by_full_eleven() {
        let players = eleven(60);
        let full = TeamProfile::from_players(&players);
        assert!((full.get(Attribute::Passing) - 60.0).abs() < 1e-9);

        let short = TeamProfile::from_players(&players[..10]);
        assert!((short.get(Attribute::Passing) - 60.0 * 10.0 / 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_mass_clamps_at_zero() {
        let yaml = "shot:\n  - { attribute: finishing, attack: 0.5, defence: 2.0 }\n";
        let table = WeightTable::from_yaml_str(yaml).unwrap();
        let profile = TeamProfile::from_players(&eleven(50));
        assert_eq!(table.mass(EventKind::Shot, &profile, &profile), Some(0.0));
        assert_eq!(table.mass(EventKind::Tackle, &profile, &profile), None);
        assert!(!table.is_complete());
        assert_eq!(table.missing_kinds().len(), EventKind::ALL.len() - 1);
    }

    #[test]
    fn test_stronger_side_gets_more_mass() {
        let yaml = "dribble:\n  - { attribute: dribbling, attack: 1.0 }\n  - { attribute: tackling, defence: 0.5 }\n";
        let table = WeightTable::from_yaml_str(yaml).unwrap();
        let strong = TeamProfile::from_players(&eleven(80));
        let weak = TeamProfile::from_players(&eleven(40));
        let a = table.mass(EventKind::Dribble, &strong, &weak).unwrap();
        let b = table.mass(EventKind::Dribble, &weak, &strong).unwrap();
        assert!(a > b);
    }

    #[test]
    fn test_rejects_unknown_kind() {
        let yaml = "bicycle_kick:\n  - { attribute: finishing, attack: 1.0 }\n";
        assert!(matches!(WeightTable::from_yaml_str(yaml), Err(EngineError::Config(_))));
    }
}

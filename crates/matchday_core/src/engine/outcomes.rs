//! Outcome table: per event kind, disjoint inclusive sub-ranges that tile
//! the draw space `0..=99`.
//!
//! A kind whose ranges do not tile the draw space is kept aside as broken.
//! Loading never fails because of it; only a match that actually draws the
//! broken kind fails (invariant violation, fatal for that match).

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{error, warn};

use super::config::DRAW_SPACE;
use crate::error::{EngineError, Result};
use crate::models::{EventKind, Outcome};

const LAST_SLOT: u8 = (DRAW_SPACE - 1) as u8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeRange {
    pub outcome: Outcome,
    pub min: u8,
    pub max: u8,
    #[serde(default)]
    pub changes_possession: bool,
}

impl OutcomeRange {
    pub fn contains(&self, slot: u8) -> bool {
        (self.min..=self.max).contains(&slot)
    }
}

/// Validated ranges for one kind, sorted by `min`.
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeSet {
    ranges: Vec<OutcomeRange>,
}

impl OutcomeSet {
    pub fn new(kind: EventKind, mut ranges: Vec<OutcomeRange>) -> Result<Self> {
        let fail = |reason: String| {
            EngineError::InvariantViolation(format!("outcome ranges for {}: {reason}", kind.code()))
        };

        if ranges.is_empty() {
            return Err(fail("no ranges".into()));
        }
        ranges.sort_by_key(|r| (r.min, r.max));

        let mut seen = HashSet::new();
        let mut next = 0u16;
        for range in &ranges {
            if range.min > range.max {
                return Err(fail(format!("{:?} has min {} > max {}", range.outcome, range.min, range.max)));
            }
            if !seen.insert(range.outcome) {
                return Err(fail(format!("{:?} listed twice", range.outcome)));
            }
            match (range.min as u16).cmp(&next) {
                std::cmp::Ordering::Less => {
                    return Err(fail(format!("overlap at {}", range.min)));
                }
                std::cmp::Ordering::Greater => {
                    return Err(fail(format!("gap between {} and {}", next, range.min - 1)));
                }
                std::cmp::Ordering::Equal => {}
            }
            next = range.max as u16 + 1;
        }
        if next != DRAW_SPACE {
            return Err(fail(format!("ranges end at {} instead of {}", next - 1, LAST_SLOT)));
        }

        Ok(Self { ranges })
    }

    /// Single range covering the whole draw space, used when a kind has no
    /// configured outcomes.
    pub fn neutral() -> Self {
        Self {
            ranges: vec![OutcomeRange {
                outcome: Outcome::Completed,
                min: 0,
                max: LAST_SLOT,
                changes_possession: false,
            }],
        }
    }

    pub fn ranges(&self) -> &[OutcomeRange] {
        &self.ranges
    }

    pub fn resolve(&self, slot: u8) -> OutcomeRange {
        let slot = slot.min(LAST_SLOT);
        // Ranges tile the draw space, so the partition point is always in bounds.
        let idx = self.ranges.partition_point(|r| r.max < slot);
        self.ranges[idx]
    }

    pub fn outcomes(&self) -> impl Iterator<Item = Outcome> + '_ {
        self.ranges.iter().map(|r| r.outcome)
    }
}

#[derive(Debug, Clone, Default)]
pub struct OutcomeTable {
    sets: HashMap<EventKind, OutcomeSet>,
    broken: BTreeMap<EventKind, String>,
}

impl OutcomeTable {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let raw: HashMap<EventKind, Vec<OutcomeRange>> = serde_yaml::from_str(text)
            .map_err(|e| EngineError::Config(format!("event outcomes: {e}")))?;
        Ok(Self::from_ranges(raw))
    }

    pub fn from_ranges(raw: HashMap<EventKind, Vec<OutcomeRange>>) -> Self {
        let mut table = Self::default();
        for (kind, ranges) in raw {
            match OutcomeSet::new(kind, ranges) {
                Ok(set) => {
                    table.sets.insert(kind, set);
                }
                Err(e) => {
                    error!(kind = kind.code(), error = %e, "outcome set rejected");
                    table.broken.insert(kind, e.to_string());
                }
            }
        }
        let missing = table.missing_kinds();
        if !missing.is_empty() {
            warn!(missing = ?missing, "no outcomes configured, using the neutral outcome set");
        }
        table
    }

    /// Outcome for `slot` of `kind`.
    ///
    /// Fails only when the kind's configured ranges are invalid.
    pub fn resolve(&self, kind: EventKind, slot: u8) -> Result<OutcomeRange> {
        if let Some(reason) = self.broken.get(&kind) {
            return Err(EngineError::InvariantViolation(reason.clone()));
        }
        match self.sets.get(&kind) {
            Some(set) => Ok(set.resolve(slot)),
            None => Ok(OutcomeSet::neutral().resolve(slot)),
        }
    }

    pub fn set(&self, kind: EventKind) -> Option<&OutcomeSet> {
        self.sets.get(&kind)
    }

    pub fn missing_kinds(&self) -> Vec<EventKind> {
        EventKind::ALL
            .iter()
            .copied()
            .filter(|k| !self.sets.contains_key(k) && !self.broken.contains_key(k))
            .collect()
    }

    pub fn broken_kinds(&self) -> impl Iterator<Item = (EventKind, &str)> + '_ {
        self.broken.iter().map(|(k, reason)| (*k, reason.as_str()))
    }

    /// Every kind configured and every configured set valid.
    pub fn validate_strict(&self) -> Result<()> {
        if let Some((_, reason)) = self.broken.iter().next() {
            return Err(EngineError::InvariantViolation(reason.clone()));
        }
        let missing = self.missing_kinds();
        if !missing.is_empty() {
            return Err(EngineError::Config(format!("no outcomes configured for {missing:?}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn range(outcome: Outcome, min: u8, max: u8) -> OutcomeRange {
        OutcomeRange { outcome, min, max, changes_possession: false }
    }

    #[test]
    fn test_resolve_boundaries() {
        let set = OutcomeSet::new(
            EventKind::Tackle,
            vec![range(Outcome::Missed, 55, 99), range(Outcome::Won, 0, 54)],
        )
        .unwrap();
        assert_eq!(set.resolve(0).outcome, Outcome::Won);
        assert_eq!(set.resolve(54).outcome, Outcome::Won);
        assert_eq!(set.resolve(55).outcome, Outcome::Missed);
        assert_eq!(set.resolve(99).outcome, Outcome::Missed);
    }

    #[test]
    fn test_rejects_gap_overlap_and_short_cover() {
        let gap = vec![range(Outcome::Won, 0, 40), range(Outcome::Missed, 42, 99)];
        let overlap = vec![range(Outcome::Won, 0, 50), range(Outcome::Missed, 50, 99)];
        let short = vec![range(Outcome::Won, 0, 50), range(Outcome::Missed, 51, 98)];
        let late_start = vec![range(Outcome::Won, 1, 99)];
        let duplicate = vec![range(Outcome::Won, 0, 50), range(Outcome::Won, 51, 99)];
        for ranges in [gap, overlap, short, late_start, duplicate] {
            assert!(matches!(
                OutcomeSet::new(EventKind::Tackle, ranges),
                Err(EngineError::InvariantViolation(_))
            ));
        }
    }

    #[test]
    fn test_broken_kind_fails_only_when_drawn() {
        let mut raw = HashMap::new();
        raw.insert(EventKind::Tackle, vec![range(Outcome::Won, 0, 40)]);
        raw.insert(EventKind::Offside, vec![range(Outcome::Flagged, 0, 99)]);
        let table = OutcomeTable::from_ranges(raw);

        assert!(table.resolve(EventKind::Offside, 10).is_ok());
        assert!(matches!(
            table.resolve(EventKind::Tackle, 10),
            Err(EngineError::InvariantViolation(_))
        ));
        // Unconfigured kinds fall back to the neutral set.
        assert_eq!(table.resolve(EventKind::Shot, 5).unwrap().outcome, Outcome::Completed);
        assert!(table.validate_strict().is_err());
    }

    fn partition() -> impl Strategy<Value = Vec<OutcomeRange>> {
        // Distinct cut points in 1..=99 split the draw space into 1..=8 ranges.
        proptest::collection::btree_set(1u8..=99, 0..8).prop_map(|cuts| {
            let mut bounds: Vec<u8> = vec![0];
            bounds.extend(cuts);
            let outcomes = [
                Outcome::Completed,
                Outcome::Intercepted,
                Outcome::Overhit,
                Outcome::Cleared,
                Outcome::Goal,
                Outcome::Saved,
                Outcome::OffTarget,
                Outcome::Blocked,
                Outcome::Woodwork,
            ];
            bounds
                .iter()
                .enumerate()
                .map(|(i, &min)| {
                    let max = bounds.get(i + 1).map_or(LAST_SLOT, |next| next - 1);
                    range(outcomes[i], min, max)
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_valid_partitions_resolve_every_slot(ranges in partition(), slot in 0u8..=99) {
            let set = OutcomeSet::new(EventKind::Shot, ranges).unwrap();
            let hits = set.ranges().iter().filter(|r| r.contains(slot)).count();
            prop_assert_eq!(hits, 1);
            prop_assert!(set.resolve(slot).contains(slot));
        }

        #[test]
        fn prop_shrunk_partitions_are_rejected(ranges in partition(), trim in 1u8..=5) {
            let mut ranges = ranges;
            let last = ranges.len() - 1;
            ranges[last].max = ranges[last].max.saturating_sub(trim).max(ranges[last].min);
            if ranges[last].max < LAST_SLOT {
                prop_assert!(OutcomeSet::new(EventKind::Shot, ranges).is_err());
            }
        }
    }
}

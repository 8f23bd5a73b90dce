use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::PlayerId;

/// Value assumed for attributes a roster snapshot leaves out.
pub const DEFAULT_ATTRIBUTE_VALUE: u8 = 50;

/// Player attributes that can drive event selection (0-100 scale).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Finishing,
    Passing,
    Vision,
    Dribbling,
    Crossing,
    Heading,
    Tackling,
    Marking,
    Positioning,
    Aggression,
    Pace,
    Composure,
    Goalkeeping,
}

impl Attribute {
    pub const COUNT: usize = 13;

    pub const ALL: [Attribute; Attribute::COUNT] = [
        Attribute::Finishing,
        Attribute::Passing,
        Attribute::Vision,
        Attribute::Dribbling,
        Attribute::Crossing,
        Attribute::Heading,
        Attribute::Tackling,
        Attribute::Marking,
        Attribute::Positioning,
        Attribute::Aggression,
        Attribute::Pace,
        Attribute::Composure,
        Attribute::Goalkeeping,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Frozen attribute values of one player for the duration of a match.
///
/// Serialized as a `{attribute: value}` map; missing entries fall back to
/// [`DEFAULT_ATTRIBUTE_VALUE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<Attribute, u8>", into = "BTreeMap<Attribute, u8>")]
pub struct AttributeSet {
    values: [u8; Attribute::COUNT],
}

impl Default for AttributeSet {
    fn default() -> Self {
        Self::uniform(DEFAULT_ATTRIBUTE_VALUE)
    }
}

impl AttributeSet {
    pub fn uniform(value: u8) -> Self {
        Self { values: [value.min(100); Attribute::COUNT] }
    }

    pub fn get(&self, attribute: Attribute) -> u8 {
        self.values[attribute.index()]
    }

    pub fn set(&mut self, attribute: Attribute, value: u8) {
        self.values[attribute.index()] = value.min(100);
    }

    pub fn with(mut self, attribute: Attribute, value: u8) -> Self {
        self.set(attribute, value);
        self
    }
}

impl From<BTreeMap<Attribute, u8>> for AttributeSet {
    fn from(map: BTreeMap<Attribute, u8>) -> Self {
        let mut set = AttributeSet::default();
        for (attribute, value) in map {
            set.set(attribute, value);
        }
        set
    }
}

impl From<AttributeSet> for BTreeMap<Attribute, u8> {
    fn from(set: AttributeSet) -> Self {
        Attribute::ALL.iter().map(|&a| (a, set.get(a))).collect()
    }
}

/// Broad on-pitch role. Event types weight their actor selection by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
pub enum Position {
    GK,
    DF,
    MF,
    FW,
}

impl Position {
    pub fn is_goalkeeper(&self) -> bool {
        matches!(self, Position::GK)
    }
}

/// A player as selected for one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub name: String,
    pub position: Position,
    #[serde(default)]
    pub attributes: AttributeSet,
}

impl PlayerSnapshot {
    pub fn new(id: PlayerId, name: impl Into<String>, position: Position) -> Self {
        Self { id, name: name.into(), position, attributes: AttributeSet::default() }
    }

    pub fn with_attributes(mut self, attributes: AttributeSet) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn attribute(&self, attribute: Attribute) -> u8 {
        self.attributes.get(attribute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_attribute_index_matches_all_order() {
        for (i, attribute) in Attribute::iter().enumerate() {
            assert_eq!(attribute.index(), i);
            assert_eq!(Attribute::ALL[i], attribute);
        }
        assert_eq!(Attribute::iter().count(), Attribute::COUNT);
    }

    #[test]
    fn test_attribute_set_json_defaults_missing_values() {
        let set: AttributeSet = serde_json::from_str(r#"{"finishing": 90, "pace": 120}"#).unwrap();
        assert_eq!(set.get(Attribute::Finishing), 90);
        assert_eq!(set.get(Attribute::Pace), 100, "values are capped at 100");
        assert_eq!(set.get(Attribute::Tackling), DEFAULT_ATTRIBUTE_VALUE);
    }
}

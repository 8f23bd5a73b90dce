//! Identifier newtypes.
//!
//! Records reference each other by id into the owning collection (team sheet
//! arena, standings table, stats book) instead of holding pointers.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident($inner:ty)) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub $inner);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$inner> for $name {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }
    };
}

id_type!(
    /// A fixture being (or having been) simulated.
    MatchId(u64)
);
id_type!(TeamId(u32));
id_type!(PlayerId(u32));
id_type!(CompetitionId(u32));
id_type!(SeasonId(u32));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_as_plain_numbers() {
        let json = serde_json::to_string(&PlayerId(42)).unwrap();
        assert_eq!(json, "42");
        let back: MatchId = serde_json::from_str("7").unwrap();
        assert_eq!(back, MatchId(7));
        assert_eq!(TeamId(5).to_string(), "5");
    }
}

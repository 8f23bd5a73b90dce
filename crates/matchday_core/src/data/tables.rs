//! Simulation Tables Loading
//!
//! The default tables are embedded at compile time and parsed once.
//!
//! ```rust
//! use matchday_core::data::SimulationTables;
//!
//! let tables = SimulationTables::embedded();
//! assert!(tables.validate_strict().is_ok());
//! ```

use std::sync::OnceLock;
use tracing::warn;

use crate::engine::commentary::CommentaryBook;
use crate::engine::outcomes::OutcomeTable;
use crate::engine::weights::WeightTable;
use crate::error::{EngineError, Result};
use crate::models::EventKind;

// =============================================================================
// Embedded YAML Data
// =============================================================================

pub const EVENT_WEIGHTS_YAML: &str = include_str!("../../data/event_weights.yaml");
pub const EVENT_OUTCOMES_YAML: &str = include_str!("../../data/event_outcomes.yaml");
pub const COMMENTARY_YAML: &str = include_str!("../../data/commentary.yaml");

static EMBEDDED: OnceLock<SimulationTables> = OnceLock::new();

#[derive(Debug, Clone, Default)]
pub struct SimulationTables {
    pub weights: WeightTable,
    pub outcomes: OutcomeTable,
    pub commentary: CommentaryBook,
}

impl SimulationTables {
    /// Tables shipped with the crate, parsed on first use.
    ///
    /// # Panics
    ///
    /// Panics if the embedded YAML does not parse, which cannot happen in a
    /// build whose tests pass.
    pub fn embedded() -> &'static SimulationTables {
        EMBEDDED.get_or_init(|| {
            Self::from_yaml(EVENT_WEIGHTS_YAML, EVENT_OUTCOMES_YAML, COMMENTARY_YAML)
                .expect("Failed to parse embedded simulation tables")
        })
    }

    /// Parses caller-supplied tables. Only syntax errors and malformed
    /// templates fail here; incomplete tables fall back at simulation time.
    pub fn from_yaml(weights: &str, outcomes: &str, commentary: &str) -> Result<Self> {
        let tables = Self {
            weights: WeightTable::from_yaml_str(weights)?,
            outcomes: OutcomeTable::from_yaml_str(outcomes)?,
            commentary: CommentaryBook::from_yaml_str(commentary)?,
        };
        let gaps = tables.commentary_gaps();
        if !gaps.is_empty() {
            warn!(count = gaps.len(), "commentary missing for some outcomes, generic lines will be used");
        }
        Ok(tables)
    }

    /// (kind, outcome) pairs the outcome table can produce with no
    /// commentary template.
    pub fn commentary_gaps(&self) -> Vec<(EventKind, crate::models::Outcome)> {
        let pairs = EventKind::ALL.iter().flat_map(|&kind| {
            self.outcomes
                .set(kind)
                .map(|set| set.outcomes().map(move |o| (kind, o)).collect::<Vec<_>>())
                .unwrap_or_default()
        });
        self.commentary.coverage_gaps(pairs)
    }

    /// Rejects anything that would make the engine fall back: missing
    /// weights, broken or missing outcome sets, missing commentary.
    pub fn validate_strict(&self) -> Result<()> {
        let missing = self.weights.missing_kinds();
        if !missing.is_empty() {
            return Err(EngineError::Config(format!("no weights configured for {missing:?}")));
        }
        self.outcomes.validate_strict()?;
        let gaps = self.commentary_gaps();
        if let Some((kind, outcome)) = gaps.first() {
            return Err(EngineError::Config(format!(
                "no commentary for {} / {} ({} gaps)",
                kind.code(),
                outcome.code(),
                gaps.len()
            )));
        }
        Ok(())
    }
}

//! Reference data: event weights, outcome ranges and commentary templates.

pub mod tables;

pub use tables::{SimulationTables, COMMENTARY_YAML, EVENT_OUTCOMES_YAML, EVENT_WEIGHTS_YAML};

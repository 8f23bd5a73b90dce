pub mod commentary;
pub mod config; // Timing, shootout and penalty parameters
pub mod deterministic; // Hash-derived seeds and attendance
pub mod match_sim;
pub mod outcomes;
pub mod rng;
pub mod selector;
pub mod shootout;
pub mod weights;

pub use commentary::{CommentaryBook, CommentaryContext};
pub use config::{EngineConfig, PenaltyModel};
pub use outcomes::{OutcomeRange, OutcomeSet, OutcomeTable};
pub use rng::MatchRng;
pub use selector::{EventSelector, Selection};
pub use weights::{TeamProfile, WeightTable};

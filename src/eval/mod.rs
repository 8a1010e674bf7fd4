//! Move evaluation.
//!
//! Scores a single candidate placement from the mover's perspective using a
//! weighted sum of tactical features. Weights live in [`weights`] so rooms can
//! tune them without touching the scoring code.

pub mod heuristic;
pub mod weights;

pub use heuristic::{analyze_move, evaluate_move, BlockTier, MoveFactors, ReplaceFactor, RunPosition};
pub use weights::HeuristicWeights;

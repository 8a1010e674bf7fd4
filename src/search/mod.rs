//! Bot move selection.
//!
//! The bot is a one-ply greedy searcher: it scores every legal move with the
//! heuristic evaluator and plays the best one.

pub mod greedy;

pub use greedy::{choose_move, score_moves, BotChoice, ScoredMove};

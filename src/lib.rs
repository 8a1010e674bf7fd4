//! ninegrid rules engine library.
//!
//! Exposes the board representation, move generation, win and scoring rules,
//! the heuristic bot, the turn controller and the room service for use by
//! integration tests and the binary entry point.

pub mod board;
pub mod config;
pub mod deck;
pub mod error;
pub mod eval;
pub mod game;
pub mod movegen;
pub mod room;
pub mod rules;
pub mod search;
pub mod selfplay;

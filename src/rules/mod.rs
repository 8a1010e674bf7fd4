//! Win detection and endgame scoring.

pub mod scoring;
pub mod win;

pub use scoring::{rank, resolve_winner, tie_breaker_line_sum, total_owned_sum, RankRow, TiePolicy};
pub use win::{count_direction, is_winning_after, longest_run_through, run_length_through};

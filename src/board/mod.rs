//! Board representation and game-state types.
//!
//! Contains the grid, its cells and access cache, seated players with their
//! hands and decks, and the move type shared by every other module.

pub mod cell;
pub mod grid;
pub mod placement;
pub mod player;

pub use cell::{
    Card, Cell, CellAccess, Pos, CARD_MAX, CARD_MIN, LINE_DIRECTIONS, NEIGHBOR_OFFSETS,
    PERMANENT_VALUE,
};
pub use grid::{Board, DEFAULT_BOARD_SIZE, WIN_LENGTH};
pub use placement::Move;
pub use player::{Player, PlayerId};

//! Grid positions and cell contents.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::player::PlayerId;

/// Lowest card value.
pub const CARD_MIN: u8 = 1;
/// Highest card value.
pub const CARD_MAX: u8 = 9;
/// Cards of this value can never be overwritten.
pub const PERMANENT_VALUE: u8 = 9;

/// Offsets of the 8-connected (Moore) neighborhood.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// The four line axes: horizontal, vertical, diagonal down-right, diagonal up-right.
pub const LINE_DIRECTIONS: [(i32, i32); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

/// A zero-based grid coordinate. `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub const fn new(x: usize, y: usize) -> Self {
        Pos { x, y }
    }

    /// Steps by `(dx, dy)`, returning None when leaving a `size`-wide board.
    #[inline]
    pub fn offset(self, dx: i32, dy: i32, size: usize) -> Option<Pos> {
        let nx = self.x as i64 + dx as i64;
        let ny = self.y as i64 + dy as i64;
        if nx < 0 || ny < 0 || nx >= size as i64 || ny >= size as i64 {
            return None;
        }
        Some(Pos::new(nx as usize, ny as usize))
    }

    /// In-bounds Moore neighbors on a `size`-wide board.
    pub fn neighbors(self, size: usize) -> impl Iterator<Item = Pos> {
        NEIGHBOR_OFFSETS
            .into_iter()
            .filter_map(move |(dx, dy)| self.offset(dx, dy, size))
    }

    /// Chebyshev distance of exactly one.
    pub fn is_adjacent(self, other: Pos) -> bool {
        self != other && self.x.abs_diff(other.x) <= 1 && self.y.abs_diff(other.y) <= 1
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Derived placement state of a cell relative to the last move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellAccess {
    /// Not a candidate for the next move.
    Blocked,
    /// Empty candidate: any card may be placed.
    Placeable,
    /// Occupied candidate that a higher card may overwrite.
    Replaceable,
    /// Occupied candidate holding a permanent card.
    Permanent,
}

/// A card lying on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub owner: PlayerId,
    pub value: u8,
}

/// One grid position. Empty cells have no card, so value 0 and "no owner"
/// always coincide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub card: Option<Card>,
    pub access: CellAccess,
}

impl Cell {
    pub const EMPTY: Cell = Cell { card: None, access: CellAccess::Blocked };

    /// Card value, 0 when empty.
    #[inline]
    pub fn value(&self) -> u8 {
        self.card.map_or(0, |c| c.value)
    }

    #[inline]
    pub fn owner(&self) -> Option<PlayerId> {
        self.card.map(|c| c.owner)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.card.is_none()
    }

    #[inline]
    pub fn is_owned_by(&self, player: PlayerId) -> bool {
        self.owner() == Some(player)
    }

    /// Owned by someone other than `player`.
    #[inline]
    pub fn is_opponent_of(&self, player: PlayerId) -> bool {
        matches!(self.owner(), Some(o) if o != player)
    }

    /// Access state this cell takes when it is a candidate.
    pub(crate) fn candidate_access(&self) -> CellAccess {
        match self.card {
            None => CellAccess::Placeable,
            Some(c) if c.value >= PERMANENT_VALUE => CellAccess::Permanent,
            Some(_) => CellAccess::Replaceable,
        }
    }
}

//! Proposed card placements.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::cell::Pos;
use super::player::PlayerId;

/// A card placement proposed by `player`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub x: usize,
    pub y: usize,
    pub card: u8,
    pub player: PlayerId,
}

impl Move {
    pub const fn new(x: usize, y: usize, card: u8, player: PlayerId) -> Self {
        Move { x, y, card, player }
    }

    pub const fn at(pos: Pos, card: u8, player: PlayerId) -> Self {
        Move { x: pos.x, y: pos.y, card, player }
    }

    #[inline]
    pub const fn pos(&self) -> Pos {
        Pos::new(self.x, self.y)
    }

    /// Canonical enumeration order: card, then row, then column.
    pub fn enumeration_cmp(&self, other: &Move) -> Ordering {
        (self.card, self.y, self.x).cmp(&(other.card, other.y, other.x))
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} plays {} at ({},{})", self.player, self.card, self.x, self.y)
    }
}

//! The square playing grid.
//!
//! Cells are stored row-major in a flat vector. Besides card ownership the
//! board tracks the last placed position, because the next move must land in
//! its Moore neighborhood (the opening move goes to the center). Each cell
//! caches its [`CellAccess`] relative to that rule; [`Board::place`] keeps the
//! cache current by touching only the two affected neighborhoods, and
//! [`Board::refresh_access`] rebuilds it from scratch.

use std::fmt;

use serde::Serialize;

use super::cell::{Card, Cell, CellAccess, Pos, CARD_MAX, CARD_MIN};
use super::player::PlayerId;

/// Standard board side.
pub const DEFAULT_BOARD_SIZE: usize = 9;
/// Contiguous same-owner cells needed to win.
pub const WIN_LENGTH: usize = 4;

/// Board state: cards, last move and cached access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Board {
    size: usize,
    cells: Vec<Cell>,
    last_move: Option<Pos>,
}

impl Board {
    /// Creates an empty `size` x `size` board where only the center is placeable.
    ///
    /// # Panics
    /// If `size` is smaller than [`WIN_LENGTH`].
    pub fn new(size: usize) -> Self {
        assert!(size >= WIN_LENGTH, "board size {size} is below the win length");
        let mut board = Board {
            size,
            cells: vec![Cell::EMPTY; size * size],
            last_move: None,
        };
        board.refresh_access();
        board
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn center(&self) -> Pos {
        Pos::new(self.size / 2, self.size / 2)
    }

    #[inline]
    pub fn last_move(&self) -> Option<Pos> {
        self.last_move
    }

    #[inline]
    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x < self.size && pos.y < self.size
    }

    #[inline]
    fn index(&self, pos: Pos) -> usize {
        pos.y * self.size + pos.x
    }

    /// # Panics
    /// If `pos` is off the board.
    #[inline]
    pub fn cell(&self, pos: Pos) -> &Cell {
        &self.cells[self.index(pos)]
    }

    /// Bounds-checked lookup.
    #[inline]
    pub fn get(&self, pos: Pos) -> Option<&Cell> {
        self.in_bounds(pos).then(|| self.cell(pos))
    }

    #[inline]
    pub fn access(&self, pos: Pos) -> CellAccess {
        self.cell(pos).access
    }

    /// Steps from `pos` by `(dx, dy)` staying on the board.
    #[inline]
    pub fn step(&self, pos: Pos, dx: i32, dy: i32) -> Option<Pos> {
        pos.offset(dx, dy, self.size)
    }

    pub fn neighbors(&self, pos: Pos) -> impl Iterator<Item = Pos> {
        pos.neighbors(self.size)
    }

    /// All positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Pos> {
        let size = self.size;
        (0..size).flat_map(move |y| (0..size).map(move |x| Pos::new(x, y)))
    }

    /// Occupied positions with their card.
    pub fn cards(&self) -> impl Iterator<Item = (Pos, Card)> + '_ {
        self.positions()
            .filter_map(move |p| self.cell(p).card.map(|c| (p, c)))
    }

    /// Positions and values of the cards `player` owns.
    pub fn owned_by(&self, player: PlayerId) -> impl Iterator<Item = (Pos, u8)> + '_ {
        self.cards()
            .filter(move |(_, c)| c.owner == player)
            .map(|(p, c)| (p, c.value))
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Cell::is_empty)
    }

    /// Cells where the next card may go, ignoring card values.
    pub fn candidates(&self) -> Vec<Pos> {
        match self.last_move {
            None => vec![self.center()],
            Some(last) => self.neighbors(last).collect(),
        }
    }

    pub fn is_candidate(&self, pos: Pos) -> bool {
        match self.last_move {
            None => pos == self.center(),
            Some(last) => pos.is_adjacent(last),
        }
    }

    /// Rebuilds every cell's access state in O(N²).
    pub fn refresh_access(&mut self) {
        for cell in self.cells.iter_mut() {
            cell.access = CellAccess::Blocked;
        }
        for pos in self.candidates() {
            let i = self.index(pos);
            self.cells[i].access = self.cells[i].candidate_access();
        }
    }

    /// Places `value` for `owner` at `pos`, makes it the last move and
    /// refreshes access around the old and new last positions only.
    ///
    /// This is the raw mutation primitive; rule checks belong to the caller.
    pub fn place(&mut self, pos: Pos, owner: PlayerId, value: u8) {
        debug_assert!((CARD_MIN..=CARD_MAX).contains(&value));
        let previous = self.candidates();
        let i = self.index(pos);
        self.cells[i].card = Some(Card { owner, value });
        self.last_move = Some(pos);

        for p in previous {
            let j = self.index(p);
            self.cells[j].access = CellAccess::Blocked;
        }
        self.cells[i].access = CellAccess::Blocked;
        for p in pos.neighbors(self.size) {
            let j = self.index(p);
            self.cells[j].access = self.cells[j].candidate_access();
        }
    }

    /// Writes a card without changing the last move. Used to set up positions.
    pub fn set_card(&mut self, pos: Pos, owner: PlayerId, value: u8) {
        let i = self.index(pos);
        self.cells[i].card = Some(Card { owner, value });
        self.refresh_access();
    }

    /// Overrides the last move. Used to set up positions.
    pub fn set_last_move(&mut self, last: Option<Pos>) {
        self.last_move = last;
        self.refresh_access();
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  ")?;
        for x in 0..self.size {
            write!(f, " {x} ")?;
        }
        writeln!(f)?;
        for y in 0..self.size {
            write!(f, "{y} ")?;
            for x in 0..self.size {
                let pos = Pos::new(x, y);
                let marker = if Some(pos) == self.last_move { '*' } else { ' ' };
                match self.cell(pos).card {
                    Some(c) => write!(f, "{}{}{}", c.value, c.owner.letter(), marker)?,
                    None if self.is_candidate(pos) => write!(f, " + ")?,
                    None => write!(f, " . ")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

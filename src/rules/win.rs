//! Four-in-a-row detection.

use crate::board::{Board, Move, PlayerId, Pos, LINE_DIRECTIONS, WIN_LENGTH};

/// Counts `owner`'s contiguous cells stepping from `pos` by `(dx, dy)`,
/// not counting `pos` itself.
#[inline]
pub fn count_direction(board: &Board, pos: Pos, owner: PlayerId, dx: i32, dy: i32) -> usize {
    let mut count = 0;
    let mut cur = board.step(pos, dx, dy);
    while let Some(p) = cur {
        if !board.cell(p).is_owned_by(owner) {
            break;
        }
        count += 1;
        cur = board.step(p, dx, dy);
    }
    count
}

/// Length of `owner`'s run through `pos` along one axis, counting `pos` as
/// owned whatever it currently holds.
#[inline]
pub fn run_length_through(board: &Board, pos: Pos, owner: PlayerId, (dx, dy): (i32, i32)) -> usize {
    1 + count_direction(board, pos, owner, dx, dy) + count_direction(board, pos, owner, -dx, -dy)
}

/// Longest run through `pos` over the four axes.
pub fn longest_run_through(board: &Board, pos: Pos, owner: PlayerId) -> usize {
    LINE_DIRECTIONS
        .iter()
        .map(|&d| run_length_through(board, pos, owner, d))
        .max()
        .unwrap_or(1)
}

/// True if placing `mv` gives its player four or more in a row through the
/// target cell. Valid on the board before or after the placement.
pub fn is_winning_after(board: &Board, mv: &Move) -> bool {
    longest_run_through(board, mv.pos(), mv.player) >= WIN_LENGTH
}

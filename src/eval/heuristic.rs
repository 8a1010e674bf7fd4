//! Heuristic move evaluation.
//!
//! Scores a candidate placement as a weighted sum of independent features,
//! in priority order: immediate win, occupying an opponent's open three,
//! overwriting opponent cards, cutting opponent lines, extending our own
//! line, card economy and proximity to our own cards.
//!
//! Design: every feature reads the board through `&Board` and treats the
//! target cell as already holding the candidate card, so evaluation never
//! writes to the board and is safe to run from many threads at once.
//! [`analyze_move`] returns the raw features; [`MoveFactors::score`] applies
//! the weights.

use serde::Serialize;

use crate::board::{Board, Move, PlayerId, Pos, LINE_DIRECTIONS, WIN_LENGTH};
use crate::rules::{count_direction, is_winning_after, longest_run_through};

use super::weights::HeuristicWeights;

/// Strength of an opponent line cut by an empty cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
pub enum BlockTier {
    #[default]
    None,
    /// The cut line has two cards.
    Potential,
    /// The cut line has three or more cards.
    Threat,
}

/// Where an overwritten card sits inside its opponent run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum RunPosition {
    /// Opponent cards continue on one side only.
    Side,
    /// Opponent cards continue on both sides.
    Center,
}

/// Features of overwriting an opponent's card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReplaceFactor {
    /// The card belongs to an opponent run of three or more.
    pub breaks_threat: bool,
    /// Position inside the longest such run, if any.
    pub position: Option<RunPosition>,
}

/// Raw, unweighted features of one candidate move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MoveFactors {
    pub win: bool,
    pub open_three: bool,
    pub replace: Option<ReplaceFactor>,
    pub block: BlockTier,
    /// Our run length through the cell after the placement.
    pub alignment: usize,
    pub smallest_in_hand: bool,
    pub near_own: bool,
}

impl MoveFactors {
    /// The move answers an immediate opponent threat.
    pub fn is_threat_response(&self) -> bool {
        self.open_three
            || self.block == BlockTier::Threat
            || self.replace.is_some_and(|r| r.breaks_threat)
    }

    /// Applies `weights` to the features of playing `card`.
    pub fn score(&self, card: u8, weights: &HeuristicWeights) -> i32 {
        let mut total = weights.legal_move as i64;

        if self.win {
            total += weights.w_win as i64;
        }
        if self.open_three {
            total += weights.w_threat as i64;
        }
        if let Some(r) = self.replace {
            total += if r.breaks_threat {
                weights.replace_when_threat
            } else {
                weights.replace_potential
            } as i64;
            total += match r.position {
                Some(RunPosition::Center) => weights.replace_pos_center,
                Some(RunPosition::Side) => weights.replace_pos_side,
                None => 0,
            } as i64;
        }
        total += match self.block {
            BlockTier::Threat => weights.block_when_threat,
            BlockTier::Potential => weights.block_potential,
            BlockTier::None => 0,
        } as i64;
        total += match self.alignment {
            n if n >= 3 => weights.build_alignment_3,
            2 => weights.build_alignment_2,
            _ => 0,
        } as i64;

        let table = if self.is_threat_response() {
            &weights.card_values_threat
        } else {
            &weights.card_values_potential
        };
        total += HeuristicWeights::card_value(table, card) as i64;
        if self.smallest_in_hand {
            total += weights.play_smallest_card as i64;
        }
        if self.near_own {
            total += weights.keep_near_card as i64;
        }

        total.clamp(i32::MIN as i64, i32::MAX as i64) as i32
    }
}

/// True if some window of four cells through the empty `pos` holds three
/// cards of a single opponent, with `pos` its only gap.
fn occupies_open_three(board: &Board, pos: Pos, player: PlayerId) -> bool {
    if !board.cell(pos).is_empty() {
        return false;
    }
    let span = WIN_LENGTH as i32;
    for &(dx, dy) in LINE_DIRECTIONS.iter() {
        'window: for gap in 0..span {
            let mut owner: Option<PlayerId> = None;
            for i in 0..span {
                if i == gap {
                    continue;
                }
                let off = i - gap;
                let Some(p) = board.step(pos, dx * off, dy * off) else {
                    continue 'window;
                };
                match board.cell(p).owner() {
                    Some(o) if o != player && owner.map_or(true, |w| w == o) => owner = Some(o),
                    _ => continue 'window,
                }
            }
            return true;
        }
    }
    false
}

/// Opponent owner and run length starting next to `pos` in direction `(dx, dy)`.
#[inline]
fn adjacent_opponent_run(
    board: &Board,
    pos: Pos,
    player: PlayerId,
    dx: i32,
    dy: i32,
) -> Option<(PlayerId, usize)> {
    let next = board.step(pos, dx, dy)?;
    let owner = board.cell(next).owner().filter(|&o| o != player)?;
    Some((owner, count_direction(board, pos, owner, dx, dy)))
}

/// Best opponent line an empty `pos` cuts. Runs of the same opponent on both
/// sides are joined, so a gap between two opponent cards counts as a pair.
fn block_tier(board: &Board, pos: Pos, player: PlayerId) -> BlockTier {
    if !board.cell(pos).is_empty() {
        return BlockTier::None;
    }
    let mut best = BlockTier::None;
    for &(dx, dy) in LINE_DIRECTIONS.iter() {
        let fwd = adjacent_opponent_run(board, pos, player, dx, dy);
        let back = adjacent_opponent_run(board, pos, player, -dx, -dy);
        let len = match (fwd, back) {
            (Some((a, n)), Some((b, m))) if a == b => n + m,
            (Some((_, n)), Some((_, m))) => n.max(m),
            (Some((_, n)), None) | (None, Some((_, n))) => n,
            (None, None) => 0,
        };
        let tier = match len {
            n if n >= 3 => BlockTier::Threat,
            2 => BlockTier::Potential,
            _ => BlockTier::None,
        };
        best = best.max(tier);
    }
    best
}

/// Features of overwriting the card at `pos`, if it belongs to an opponent.
fn replace_factor(board: &Board, pos: Pos, player: PlayerId) -> Option<ReplaceFactor> {
    let owner = board.cell(pos).owner().filter(|&o| o != player)?;
    let mut position: Option<RunPosition> = None;
    for &(dx, dy) in LINE_DIRECTIONS.iter() {
        let fwd = count_direction(board, pos, owner, dx, dy);
        let back = count_direction(board, pos, owner, -dx, -dy);
        if 1 + fwd + back < 3 {
            continue;
        }
        let here = if fwd > 0 && back > 0 {
            RunPosition::Center
        } else {
            RunPosition::Side
        };
        position = position.max(Some(here));
    }
    Some(ReplaceFactor {
        breaks_threat: position.is_some(),
        position,
    })
}

/// True if any Moore neighbor of `pos` belongs to `player`.
fn near_own_card(board: &Board, pos: Pos, player: PlayerId) -> bool {
    board.neighbors(pos).any(|p| board.cell(p).is_owned_by(player))
}

/// Extracts the raw features of `mv` for a player holding `hand`.
pub fn analyze_move(board: &Board, mv: &Move, hand: &[u8]) -> MoveFactors {
    let pos = mv.pos();
    let player = mv.player;
    MoveFactors {
        win: is_winning_after(board, mv),
        open_three: occupies_open_three(board, pos, player),
        replace: replace_factor(board, pos, player),
        block: block_tier(board, pos, player),
        alignment: longest_run_through(board, pos, player),
        smallest_in_hand: hand.iter().min() == Some(&mv.card),
        near_own: near_own_card(board, pos, player),
    }
}

/// Scores `mv` for a player holding `hand`. Pure: identical inputs always
/// give identical scores and `board` is only read.
pub fn evaluate_move(board: &Board, mv: &Move, hand: &[u8], weights: &HeuristicWeights) -> i32 {
    analyze_move(board, mv, hand).score(mv.card, weights)
}

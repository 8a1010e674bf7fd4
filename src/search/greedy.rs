//! Greedy one-ply search over the legal move list.

use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;

use crate::board::{Board, Move, PlayerId};
use crate::error::GameError;
use crate::eval::{evaluate_move, HeuristicWeights};
use crate::movegen::generate_legal_moves;

/// A legal move and its heuristic score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoredMove {
    pub mv: Move,
    pub score: i32,
}

/// Result of a bot search: the chosen move and associated info.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BotChoice {
    pub mv: Move,
    pub score: i32,
    /// Number of legal moves considered.
    pub considered: usize,
    #[serde(skip)]
    pub elapsed_us: u64,
}

/// Scores every legal move for `player`, in legality order.
///
/// Scoring runs on the rayon pool; `collect` keeps the input order so the
/// result is identical to a sequential pass.
pub fn score_moves(
    board: &Board,
    hand: &[u8],
    player: PlayerId,
    weights: &HeuristicWeights,
) -> Vec<ScoredMove> {
    generate_legal_moves(board, hand, player)
        .into_par_iter()
        .map(|mv| ScoredMove {
            score: evaluate_move(board, &mv, hand, weights),
            mv,
        })
        .collect()
}

/// Picks the highest scoring legal move. Ties go to the earliest move in
/// `(card, y, x)` order, so the choice is deterministic.
pub fn choose_move(
    board: &Board,
    hand: &[u8],
    player: PlayerId,
    weights: &HeuristicWeights,
) -> Result<BotChoice, GameError> {
    let start = Instant::now();
    let scored = score_moves(board, hand, player, weights);

    let mut best: Option<ScoredMove> = None;
    for s in &scored {
        // Strict comparison keeps the first of equal scores.
        if best.map_or(true, |b| s.score > b.score) {
            best = Some(*s);
        }
    }

    let best = best.ok_or(GameError::NoLegalMoves(player))?;
    Ok(BotChoice {
        mv: best.mv,
        score: best.score,
        considered: scored.len(),
        elapsed_us: start.elapsed().as_micros() as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Pos;

    const A: PlayerId = PlayerId(0);
    const B: PlayerId = PlayerId(1);

    #[test]
    fn empty_hand_has_no_choice() {
        let board = Board::new(9);
        let err = choose_move(&board, &[], A, &HeuristicWeights::default()).unwrap_err();
        assert_eq!(err, GameError::NoLegalMoves(A));
    }

    #[test]
    fn opening_prefers_smallest_card() {
        let board = Board::new(9);
        let choice = choose_move(&board, &[7, 2, 5], A, &HeuristicWeights::default()).unwrap();
        assert_eq!(choice.mv, Move::new(4, 4, 2, A));
        assert_eq!(choice.considered, 3);
    }

    #[test]
    fn completes_four_in_a_row() {
        let mut board = Board::new(9);
        board.set_card(Pos::new(1, 3), A, 4);
        board.set_card(Pos::new(2, 3), A, 4);
        board.set_card(Pos::new(3, 3), A, 4);
        board.set_card(Pos::new(6, 6), B, 2);
        board.set_last_move(Some(Pos::new(3, 3)));
        let choice = choose_move(&board, &[1, 8], A, &HeuristicWeights::default()).unwrap();
        assert_eq!(choice.mv.pos(), Pos::new(4, 3));
        assert!(choice.score >= HeuristicWeights::default().w_win);
    }

    #[test]
    fn scores_follow_legality_order() {
        let mut board = Board::new(9);
        board.set_card(Pos::new(4, 4), B, 3);
        board.set_last_move(Some(Pos::new(4, 4)));
        let hand = [6, 1];
        let scored = score_moves(&board, &hand, A, &HeuristicWeights::default());
        let legal = generate_legal_moves(&board, &hand, A);
        assert_eq!(scored.iter().map(|s| s.mv).collect::<Vec<_>>(), legal);
    }

    #[test]
    fn ties_break_to_first_enumerated_move() {
        // All-zero weights make every move score the same.
        let zero = HeuristicWeights {
            legal_move: 0,
            w_win: 0,
            w_threat: 0,
            replace_when_threat: 0,
            replace_potential: 0,
            replace_pos_center: 0,
            replace_pos_side: 0,
            block_when_threat: 0,
            block_potential: 0,
            build_alignment_2: 0,
            build_alignment_3: 0,
            card_values_threat: [0; 9],
            card_values_potential: [0; 9],
            play_smallest_card: 0,
            keep_near_card: 0,
        };
        let mut board = Board::new(9);
        board.set_card(Pos::new(4, 4), B, 5);
        board.set_last_move(Some(Pos::new(4, 4)));
        let choice = choose_move(&board, &[3, 8], A, &zero).unwrap();
        assert_eq!(choice.mv, Move::new(3, 3, 3, A));
        assert_eq!(choice.score, 0);
    }
}

//! Legal move generation.
//!
//! The next card must land in the Moore neighborhood of the last placed card;
//! the opening card goes to the exact center. An empty candidate accepts any
//! card from the hand. An occupied candidate accepts only a strictly higher
//! card, whoever owns it, and a permanent 9 accepts nothing.

use rand::Rng;

use crate::board::{Board, CellAccess, Move, PlayerId, Pos};

/// Distinct cards of a hand in ascending order.
fn distinct_cards(hand: &[u8]) -> Vec<u8> {
    let mut cards = hand.to_vec();
    cards.sort_unstable();
    cards.dedup();
    cards
}

/// Whether `card` may be placed at `pos` under the current access state.
#[inline]
fn card_fits(board: &Board, pos: Pos, card: u8) -> bool {
    match board.access(pos) {
        CellAccess::Placeable => true,
        CellAccess::Replaceable => card > board.cell(pos).value(),
        CellAccess::Blocked | CellAccess::Permanent => false,
    }
}

/// Generates every legal placement of a hand card for `player`.
///
/// Output is sorted by (card, y, x) and holds one move per distinct card.
pub fn generate_legal_moves(board: &Board, hand: &[u8], player: PlayerId) -> Vec<Move> {
    if hand.is_empty() {
        return Vec::new();
    }
    let cards = distinct_cards(hand);
    let mut cells = board.candidates();
    cells.sort_unstable_by_key(|p| (p.y, p.x));

    let mut moves = Vec::with_capacity(cards.len() * cells.len());
    for &card in &cards {
        for &pos in &cells {
            if card_fits(board, pos, card) {
                moves.push(Move::at(pos, card, player));
            }
        }
    }
    moves
}

/// Checks a single placement without enumerating the whole move list.
pub fn is_legal(board: &Board, hand: &[u8], mv: &Move) -> bool {
    let pos = mv.pos();
    board.in_bounds(pos) && hand.contains(&mv.card) && card_fits(board, pos, mv.card)
}

/// True if any hand card fits any candidate cell.
pub fn has_legal_move(board: &Board, hand: &[u8]) -> bool {
    let Some(&best) = hand.iter().max() else {
        return false;
    };
    board.candidates().into_iter().any(|pos| card_fits(board, pos, best))
}

/// Picks a uniformly random legal move, or None when there is none.
pub fn random_move(board: &Board, hand: &[u8], player: PlayerId, rng: &mut impl Rng) -> Option<Move> {
    let moves = generate_legal_moves(board, hand, player);
    if moves.is_empty() {
        return None;
    }
    Some(moves[rng.gen_range(0..moves.len())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{CARD_MAX, CARD_MIN};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const A: PlayerId = PlayerId(0);
    const B: PlayerId = PlayerId(1);

    #[test]
    fn opening_is_forced_to_center() {
        let board = Board::new(9);
        let moves = generate_legal_moves(&board, &[3, 7, 1], A);
        assert_eq!(moves.len(), 3);
        assert!(moves.iter().all(|m| m.pos() == Pos::new(4, 4)));
        assert_eq!(moves.iter().map(|m| m.card).collect::<Vec<_>>(), vec![1, 3, 7]);
    }

    #[test]
    fn empty_hand_has_no_moves() {
        let board = Board::new(9);
        assert!(generate_legal_moves(&board, &[], A).is_empty());
        assert!(!has_legal_move(&board, &[]));
    }

    #[test]
    fn only_neighbors_of_last_move_are_candidates() {
        let mut board = Board::new(9);
        board.place(Pos::new(4, 4), A, 5);
        let moves = generate_legal_moves(&board, &[2], B);
        assert_eq!(moves.len(), 8);
        assert!(moves.iter().all(|m| m.pos().is_adjacent(Pos::new(4, 4))));
    }

    #[test]
    fn overwrite_needs_strictly_higher_card() {
        let mut board = Board::new(9);
        board.place(Pos::new(4, 4), A, 5);
        board.place(Pos::new(5, 5), B, 2);
        // (4,4) holds A's 5 and is now a candidate again.
        let low = generate_legal_moves(&board, &[5], A);
        assert!(!low.iter().any(|m| m.pos() == Pos::new(4, 4)));
        let high = generate_legal_moves(&board, &[6], A);
        assert!(high.iter().any(|m| m.pos() == Pos::new(4, 4)));
    }

    #[test]
    fn own_cards_can_be_overwritten() {
        let mut board = Board::new(9);
        board.place(Pos::new(4, 4), A, 3);
        board.place(Pos::new(4, 5), B, 1);
        assert!(is_legal(&board, &[4], &Move::new(4, 4, 4, A)));
    }

    #[test]
    fn permanent_nine_is_never_a_target() {
        let mut board = Board::new(9);
        board.place(Pos::new(4, 4), A, 9);
        board.place(Pos::new(3, 3), B, 2);
        let moves = generate_legal_moves(&board, &[9], B);
        assert!(!moves.iter().any(|m| m.pos() == Pos::new(4, 4)));
    }

    #[test]
    fn corner_last_move_limits_candidates() {
        let mut board = Board::new(9);
        board.set_card(Pos::new(0, 0), A, 4);
        board.set_last_move(Some(Pos::new(0, 0)));
        assert_eq!(generate_legal_moves(&board, &[1], B).len(), 3);
    }

    #[test]
    fn duplicate_cards_yield_one_move_each() {
        let board = Board::new(9);
        let moves = generate_legal_moves(&board, &[4, 4, 4], A);
        assert_eq!(moves.len(), 1);
    }

    #[test]
    fn output_is_sorted() {
        let mut board = Board::new(9);
        board.place(Pos::new(4, 4), A, 5);
        let moves = generate_legal_moves(&board, &[8, 2, 6], B);
        let mut sorted = moves.clone();
        sorted.sort_by(Move::enumeration_cmp);
        assert_eq!(moves, sorted);
    }

    #[test]
    fn is_legal_agrees_with_generation() {
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..30 {
            let mut board = Board::new(9);
            for _ in 0..25 {
                let hand: Vec<u8> = (0..3).map(|_| rng.gen_range(CARD_MIN..=CARD_MAX)).collect();
                let moves = generate_legal_moves(&board, &hand, A);
                for pos in board.positions() {
                    for card in CARD_MIN..=CARD_MAX {
                        let mv = Move::at(pos, card, A);
                        assert_eq!(is_legal(&board, &hand, &mv), moves.contains(&mv));
                    }
                }
                assert_eq!(has_legal_move(&board, &hand), !moves.is_empty());
                match random_move(&board, &hand, A, &mut rng) {
                    Some(mv) => board.place(mv.pos(), PlayerId(rng.gen_range(0..2)), mv.card),
                    None => break,
                }
            }
        }
    }
}

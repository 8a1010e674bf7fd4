//! Error types for the rules engine and room service.
//!
//! Every variant is recoverable at the request boundary: a rejected move or
//! bot request leaves the game state exactly as it was.

use crate::board::{PlayerId, Pos};

/// Errors returned by the turn controller and the room manager.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("it is not {0}'s turn")]
    NotYourTurn(PlayerId),

    #[error("illegal move: card {card} at {pos}")]
    IllegalMove { pos: Pos, card: u8 },

    #[error("{0} has no legal moves")]
    NoLegalMoves(PlayerId),

    #[error("player {0} is not seated in this game")]
    PlayerNotFound(PlayerId),

    #[error("room '{0}' not found")]
    RoomNotFound(String),

    #[error("room '{0}' already exists")]
    RoomExists(String),

    #[error("no free room code after {0} attempts")]
    NoFreeRoomCode(usize),

    #[error("game is already over")]
    GameOver,

    #[error("{0} has a legal move and cannot skip")]
    MustPlay(PlayerId),

    #[error("a game needs 2 to 4 players, got {0}")]
    InvalidPlayerCount(usize),

    #[error("invalid heuristic weights: {0}")]
    InvalidWeights(String),
}

impl GameError {
    /// True when the caller should skip the current seat rather than fail.
    pub fn is_skip(&self) -> bool {
        matches!(self, GameError::NoLegalMoves(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        let e = GameError::IllegalMove { pos: Pos::new(3, 4), card: 7 };
        assert_eq!(e.to_string(), "illegal move: card 7 at (3,4)");
        assert_eq!(GameError::NotYourTurn(PlayerId(2)).to_string(), "it is not P2's turn");
    }

    #[test]
    fn only_no_legal_moves_means_skip() {
        assert!(GameError::NoLegalMoves(PlayerId(0)).is_skip());
        assert!(!GameError::GameOver.is_skip());
        assert!(!GameError::NotYourTurn(PlayerId(0)).is_skip());
    }
}

//! Events published to a room's observers.

use serde::Serialize;

use crate::board::{Move, PlayerId};
use crate::game::{GameState, GameStatus, TurnAdvance};
use crate::rules::RankRow;

/// Why a game finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    FourInARow,
    NoMovesLeft,
}

/// Something observers of a room should hear about. Serializes with an
/// `event` tag equal to [`GameEvent::name`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    /// A human placed a card. The drawn card stays private.
    Move {
        #[serde(rename = "move")]
        mv: Move,
        drew: bool,
        next: Option<PlayerId>,
    },
    BotMove {
        #[serde(rename = "move")]
        mv: Move,
        score: i32,
        drew: bool,
        next: Option<PlayerId>,
    },
    TurnSkipped {
        player: PlayerId,
        next: Option<PlayerId>,
    },
    GameOver {
        winner: Option<PlayerId>,
        reason: EndReason,
        ranking: Vec<RankRow>,
    },
}

impl GameEvent {
    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::Move { .. } => "move",
            GameEvent::BotMove { .. } => "bot_move",
            GameEvent::TurnSkipped { .. } => "turn_skipped",
            GameEvent::GameOver { .. } => "game_over",
        }
    }

    /// The game-over event for a finished `state`, if it is finished.
    pub fn game_over(state: &GameState) -> Option<GameEvent> {
        let reason = match state.status {
            GameStatus::InProgress => return None,
            GameStatus::Won { .. } => EndReason::FourInARow,
            GameStatus::Ended { .. } => EndReason::NoMovesLeft,
        };
        Some(GameEvent::GameOver {
            winner: state.status.winner(),
            reason,
            ranking: state.ranking(),
        })
    }
}

/// Events following `first`: one `turn_skipped` per passed seat, then
/// `game_over` if the game just ended.
pub(crate) fn follow_up(first: GameEvent, advance: &TurnAdvance, state: &GameState) -> Vec<GameEvent> {
    let mut events = Vec::with_capacity(2 + advance.skipped.len());
    events.push(first);
    for &player in &advance.skipped {
        events.push(GameEvent::TurnSkipped { player, next: advance.next });
    }
    events.extend(GameEvent::game_over(state));
    events
}

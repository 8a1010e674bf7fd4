//! Turn controller.
//!
//! [`GameState`] owns the board, the seated players in turn order and the
//! game status. It is the only code that mutates hands, decks or the board
//! during play. Every mutation is checked first; a rejected request returns
//! an error and leaves the state untouched.
//!
//! After each accepted move the turn passes to the next seat that can play.
//! Seats without a legal move are skipped; when nobody can move the game is
//! scored by [`rank`] and ends.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::board::{Board, Move, Player, PlayerId};
use crate::config::GameConfig;
use crate::deck;
use crate::error::GameError;
use crate::movegen::{generate_legal_moves, has_legal_move, is_legal};
use crate::rules::{is_winning_after, rank, resolve_winner, RankRow, TiePolicy};

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 4;

/// A seat requested at game creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatSpec {
    pub name: String,
    pub is_bot: bool,
}

impl SeatSpec {
    pub fn human(name: impl Into<String>) -> Self {
        SeatSpec { name: name.into(), is_bot: false }
    }

    pub fn bot(name: impl Into<String>) -> Self {
        SeatSpec { name: name.into(), is_bot: true }
    }
}

/// Lifecycle of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GameStatus {
    InProgress,
    /// Someone completed four in a row.
    Won { winner: PlayerId },
    /// Nobody could move; decided on points. `winner` is None for a draw.
    Ended {
        winner: Option<PlayerId>,
        ranking: Vec<RankRow>,
    },
}

impl GameStatus {
    pub fn is_over(&self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }

    pub fn winner(&self) -> Option<PlayerId> {
        match self {
            GameStatus::InProgress => None,
            GameStatus::Won { winner } => Some(*winner),
            GameStatus::Ended { winner, .. } => *winner,
        }
    }
}

/// How the turn moved on after a move or skip.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TurnAdvance {
    /// Seats passed over because they had no legal move, in order.
    pub skipped: Vec<PlayerId>,
    /// Seat to move next, or None once the game is over.
    pub next: Option<PlayerId>,
}

/// Result of an accepted move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveOutcome {
    pub mv: Move,
    /// Card drawn to replace the one played.
    pub drawn: Option<u8>,
    pub advance: TurnAdvance,
}

/// Full state of one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameState {
    pub board: Board,
    /// Players in turn order.
    pub players: Vec<Player>,
    /// Index into `players` of the seat to move.
    pub turn: usize,
    pub status: GameStatus,
    pub history: Vec<Move>,
    pub hand_size: usize,
    pub tie_policy: TiePolicy,
}

impl GameState {
    /// Starts a game with `players` already holding their cards, in turn
    /// order. The turn starts at the first seat able to move.
    pub fn new(
        board: Board,
        players: Vec<Player>,
        hand_size: usize,
        tie_policy: TiePolicy,
    ) -> Result<Self, GameError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&players.len()) {
            return Err(GameError::InvalidPlayerCount(players.len()));
        }
        let mut state = GameState {
            board,
            players,
            turn: 0,
            status: GameStatus::InProgress,
            history: Vec::new(),
            hand_size,
            tie_policy,
        };
        if !state.can_move(0) {
            state.advance_turn();
        }
        Ok(state)
    }

    /// Seats `seats` with fresh shuffled decks, deals their hands and shuffles
    /// the turn order. Player ids follow the order of `seats`.
    pub fn deal(seats: &[SeatSpec], config: &GameConfig, rng: &mut impl Rng) -> Result<Self, GameError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&seats.len()) {
            return Err(GameError::InvalidPlayerCount(seats.len()));
        }
        let mut players: Vec<Player> = seats
            .iter()
            .enumerate()
            .map(|(i, seat)| {
                let mut p = Player::new(PlayerId(i as u8), seat.name.clone(), seat.is_bot);
                deck::deal(&mut p, config.copies_per_value, config.hand_size, rng);
                p
            })
            .collect();
        players.shuffle(rng);

        let order: Vec<String> = players.iter().map(|p| p.id.to_string()).collect();
        info!(players = players.len(), order = %order.join(","), "game dealt");

        Self::new(Board::new(config.board_size), players, config.hand_size, config.tie_policy)
    }

    pub fn is_over(&self) -> bool {
        self.status.is_over()
    }

    /// Seat to move, or None once the game is over.
    pub fn current_player(&self) -> Option<&Player> {
        if self.is_over() {
            return None;
        }
        self.players.get(self.turn)
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    fn seat_of(&self, id: PlayerId) -> Result<usize, GameError> {
        self.players
            .iter()
            .position(|p| p.id == id)
            .ok_or(GameError::PlayerNotFound(id))
    }

    /// Legal moves for `id` on the current board, whoever's turn it is.
    pub fn legal_moves_for(&self, id: PlayerId) -> Result<Vec<Move>, GameError> {
        let seat = self.seat_of(id)?;
        Ok(generate_legal_moves(&self.board, &self.players[seat].hand, id))
    }

    fn can_move(&self, seat: usize) -> bool {
        has_legal_move(&self.board, &self.players[seat].hand)
    }

    fn anyone_can_move(&self) -> bool {
        (0..self.players.len()).any(|seat| self.can_move(seat))
    }

    /// Checks that the game is running and that `id` holds the turn.
    fn require_turn(&self, id: PlayerId) -> Result<usize, GameError> {
        if self.is_over() {
            return Err(GameError::GameOver);
        }
        let seat = self.seat_of(id)?;
        if seat != self.turn {
            return Err(GameError::NotYourTurn(id));
        }
        Ok(seat)
    }

    /// Plays `card` at `(x, y)` for `id`.
    pub fn apply_move(&mut self, id: PlayerId, x: usize, y: usize, card: u8) -> Result<MoveOutcome, GameError> {
        let seat = self.require_turn(id)?;
        let mv = Move::new(x, y, card, id);
        if !is_legal(&self.board, &self.players[seat].hand, &mv) {
            return Err(GameError::IllegalMove { pos: mv.pos(), card });
        }

        self.board.place(mv.pos(), id, card);
        let player = &mut self.players[seat];
        player.remove_card(card);
        let drawn = if player.hand.len() < self.hand_size {
            player.draw()
        } else {
            None
        };
        self.history.push(mv);
        debug!(player = %id, x, y, card, ?drawn, "move applied");

        if is_winning_after(&self.board, &mv) {
            self.status = GameStatus::Won { winner: id };
            info!(winner = %id, moves = self.history.len(), "four in a row");
            return Ok(MoveOutcome { mv, drawn, advance: TurnAdvance::default() });
        }

        let advance = self.advance_turn();
        Ok(MoveOutcome { mv, drawn, advance })
    }

    /// Passes the turn for `id`, who must have no legal move.
    pub fn skip_turn(&mut self, id: PlayerId) -> Result<TurnAdvance, GameError> {
        let seat = self.require_turn(id)?;
        if self.can_move(seat) {
            return Err(GameError::MustPlay(id));
        }
        debug!(player = %id, "turn skipped");
        let mut advance = self.advance_turn();
        advance.skipped.insert(0, id);
        Ok(advance)
    }

    /// Moves the turn to the next seat that can play, or ends the game.
    fn advance_turn(&mut self) -> TurnAdvance {
        let n = self.players.len();
        let mut skipped = Vec::new();
        for step in 1..=n {
            let seat = (self.turn + step) % n;
            if self.can_move(seat) {
                self.turn = seat;
                return TurnAdvance { skipped, next: Some(self.players[seat].id) };
            }
            if step < n {
                skipped.push(self.players[seat].id);
            }
        }
        self.finish_by_points();
        TurnAdvance { skipped, next: None }
    }

    /// Ends the game on points if nobody can move. Returns true if the game
    /// is over afterwards.
    pub fn check_endgame(&mut self) -> bool {
        if !self.is_over() && !self.anyone_can_move() {
            self.finish_by_points();
        }
        self.is_over()
    }

    fn finish_by_points(&mut self) {
        let ranking = rank(&self.board, &self.players);
        let winner = resolve_winner(&ranking, self.tie_policy);
        match winner {
            Some(w) => info!(winner = %w, "no moves left, decided on points"),
            None => info!("no moves left, game drawn"),
        }
        self.status = GameStatus::Ended { winner, ranking };
    }

    /// Final ranking once ended, otherwise the standings right now.
    pub fn ranking(&self) -> Vec<RankRow> {
        match &self.status {
            GameStatus::Ended { ranking, .. } => ranking.clone(),
            _ => rank(&self.board, &self.players),
        }
    }
}

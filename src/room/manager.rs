//! Room service.
//!
//! [`RoomManager`] is the entry point for callers outside the rules engine.
//! It looks rooms up in a [`Store`], serializes every change on the room's
//! own lock, runs bot turns and publishes what happened through a
//! [`Broadcaster`].
//!
//! Bot chains take the room lock once per move, so a human request can slot
//! in between two bot moves but never in the middle of one.

use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::Mutex;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::board::PlayerId;
use crate::config::GameConfig;
use crate::error::GameError;
use crate::eval::HeuristicWeights;
use crate::game::{GameState, MoveOutcome, SeatSpec, TurnAdvance};
use crate::rules::RankRow;
use crate::search::{choose_move, BotChoice};

use super::broadcast::Broadcaster;
use super::event::{follow_up, GameEvent};
use super::store::{Room, Store};

/// Characters used in room codes. Leaves out I, O, 0 and 1.
pub const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const ROOM_CODE_LEN: usize = 6;

/// Attempts at drawing an unused room code before giving up.
const CODE_ATTEMPTS: usize = 32;

/// A fresh random room code.
pub fn random_room_code(rng: &mut impl Rng) -> String {
    (0..ROOM_CODE_LEN)
        .map(|_| ROOM_CODE_ALPHABET[rng.gen_range(0..ROOM_CODE_ALPHABET.len())] as char)
        .collect()
}

/// What a single bot request did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotTurn {
    Played { choice: BotChoice, outcome: MoveOutcome },
    /// The bot had nothing to play and passed.
    Skipped(TurnAdvance),
}

/// Creates, drives and observes rooms.
pub struct RoomManager<S, B> {
    store: S,
    broadcaster: B,
    config: GameConfig,
    rng: Mutex<SmallRng>,
}

impl<S: Store, B: Broadcaster> RoomManager<S, B> {
    pub fn new(store: S, broadcaster: B, config: GameConfig) -> Self {
        Self::with_rng(store, broadcaster, config, SmallRng::from_entropy())
    }

    /// Reproducible codes and deals for a given seed.
    pub fn with_seed(store: S, broadcaster: B, config: GameConfig, seed: u64) -> Self {
        Self::with_rng(store, broadcaster, config, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(store: S, broadcaster: B, config: GameConfig, rng: SmallRng) -> Self {
        RoomManager {
            store,
            broadcaster,
            config,
            rng: Mutex::new(rng),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn broadcaster(&self) -> &B {
        &self.broadcaster
    }

    /// Deals a new game under a fresh random code.
    pub fn create_room(&self, seats: &[SeatSpec]) -> Result<Arc<Room>, GameError> {
        for _ in 0..CODE_ATTEMPTS {
            let code = random_room_code(&mut *self.rng.lock());
            match self.create_room_with_code(&code, seats) {
                Err(GameError::RoomExists(_)) => continue,
                res => return res,
            }
        }
        Err(GameError::NoFreeRoomCode(CODE_ATTEMPTS))
    }

    /// Deals a new game under `code`.
    pub fn create_room_with_code(&self, code: &str, seats: &[SeatSpec]) -> Result<Arc<Room>, GameError> {
        if self.store.get_room(code).is_some() {
            return Err(GameError::RoomExists(code.to_string()));
        }
        let state = GameState::deal(seats, &self.config, &mut *self.rng.lock())?;
        let room = Arc::new(Room::new(code, state, self.config.weights.clone()));
        let room = self
            .store
            .insert_room(room)
            .map_err(|_| GameError::RoomExists(code.to_string()))?;
        info!(room = code, seats = seats.len(), "room created");
        Ok(room)
    }

    fn room(&self, code: &str) -> Result<Arc<Room>, GameError> {
        self.store
            .get_room(code)
            .ok_or_else(|| GameError::RoomNotFound(code.to_string()))
    }

    fn publish(&self, code: &str, events: &[GameEvent]) {
        for event in events {
            self.broadcaster.broadcast(code, event);
        }
    }

    /// Applies a human move and publishes it.
    pub fn apply_move(&self, code: &str, player: PlayerId, x: usize, y: usize, card: u8) -> Result<MoveOutcome, GameError> {
        let room = self.room(code)?;
        let mut state = room.lock();
        let outcome = state.apply_move(player, x, y, card).map_err(|e| {
            debug!(room = code, player = %player, error = %e, "move rejected");
            e
        })?;
        let first = GameEvent::Move {
            mv: outcome.mv,
            drew: outcome.drawn.is_some(),
            next: outcome.advance.next,
        };
        self.publish(code, &follow_up(first, &outcome.advance, &state));
        Ok(outcome)
    }

    /// Plays one move for the bot holding the turn.
    ///
    /// Returns `Ok(None)` when the seat to move is human.
    pub fn bot_move(&self, code: &str) -> Result<Option<BotTurn>, GameError> {
        let room = self.room(code)?;
        let weights = room.weights();
        let mut state = room.lock();
        let (id, hand) = match state.current_player() {
            None => return Err(GameError::GameOver),
            Some(p) if !p.is_bot => return Ok(None),
            Some(p) => (p.id, p.hand.clone()),
        };

        let choice = match choose_move(&state.board, &hand, id, &weights) {
            Ok(choice) => choice,
            Err(e) if e.is_skip() => {
                let advance = state.skip_turn(id)?;
                let first = GameEvent::TurnSkipped { player: id, next: advance.next };
                let rest = TurnAdvance { skipped: advance.skipped[1..].to_vec(), next: advance.next };
                self.publish(code, &follow_up(first, &rest, &state));
                return Ok(Some(BotTurn::Skipped(advance)));
            }
            Err(e) => return Err(e),
        };

        let outcome = state.apply_move(id, choice.mv.x, choice.mv.y, choice.mv.card)?;
        debug!(room = code, bot = %id, mv = %choice.mv, score = choice.score, "bot moved");
        let first = GameEvent::BotMove {
            mv: outcome.mv,
            score: choice.score,
            drew: outcome.drawn.is_some(),
            next: outcome.advance.next,
        };
        self.publish(code, &follow_up(first, &outcome.advance, &state));
        Ok(Some(BotTurn::Played { choice, outcome }))
    }

    /// Plays bot turns until a human holds the turn or the game ends.
    pub fn run_bots(&self, code: &str) -> Result<Vec<BotTurn>, GameError> {
        let mut turns = Vec::new();
        loop {
            if self.room(code)?.lock().is_over() {
                break;
            }
            match self.bot_move(code)? {
                Some(turn) => turns.push(turn),
                None => break,
            }
        }
        Ok(turns)
    }

    /// Runs [`run_bots`](Self::run_bots) on a background thread. The handle
    /// yields the number of bot turns taken.
    pub fn spawn_bot_chain(self: &Arc<Self>, code: impl Into<String>) -> JoinHandle<Result<usize, GameError>>
    where
        S: 'static,
        B: 'static,
    {
        let manager = Arc::clone(self);
        let code = code.into();
        std::thread::spawn(move || {
            let turns = manager.run_bots(&code).map_err(|e| {
                warn!(room = %code, error = %e, "bot chain stopped");
                e
            })?;
            Ok(turns.len())
        })
    }

    /// Merges `overrides` onto the room's current weights.
    pub fn set_weight_overrides(&self, code: &str, overrides: &Map<String, Value>) -> Result<HeuristicWeights, GameError> {
        let room = self.room(code)?;
        let merged = room.update_weights(|w| w.with_overrides(overrides))?;
        info!(room = code, keys = overrides.len(), "weights overridden");
        Ok(merged)
    }

    /// Restores the configured default weights.
    pub fn reset_weights(&self, code: &str) -> Result<(), GameError> {
        self.room(code)?.set_weights(self.config.weights.clone());
        Ok(())
    }

    /// Current standings, or the final ranking of a finished game.
    pub fn rank(&self, code: &str) -> Result<Vec<RankRow>, GameError> {
        Ok(self.room(code)?.lock().ranking())
    }

    /// A copy of the room's game.
    pub fn snapshot(&self, code: &str) -> Result<GameState, GameError> {
        Ok(self.room(code)?.lock().clone())
    }

    pub fn close_room(&self, code: &str) -> Result<(), GameError> {
        self.store
            .remove_room(code)
            .map(|_| info!(room = code, "room closed"))
            .ok_or_else(|| GameError::RoomNotFound(code.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::{MemoryStore, RecordingBroadcaster};

    fn manager() -> RoomManager<MemoryStore, RecordingBroadcaster> {
        RoomManager::with_seed(MemoryStore::new(), RecordingBroadcaster::new(), GameConfig::default(), 42)
    }

    #[test]
    fn codes_use_the_alphabet() {
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..50 {
            let code = random_room_code(&mut rng);
            assert_eq!(code.len(), ROOM_CODE_LEN);
            assert!(code.bytes().all(|b| ROOM_CODE_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn duplicate_code_is_rejected() {
        let m = manager();
        let seats = [SeatSpec::human("a"), SeatSpec::bot("b")];
        m.create_room_with_code("ROOM22", &seats).unwrap();
        assert_eq!(
            m.create_room_with_code("ROOM22", &seats).unwrap_err(),
            GameError::RoomExists("ROOM22".into())
        );
    }

    #[test]
    fn concurrent_creates_of_one_code_admit_a_single_room() {
        use std::sync::Barrier;

        const CREATORS: usize = 8;
        for seed in 0..20 {
            let m = RoomManager::with_seed(MemoryStore::new(), RecordingBroadcaster::new(), GameConfig::default(), seed);
            let barrier = Barrier::new(CREATORS);
            let seats = [SeatSpec::human("a"), SeatSpec::bot("b")];
            let results: Vec<_> = std::thread::scope(|scope| {
                let handles: Vec<_> = (0..CREATORS)
                    .map(|_| {
                        scope.spawn(|| {
                            barrier.wait();
                            m.create_room_with_code("SAME01", &seats)
                        })
                    })
                    .collect();
                handles.into_iter().map(|h| h.join().unwrap()).collect()
            });

            let created: Vec<&Arc<Room>> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
            assert_eq!(created.len(), 1, "seed {seed}");
            assert!(results
                .iter()
                .filter_map(|r| r.as_ref().err())
                .all(|e| *e == GameError::RoomExists("SAME01".into())));
            let stored = m.store().get_room("SAME01").unwrap();
            assert!(Arc::ptr_eq(&stored, created[0]));
            assert_eq!(m.store().len(), 1);
        }
    }

    #[test]
    fn exhausted_codes_have_their_own_error() {
        let err = GameError::NoFreeRoomCode(CODE_ATTEMPTS);
        assert_eq!(err.to_string(), "no free room code after 32 attempts");
    }

    #[test]
    fn concurrent_overrides_keep_every_key() {
        let m = manager();
        let room = m.create_room(&[SeatSpec::human("a"), SeatSpec::bot("b")]).unwrap();
        let keys = ["w_threat", "keep_near_card", "build_alignment_2", "play_smallest_card"];
        std::thread::scope(|scope| {
            for key in keys {
                let (m, code) = (&m, &room.code);
                scope.spawn(move || {
                    let mut overrides = Map::new();
                    overrides.insert(key.to_string(), Value::from(7));
                    m.set_weight_overrides(code, &overrides).unwrap();
                });
            }
        });
        let w = room.weights();
        assert_eq!((w.w_threat, w.keep_near_card, w.build_alignment_2, w.play_smallest_card), (7, 7, 7, 7));
    }

    #[test]
    fn unknown_room() {
        let m = manager();
        assert_eq!(m.rank("NOPE99"), Err(GameError::RoomNotFound("NOPE99".into())));
        assert!(m.bot_move("NOPE99").is_err());
        assert!(m.close_room("NOPE99").is_err());
    }

    #[test]
    fn bot_only_room_plays_to_the_end() {
        let m = manager();
        let room = m.create_room(&[SeatSpec::bot("b1"), SeatSpec::bot("b2")]).unwrap();
        let turns = m.run_bots(&room.code).unwrap();
        assert!(!turns.is_empty());
        assert!(room.lock().is_over());
        let names = m.broadcaster().names();
        assert_eq!(names.last(), Some(&"game_over"));
        assert_eq!(names.iter().filter(|n| **n == "game_over").count(), 1);
        assert_eq!(m.bot_move(&room.code), Err(GameError::GameOver));
    }

    #[test]
    fn bot_waits_for_human() {
        let m = manager();
        let room = m.create_room(&[SeatSpec::human("h1"), SeatSpec::human("h2")]).unwrap();
        assert_eq!(m.bot_move(&room.code), Ok(None));
        assert!(m.run_bots(&room.code).unwrap().is_empty());
    }

    #[test]
    fn rejected_move_publishes_nothing() {
        let m = manager();
        let room = m.create_room(&[SeatSpec::human("h1"), SeatSpec::human("h2")]).unwrap();
        let current = room.lock().current_player().map(|p| p.id).unwrap();
        assert!(m.apply_move(&room.code, current, 0, 0, 1).is_err());
        assert!(m.broadcaster().names().is_empty());
    }

    #[test]
    fn overrides_apply_per_room() {
        let m = manager();
        let seats = [SeatSpec::human("a"), SeatSpec::bot("b")];
        let r1 = m.create_room(&seats).unwrap();
        let r2 = m.create_room(&seats).unwrap();
        let overrides: Map<String, Value> = serde_json::from_str(r#"{"w_threat": 999}"#).unwrap();
        let w = m.set_weight_overrides(&r1.code, &overrides).unwrap();
        assert_eq!(w.w_threat, 999);
        assert_eq!(r1.weights().w_threat, 999);
        assert_eq!(r2.weights().w_threat, 200);

        let bad: Map<String, Value> = serde_json::from_str(r#"{"w_threat": -4}"#).unwrap();
        assert!(m.set_weight_overrides(&r1.code, &bad).is_err());
        assert_eq!(r1.weights().w_threat, 999);

        m.reset_weights(&r1.code).unwrap();
        assert!(!r1.weights().is_customized());
    }
}

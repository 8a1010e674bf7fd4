//! Room storage.
//!
//! A [`Room`] pairs a game with the lock that serializes every
//! read-modify-write on it. Stores hand out shared `Arc<Room>` handles, so a
//! caller holds the store lock only for the lookup and the room lock only for
//! its own move.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard, RwLock};

use crate::eval::HeuristicWeights;
use crate::game::GameState;

/// One game and its bot settings.
#[derive(Debug)]
pub struct Room {
    pub code: String,
    state: Mutex<GameState>,
    weights: RwLock<HeuristicWeights>,
}

impl Room {
    pub fn new(code: impl Into<String>, state: GameState, weights: HeuristicWeights) -> Self {
        Room {
            code: code.into(),
            state: Mutex::new(state),
            weights: RwLock::new(weights),
        }
    }

    /// Takes the per-room lock.
    pub fn lock(&self) -> MutexGuard<'_, GameState> {
        self.state.lock()
    }

    pub fn weights(&self) -> HeuristicWeights {
        self.weights.read().clone()
    }

    pub fn set_weights(&self, weights: HeuristicWeights) {
        *self.weights.write() = weights;
    }

    /// Replaces the weights with `f(current)` under the write lock. On error
    /// the weights are left as they were.
    pub fn update_weights<E>(
        &self,
        f: impl FnOnce(&HeuristicWeights) -> Result<HeuristicWeights, E>,
    ) -> Result<HeuristicWeights, E> {
        let mut weights = self.weights.write();
        let updated = f(&*weights)?;
        *weights = updated.clone();
        Ok(updated)
    }
}

/// Where rooms live between requests.
pub trait Store: Send + Sync {
    fn get_room(&self, code: &str) -> Option<Arc<Room>>;

    /// Inserts `room`, replacing any room with the same code.
    fn save_room(&self, room: Arc<Room>);

    /// Inserts `room` unless its code is taken, atomically. Returns the
    /// room already holding the code on conflict.
    fn insert_room(&self, room: Arc<Room>) -> Result<Arc<Room>, Arc<Room>>;

    fn remove_room(&self, code: &str) -> Option<Arc<Room>>;

    fn room_codes(&self) -> Vec<String>;
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rooms: RwLock<HashMap<String, Arc<Room>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rooms.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.read().is_empty()
    }
}

impl Store for MemoryStore {
    fn get_room(&self, code: &str) -> Option<Arc<Room>> {
        self.rooms.read().get(code).cloned()
    }

    fn save_room(&self, room: Arc<Room>) {
        self.rooms.write().insert(room.code.clone(), room);
    }

    fn insert_room(&self, room: Arc<Room>) -> Result<Arc<Room>, Arc<Room>> {
        match self.rooms.write().entry(room.code.clone()) {
            Entry::Occupied(taken) => Err(Arc::clone(taken.get())),
            Entry::Vacant(slot) => Ok(Arc::clone(slot.insert(room))),
        }
    }

    fn remove_room(&self, code: &str) -> Option<Arc<Room>> {
        self.rooms.write().remove(code)
    }

    fn room_codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.rooms.read().keys().cloned().collect();
        codes.sort();
        codes
    }
}

impl<T: Store + ?Sized> Store for Arc<T> {
    fn get_room(&self, code: &str) -> Option<Arc<Room>> {
        (**self).get_room(code)
    }

    fn save_room(&self, room: Arc<Room>) {
        (**self).save_room(room)
    }

    fn insert_room(&self, room: Arc<Room>) -> Result<Arc<Room>, Arc<Room>> {
        (**self).insert_room(room)
    }

    fn remove_room(&self, code: &str) -> Option<Arc<Room>> {
        (**self).remove_room(code)
    }

    fn room_codes(&self) -> Vec<String> {
        (**self).room_codes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, Player, PlayerId};
    use crate::rules::TiePolicy;

    fn room(code: &str) -> Arc<Room> {
        let players = vec![
            Player::new(PlayerId(0), "a", false).with_cards(&[1], &[]),
            Player::new(PlayerId(1), "b", true).with_cards(&[2], &[]),
        ];
        let state = GameState::new(Board::new(9), players, 3, TiePolicy::Draw).unwrap();
        Arc::new(Room::new(code, state, HeuristicWeights::default()))
    }

    #[test]
    fn save_get_remove() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        store.save_room(room("BBBBBB"));
        store.save_room(room("AAAAAA"));
        assert_eq!(store.len(), 2);
        assert_eq!(store.room_codes(), vec!["AAAAAA", "BBBBBB"]);
        assert!(store.get_room("AAAAAA").is_some());
        assert!(store.get_room("ZZZZZZ").is_none());
        assert!(store.remove_room("AAAAAA").is_some());
        assert!(store.get_room("AAAAAA").is_none());
    }

    #[test]
    fn handles_share_one_room() {
        let store = MemoryStore::new();
        store.save_room(room("CCCCCC"));
        let a = store.get_room("CCCCCC").unwrap();
        let b = store.get_room("CCCCCC").unwrap();
        a.lock().apply_move(PlayerId(0), 4, 4, 1).unwrap();
        assert_eq!(b.lock().history.len(), 1);
    }

    #[test]
    fn insert_keeps_the_first_room() {
        let store = MemoryStore::new();
        let first = store.insert_room(room("DDDDDD")).unwrap();
        let second = room("DDDDDD");
        let taken = store.insert_room(Arc::clone(&second)).unwrap_err();
        assert!(Arc::ptr_eq(&taken, &first));
        assert!(Arc::ptr_eq(&store.get_room("DDDDDD").unwrap(), &first));
        assert!(!Arc::ptr_eq(&store.get_room("DDDDDD").unwrap(), &second));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn failed_weight_update_keeps_old_weights() {
        let r = room("EEEEEE");
        let res: Result<_, ()> = r.update_weights(|_| Err(()));
        assert!(res.is_err());
        assert!(!r.weights().is_customized());
        let w = r
            .update_weights(|w| Ok::<_, ()>(HeuristicWeights { w_threat: w.w_threat + 1, ..w.clone() }))
            .unwrap();
        assert_eq!(r.weights(), w);
    }
}

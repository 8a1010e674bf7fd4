//! Room service around the rules engine.
//!
//! Storage and event delivery are injected through the [`Store`] and
//! [`Broadcaster`] traits; [`RoomManager`] drives games through them.

pub mod broadcast;
pub mod event;
pub mod manager;
pub mod store;

pub use broadcast::{Broadcaster, JsonLinesBroadcaster, LogBroadcaster, RecordingBroadcaster};
pub use event::{EndReason, GameEvent};
pub use manager::{random_room_code, BotTurn, RoomManager, ROOM_CODE_ALPHABET, ROOM_CODE_LEN};
pub use store::{MemoryStore, Room, Store};

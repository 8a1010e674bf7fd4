//! Event fan-out.
//!
//! The room manager publishes every state change through a [`Broadcaster`].
//! Transports live outside this crate; the implementations here log events,
//! write them as JSON lines or record them for inspection.

use std::io::Write;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{info, warn};

use super::event::GameEvent;

/// Receives events for a room. Called with the room lock held, so events
/// arrive in the order the moves were applied. Implementations must not call
/// back into the room manager.
pub trait Broadcaster: Send + Sync {
    fn broadcast(&self, room_code: &str, event: &GameEvent);
}

/// Wire form of one event: the room code next to the tagged payload.
#[derive(Serialize)]
struct Envelope<'a> {
    room: &'a str,
    #[serde(flatten)]
    event: &'a GameEvent,
}

/// Logs each event through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogBroadcaster;

impl Broadcaster for LogBroadcaster {
    fn broadcast(&self, room_code: &str, event: &GameEvent) {
        match serde_json::to_string(event) {
            Ok(payload) => info!(room = room_code, event = event.name(), %payload, "broadcast"),
            Err(e) => warn!(room = room_code, event = event.name(), error = %e, "unserializable event"),
        }
    }
}

/// Writes one JSON object per event to `W`.
pub struct JsonLinesBroadcaster<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> JsonLinesBroadcaster<W> {
    pub fn new(out: W) -> Self {
        JsonLinesBroadcaster { out: Mutex::new(out) }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: Write + Send> Broadcaster for JsonLinesBroadcaster<W> {
    fn broadcast(&self, room_code: &str, event: &GameEvent) {
        let mut out = self.out.lock();
        let res = serde_json::to_writer(&mut *out, &Envelope { room: room_code, event })
            .map_err(std::io::Error::from)
            .and_then(|_| writeln!(out))
            .and_then(|_| out.flush());
        if let Err(e) = res {
            warn!(room = room_code, error = %e, "failed to write event");
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingBroadcaster {
    events: Mutex<Vec<(String, GameEvent)>>,
}

impl RecordingBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns everything recorded so far.
    pub fn take(&self) -> Vec<(String, GameEvent)> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Names of the recorded events, oldest first.
    pub fn names(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(|(_, e)| e.name()).collect()
    }
}

impl Broadcaster for RecordingBroadcaster {
    fn broadcast(&self, room_code: &str, event: &GameEvent) {
        self.events.lock().push((room_code.to_string(), event.clone()));
    }
}

impl<T: Broadcaster + ?Sized> Broadcaster for std::sync::Arc<T> {
    fn broadcast(&self, room_code: &str, event: &GameEvent) {
        (**self).broadcast(room_code, event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::PlayerId;

    #[test]
    fn json_lines_carry_room_and_tag() {
        let b = JsonLinesBroadcaster::new(Vec::new());
        b.broadcast("ABC234", &GameEvent::TurnSkipped { player: PlayerId(1), next: Some(PlayerId(0)) });
        b.broadcast("ABC234", &GameEvent::TurnSkipped { player: PlayerId(0), next: None });
        let text = String::from_utf8(b.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["room"], "ABC234");
        assert_eq!(first["event"], "turn_skipped");
        assert_eq!(first["player"], 1);
    }

    #[test]
    fn recorder_keeps_order() {
        let r = RecordingBroadcaster::new();
        r.broadcast("R1", &GameEvent::TurnSkipped { player: PlayerId(0), next: None });
        assert_eq!(r.names(), vec!["turn_skipped"]);
        let taken = r.take();
        assert_eq!(taken[0].0, "R1");
        assert!(r.take().is_empty());
    }
}

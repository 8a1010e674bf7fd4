//! Seats, hands and decks.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Seat identifier. Seats are numbered from 0 in the order they were created;
/// the turn order is a separate permutation held by the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Single uppercase letter used when rendering the board.
    pub fn letter(self) -> char {
        (b'A' + self.0 % 26) as char
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// A seated player with their hand and remaining draw pile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub is_bot: bool,
    /// Cards available to play, in draw order.
    pub hand: Vec<u8>,
    /// Remaining draw pile; the front is drawn next.
    #[serde(skip)]
    pub deck: VecDeque<u8>,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, is_bot: bool) -> Self {
        Player {
            id,
            name: name.into(),
            is_bot,
            hand: Vec::new(),
            deck: VecDeque::new(),
        }
    }

    /// Replaces hand and deck, mostly for fixtures.
    pub fn with_cards(mut self, hand: &[u8], deck: &[u8]) -> Self {
        self.hand = hand.to_vec();
        self.deck = deck.iter().copied().collect();
        self
    }

    /// Removes one copy of `card` from the hand. Returns false if absent.
    pub fn remove_card(&mut self, card: u8) -> bool {
        match self.hand.iter().position(|&c| c == card) {
            Some(i) => {
                self.hand.remove(i);
                true
            }
            None => false,
        }
    }

    /// Moves the top of the deck into the hand.
    pub fn draw(&mut self) -> Option<u8> {
        let card = self.deck.pop_front()?;
        self.hand.push(card);
        Some(card)
    }

    /// Draws until the hand holds `hand_size` cards or the deck runs out.
    pub fn refill(&mut self, hand_size: usize) {
        while self.hand.len() < hand_size && self.draw().is_some() {}
    }

    pub fn cards_left(&self) -> usize {
        self.hand.len() + self.deck.len()
    }
}

//! Card decks and dealing.
//!
//! Every seat gets its own deck holding `copies` of each value 1-9, shuffled
//! independently. Hands are filled from the front of the deck.

use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::board::{Player, CARD_MAX, CARD_MIN};

/// Copies of each value in a standard deck.
pub const DEFAULT_COPIES_PER_VALUE: usize = 2;

/// Cards held in hand between turns.
pub const DEFAULT_HAND_SIZE: usize = 3;

/// Unshuffled deck: `copies` runs of 1..=9.
pub fn new_deck(copies: usize) -> Vec<u8> {
    let mut deck = Vec::with_capacity(copies * CARD_MAX as usize);
    for _ in 0..copies {
        deck.extend(CARD_MIN..=CARD_MAX);
    }
    deck
}

/// A freshly shuffled deck.
pub fn shuffled_deck(copies: usize, rng: &mut impl Rng) -> VecDeque<u8> {
    let mut deck = new_deck(copies);
    deck.shuffle(rng);
    deck.into()
}

/// Gives `player` a new shuffled deck and fills their hand from it.
pub fn deal(player: &mut Player, copies: usize, hand_size: usize, rng: &mut impl Rng) {
    player.hand.clear();
    player.deck = shuffled_deck(copies, rng);
    player.refill(hand_size);
}

//! Player identification and per-player data storage.
//!
//! ## PlayerId
//!
//! Type-safe identifier for the two seats of a match. Player indices are
//! 0-based; `opponent()` gives the other seat.
//!
//! ## PlayerPair
//!
//! Per-player data storage backed by a fixed two-element array, indexable
//! by `PlayerId`.
//!
//! ## Player
//!
//! The per-player game record: command counters (CC), the three card zones,
//! and the counters that reset at the start of each turn.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

use super::card::CardId;

/// Identifier for one of the two players.
///
/// Indices are 0-based: the first player is `PlayerId(0)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Create a new player ID. Panics on indices other than 0 or 1.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        assert!(id < 2, "A match has exactly two players");
        Self(id)
    }

    /// Get the raw player index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Get the other player's ID.
    #[must_use]
    pub const fn opponent(self) -> Self {
        Self(1 - self.0)
    }

    /// Iterate over both player IDs.
    pub fn both() -> impl Iterator<Item = PlayerId> {
        (0..2u8).map(PlayerId)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// Per-player data storage for a two-player match.
///
/// Backed by a fixed two-element array with O(1) access by `PlayerId`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerPair<T> {
    data: [T; 2],
}

impl<T> PlayerPair<T> {
    /// Create a pair from a factory function.
    pub fn new(factory: impl Fn(PlayerId) -> T) -> Self {
        Self {
            data: [factory(PlayerId(0)), factory(PlayerId(1))],
        }
    }

    /// Create a pair with both entries set to the same value.
    pub fn with_value(value: T) -> Self
    where
        T: Clone,
    {
        Self::new(|_| value.clone())
    }

    /// Get a reference to a player's data.
    #[must_use]
    pub fn get(&self, player: PlayerId) -> &T {
        &self.data[player.index()]
    }

    /// Get a mutable reference to a player's data.
    pub fn get_mut(&mut self, player: PlayerId) -> &mut T {
        &mut self.data[player.index()]
    }

    /// Iterate over (PlayerId, &T) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        self.data
            .iter()
            .enumerate()
            .map(|(i, v)| (PlayerId(i as u8), v))
    }

    /// Iterate over (PlayerId, &mut T) pairs.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (PlayerId, &mut T)> {
        self.data
            .iter_mut()
            .enumerate()
            .map(|(i, v)| (PlayerId(i as u8), v))
    }
}

impl<T> Index<PlayerId> for PlayerPair<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &Self::Output {
        self.get(player)
    }
}

impl<T> IndexMut<PlayerId> for PlayerPair<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut Self::Output {
        self.get_mut(player)
    }
}

/// Maximum CC a player can hold.
pub const CC_CAP: u8 = 7;

/// One player's game record.
///
/// Zone list routing follows the owner/controller split: `hand` and
/// `sleep_zone` hold cards this player *owns*; `in_play` holds cards this
/// player currently *controls* (a stolen card sits in the thief's `in_play`
/// but still sleeps to its owner's `sleep_zone`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// This player's seat.
    pub id: PlayerId,

    /// Display name.
    pub name: String,

    /// Command counters, always within `[0, cap]` for the configured cap.
    cc: u8,

    /// Cards owned by this player, currently in hand.
    pub hand: Vec<CardId>,

    /// Cards controlled by this player, currently in play.
    pub in_play: Vec<CardId>,

    /// Cards owned by this player that have been sleeped.
    pub sleep_zone: Vec<CardId>,

    /// Tussles initiated this turn. Reset at turn start.
    pub tussles_this_turn: u8,

    /// Direct attacks made this turn. Reset at turn start.
    pub direct_attacks_this_turn: u8,
}

impl Player {
    /// Create a new player with empty zones and no CC.
    #[must_use]
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            cc: 0,
            hand: Vec::new(),
            in_play: Vec::new(),
            sleep_zone: Vec::new(),
            tussles_this_turn: 0,
            direct_attacks_this_turn: 0,
        }
    }

    /// Current CC balance.
    #[must_use]
    pub fn cc(&self) -> u8 {
        self.cc
    }

    /// Grant CC, clamped to `cap`. Returns the amount actually gained.
    pub fn gain_cc(&mut self, amount: u8, cap: u8) -> u8 {
        let gained = amount.min(cap.saturating_sub(self.cc));
        self.cc += gained;
        gained
    }

    /// Spend CC. Returns false (and spends nothing) if the balance is
    /// insufficient, so the balance can never go negative.
    pub fn spend_cc(&mut self, amount: u8) -> bool {
        if self.cc < amount {
            return false;
        }
        self.cc -= amount;
        true
    }

    /// Reset the per-turn counters. Called exactly once per turn start.
    pub fn reset_turn_counters(&mut self) {
        self.tussles_this_turn = 0;
        self.direct_attacks_this_turn = 0;
    }

    /// Total cards listed across this player's three zone lists.
    ///
    /// With unchanged control this equals the number of cards the player
    /// owns; once control has changed hands, exact ownership accounting
    /// goes through the card store instead.
    #[must_use]
    pub fn zone_card_count(&self) -> usize {
        self.hand.len() + self.in_play.len() + self.sleep_zone.len()
    }

    /// Remove a card ID from whichever zone list holds it.
    ///
    /// Returns true if the card was found and removed.
    pub fn remove_card(&mut self, card: CardId) -> bool {
        for list in [&mut self.hand, &mut self.in_play, &mut self.sleep_zone] {
            if let Some(pos) = list.iter().position(|&c| c == card) {
                list.remove(pos);
                return true;
            }
        }
        false
    }
}

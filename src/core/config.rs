//! Tunable rule constants.
//!
//! The defaults are the standard rules. Tests and variant formats adjust
//! individual knobs through the builder methods rather than carrying
//! their own constants.

use serde::{Deserialize, Serialize};

use super::player::CC_CAP;

/// Rule parameters for one game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Hard ceiling on a player's CC pool.
    pub cc_cap: u8,
    /// CC granted at the start of the very first turn.
    pub first_turn_cc: u8,
    /// CC granted at the start of every later turn.
    pub cc_per_turn: u8,
    /// Direct attacks allowed per player per turn.
    pub direct_attack_limit: u8,
    /// Speed bonus the attacker gets on the active player's turn.
    pub attacker_speed_bonus: i32,
    /// CC cost to initiate a tussle before cost modifiers.
    pub base_tussle_cost: u8,
    /// Seed for the game's RNG stream.
    pub rng_seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            cc_cap: CC_CAP,
            first_turn_cc: 2,
            cc_per_turn: 3,
            direct_attack_limit: 2,
            attacker_speed_bonus: 1,
            base_tussle_cost: 1,
            rng_seed: 0,
        }
    }
}

impl GameConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = seed;
        self
    }

    #[must_use]
    pub fn with_cc_per_turn(mut self, first_turn: u8, later_turns: u8) -> Self {
        self.first_turn_cc = first_turn;
        self.cc_per_turn = later_turns;
        self
    }

    #[must_use]
    pub fn with_direct_attack_limit(mut self, limit: u8) -> Self {
        self.direct_attack_limit = limit;
        self
    }

    #[must_use]
    pub fn with_cc_cap(mut self, cap: u8) -> Self {
        self.cc_cap = cap;
        self
    }
}

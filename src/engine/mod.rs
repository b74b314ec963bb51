//! The game engine: turn FSM, card play, tussles, state-based actions.

mod error;
mod game;
mod queries;

pub use error::IllegalMove;
pub use game::{CancelOutcome, GameEngine, PlayOutcome, TussleReport};
pub use queries::{card_play_cost, combatant_view, effective_stat, has_protection, tussle_cost};

//! Core data model: players, cards, templates, state, RNG, configuration.

pub mod card;
pub mod config;
pub mod player;
pub mod rng;
pub mod state;
pub mod template;

pub use card::{
    Card, CardCost, CardId, CardType, Stat, Stats, TransformState, TurnModifier, Zone,
};
pub use config::GameConfig;
pub use player::{Player, PlayerId, PlayerPair, CC_CAP};
pub use rng::{GameRng, GameRngState};
pub use state::{CcTurnTotals, GameSnapshot, GameState, LogEntry, LogEvent, TurnPhase};
pub use template::{CardLibrary, CardTemplate};

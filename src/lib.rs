//! # tussle-engine
//!
//! Rules engine for a two-player toy-tussling card game: it owns every
//! game-legal state transition (playing cards, tussles, turn ends), a
//! data-driven card-effect system, and a plan validator that checks
//! multi-step action sequences before they are executed.
//!
//! ## Design Principles
//!
//! 1. **One writer**: `GameEngine` is the sole mutator of `GameState`;
//!    every operation validates fully before touching anything.
//!
//! 2. **Effects as data**: cards carry a compact textual effect
//!    definition, parsed once at load into a closed `EffectDef` enum.
//!    The string is the persistence contract; the enum is what runs.
//!
//! 3. **Pure computation at the seams**: stats and costs are folds
//!    recomputed on demand, combat is a pure function over two views,
//!    and the validator predicts with the same functions the engine
//!    resolves with.
//!
//! 4. **Owner vs. controller**: a card returns to its *owner's* zones
//!    when sleeped or bounced, but its *controller* decides who benefits
//!    from it. Every zone move routes through one place.
//!
//! ## Modules
//!
//! - `core`: cards, players, templates, game state, RNG, configuration
//! - `effects`: effect taxonomy, mini-language parser, registry
//! - `engine`: turn state machine and all mutating operations
//! - `combat`: tussle resolution arithmetic
//! - `validator`: sequence-level plan checking

pub mod combat;
pub mod core;
pub mod effects;
pub mod engine;
pub mod validator;

// Re-export commonly used types
pub use crate::core::{
    Card, CardCost, CardId, CardLibrary, CardTemplate, CardType, GameConfig, GameState, Player,
    PlayerId, Stat, Stats, TransformState, TurnPhase, Zone, CC_CAP,
};

pub use crate::effects::{parse_effects, EffectDef, EffectParseError, EffectRegistry};

pub use crate::engine::{CancelOutcome, GameEngine, IllegalMove, PlayOutcome, TussleReport};

pub use crate::combat::{resolve, CombatantView, FirstStriker, TussleOutcome};

pub use crate::validator::{validate_plan, ActionKind, PlannedAction, Violation, ViolationKind};

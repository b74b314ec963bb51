//! Tussle (combat) resolution.

mod resolver;

pub use resolver::{resolve, CombatantView, FirstStriker, TussleOutcome};

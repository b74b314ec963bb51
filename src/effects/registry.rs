//! Read-only effect lookup, built once at game construction and handed to
//! the engine by reference. Nothing in the engine mutates it mid-game.

use rustc_hash::FxHashMap;

use crate::core::{Card, CardLibrary};

use super::effect::EffectDef;
use super::parser::{parse_effects, EffectParseError};

/// Resolves a card to its parsed effects.
///
/// A card's own `effect_definitions` string is authoritative. The legacy
/// name-keyed table exists for imported card pools whose cards predate
/// per-card definition strings; it is consulted only when a card carries
/// no definitions of its own.
#[derive(Clone, Debug, Default)]
pub struct EffectRegistry {
    library: CardLibrary,
    legacy: FxHashMap<String, Vec<EffectDef>>,
}

impl EffectRegistry {
    #[must_use]
    pub fn new(library: CardLibrary) -> Self {
        EffectRegistry {
            library,
            legacy: FxHashMap::default(),
        }
    }

    #[must_use]
    pub fn library(&self) -> &CardLibrary {
        &self.library
    }

    /// Register a name-keyed fallback definition for cards without their
    /// own definitions string. Parse failures are hard errors, same as
    /// library load.
    pub fn register_legacy(
        &mut self,
        name: impl Into<String>,
        definitions: &str,
    ) -> Result<(), EffectParseError> {
        let effects = parse_effects(definitions)?;
        self.legacy.insert(name.into(), effects);
        Ok(())
    }

    /// The effects governing `card` right now.
    ///
    /// Transformed cards carry the parsed effects of their current text,
    /// so no special casing is needed here.
    #[must_use]
    pub fn effects_for<'a>(&'a self, card: &'a Card) -> &'a [EffectDef] {
        if !card.effect_definitions.is_empty() {
            return card.effects();
        }
        match self.legacy.get(&card.name) {
            Some(effects) => {
                log::warn!(
                    "card `{}` has no effect definitions, using legacy table",
                    card.name
                );
                effects
            }
            None => &[],
        }
    }
}

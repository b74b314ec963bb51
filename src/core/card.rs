//! Card instances - runtime card state.
//!
//! A `Card` is one physical card in a match. Its `effect_definitions`
//! string is the single source of truth for what the card does: the parsed
//! `effects` are derived from it at load time and can always be rebuilt
//! from the string alone, which is what makes transformed cards survive a
//! snapshot round-trip.
//!
//! ## Owner vs. controller
//!
//! `owner` never changes after creation and decides which player's hand or
//! sleep zone the card returns to. `controller` decides who currently
//! benefits from the card and may change (capture effects). The owner
//! field is private and exposed read-only.

use serde::{Deserialize, Serialize};

use crate::effects::{parse_effects, EffectDef, EffectParseError};

use super::player::PlayerId;

/// Unique identifier for a card instance within a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// The two card types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardType {
    /// Stays in play with combat stats until sleeped.
    Toy,
    /// Resolves once when played, then leaves play.
    Action,
}

/// The three zones a card can occupy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    Hand,
    InPlay,
    Sleep,
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Zone::Hand => write!(f, "hand"),
            Zone::InPlay => write!(f, "in play"),
            Zone::Sleep => write!(f, "sleep zone"),
        }
    }
}

/// A card's CC cost.
///
/// `MatchTarget` replaces the authoring format's sentinel value: the cost
/// is determined by the cost of a target chosen at play time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardCost {
    Fixed(u8),
    MatchTarget,
}

impl CardCost {
    /// The fixed cost, if this cost is not target-dependent.
    #[must_use]
    pub fn fixed(self) -> Option<u8> {
        match self {
            CardCost::Fixed(n) => Some(n),
            CardCost::MatchTarget => None,
        }
    }
}

/// A combat stat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stat {
    Speed,
    Strength,
    Stamina,
}

impl std::fmt::Display for Stat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stat::Speed => write!(f, "speed"),
            Stat::Strength => write!(f, "strength"),
            Stat::Stamina => write!(f, "stamina"),
        }
    }
}

/// Base combat stats for a Toy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Stats {
    pub speed: i32,
    pub strength: i32,
    pub stamina: i32,
}

impl Stats {
    #[must_use]
    pub const fn new(speed: i32, strength: i32, stamina: i32) -> Self {
        Self {
            speed,
            strength,
            stamina,
        }
    }

    /// Get one stat by name.
    #[must_use]
    pub fn get(&self, stat: Stat) -> i32 {
        match stat {
            Stat::Speed => self.speed,
            Stat::Strength => self.strength,
            Stat::Stamina => self.stamina,
        }
    }
}

/// A stat delta that expires at end of turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnModifier {
    pub stat: Stat,
    pub amount: i32,
}

/// Whether a card is its printed self or a permanent copy of another
/// template. The original template name is kept so observers can tell
/// what the card started as.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransformState {
    Base,
    TransformedInto {
        /// Template name of the card as originally created.
        original: String,
    },
}

/// One card instance in a match.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Card {
    /// Unique instance ID. Survives transformation.
    pub id: CardId,

    /// Current card name (changes on transformation).
    pub name: String,

    /// Current card type.
    pub card_type: CardType,

    /// Current CC cost.
    pub cost: CardCost,

    /// Printed combat stats. `None` for Actions.
    pub base_stats: Option<Stats>,

    /// Remaining stamina while in play; `None` otherwise.
    pub current_stamina: Option<i32>,

    /// Current zone. Kept in sync with the players' zone lists by
    /// `GameState::move_card`.
    pub zone: Zone,

    /// Immutable owner. Decides sleep/hand routing.
    owner: PlayerId,

    /// Current controller. Decides who benefits from the card.
    pub controller: PlayerId,

    /// The persisted effect mini-language string. Single source of truth.
    pub effect_definitions: String,

    /// Parsed effects, derived from `effect_definitions`. Not serialized;
    /// rebuilt by `rehydrate` after deserialization.
    #[serde(skip)]
    effects: Vec<EffectDef>,

    /// Turn-scoped stat deltas, keyed by turn number. Only the current
    /// turn's entry applies; stale entries are dropped on zone change.
    pub turn_modifiers: rustc_hash::FxHashMap<u32, Vec<TurnModifier>>,

    /// Transformation tag.
    pub transform: TransformState,
}

impl Card {
    /// Create a card in its owner's hand from authored template data.
    ///
    /// Fails if the effect string does not parse; a `CardLibrary` validates
    /// its templates up front so this only fires on unvalidated input.
    pub fn new(
        id: CardId,
        name: impl Into<String>,
        card_type: CardType,
        cost: CardCost,
        base_stats: Option<Stats>,
        owner: PlayerId,
        effect_definitions: impl Into<String>,
    ) -> Result<Self, EffectParseError> {
        let effect_definitions = effect_definitions.into();
        let effects = parse_effects(&effect_definitions)?;
        Ok(Self {
            id,
            name: name.into(),
            card_type,
            cost,
            base_stats,
            current_stamina: None,
            zone: Zone::Hand,
            owner,
            controller: owner,
            effect_definitions,
            effects,
            turn_modifiers: rustc_hash::FxHashMap::default(),
            transform: TransformState::Base,
        })
    }

    /// The immutable owner.
    #[must_use]
    pub fn owner(&self) -> PlayerId {
        self.owner
    }

    /// Parsed effects.
    #[must_use]
    pub fn effects(&self) -> &[EffectDef] {
        &self.effects
    }

    #[must_use]
    pub fn is_toy(&self) -> bool {
        self.card_type == CardType::Toy
    }

    /// Printed value of one stat, 0 for Actions.
    #[must_use]
    pub fn base_stat(&self, stat: Stat) -> i32 {
        self.base_stats.map_or(0, |s| s.get(stat))
    }

    /// Sum of this turn's expiring stat deltas for one stat.
    #[must_use]
    pub fn turn_modifier_total(&self, stat: Stat, turn: u32) -> i32 {
        self.turn_modifiers
            .get(&turn)
            .map_or(0, |mods| {
                mods.iter()
                    .filter(|m| m.stat == stat)
                    .map(|m| m.amount)
                    .sum()
            })
    }

    /// Record a stat delta that expires when `turn` ends.
    pub fn add_turn_modifier(&mut self, turn: u32, stat: Stat, amount: i32) {
        self.turn_modifiers
            .entry(turn)
            .or_default()
            .push(TurnModifier { stat, amount });
    }

    /// Prime combat state on entering play.
    pub fn enter_play(&mut self) {
        if let Some(stats) = self.base_stats {
            self.current_stamina = Some(stats.stamina);
        }
    }

    /// Clear volatile combat state on leaving play. Transformation reset is
    /// handled separately because it needs the card library.
    pub fn leave_play(&mut self) {
        self.current_stamina = None;
        self.turn_modifiers.clear();
    }

    /// Permanently take on another card's printed identity.
    ///
    /// Keeps this card's `id`, `owner`, `controller`, and `zone`; replaces
    /// name, type, cost, stats, and effects. The transform survives zone
    /// changes; the original template name is recorded for observers.
    pub fn transform_into(
        &mut self,
        name: impl Into<String>,
        card_type: CardType,
        cost: CardCost,
        base_stats: Option<Stats>,
        effect_definitions: impl Into<String>,
    ) -> Result<(), EffectParseError> {
        let effect_definitions = effect_definitions.into();
        let effects = parse_effects(&effect_definitions)?;

        if self.transform == TransformState::Base {
            self.transform = TransformState::TransformedInto {
                original: self.name.clone(),
            };
        }
        self.name = name.into();
        self.card_type = card_type;
        self.cost = cost;
        self.base_stats = base_stats;
        self.current_stamina = base_stats.map(|s| s.stamina);
        self.effect_definitions = effect_definitions;
        self.effects = effects;
        Ok(())
    }

    /// Re-derive parsed effects from `effect_definitions`.
    ///
    /// Must be called after deserializing a snapshot; a transformed card is
    /// fully reconstructible from its persisted string alone.
    pub fn rehydrate(&mut self) -> Result<(), EffectParseError> {
        self.effects = parse_effects(&self.effect_definitions)?;
        Ok(())
    }
}

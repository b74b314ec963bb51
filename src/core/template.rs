//! Card templates and the library that holds them.
//!
//! A template is the printed card: name, type, cost, stats, and the raw
//! effect-definitions string. Game instances are stamped out of templates
//! via [`CardTemplate::instantiate`], which is where definitions are
//! parsed and validated. A library that loads is a library whose every
//! card parses.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::effects::{parse_effects, EffectParseError};

use super::card::{Card, CardCost, CardId, CardType, Stats};
use super::player::PlayerId;

/// The printed face of a card, shared by all instances of it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardTemplate {
    pub name: String,
    pub card_type: CardType,
    pub cost: CardCost,
    pub stats: Option<Stats>,
    pub effect_definitions: String,
}

impl CardTemplate {
    /// A toy with fixed cost and printed stats, no effects.
    #[must_use]
    pub fn toy(name: impl Into<String>, cost: u8, speed: i32, strength: i32, stamina: i32) -> Self {
        CardTemplate {
            name: name.into(),
            card_type: CardType::Toy,
            cost: CardCost::Fixed(cost),
            stats: Some(Stats::new(speed, strength, stamina)),
            effect_definitions: String::new(),
        }
    }

    /// An action card with fixed cost, no stats, no effects.
    #[must_use]
    pub fn action(name: impl Into<String>, cost: u8) -> Self {
        CardTemplate {
            name: name.into(),
            card_type: CardType::Action,
            cost: CardCost::Fixed(cost),
            stats: None,
            effect_definitions: String::new(),
        }
    }

    #[must_use]
    pub fn with_effects(mut self, definitions: impl Into<String>) -> Self {
        self.effect_definitions = definitions.into();
        self
    }

    /// Cost becomes "equal to the target's cost", resolved at play time.
    #[must_use]
    pub fn with_match_cost(mut self) -> Self {
        self.cost = CardCost::MatchTarget;
        self
    }

    /// Stamp out a game instance. The instance starts in its owner's hand
    /// with the owner as controller.
    pub fn instantiate(&self, id: CardId, owner: PlayerId) -> Result<Card, EffectParseError> {
        Card::new(
            id,
            self.name.clone(),
            self.card_type,
            self.cost,
            self.stats,
            owner,
            self.effect_definitions.clone(),
        )
    }
}

/// Name-keyed collection of templates. Insertion parses every template's
/// definitions, so a constructed library contains no malformed cards.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CardLibrary {
    templates: FxHashMap<String, CardTemplate>,
}

impl CardLibrary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a template, validating its effect definitions first.
    pub fn add(&mut self, template: CardTemplate) -> Result<(), EffectParseError> {
        parse_effects(&template.effect_definitions)?;
        self.templates.insert(template.name.clone(), template);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CardTemplate> {
        self.templates.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    /// A small built-in card pool covering every effect kind. Useful for
    /// integration tests and as authoring reference.
    #[must_use]
    pub fn demo() -> Self {
        let mut library = CardLibrary::new();
        let templates = [
            CardTemplate::toy("Pebble Golem", 1, 1, 1, 2),
            CardTemplate::toy("Tin Soldier", 2, 2, 2, 2),
            CardTemplate::toy("Clockwork Cheetah", 3, 4, 2, 2)
                .with_effects("stat_boost:speed:1:self"),
            CardTemplate::toy("Rally Drummer", 3, 1, 1, 3).with_effects("stat_boost:strength:1"),
            CardTemplate::toy("Gloom Balloon", 4, 2, 2, 3)
                .with_effects("stat_boost:strength:-1:all"),
            CardTemplate::toy("Lucky Dreidel", 5, 2, 2, 3).with_effects("auto_win:own_turn"),
            CardTemplate::toy("Stubborn Mule", 4, 1, 3, 4).with_effects("protection:auto_win"),
            CardTemplate::toy("Porcelain Knight", 3, 2, 2, 3).with_effects("protection:effects"),
            CardTemplate::toy("Bargain Bin", 2, 1, 1, 2).with_effects("cost_mod:card:-1"),
            CardTemplate::toy("Scrappy Terrier", 2, 2, 1, 2).with_effects("cost_mod:tussle:-1"),
            CardTemplate::toy("Dream Sprite", 2, 2, 1, 2)
                .with_effects("triggered:when_sleeped:gain_cc:1"),
            CardTemplate::toy("Boomerang Bat", 3, 3, 1, 1)
                .with_effects("triggered:when_sleeped:return_to_hand:optional"),
            CardTemplate::toy("Morning Rooster", 2, 1, 1, 3)
                .with_effects("triggered:start_of_turn:boost_turn:strength:1"),
            CardTemplate::toy("Copycat Parrot", 3, 2, 2, 2)
                .with_effects("triggered:when_other_card_played:boost_turn:speed:1"),
            CardTemplate::toy("Wind-Up Bruiser", 3, 2, 2, 3)
                .with_effects("activated:2:boost_turn:strength:2"),
            CardTemplate::toy("Patchwork Bear", 3, 1, 2, 4)
                .with_effects("activated:1:restore_stamina:2"),
            CardTemplate::action("Lullaby", 3).with_effects("play:sleep_target:1:1"),
            CardTemplate::action("Yoink", 2).with_effects("play:return_target:1:1"),
            CardTemplate::action("Finders Keepers", 0)
                .with_effects("play:take_control:1:1")
                .with_match_cost(),
            CardTemplate::action("Mirror Putty", 0)
                .with_effects("play:transform_copy:1:1")
                .with_match_cost(),
            CardTemplate::action("Slingshot", 2).with_effects("play:damage_target:2:1:1"),
            CardTemplate::action("Sugar Rush", 1).with_effects("play:gain_cc:2:0:0"),
            CardTemplate::action("Time Out", 2).with_effects("interrupt:cancel_tussle"),
        ];
        for template in templates {
            // Demo definitions are fixed strings validated by tests.
            if let Err(err) = library.add(template) {
                unreachable!("demo library must parse: {err}");
            }
        }
        library
    }
}

//! Effect definitions.
//!
//! Card behavior is a closed set of tagged variants, one per effect kind,
//! matched exhaustively wherever effects are evaluated. "Does this card
//! have an effect of kind X" is a pattern match, never a runtime type test.
//!
//! Effects are *descriptions*: parsing the mini-language produces these
//! values once at load time, and the engine interprets them on demand.
//! Nothing here mutates game state.

use serde::{Deserialize, Serialize};

use crate::core::Stat;

/// Which cards a continuous or cost-modifying effect reaches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectScope {
    /// Only the source card itself.
    SourceOnly,
    /// Cards controlled by the source's controller (the default).
    Team,
    /// Every card in play.
    All,
}

/// A continuous effect: recomputed whenever a stat is queried, applying
/// only while the source card is in play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContinuousEffect {
    /// A flat delta to one stat for cards within scope.
    StatBoost {
        stat: Stat,
        amount: i32,
        scope: EffectScope,
    },
    /// The source wins every tussle it fights on its controller's turn.
    /// Nullified by `ProtectionEffect::NullifyAutoWin` on the defender.
    AutoWinOnOwnTurn,
}

/// Events a triggered effect can listen for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerEvent {
    /// The source was sleeped from play. Does not fire for cards sleeped
    /// straight from hand (direct attacks).
    WhenSleeped,
    /// The source itself was just played.
    WhenPlayed,
    /// The controller's turn started while the source was in play.
    StartOfTurn,
    /// Another card was played while the source was in play.
    WhenOtherCardPlayed,
}

/// What a triggered effect does when it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggeredAction {
    /// The source's controller gains CC (clamped to the cap).
    GainCc(u8),
    /// The source returns to its owner's hand.
    ReturnToHand,
    /// The source gets a stat delta until end of turn.
    StatBoostThisTurn { stat: Stat, amount: i32 },
}

/// An effect that fires on a named event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TriggeredEffect {
    pub event: TriggerEvent,
    pub action: TriggeredAction,
    /// Mandatory triggers always fire; optional ones are offered to the
    /// controller. The engine currently fires both (optional triggers are
    /// always beneficial in the current card pool).
    pub mandatory: bool,
}

/// What an activated ability does when its cost is paid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivatedAction {
    StatBoostThisTurn { stat: Stat, amount: i32 },
    /// Restore stamina, up to the printed maximum.
    RestoreStamina(u8),
}

/// A pay-CC ability usable during the controller's Main phase,
/// repeatable while affordable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActivatedEffect {
    pub cost: u8,
    pub action: ActivatedAction,
}

/// What a play effect does when an Action card resolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayAction {
    /// Sleep a target in-play card (to its owner's sleep zone).
    SleepTarget,
    /// Return a target card to its owner's hand.
    ReturnTargetToHand,
    /// Take control of a target in-play card.
    TakeControlOfTarget,
    /// Permanently copy a target's name, stats, and effects.
    TransformIntoTarget,
    /// Deal damage to a target Toy's stamina.
    DamageTarget(u8),
    /// The player gains CC. Takes no targets.
    GainCc(u8),
}

/// A one-shot effect resolving synchronously when an Action is played.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayEffect {
    pub action: PlayAction,
    /// Declared target arity.
    pub min_targets: u8,
    pub max_targets: u8,
}

/// Which cost a cost-modification effect alters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CostDomain {
    /// Cost of playing cards.
    Card,
    /// Cost of initiating tussles.
    Tussle,
}

/// A continuous cost alteration (negative amounts are discounts).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CostModEffect {
    pub domain: CostDomain,
    pub amount: i32,
    pub scope: EffectScope,
}

/// Immunities granted while the source is in play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProtectionEffect {
    /// Immune to hostile card effects. Does not protect against direct
    /// combat damage.
    EffectImmunity,
    /// Specifically nullifies an attacker's auto-win effect.
    NullifyAutoWin,
}

/// Interrupt-style effects playable off-turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterruptEffect {
    /// Cancel an opponent's tussle. The cancellation mechanism itself is
    /// an unresolved design question; see `GameEngine::try_cancel_tussle`.
    CancelTussle,
}

/// One parsed card effect.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectDef {
    Continuous(ContinuousEffect),
    Triggered(TriggeredEffect),
    Activated(ActivatedEffect),
    Play(PlayEffect),
    CostMod(CostModEffect),
    Protection(ProtectionEffect),
    Interrupt(InterruptEffect),
}

impl EffectDef {
    /// The activated ability, if this is one.
    #[must_use]
    pub fn as_activated(&self) -> Option<&ActivatedEffect> {
        match self {
            EffectDef::Activated(a) => Some(a),
            _ => None,
        }
    }

    /// The play effect, if this is one.
    #[must_use]
    pub fn as_play(&self) -> Option<&PlayEffect> {
        match self {
            EffectDef::Play(p) => Some(p),
            _ => None,
        }
    }

    /// Check for a specific protection kind.
    #[must_use]
    pub fn grants_protection(&self, kind: ProtectionEffect) -> bool {
        matches!(self, EffectDef::Protection(p) if *p == kind)
    }

    /// Check whether this is an interrupt (off-turn playable) effect.
    #[must_use]
    pub fn is_interrupt(&self) -> bool {
        matches!(self, EffectDef::Interrupt(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_activated() {
        let effect = EffectDef::Activated(ActivatedEffect {
            cost: 2,
            action: ActivatedAction::RestoreStamina(3),
        });

        assert!(effect.as_activated().is_some());
        assert!(effect.as_play().is_none());
    }

    #[test]
    fn test_grants_protection_is_kind_specific() {
        let effect = EffectDef::Protection(ProtectionEffect::NullifyAutoWin);

        assert!(effect.grants_protection(ProtectionEffect::NullifyAutoWin));
        assert!(!effect.grants_protection(ProtectionEffect::EffectImmunity));
    }

    #[test]
    fn test_is_interrupt() {
        assert!(EffectDef::Interrupt(InterruptEffect::CancelTussle).is_interrupt());
        assert!(!EffectDef::Protection(ProtectionEffect::EffectImmunity).is_interrupt());
    }

    #[test]
    fn test_effect_serialization() {
        let effect = EffectDef::Continuous(ContinuousEffect::StatBoost {
            stat: Stat::Speed,
            amount: 1,
            scope: EffectScope::Team,
        });

        let json = serde_json::to_string(&effect).unwrap();
        let deserialized: EffectDef = serde_json::from_str(&json).unwrap();
        assert_eq!(effect, deserialized);
    }
}

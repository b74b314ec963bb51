//! Tussle resolution.
//!
//! Resolution is a pure function over two [`CombatantView`]s. The engine
//! builds the views (folding base stats, continuous effects, turn
//! modifiers, and the active-turn speed bonus) and applies the outcome;
//! the validator builds hypothetical views from a snapshot and predicts
//! with the same function. One resolver, two callers, no drift.

use serde::{Deserialize, Serialize};

use crate::core::CardId;

/// A combatant's effective numbers at the moment of resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatantView {
    pub card: CardId,
    pub speed: i32,
    pub strength: i32,
    /// Remaining stamina, after prior damage this game.
    pub stamina: i32,
    /// Wins tussles outright (already gated on whose turn it is).
    pub auto_win: bool,
    /// Ignores the opponent's auto-win.
    pub nullify_auto_win: bool,
}

/// Who dealt damage first, if resolution was ordered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FirstStriker {
    Attacker,
    Defender,
}

/// Result of one tussle. Damage figures are what was actually dealt;
/// a combatant defeated before striking deals none.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TussleOutcome {
    pub attacker_defeated: bool,
    pub defender_defeated: bool,
    pub damage_to_attacker: i32,
    pub damage_to_defender: i32,
    /// `None` for simultaneous strikes and auto-wins.
    pub first_striker: Option<FirstStriker>,
    pub won_by_auto_win: bool,
}

/// Resolve a tussle between two in-play toys.
#[must_use]
pub fn resolve(attacker: &CombatantView, defender: &CombatantView) -> TussleOutcome {
    if attacker.auto_win && !defender.nullify_auto_win {
        return TussleOutcome {
            attacker_defeated: false,
            defender_defeated: true,
            damage_to_attacker: 0,
            damage_to_defender: 0,
            first_striker: None,
            won_by_auto_win: true,
        };
    }

    let attacker_hits = damage_of(attacker);
    let defender_hits = damage_of(defender);

    if attacker.speed == defender.speed {
        // Simultaneous strikes: each side takes damage even if defeated.
        return TussleOutcome {
            attacker_defeated: attacker.stamina <= defender_hits,
            defender_defeated: defender.stamina <= attacker_hits,
            damage_to_attacker: defender_hits,
            damage_to_defender: attacker_hits,
            first_striker: None,
            won_by_auto_win: false,
        };
    }

    let (first, second, striker) = if attacker.speed > defender.speed {
        (attacker, defender, FirstStriker::Attacker)
    } else {
        (defender, attacker, FirstStriker::Defender)
    };

    let first_damage = damage_of(first);
    // A combatant defeated by the first strike never strikes back.
    let second_defeated = second.stamina <= first_damage;
    let second_damage = if second_defeated { 0 } else { damage_of(second) };
    let first_defeated = !second_defeated && first.stamina <= second_damage;

    let (attacker_defeated, defender_defeated, damage_to_attacker, damage_to_defender) =
        match striker {
            FirstStriker::Attacker => (first_defeated, second_defeated, second_damage, first_damage),
            FirstStriker::Defender => (second_defeated, first_defeated, first_damage, second_damage),
        };

    TussleOutcome {
        attacker_defeated,
        defender_defeated,
        damage_to_attacker,
        damage_to_defender,
        first_striker: Some(striker),
        won_by_auto_win: false,
    }
}

/// Strength can be debuffed below zero; such a toy still strikes, for
/// nothing.
fn damage_of(combatant: &CombatantView) -> i32 {
    combatant.strength.max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn combatant(speed: i32, strength: i32, stamina: i32) -> CombatantView {
        CombatantView {
            card: CardId(0),
            speed,
            strength,
            stamina,
            auto_win: false,
            nullify_auto_win: false,
        }
    }

    #[test]
    fn test_faster_attacker_kills_without_counter() {
        let attacker = combatant(3, 2, 1);
        let defender = combatant(1, 5, 2);

        let outcome = resolve(&attacker, &defender);

        assert!(outcome.defender_defeated);
        assert!(!outcome.attacker_defeated);
        assert_eq!(outcome.damage_to_attacker, 0);
        assert_eq!(outcome.damage_to_defender, 2);
        assert_eq!(outcome.first_striker, Some(FirstStriker::Attacker));
    }

    #[test]
    fn test_faster_defender_strikes_first() {
        let attacker = combatant(1, 5, 1);
        let defender = combatant(3, 2, 4);

        let outcome = resolve(&attacker, &defender);

        assert!(outcome.attacker_defeated);
        assert!(!outcome.defender_defeated);
        assert_eq!(outcome.damage_to_defender, 0);
        assert_eq!(outcome.first_striker, Some(FirstStriker::Defender));
    }

    #[test]
    fn test_survivor_counter_strikes() {
        let attacker = combatant(3, 2, 4);
        let defender = combatant(1, 3, 5);

        let outcome = resolve(&attacker, &defender);

        assert!(!outcome.defender_defeated);
        assert!(!outcome.attacker_defeated);
        assert_eq!(outcome.damage_to_defender, 2);
        assert_eq!(outcome.damage_to_attacker, 3);
    }

    #[test]
    fn test_equal_speed_is_simultaneous() {
        let attacker = combatant(2, 3, 3);
        let defender = combatant(2, 3, 3);

        let outcome = resolve(&attacker, &defender);

        assert!(outcome.attacker_defeated);
        assert!(outcome.defender_defeated);
        assert_eq!(outcome.damage_to_attacker, 3);
        assert_eq!(outcome.damage_to_defender, 3);
        assert_eq!(outcome.first_striker, None);
    }

    #[test]
    fn test_auto_win_skips_damage() {
        let mut attacker = combatant(1, 1, 1);
        attacker.auto_win = true;
        let defender = combatant(5, 5, 5);

        let outcome = resolve(&attacker, &defender);

        assert!(outcome.defender_defeated);
        assert!(!outcome.attacker_defeated);
        assert!(outcome.won_by_auto_win);
        assert_eq!(outcome.damage_to_defender, 0);
    }

    #[test]
    fn test_nullified_auto_win_falls_through_to_stats() {
        let mut attacker = combatant(1, 1, 1);
        attacker.auto_win = true;
        let mut defender = combatant(5, 5, 5);
        defender.nullify_auto_win = true;

        let outcome = resolve(&attacker, &defender);

        assert!(!outcome.won_by_auto_win);
        assert!(outcome.attacker_defeated);
        assert!(!outcome.defender_defeated);
    }

    #[test]
    fn test_negative_strength_deals_nothing() {
        let attacker = combatant(3, -2, 3);
        let defender = combatant(1, 1, 3);

        let outcome = resolve(&attacker, &defender);

        assert!(!outcome.defender_defeated);
        assert_eq!(outcome.damage_to_defender, 0);
        assert_eq!(outcome.damage_to_attacker, 1);
    }
}

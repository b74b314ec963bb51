//! Read-only stat and cost computation.
//!
//! Stats are never cached or mutated in place: every query is a fold of
//! base stats, applicable continuous effects, and the current turn's
//! scoped modifiers. The validator calls these same functions over its
//! snapshot, so live play and prediction cannot disagree.
//!
//! Continuous effects apply only while their source is `InPlay`, and only
//! to cards in `InPlay`; nothing ever radiates from a hand or the sleep
//! zone.

use crate::combat::CombatantView;
use crate::core::{CardId, GameConfig, GameState, PlayerId, Stat, Zone};
use crate::effects::{
    ContinuousEffect, CostDomain, EffectDef, EffectRegistry, EffectScope, ProtectionEffect,
};

use super::error::IllegalMove;

/// Does a continuous effect on `source` reach `target`?
fn scope_covers(state: &GameState, scope: EffectScope, source: CardId, target: CardId) -> bool {
    match scope {
        EffectScope::SourceOnly => source == target,
        EffectScope::Team => state.card(source).controller == state.card(target).controller,
        EffectScope::All => true,
    }
}

/// Does `card` carry the given protection while in play?
#[must_use]
pub fn has_protection(
    state: &GameState,
    registry: &EffectRegistry,
    card: CardId,
    kind: ProtectionEffect,
) -> bool {
    let c = state.card(card);
    c.zone == Zone::InPlay
        && registry
            .effects_for(c)
            .iter()
            .any(|e| e.grants_protection(kind))
}

/// Sum of continuous stat boosts reaching `card` from in-play sources.
///
/// A card with `EffectImmunity` ignores boosts (and debuffs) from sources
/// controlled by its opponent; its own side's effects still apply.
fn continuous_delta(state: &GameState, registry: &EffectRegistry, card: CardId, stat: Stat) -> i32 {
    let target = state.card(card);
    if target.zone != Zone::InPlay {
        return 0;
    }
    let immune = has_protection(state, registry, card, ProtectionEffect::EffectImmunity);

    let mut delta = 0;
    for source in state.cards_in_play() {
        if immune && source.controller != target.controller {
            continue;
        }
        for effect in registry.effects_for(source) {
            if let EffectDef::Continuous(ContinuousEffect::StatBoost {
                stat: boosted,
                amount,
                scope,
            }) = effect
            {
                if *boosted == stat && scope_covers(state, *scope, source.id, card) {
                    delta += amount;
                }
            }
        }
    }
    delta
}

/// A card's effective stat right now.
///
/// Stamina folds over `current_stamina` (damage taken so far) when the
/// card is in play; speed and strength fold over the printed base.
/// Panics on an unknown card id.
#[must_use]
pub fn effective_stat(
    state: &GameState,
    registry: &EffectRegistry,
    card: CardId,
    stat: Stat,
) -> i32 {
    let c = state.card(card);
    let base = match (stat, c.current_stamina) {
        (Stat::Stamina, Some(current)) => current,
        _ => c.base_stat(stat),
    };
    base + continuous_delta(state, registry, card, stat)
        + c.turn_modifier_total(stat, state.turn_number)
}

/// Effective CC cost to play `card`, after cost modifiers.
///
/// `MatchTarget` cost resolves to the chosen target's printed cost.
/// Card-domain modifiers from in-play sources stack additively; the
/// result never goes below zero.
pub fn card_play_cost(
    state: &GameState,
    registry: &EffectRegistry,
    card: CardId,
    player: PlayerId,
    target: Option<CardId>,
) -> Result<u8, IllegalMove> {
    let base = match state.card(card).cost.fixed() {
        Some(cost) => i32::from(cost),
        None => {
            let target = target.ok_or(IllegalMove::MissingCostTarget)?;
            i32::from(state.card(target).cost.fixed().unwrap_or(0))
        }
    };

    let mut cost = base;
    for (amount, scope, source) in cost_mods(state, registry, CostDomain::Card) {
        if mod_applies(state, scope, source, player) {
            cost += amount;
        }
    }
    Ok(clamp_cost(cost))
}

/// Effective CC cost for `player` to initiate a tussle.
///
/// When several tussle cost modifiers apply, the cheapest single result
/// wins; they do not stack.
#[must_use]
pub fn tussle_cost(
    state: &GameState,
    registry: &EffectRegistry,
    config: &GameConfig,
    player: PlayerId,
) -> u8 {
    let base = i32::from(config.base_tussle_cost);
    let mut best = base;
    for (amount, scope, source) in cost_mods(state, registry, CostDomain::Tussle) {
        if mod_applies(state, scope, source, player) {
            best = best.min(base + amount);
        }
    }
    clamp_cost(best)
}

fn cost_mods(
    state: &GameState,
    registry: &EffectRegistry,
    domain: CostDomain,
) -> Vec<(i32, EffectScope, CardId)> {
    let mut mods = Vec::new();
    for source in state.cards_in_play() {
        for effect in registry.effects_for(source) {
            if let EffectDef::CostMod(m) = effect {
                if m.domain == domain {
                    mods.push((m.amount, m.scope, source.id));
                }
            }
        }
    }
    mods
}

/// Cost modifiers scope over players, not cards: Team reaches the
/// source's controller, All reaches both players.
fn mod_applies(state: &GameState, scope: EffectScope, source: CardId, player: PlayerId) -> bool {
    match scope {
        EffectScope::SourceOnly | EffectScope::Team => state.card(source).controller == player,
        EffectScope::All => true,
    }
}

fn clamp_cost(cost: i32) -> u8 {
    cost.clamp(0, i32::from(u8::MAX)) as u8
}

/// Effective numbers for one side of a tussle.
///
/// The attacker carries the own-turn speed bonus, and only the attacker's
/// auto-win can apply, since tussles happen on the attacker's turn. Used
/// by live resolution and by the validator's prediction, so the two can
/// never disagree.
#[must_use]
pub fn combatant_view(
    state: &GameState,
    registry: &EffectRegistry,
    config: &GameConfig,
    card: CardId,
    is_attacker: bool,
) -> CombatantView {
    let speed_bonus = if is_attacker {
        config.attacker_speed_bonus
    } else {
        0
    };
    let auto_win = is_attacker
        && registry
            .effects_for(state.card(card))
            .iter()
            .any(|e| matches!(e, EffectDef::Continuous(ContinuousEffect::AutoWinOnOwnTurn)));
    CombatantView {
        card,
        speed: effective_stat(state, registry, card, Stat::Speed) + speed_bonus,
        strength: effective_stat(state, registry, card, Stat::Strength),
        stamina: effective_stat(state, registry, card, Stat::Stamina),
        auto_win,
        nullify_auto_win: has_protection(state, registry, card, ProtectionEffect::NullifyAutoWin),
    }
}

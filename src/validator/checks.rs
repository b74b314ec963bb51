//! The four plan checkers.
//!
//! Each pass is a pure function over the real `GameState` (read-only) and
//! the candidate plan, catching a class of sequence-level error that
//! per-action engine validation cannot see. All violations are collected
//! and returned together so the planner can fix everything in one
//! revision. The plan is assumed to belong to the active player.
//!
//! An action referencing a card id the game has never seen is a plan
//! defect, not a programmer error, so it surfaces as a dependency
//! violation instead of the panic the engine reserves for its own ids.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::combat::{self, TussleOutcome};
use crate::core::{CardId, GameState, Zone};
use crate::effects::{EffectDef, EffectRegistry, PlayAction, TriggerEvent, TriggeredAction};
use crate::engine::combatant_view;

use super::plan::{ActionKind, PlannedAction, Violation, ViolationKind};

/// Validate a whole plan. Never mutates `state`; never panics on bad
/// plan input.
#[must_use]
pub fn validate_plan(
    state: &GameState,
    registry: &EffectRegistry,
    plan: &[PlannedAction],
) -> Vec<Violation> {
    let mut violations = check_resources(state, registry, plan);
    violations.extend(check_board_projection(state, registry, plan));
    violations.extend(check_outcomes(state, registry, plan));
    violations.extend(check_dependencies(state, registry, plan));
    violations.sort_by_key(|v| v.index);
    violations
}

/// Replay the CC balance across the sequence, crediting gains from play
/// and when-played effects, and flag the first action that would drive
/// it negative.
fn check_resources(
    state: &GameState,
    registry: &EffectRegistry,
    plan: &[PlannedAction],
) -> Vec<Violation> {
    let player = state.active_player;
    let cap = i32::from(state.config.cc_cap);
    let mut balance = i32::from(state.players[player].cc());

    for (index, action) in plan.iter().enumerate() {
        balance -= i32::from(action.declared_cc_cost);
        if balance < 0 {
            return vec![Violation::new(
                index,
                ViolationKind::Resource,
                format!(
                    "spending {} CC here drives the balance to {}",
                    action.declared_cc_cost, balance
                ),
            )];
        }
        match action.kind {
            ActionKind::Play => {
                if let Some(card) = action.card.filter(|&c| state.contains_card(c)) {
                    balance = (balance + cc_gains_on_play(state, registry, card)).min(cap);
                }
            }
            // Actions after an end-turn happen on the planner's next
            // turn, after the regular grant.
            ActionKind::EndTurn => {
                balance = (balance + i32::from(state.config.cc_per_turn)).min(cap);
            }
            _ => {}
        }
    }
    Vec::new()
}

fn cc_gains_on_play(state: &GameState, registry: &EffectRegistry, card: CardId) -> i32 {
    let mut gain = 0;
    for effect in registry.effects_for(state.card(card)) {
        match effect {
            EffectDef::Play(p) => {
                if let PlayAction::GainCc(n) = p.action {
                    gain += i32::from(n);
                }
            }
            EffectDef::Triggered(t)
                if t.event == TriggerEvent::WhenPlayed =>
            {
                if let TriggeredAction::GainCc(n) = t.action {
                    gain += i32::from(n);
                }
            }
            _ => {}
        }
    }
    gain
}

/// Track which opponent in-play cards would survive each prior action,
/// and flag a direct attack scheduled while the projection still shows
/// opponent cards on the board.
fn check_board_projection(
    state: &GameState,
    registry: &EffectRegistry,
    plan: &[PlannedAction],
) -> Vec<Violation> {
    let player = state.active_player;
    let opponent = player.opponent();
    let mut survivors: FxHashSet<CardId> =
        state.players[opponent].in_play.iter().copied().collect();
    let mut violations = Vec::new();

    for (index, action) in plan.iter().enumerate() {
        match action.kind {
            ActionKind::DirectAttack => {
                if !survivors.is_empty() {
                    violations.push(Violation::new(
                        index,
                        ViolationKind::BoardState,
                        format!(
                            "direct attack while the opponent is projected to have {} toy(s) in play",
                            survivors.len()
                        ),
                    ));
                }
            }
            ActionKind::Tussle => {
                if let Some(outcome) = predict_tussle(state, registry, action) {
                    if outcome.defender_defeated {
                        if let Some(defender) = action.defender() {
                            survivors.remove(&defender);
                        }
                    }
                }
            }
            ActionKind::Play => {
                if let Some(card) = action.card.filter(|&c| state.contains_card(c)) {
                    if has_removal_play_effect(state, registry, card) {
                        for target in &action.targets {
                            survivors.remove(target);
                        }
                    }
                }
            }
            _ => {}
        }
    }
    violations
}

/// Sleep, bounce, and capture all remove a card from the opponent's
/// board for projection purposes.
fn has_removal_play_effect(state: &GameState, registry: &EffectRegistry, card: CardId) -> bool {
    registry
        .effects_for(state.card(card))
        .iter()
        .filter_map(EffectDef::as_play)
        .any(|p| {
            matches!(
                p.action,
                PlayAction::SleepTarget
                    | PlayAction::ReturnTargetToHand
                    | PlayAction::TakeControlOfTarget
            )
        })
}

/// Predict each tussle with the live combat math and flag certain
/// suicide trades: the attacker falls without dealing any damage.
fn check_outcomes(
    state: &GameState,
    registry: &EffectRegistry,
    plan: &[PlannedAction],
) -> Vec<Violation> {
    let mut violations = Vec::new();
    for (index, action) in plan.iter().enumerate() {
        if action.kind != ActionKind::Tussle {
            continue;
        }
        if let Some(outcome) = predict_tussle(state, registry, action) {
            if outcome.attacker_defeated && outcome.damage_to_defender == 0 {
                violations.push(Violation::new(
                    index,
                    ViolationKind::Outcome,
                    "attacker is certain to be defeated without dealing damage",
                ));
            }
        }
    }
    violations
}

fn predict_tussle(
    state: &GameState,
    registry: &EffectRegistry,
    action: &PlannedAction,
) -> Option<TussleOutcome> {
    let attacker = action.card.filter(|&c| state.contains_card(c))?;
    let defender = action.defender().filter(|&c| state.contains_card(c))?;
    let attacker_view = combatant_view(state, registry, &state.config, attacker, true);
    let defender_view = combatant_view(state, registry, &state.config, defender, false);
    Some(combat::resolve(&attacker_view, &defender_view))
}

/// Project card zones through the sequence and flag actions that need a
/// card somewhere it cannot yet be.
fn check_dependencies(
    state: &GameState,
    registry: &EffectRegistry,
    plan: &[PlannedAction],
) -> Vec<Violation> {
    let mut projected: FxHashMap<CardId, Zone> =
        state.cards().map(|c| (c.id, c.zone)).collect();
    let mut violations = Vec::new();

    for (index, action) in plan.iter().enumerate() {
        let Some(card) = action.card else {
            continue; // EndTurn
        };
        if !state.contains_card(card) {
            violations.push(Violation::new(
                index,
                ViolationKind::Dependency,
                format!("references card {:?}, which does not exist in this game", card),
            ));
            continue;
        }
        let name = &state.card(card).name;
        let zone = projected[&card];

        match action.kind {
            ActionKind::Play => match zone {
                Zone::Hand => {
                    apply_play_projection(state, registry, card, action, &mut projected);
                }
                Zone::InPlay => violations.push(Violation::new(
                    index,
                    ViolationKind::Dependency,
                    format!("{name} is already in play; activate it instead of playing it"),
                )),
                Zone::Sleep => violations.push(Violation::new(
                    index,
                    ViolationKind::Dependency,
                    format!(
                        "{name} is in the sleep zone and no earlier action returns it to hand"
                    ),
                )),
            },
            ActionKind::Tussle | ActionKind::DirectAttack | ActionKind::Activate => match zone {
                Zone::InPlay => {
                    if action.kind == ActionKind::Tussle {
                        if let Some(outcome) = predict_tussle(state, registry, action) {
                            if outcome.attacker_defeated {
                                projected.insert(card, Zone::Sleep);
                            }
                            if outcome.defender_defeated {
                                if let Some(defender) = action.defender() {
                                    projected.insert(defender, Zone::Sleep);
                                }
                            }
                        }
                    }
                }
                Zone::Hand => violations.push(Violation::new(
                    index,
                    ViolationKind::Dependency,
                    format!("{name} is still in hand; play it before using it in play"),
                )),
                Zone::Sleep => violations.push(Violation::new(
                    index,
                    ViolationKind::Dependency,
                    format!("{name} is projected to be in the sleep zone by this point"),
                )),
            },
            ActionKind::EndTurn => {}
        }
    }
    violations
}

fn apply_play_projection(
    state: &GameState,
    registry: &EffectRegistry,
    card: CardId,
    action: &PlannedAction,
    projected: &mut FxHashMap<CardId, Zone>,
) {
    let c = state.card(card);
    let play_effects: Vec<PlayAction> = registry
        .effects_for(c)
        .iter()
        .filter_map(EffectDef::as_play)
        .map(|p| p.action)
        .collect();

    let transforms = play_effects
        .iter()
        .any(|a| matches!(a, PlayAction::TransformIntoTarget));
    let destination = if c.is_toy() || transforms {
        Zone::InPlay
    } else {
        Zone::Sleep
    };
    projected.insert(card, destination);

    // A bounce effect puts its targets back in hand, which may satisfy a
    // later play action in the same sequence.
    if play_effects
        .iter()
        .any(|a| matches!(a, PlayAction::ReturnTargetToHand))
    {
        for &target in &action.targets {
            if projected.contains_key(&target) {
                projected.insert(target, Zone::Hand);
            }
        }
    }
    // Sleep effects move their targets to the sleep zone.
    if play_effects
        .iter()
        .any(|a| matches!(a, PlayAction::SleepTarget))
    {
        for &target in &action.targets {
            if projected.contains_key(&target) {
                projected.insert(target, Zone::Sleep);
            }
        }
    }
}

//! The turn state machine.
//!
//! `GameEngine` is the only writer of `GameState`. Every mutating
//! operation validates fully before touching anything, so a returned
//! `Err(IllegalMove)` leaves the state exactly as it was. After each
//! successful mutation the engine runs the state-based sweep: defeated
//! toys go to their owners' sleep zones and the victory condition is
//! checked.
//!
//! The registry is injected by reference and read-only; the engine never
//! registers or alters effects.

use smallvec::SmallVec;

use crate::combat::{self, CombatantView, TussleOutcome};
use crate::core::{
    CardId, CardTemplate, GameConfig, GameState, LogEvent, PlayerId, Stat, TurnPhase, Zone,
};
use crate::effects::{
    ActivatedAction, ActivatedEffect, EffectDef, EffectParseError, EffectRegistry, PlayAction,
    PlayEffect, ProtectionEffect, TriggerEvent, TriggeredAction,
};

use super::error::IllegalMove;
use super::queries;

/// What happened when a card was played.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayOutcome {
    pub cost_paid: u8,
    /// Zone the played card ended up in.
    pub ended_in: Zone,
    pub transformed: bool,
}

/// What happened when a tussle was initiated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TussleReport {
    pub cost_paid: u8,
    /// Combat result, `None` for a direct attack.
    pub outcome: Option<TussleOutcome>,
    /// The card a direct attack sleeped out of the opponent's hand.
    pub sleeped_from_hand: Option<CardId>,
}

/// Result of attempting to interrupt a tussle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CancelOutcome {
    NotCancelled,
}

/// The rules engine for one match.
pub struct GameEngine<'a> {
    pub state: GameState,
    registry: &'a EffectRegistry,
}

impl<'a> GameEngine<'a> {
    /// New match with a fresh state. Call [`GameEngine::start_turn`] to
    /// begin turn 1.
    #[must_use]
    pub fn new(registry: &'a EffectRegistry, config: GameConfig) -> Self {
        GameEngine {
            state: GameState::new(config),
            registry,
        }
    }

    /// Resume a match from restored state.
    #[must_use]
    pub fn from_state(registry: &'a EffectRegistry, state: GameState) -> Self {
        GameEngine { state, registry }
    }

    #[must_use]
    pub fn registry(&self) -> &'a EffectRegistry {
        self.registry
    }

    fn config(&self) -> GameConfig {
        self.state.config
    }

    /// Instantiate a template into `owner`'s hand.
    pub fn spawn_card(
        &mut self,
        template: &CardTemplate,
        owner: PlayerId,
    ) -> Result<CardId, EffectParseError> {
        let id = self.state.alloc_card_id();
        let card = template.instantiate(id, owner)?;
        self.state.add_card(card);
        Ok(id)
    }

    // === Turn transitions ===

    /// Begin the active player's turn: reset per-turn counters, grant CC,
    /// fire start-of-turn triggers, enter the Main phase.
    pub fn start_turn(&mut self) -> Result<(), IllegalMove> {
        if self.state.is_over() {
            return Err(IllegalMove::GameOver);
        }
        if self.state.phase != TurnPhase::Start {
            return Err(IllegalMove::WrongPhase {
                phase: self.state.phase,
            });
        }
        let player = self.state.active_player;
        log::debug!(
            "turn {} start for player {}",
            self.state.turn_number,
            player.index()
        );

        self.state.players[player].reset_turn_counters();
        self.state.record(LogEvent::TurnStarted { player });

        let grant = if self.state.turn_number == 1 {
            self.config().first_turn_cc
        } else {
            self.config().cc_per_turn
        };
        self.state.grant_cc(player, grant);

        let own_board: Vec<CardId> = self.state.players[player].in_play.clone();
        for card in own_board {
            self.fire_triggers(card, TriggerEvent::StartOfTurn);
        }

        self.state.phase = TurnPhase::Main;
        self.check_state_based_actions();
        Ok(())
    }

    /// End the active player's turn and atomically start the opponent's.
    pub fn end_turn(&mut self, player: PlayerId) -> Result<(), IllegalMove> {
        if self.state.is_over() {
            return Err(IllegalMove::GameOver);
        }
        if player != self.state.active_player {
            return Err(IllegalMove::NotYourTurn { player });
        }

        self.state.record(LogEvent::TurnEnded { player });
        self.state.phase = TurnPhase::End;
        self.state.active_player = player.opponent();
        self.state.turn_number += 1;
        self.state.phase = TurnPhase::Start;
        self.start_turn()
    }

    // === Playing cards ===

    /// Play a card from hand.
    ///
    /// Validation happens in full before any mutation. Toys enter play
    /// and fire `WhenPlayed`; Actions resolve their play effects against
    /// `targets` and then go to their owner's sleep zone without firing
    /// `WhenSleeped` (they were never in play), unless a transform left
    /// the card in play.
    pub fn play_card(
        &mut self,
        player: PlayerId,
        card: CardId,
        targets: &[CardId],
    ) -> Result<PlayOutcome, IllegalMove> {
        if self.state.is_over() {
            return Err(IllegalMove::GameOver);
        }

        // An interrupt card may be played off-turn; the interrupt window
        // itself is not implemented (see `try_cancel_tussle`).
        let is_interrupt = self
            .registry
            .effects_for(self.state.card(card))
            .iter()
            .any(EffectDef::is_interrupt);
        if !is_interrupt {
            if player != self.state.active_player {
                return Err(IllegalMove::NotYourTurn { player });
            }
            if self.state.phase != TurnPhase::Main {
                return Err(IllegalMove::WrongPhase {
                    phase: self.state.phase,
                });
            }
        }

        if self.state.card(card).zone != Zone::Hand || self.state.card(card).owner() != player {
            return Err(IllegalMove::CardNotInHand { card });
        }

        let play_effects: Vec<PlayEffect> = self
            .registry
            .effects_for(self.state.card(card))
            .iter()
            .filter_map(EffectDef::as_play)
            .copied()
            .collect();
        let assigned = self.assign_targets(player, card, &play_effects, targets)?;

        let cost = queries::card_play_cost(
            &self.state,
            self.registry,
            card,
            player,
            targets.first().copied(),
        )?;
        let available = self.state.players[player].cc();
        if available < cost {
            return Err(IllegalMove::InsufficientCc {
                required: cost,
                available,
            });
        }

        // Validation complete; from here on we mutate.
        self.state.spend_cc(player, cost);
        let name = self.state.card(card).name.clone();
        self.state.record(LogEvent::CardPlayed { player, card, name });

        let is_toy = self.state.card(card).is_toy();
        let mut transformed = false;

        if is_toy {
            self.state.move_card(card, Zone::InPlay);
            self.fire_triggers(card, TriggerEvent::WhenPlayed);
        } else {
            for (effect, effect_targets) in &assigned {
                transformed |= self.resolve_play_effect(player, card, effect, effect_targets);
            }
            if transformed {
                self.state.move_card(card, Zone::InPlay);
            } else {
                // No `WhenSleeped` here: the card never hit the board.
                self.state.move_card(card, Zone::Sleep);
            }
        }

        let bystanders: Vec<CardId> = self
            .state
            .cards_in_play()
            .map(|c| c.id)
            .filter(|&id| id != card)
            .collect();
        for other in bystanders {
            self.fire_triggers(other, TriggerEvent::WhenOtherCardPlayed);
        }

        self.check_state_based_actions();
        Ok(PlayOutcome {
            cost_paid: cost,
            ended_in: self.state.card(card).zone,
            transformed,
        })
    }

    /// Pair each play effect with its slice of the declared target list,
    /// validating counts and each target's legality. Pure.
    fn assign_targets(
        &self,
        player: PlayerId,
        card: CardId,
        play_effects: &[PlayEffect],
        targets: &[CardId],
    ) -> Result<Vec<(PlayEffect, SmallVec<[CardId; 2]>)>, IllegalMove> {
        let min_total: usize = play_effects.iter().map(|e| usize::from(e.min_targets)).sum();
        let max_total: usize = play_effects.iter().map(|e| usize::from(e.max_targets)).sum();
        if targets.len() < min_total || targets.len() > max_total {
            return Err(IllegalMove::TargetCount {
                min: min_total as u8,
                max: max_total as u8,
                got: targets.len(),
            });
        }

        let mut remaining = targets;
        let mut assigned = Vec::with_capacity(play_effects.len());
        for effect in play_effects {
            let take = remaining.len().min(usize::from(effect.max_targets));
            let (taken, rest) = remaining.split_at(take);
            remaining = rest;
            for &target in taken {
                self.validate_target(player, card, effect.action, target)?;
            }
            assigned.push((*effect, SmallVec::from_slice(taken)));
        }
        Ok(assigned)
    }

    fn validate_target(
        &self,
        player: PlayerId,
        _card: CardId,
        action: PlayAction,
        target: CardId,
    ) -> Result<(), IllegalMove> {
        if !self.state.contains_card(target) {
            panic!("unknown card id {target:?}");
        }
        let target_card = self.state.card(target);

        let zone_ok = match action {
            // Bouncing your own sleeped card back to hand is legal.
            PlayAction::ReturnTargetToHand => {
                target_card.zone == Zone::InPlay
                    || (target_card.zone == Zone::Sleep && target_card.owner() == player)
            }
            PlayAction::GainCc(_) => true,
            _ => target_card.zone == Zone::InPlay,
        };
        if !zone_ok {
            return Err(IllegalMove::invalid_target(format!(
                "{} is not in a targetable zone",
                target_card.name
            )));
        }

        if matches!(action, PlayAction::DamageTarget(_)) && !target_card.is_toy() {
            return Err(IllegalMove::invalid_target(format!(
                "{} has no stamina to damage",
                target_card.name
            )));
        }

        // Immunity shields in-play cards from hostile effects. Transform
        // only reads the target, so it goes through.
        let hostile = target_card.controller != player;
        let touches_target = !matches!(
            action,
            PlayAction::TransformIntoTarget | PlayAction::GainCc(_)
        );
        if hostile
            && touches_target
            && queries::has_protection(
                &self.state,
                self.registry,
                target,
                ProtectionEffect::EffectImmunity,
            )
        {
            return Err(IllegalMove::invalid_target(format!(
                "{} is immune to effects",
                target_card.name
            )));
        }
        Ok(())
    }

    /// Apply one play effect. Returns true if it transformed the played
    /// card.
    fn resolve_play_effect(
        &mut self,
        player: PlayerId,
        card: CardId,
        effect: &PlayEffect,
        targets: &[CardId],
    ) -> bool {
        match effect.action {
            PlayAction::SleepTarget => {
                for &target in targets {
                    self.sleep_from_play(target);
                }
            }
            PlayAction::ReturnTargetToHand => {
                for &target in targets {
                    self.state.move_card(target, Zone::Hand);
                    self.state.record(LogEvent::CardReturnedToHand { card: target });
                }
            }
            PlayAction::TakeControlOfTarget => {
                for &target in targets {
                    self.state.set_controller(target, player);
                    self.state.record(LogEvent::ControlTaken {
                        card: target,
                        new_controller: player,
                    });
                }
            }
            PlayAction::TransformIntoTarget => {
                if let Some(&target) = targets.first() {
                    self.transform_card(card, target);
                    return true;
                }
            }
            PlayAction::DamageTarget(amount) => {
                for &target in targets {
                    self.damage_card(target, i32::from(amount));
                }
            }
            PlayAction::GainCc(amount) => {
                self.state.grant_cc(player, amount);
            }
        }
        false
    }

    /// Permanently copy `target`'s printed face onto `card`. Identity,
    /// owner, and controller stay; definitions are re-parsed so the copy
    /// is observationally identical to a fresh instance of the target.
    fn transform_card(&mut self, card: CardId, target: CardId) {
        let (name, card_type, cost, stats, defs) = {
            let t = self.state.card(target);
            (
                t.name.clone(),
                t.card_type,
                t.cost,
                t.base_stats,
                t.effect_definitions.clone(),
            )
        };
        let result = self
            .state
            .card_mut(card)
            .transform_into(name.clone(), card_type, cost, stats, defs);
        match result {
            // The target's definitions already parsed when it was built.
            Ok(()) => self.state.record(LogEvent::Transformed { card, into: name }),
            Err(err) => panic!("transform target carried unparseable definitions: {err}"),
        }
    }

    // === Tussles ===

    /// Initiate a tussle, or a direct attack when `defender` is `None`.
    ///
    /// A direct attack requires the opponent's board to be empty and
    /// their hand non-empty, and is limited per turn. It sleeps a random
    /// card from their hand without firing `WhenSleeped`.
    pub fn initiate_tussle(
        &mut self,
        player: PlayerId,
        attacker: CardId,
        defender: Option<CardId>,
    ) -> Result<TussleReport, IllegalMove> {
        if self.state.is_over() {
            return Err(IllegalMove::GameOver);
        }
        if player != self.state.active_player {
            return Err(IllegalMove::NotYourTurn { player });
        }
        if self.state.phase != TurnPhase::Main {
            return Err(IllegalMove::WrongPhase {
                phase: self.state.phase,
            });
        }

        let attacker_card = self.state.card(attacker);
        if attacker_card.zone != Zone::InPlay {
            return Err(IllegalMove::CardNotInPlay { card: attacker });
        }
        if attacker_card.controller != player {
            return Err(IllegalMove::NotController { card: attacker });
        }
        if !attacker_card.is_toy() {
            return Err(IllegalMove::NotAToy { card: attacker });
        }

        let opponent = player.opponent();
        match defender {
            Some(d) => {
                let defender_card = self.state.card(d);
                if defender_card.zone != Zone::InPlay {
                    return Err(IllegalMove::invalid_target("defender is not in play"));
                }
                if defender_card.controller != opponent {
                    return Err(IllegalMove::invalid_target(
                        "you can only tussle the opponent's toys",
                    ));
                }
                if !defender_card.is_toy() {
                    return Err(IllegalMove::invalid_target("defender is not a toy"));
                }
            }
            None => {
                if !self.state.players[opponent].in_play.is_empty() {
                    return Err(IllegalMove::OpponentBoardNotEmpty);
                }
                if self.state.players[opponent].hand.is_empty() {
                    return Err(IllegalMove::OpponentHandEmpty);
                }
                let limit = self.config().direct_attack_limit;
                if self.state.players[player].direct_attacks_this_turn >= limit {
                    return Err(IllegalMove::DirectAttackLimit { limit });
                }
            }
        }

        let config = self.config();
        let cost = queries::tussle_cost(&self.state, self.registry, &config, player);
        let available = self.state.players[player].cc();
        if available < cost {
            return Err(IllegalMove::InsufficientCc {
                required: cost,
                available,
            });
        }

        // Validation complete.
        self.state.spend_cc(player, cost);
        self.state.players[player].tussles_this_turn += 1;

        let report = match defender {
            Some(d) => {
                let outcome = self.resolve_tussle(attacker, d);
                TussleReport {
                    cost_paid: cost,
                    outcome: Some(outcome),
                    sleeped_from_hand: None,
                }
            }
            None => {
                self.state.players[player].direct_attacks_this_turn += 1;
                let sleeped = self.direct_attack(player, opponent)?;
                TussleReport {
                    cost_paid: cost,
                    outcome: None,
                    sleeped_from_hand: Some(sleeped),
                }
            }
        };

        self.check_state_based_actions();
        Ok(report)
    }

    fn resolve_tussle(&mut self, attacker: CardId, defender: CardId) -> TussleOutcome {
        let attacker_view = self.combatant_view(attacker, true);
        let defender_view = self.combatant_view(defender, false);
        let outcome = combat::resolve(&attacker_view, &defender_view);

        if outcome.damage_to_defender > 0 {
            self.damage_card(defender, outcome.damage_to_defender);
        }
        if outcome.damage_to_attacker > 0 {
            self.damage_card(attacker, outcome.damage_to_attacker);
        }
        self.state.record(LogEvent::TussleResolved {
            attacker,
            defender,
            attacker_defeated: outcome.attacker_defeated,
            defender_defeated: outcome.defender_defeated,
        });

        // Auto-win defeats a toy at full stamina, so defeat flags drive
        // the sleep, not the damage numbers.
        for (card, defeated) in [
            (defender, outcome.defender_defeated),
            (attacker, outcome.attacker_defeated),
        ] {
            if defeated && self.state.card(card).zone == Zone::InPlay {
                self.sleep_from_play(card);
            }
        }
        outcome
    }

    fn direct_attack(
        &mut self,
        player: PlayerId,
        opponent: PlayerId,
    ) -> Result<CardId, IllegalMove> {
        let hand = self.state.players[opponent].hand.clone();
        let picked = match self.state.rng.choose(&hand) {
            Some(&id) => id,
            None => return Err(IllegalMove::OpponentHandEmpty),
        };
        self.state.move_card(picked, Zone::Sleep);
        self.state.record(LogEvent::DirectAttack {
            attacker: player,
            sleeped_card: picked,
        });
        Ok(picked)
    }

    fn combatant_view(&self, card: CardId, is_attacker: bool) -> CombatantView {
        let config = self.config();
        queries::combatant_view(&self.state, self.registry, &config, card, is_attacker)
    }

    // === Activated abilities ===

    /// Pay for and apply the `index`-th activated ability on `card`.
    /// Repeatable while affordable.
    pub fn activate_ability(
        &mut self,
        player: PlayerId,
        card: CardId,
        index: usize,
    ) -> Result<(), IllegalMove> {
        if self.state.is_over() {
            return Err(IllegalMove::GameOver);
        }
        if player != self.state.active_player {
            return Err(IllegalMove::NotYourTurn { player });
        }
        if self.state.phase != TurnPhase::Main {
            return Err(IllegalMove::WrongPhase {
                phase: self.state.phase,
            });
        }
        let c = self.state.card(card);
        if c.zone != Zone::InPlay {
            return Err(IllegalMove::CardNotInPlay { card });
        }
        if c.controller != player {
            return Err(IllegalMove::NotController { card });
        }

        let abilities: Vec<ActivatedEffect> = self
            .registry
            .effects_for(c)
            .iter()
            .filter_map(EffectDef::as_activated)
            .copied()
            .collect();
        let ability = *abilities
            .get(index)
            .ok_or(IllegalMove::NoSuchAbility { card, index })?;

        let available = self.state.players[player].cc();
        if available < ability.cost {
            return Err(IllegalMove::InsufficientCc {
                required: ability.cost,
                available,
            });
        }

        self.state.spend_cc(player, ability.cost);
        self.state.record(LogEvent::AbilityActivated { player, card });

        match ability.action {
            ActivatedAction::StatBoostThisTurn { stat, amount } => {
                let turn = self.state.turn_number;
                self.state.card_mut(card).add_turn_modifier(turn, stat, amount);
            }
            ActivatedAction::RestoreStamina(amount) => {
                let c = self.state.card_mut(card);
                let printed = c.base_stat(Stat::Stamina);
                if let Some(current) = c.current_stamina {
                    c.current_stamina = Some(printed.min(current + i32::from(amount)));
                }
                self.state.record(LogEvent::StaminaRestored { card, amount });
            }
        }

        self.check_state_based_actions();
        Ok(())
    }

    // === Interrupts ===

    /// Attempt to cancel an opponent's tussle with an interrupt card.
    ///
    /// The cancellation mechanic is deliberately unimplemented: playing
    /// the interrupt off-turn works, but the cancel itself always reports
    /// [`CancelOutcome::NotCancelled`].
    // TODO: wire an interrupt window into initiate_tussle once the cancel
    // mechanic is designed.
    pub fn try_cancel_tussle(&mut self, _player: PlayerId, _card: CardId) -> CancelOutcome {
        CancelOutcome::NotCancelled
    }

    // === State-based actions ===

    /// Sweep defeated toys to their owners' sleep zones and check the
    /// victory condition. Idempotent; runs after every mutation and loops
    /// until stable, since sleeping a stamina booster can defeat others.
    pub fn check_state_based_actions(&mut self) {
        loop {
            let defeated: Vec<CardId> = self
                .state
                .cards_in_play()
                .filter(|c| c.is_toy())
                .filter(|c| {
                    queries::effective_stat(&self.state, self.registry, c.id, Stat::Stamina) <= 0
                })
                .map(|c| c.id)
                .collect();
            if defeated.is_empty() {
                break;
            }
            for card in defeated {
                if self.state.card(card).zone == Zone::InPlay {
                    self.sleep_from_play(card);
                }
            }
        }

        // A player loses when every card they own sits in their own
        // sleep zone. Checked in seat order.
        for player in PlayerId::both() {
            let mut owned = 0usize;
            let mut sleeped = 0usize;
            for card in self.state.cards() {
                if card.owner() == player {
                    owned += 1;
                    if card.zone == Zone::Sleep {
                        sleeped += 1;
                    }
                }
            }
            if owned > 0 && owned == sleeped {
                self.state.set_winner(player.opponent());
            }
        }
    }

    /// Sleep a card that is currently in play: owner's sleep zone, log,
    /// `WhenSleeped` triggers.
    fn sleep_from_play(&mut self, card: CardId) {
        let name = self.state.card(card).name.clone();
        self.state.move_card(card, Zone::Sleep);
        self.state.record(LogEvent::CardSleeped { card, name });
        self.fire_triggers(card, TriggerEvent::WhenSleeped);
    }

    fn damage_card(&mut self, card: CardId, amount: i32) {
        let c = self.state.card_mut(card);
        if let Some(current) = c.current_stamina {
            c.current_stamina = Some(current - amount);
        }
        self.state.record(LogEvent::StaminaDamaged { card, amount });
    }

    /// Fire every trigger on `card` matching `event`. Optional triggers
    /// resolve affirmatively; there is no choice channel in the engine.
    fn fire_triggers(&mut self, card: CardId, event: TriggerEvent) {
        let actions: Vec<TriggeredAction> = self
            .registry
            .effects_for(self.state.card(card))
            .iter()
            .filter_map(|e| match e {
                EffectDef::Triggered(t) if t.event == event => Some(t.action),
                _ => None,
            })
            .collect();

        for action in actions {
            self.state.record(LogEvent::EffectTriggered { card });
            match action {
                TriggeredAction::GainCc(amount) => {
                    let controller = self.state.card(card).controller;
                    self.state.grant_cc(controller, amount);
                }
                TriggeredAction::ReturnToHand => {
                    self.state.move_card(card, Zone::Hand);
                    self.state.record(LogEvent::CardReturnedToHand { card });
                }
                TriggeredAction::StatBoostThisTurn { stat, amount } => {
                    let turn = self.state.turn_number;
                    self.state.card_mut(card).add_turn_modifier(turn, stat, amount);
                }
            }
        }
    }

    // === Queries (thin wrappers over the pure fold) ===

    /// Effective value of a stat right now. Panics on unknown ids.
    #[must_use]
    pub fn get_card_stat(&self, card: CardId, stat: Stat) -> i32 {
        queries::effective_stat(&self.state, self.registry, card, stat)
    }

    /// Effective CC cost to play `card`, given an optional cost target.
    pub fn calculate_card_cost(
        &self,
        card: CardId,
        player: PlayerId,
        target: Option<CardId>,
    ) -> Result<u8, IllegalMove> {
        queries::card_play_cost(&self.state, self.registry, card, player, target)
    }

    /// Effective CC cost for `player` to initiate a tussle.
    #[must_use]
    pub fn calculate_tussle_cost(&self, player: PlayerId) -> u8 {
        let config = self.config();
        queries::tussle_cost(&self.state, self.registry, &config, player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CardLibrary;

    fn engine(registry: &EffectRegistry) -> GameEngine<'_> {
        GameEngine::new(registry, GameConfig::default().with_seed(7))
    }

    fn spawn(engine: &mut GameEngine<'_>, owner: PlayerId, template: CardTemplate) -> CardId {
        engine.spawn_card(&template, owner).unwrap()
    }

    fn put_in_play(engine: &mut GameEngine<'_>, id: CardId) {
        engine.state.move_card(id, Zone::InPlay);
    }

    fn basic_toy(name: &str) -> CardTemplate {
        CardTemplate::toy(name, 2, 2, 2, 3)
    }

    #[test]
    fn test_start_turn_grants_first_turn_cc() {
        let registry = EffectRegistry::default();
        let mut engine = engine(&registry);
        // A card each so nobody instantly wins on an empty board.
        spawn(&mut engine, PlayerId::new(0), basic_toy("A"));
        spawn(&mut engine, PlayerId::new(1), basic_toy("B"));

        engine.start_turn().unwrap();
        assert_eq!(engine.state.players[PlayerId::new(0)].cc(), 2);
        assert_eq!(engine.state.phase, TurnPhase::Main);
    }

    #[test]
    fn test_start_turn_rejects_repeat_call() {
        let registry = EffectRegistry::default();
        let mut engine = engine(&registry);
        spawn(&mut engine, PlayerId::new(0), basic_toy("A"));
        spawn(&mut engine, PlayerId::new(1), basic_toy("B"));

        engine.start_turn().unwrap();
        assert_eq!(
            engine.start_turn(),
            Err(IllegalMove::WrongPhase {
                phase: TurnPhase::Main
            })
        );
        // No second first-turn grant.
        assert_eq!(engine.state.players[PlayerId::new(0)].cc(), 2);
    }

    #[test]
    fn test_end_turn_is_atomic() {
        let registry = EffectRegistry::default();
        let mut engine = engine(&registry);
        spawn(&mut engine, PlayerId::new(0), basic_toy("A"));
        spawn(&mut engine, PlayerId::new(1), basic_toy("B"));
        engine.start_turn().unwrap();

        engine.end_turn(PlayerId::new(0)).unwrap();

        assert_eq!(engine.state.active_player, PlayerId::new(1));
        assert_eq!(engine.state.turn_number, 2);
        // The new turn already started: counters reset, CC granted, Main.
        assert_eq!(engine.state.players[PlayerId::new(1)].cc(), 3);
        assert_eq!(engine.state.phase, TurnPhase::Main);
    }

    #[test]
    fn test_end_turn_rejects_non_active_player() {
        let registry = EffectRegistry::default();
        let mut engine = engine(&registry);
        spawn(&mut engine, PlayerId::new(0), basic_toy("A"));
        spawn(&mut engine, PlayerId::new(1), basic_toy("B"));
        engine.start_turn().unwrap();

        assert_eq!(
            engine.end_turn(PlayerId::new(1)),
            Err(IllegalMove::NotYourTurn {
                player: PlayerId::new(1)
            })
        );
    }

    #[test]
    fn test_play_toy_enters_play_and_pays_cost() {
        let registry = EffectRegistry::default();
        let mut engine = engine(&registry);
        let p0 = PlayerId::new(0);
        let toy = spawn(&mut engine, p0, basic_toy("A"));
        spawn(&mut engine, PlayerId::new(1), basic_toy("B"));
        engine.start_turn().unwrap();

        let outcome = engine.play_card(p0, toy, &[]).unwrap();

        assert_eq!(outcome.cost_paid, 2);
        assert_eq!(outcome.ended_in, Zone::InPlay);
        assert_eq!(engine.state.players[p0].cc(), 0);
        assert_eq!(engine.state.card(toy).current_stamina, Some(3));
    }

    #[test]
    fn test_play_rejects_insufficient_cc_without_mutating() {
        let registry = EffectRegistry::default();
        let mut engine = engine(&registry);
        let p0 = PlayerId::new(0);
        let pricey = spawn(&mut engine, p0, CardTemplate::toy("Pricey", 6, 2, 2, 3));
        spawn(&mut engine, PlayerId::new(1), basic_toy("B"));
        engine.start_turn().unwrap();

        let err = engine.play_card(p0, pricey, &[]).unwrap_err();
        assert_eq!(
            err,
            IllegalMove::InsufficientCc {
                required: 6,
                available: 2
            }
        );
        assert_eq!(engine.state.card(pricey).zone, Zone::Hand);
        assert_eq!(engine.state.players[p0].cc(), 2);
    }

    #[test]
    fn test_action_sleeps_without_when_sleeped_trigger() {
        let registry = EffectRegistry::default();
        let mut engine = engine(&registry);
        let p0 = PlayerId::new(0);
        // If WhenSleeped fired for the action itself we'd see a CC gain.
        let action = spawn(
            &mut engine,
            p0,
            CardTemplate::action("Windfall", 0)
                .with_effects("play:gain_cc:2:0:0;triggered:when_sleeped:gain_cc:7"),
        );
        spawn(&mut engine, p0, basic_toy("A"));
        spawn(&mut engine, PlayerId::new(1), basic_toy("B"));
        engine.start_turn().unwrap();

        let outcome = engine.play_card(p0, action, &[]).unwrap();

        assert_eq!(outcome.ended_in, Zone::Sleep);
        assert_eq!(engine.state.players[p0].cc(), 4); // 2 start + 2 gained
    }

    #[test]
    fn test_sleep_target_action() {
        let registry = EffectRegistry::default();
        let mut engine = engine(&registry);
        let p0 = PlayerId::new(0);
        let p1 = PlayerId::new(1);
        let lullaby = spawn(
            &mut engine,
            p0,
            CardTemplate::action("Lullaby", 1).with_effects("play:sleep_target:1:1"),
        );
        spawn(&mut engine, p0, basic_toy("A"));
        let victim = spawn(&mut engine, p1, basic_toy("B"));
        spawn(&mut engine, p1, basic_toy("C"));
        put_in_play(&mut engine, victim);
        engine.start_turn().unwrap();

        engine.play_card(p0, lullaby, &[victim]).unwrap();

        assert_eq!(engine.state.card(victim).zone, Zone::Sleep);
        assert_eq!(engine.state.players[p1].sleep_zone, vec![victim]);
    }

    #[test]
    fn test_immune_target_rejected_before_mutation() {
        let registry = EffectRegistry::default();
        let mut engine = engine(&registry);
        let p0 = PlayerId::new(0);
        let p1 = PlayerId::new(1);
        let lullaby = spawn(
            &mut engine,
            p0,
            CardTemplate::action("Lullaby", 1).with_effects("play:sleep_target:1:1"),
        );
        spawn(&mut engine, p0, basic_toy("A"));
        let knight = spawn(
            &mut engine,
            p1,
            CardTemplate::toy("Porcelain Knight", 3, 2, 2, 3).with_effects("protection:effects"),
        );
        put_in_play(&mut engine, knight);
        engine.start_turn().unwrap();

        let err = engine.play_card(p0, lullaby, &[knight]).unwrap_err();
        assert!(matches!(err, IllegalMove::InvalidTarget { .. }));
        assert_eq!(engine.state.card(lullaby).zone, Zone::Hand);
        assert_eq!(engine.state.players[p0].cc(), 2);
    }

    #[test]
    fn test_take_control_keeps_owner() {
        let registry = EffectRegistry::default();
        let mut engine = engine(&registry);
        let p0 = PlayerId::new(0);
        let p1 = PlayerId::new(1);
        let steal = spawn(
            &mut engine,
            p0,
            CardTemplate::action("Finders Keepers", 0)
                .with_effects("play:take_control:1:1")
                .with_match_cost(),
        );
        spawn(&mut engine, p0, basic_toy("A"));
        let prize = spawn(&mut engine, p1, basic_toy("B"));
        spawn(&mut engine, p1, basic_toy("C"));
        put_in_play(&mut engine, prize);
        engine.start_turn().unwrap();

        engine.play_card(p0, steal, &[prize]).unwrap();

        let card = engine.state.card(prize);
        assert_eq!(card.controller, p0);
        assert_eq!(card.owner(), p1);
        assert_eq!(engine.state.players[p0].in_play, vec![prize]);
    }

    #[test]
    fn test_transform_stays_in_play() {
        let registry = EffectRegistry::default();
        let mut engine = engine(&registry);
        let p0 = PlayerId::new(0);
        let p1 = PlayerId::new(1);
        let putty = spawn(
            &mut engine,
            p0,
            CardTemplate::action("Mirror Putty", 0)
                .with_effects("play:transform_copy:1:1")
                .with_match_cost(),
        );
        spawn(&mut engine, p0, basic_toy("A"));
        let model = spawn(
            &mut engine,
            p1,
            CardTemplate::toy("Lucky Dreidel", 2, 2, 2, 3).with_effects("auto_win:own_turn"),
        );
        spawn(&mut engine, p1, basic_toy("C"));
        put_in_play(&mut engine, model);
        engine.start_turn().unwrap();

        let outcome = engine.play_card(p0, putty, &[model]).unwrap();

        assert!(outcome.transformed);
        assert_eq!(outcome.ended_in, Zone::InPlay);
        let copy = engine.state.card(putty);
        assert_eq!(copy.name, "Lucky Dreidel");
        assert!(copy.is_toy());
        assert_eq!(copy.owner(), p0);
        assert_eq!(copy.effects(), engine.state.card(model).effects());
    }

    #[test]
    fn test_tussle_attacker_speed_bonus_decides() {
        let registry = EffectRegistry::default();
        let mut engine = engine(&registry);
        let p0 = PlayerId::new(0);
        let p1 = PlayerId::new(1);
        // Equal printed speed; the +1 attacker bonus breaks the tie.
        let attacker = spawn(&mut engine, p0, CardTemplate::toy("A", 2, 2, 3, 3));
        let defender = spawn(&mut engine, p1, CardTemplate::toy("B", 2, 2, 3, 3));
        spawn(&mut engine, p1, basic_toy("C"));
        put_in_play(&mut engine, attacker);
        put_in_play(&mut engine, defender);
        engine.start_turn().unwrap();

        let report = engine.initiate_tussle(p0, attacker, Some(defender)).unwrap();
        let outcome = report.outcome.unwrap();

        assert!(outcome.defender_defeated);
        assert!(!outcome.attacker_defeated);
        assert_eq!(engine.state.card(defender).zone, Zone::Sleep);
        assert_eq!(engine.state.card(attacker).current_stamina, Some(3));
    }

    #[test]
    fn test_direct_attack_requires_empty_board_and_respects_limit() {
        let registry = EffectRegistry::default();
        let mut engine = engine(&registry);
        let p0 = PlayerId::new(0);
        let p1 = PlayerId::new(1);
        let attacker = spawn(&mut engine, p0, basic_toy("A"));
        let blocker = spawn(&mut engine, p1, basic_toy("B"));
        spawn(&mut engine, p1, basic_toy("C"));
        spawn(&mut engine, p1, basic_toy("D"));
        spawn(&mut engine, p1, basic_toy("E"));
        put_in_play(&mut engine, attacker);
        put_in_play(&mut engine, blocker);
        engine.start_turn().unwrap();
        engine.state.grant_cc(p0, 7);

        assert_eq!(
            engine.initiate_tussle(p0, attacker, None),
            Err(IllegalMove::OpponentBoardNotEmpty)
        );

        engine.state.move_card(blocker, Zone::Sleep);
        let report = engine.initiate_tussle(p0, attacker, None).unwrap();
        let sleeped = report.sleeped_from_hand.unwrap();
        assert_eq!(engine.state.card(sleeped).zone, Zone::Sleep);
        assert_eq!(engine.state.card(sleeped).owner(), p1);

        engine.initiate_tussle(p0, attacker, None).unwrap();
        assert_eq!(
            engine.initiate_tussle(p0, attacker, None),
            Err(IllegalMove::DirectAttackLimit { limit: 2 })
        );
    }

    #[test]
    fn test_when_sleeped_gain_cc_fires_from_combat() {
        let registry = EffectRegistry::default();
        let mut engine = engine(&registry);
        let p0 = PlayerId::new(0);
        let p1 = PlayerId::new(1);
        let attacker = spawn(&mut engine, p0, CardTemplate::toy("A", 2, 5, 5, 5));
        let sprite = spawn(
            &mut engine,
            p1,
            CardTemplate::toy("Dream Sprite", 2, 1, 1, 1)
                .with_effects("triggered:when_sleeped:gain_cc:2"),
        );
        spawn(&mut engine, p1, basic_toy("C"));
        put_in_play(&mut engine, attacker);
        put_in_play(&mut engine, sprite);
        engine.start_turn().unwrap();

        engine.initiate_tussle(p0, attacker, Some(sprite)).unwrap();

        assert_eq!(engine.state.card(sprite).zone, Zone::Sleep);
        assert_eq!(engine.state.players[p1].cc(), 2);
    }

    #[test]
    fn test_activate_ability_repeatable_while_affordable() {
        let registry = EffectRegistry::default();
        let mut engine = engine(&registry);
        let p0 = PlayerId::new(0);
        let bruiser = spawn(
            &mut engine,
            p0,
            CardTemplate::toy("Wind-Up Bruiser", 3, 2, 2, 3)
                .with_effects("activated:2:boost_turn:strength:2"),
        );
        spawn(&mut engine, PlayerId::new(1), basic_toy("B"));
        put_in_play(&mut engine, bruiser);
        engine.start_turn().unwrap();
        engine.state.grant_cc(p0, 5); // 2 + 5 = cap

        engine.activate_ability(p0, bruiser, 0).unwrap();
        engine.activate_ability(p0, bruiser, 0).unwrap();
        assert_eq!(engine.get_card_stat(bruiser, Stat::Strength), 6);

        engine.activate_ability(p0, bruiser, 0).unwrap();
        assert_eq!(
            engine.activate_ability(p0, bruiser, 0),
            Err(IllegalMove::InsufficientCc {
                required: 2,
                available: 1
            })
        );
    }

    #[test]
    fn test_restore_stamina_caps_at_printed() {
        let registry = EffectRegistry::default();
        let mut engine = engine(&registry);
        let p0 = PlayerId::new(0);
        let bear = spawn(
            &mut engine,
            p0,
            CardTemplate::toy("Patchwork Bear", 3, 1, 2, 4)
                .with_effects("activated:1:restore_stamina:2"),
        );
        spawn(&mut engine, PlayerId::new(1), basic_toy("B"));
        put_in_play(&mut engine, bear);
        engine.start_turn().unwrap();

        engine.state.card_mut(bear).current_stamina = Some(3);
        engine.activate_ability(p0, bear, 0).unwrap();
        assert_eq!(engine.state.card(bear).current_stamina, Some(4));
    }

    #[test]
    fn test_victory_when_all_owned_cards_sleeped() {
        let registry = EffectRegistry::default();
        let mut engine = engine(&registry);
        let p0 = PlayerId::new(0);
        let p1 = PlayerId::new(1);
        spawn(&mut engine, p0, basic_toy("A"));
        let only = spawn(&mut engine, p1, basic_toy("B"));
        engine.start_turn().unwrap();

        engine.state.move_card(only, Zone::Sleep);
        engine.check_state_based_actions();

        assert_eq!(engine.state.winner(), Some(p0));
        assert_eq!(engine.start_turn(), Err(IllegalMove::GameOver));
    }

    #[test]
    fn test_interrupt_card_playable_off_turn() {
        let registry = EffectRegistry::default();
        let mut engine = engine(&registry);
        let p0 = PlayerId::new(0);
        let p1 = PlayerId::new(1);
        spawn(&mut engine, p0, basic_toy("A"));
        let timeout = spawn(
            &mut engine,
            p1,
            CardTemplate::action("Time Out", 0).with_effects("interrupt:cancel_tussle"),
        );
        spawn(&mut engine, p1, basic_toy("B"));
        engine.start_turn().unwrap(); // p0's turn

        let outcome = engine.play_card(p1, timeout, &[]).unwrap();
        assert_eq!(outcome.ended_in, Zone::Sleep);
        assert_eq!(
            engine.try_cancel_tussle(p1, timeout),
            CancelOutcome::NotCancelled
        );
    }

    #[test]
    fn test_cancel_is_a_stub() {
        let registry = EffectRegistry::default();
        let mut engine = engine(&registry);
        let p0 = PlayerId::new(0);
        let card = spawn(&mut engine, p0, basic_toy("A"));
        assert_eq!(
            engine.try_cancel_tussle(p0, card),
            CancelOutcome::NotCancelled
        );
    }

    #[test]
    fn test_demo_library_cards_all_playable() {
        let library = CardLibrary::demo();
        let registry = EffectRegistry::new(library);
        let mut engine = GameEngine::new(&registry, GameConfig::default());
        let p0 = PlayerId::new(0);

        let template = registry.library().get("Tin Soldier").unwrap().clone();
        spawn(&mut engine, PlayerId::new(1), template.clone());
        let toy = spawn(&mut engine, p0, template);
        engine.start_turn().unwrap();
        engine.play_card(p0, toy, &[]).unwrap();
        assert_eq!(engine.state.card(toy).zone, Zone::InPlay);
    }
}

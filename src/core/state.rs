//! Complete game state.
//!
//! `GameState` owns the two [`Player`] records, the card store, the event
//! log, the CC ledger, and the RNG. All zone movement goes through
//! [`GameState::move_card`] so the per-player zone lists and each card's
//! `zone` field can never disagree. The engine holds the rules; this type
//! holds the facts.
//!
//! ## Snapshots
//!
//! A [`GameSnapshot`] is the serializable form of the state. Parsed
//! effects are not serialized (`Card.effects` is `#[serde(skip)]`);
//! restoring a snapshot re-parses every card's definitions string, so a
//! snapshot is valid exactly when its definitions are.

use im::Vector;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::effects::EffectParseError;

use super::card::{Card, CardId, Zone};
use super::config::GameConfig;
use super::player::{Player, PlayerId, PlayerPair};
use super::rng::{GameRng, GameRngState};

/// Phase within a turn. Start runs automatic upkeep, Main is where the
/// active player acts, End closes out the turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnPhase {
    Start,
    Main,
    End,
}

impl std::fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnPhase::Start => write!(f, "start"),
            TurnPhase::Main => write!(f, "main"),
            TurnPhase::End => write!(f, "end"),
        }
    }
}

/// One game event, recorded in order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogEvent {
    TurnStarted { player: PlayerId },
    TurnEnded { player: PlayerId },
    CcGained { player: PlayerId, amount: u8 },
    CcSpent { player: PlayerId, amount: u8 },
    CardPlayed { player: PlayerId, card: CardId, name: String },
    CardSleeped { card: CardId, name: String },
    CardReturnedToHand { card: CardId },
    TussleResolved {
        attacker: CardId,
        defender: CardId,
        attacker_defeated: bool,
        defender_defeated: bool,
    },
    DirectAttack { attacker: PlayerId, sleeped_card: CardId },
    AbilityActivated { player: PlayerId, card: CardId },
    EffectTriggered { card: CardId },
    ControlTaken { card: CardId, new_controller: PlayerId },
    Transformed { card: CardId, into: String },
    StaminaDamaged { card: CardId, amount: i32 },
    StaminaRestored { card: CardId, amount: u8 },
    GameWon { winner: PlayerId },
}

/// A log event stamped with the turn it happened on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub turn: u32,
    pub event: LogEvent,
}

/// CC gained and spent by one player on one turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CcTurnTotals {
    pub gained: u32,
    pub spent: u32,
}

/// The whole game, as facts. Rules live in the engine.
#[derive(Clone, Debug)]
pub struct GameState {
    pub config: GameConfig,
    pub players: PlayerPair<Player>,
    cards: FxHashMap<CardId, Card>,
    pub phase: TurnPhase,
    pub active_player: PlayerId,
    /// Starts at 1.
    pub turn_number: u32,
    winner: Option<PlayerId>,
    log: Vector<LogEntry>,
    cc_ledger: FxHashMap<u32, PlayerPair<CcTurnTotals>>,
    pub rng: GameRng,
    next_card_id: u32,
}

impl GameState {
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        Self::with_names(config, "Player 1", "Player 2")
    }

    #[must_use]
    pub fn with_names(
        config: GameConfig,
        first: impl Into<String>,
        second: impl Into<String>,
    ) -> Self {
        let names = [first.into(), second.into()];
        GameState {
            config,
            players: PlayerPair::new(|id| Player::new(id, names[id.index()].clone())),
            cards: FxHashMap::default(),
            phase: TurnPhase::Start,
            active_player: PlayerId::new(0),
            turn_number: 1,
            winner: None,
            log: Vector::new(),
            cc_ledger: FxHashMap::default(),
            rng: GameRng::new(config.rng_seed),
            next_card_id: 0,
        }
    }

    // === Card store ===

    /// Allocate the next card instance ID.
    pub fn alloc_card_id(&mut self) -> CardId {
        let id = CardId(self.next_card_id);
        self.next_card_id += 1;
        id
    }

    /// Register a freshly instantiated card. It enters its owner's hand,
    /// matching the zone the instance was created in.
    pub fn add_card(&mut self, card: Card) {
        debug_assert_eq!(card.zone, Zone::Hand);
        self.players[card.owner()].hand.push(card.id);
        self.cards.insert(card.id, card);
    }

    /// Look up a card. Panics if the ID is unknown: IDs come from the
    /// state itself, so a miss is a bug in the caller, not game input.
    #[must_use]
    pub fn card(&self, id: CardId) -> &Card {
        match self.cards.get(&id) {
            Some(card) => card,
            None => panic!("unknown card id {id:?}"),
        }
    }

    pub fn card_mut(&mut self, id: CardId) -> &mut Card {
        match self.cards.get_mut(&id) {
            Some(card) => card,
            None => panic!("unknown card id {id:?}"),
        }
    }

    #[must_use]
    pub fn contains_card(&self, id: CardId) -> bool {
        self.cards.contains_key(&id)
    }

    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.values()
    }

    /// Cards currently in play, regardless of controller.
    pub fn cards_in_play(&self) -> impl Iterator<Item = &Card> {
        self.cards.values().filter(|c| c.zone == Zone::InPlay)
    }

    // === Zone movement ===

    /// Move a card to a zone, keeping the zone lists consistent.
    ///
    /// Hand and Sleep route by *owner*; InPlay routes by *controller*.
    /// Leaving play clears stamina and turn modifiers; entering play
    /// initializes stamina. Returns the zone the card came from.
    pub fn move_card(&mut self, id: CardId, to: Zone) -> Zone {
        let (owner, controller, from) = {
            let card = self.card(id);
            (card.owner(), card.controller, card.zone)
        };

        for (_, player) in self.players.iter_mut() {
            if player.remove_card(id) {
                break;
            }
        }
        match to {
            Zone::Hand => self.players[owner].hand.push(id),
            Zone::Sleep => self.players[owner].sleep_zone.push(id),
            Zone::InPlay => self.players[controller].in_play.push(id),
        }

        let card = self.card_mut(id);
        card.zone = to;
        if to == Zone::InPlay && from != Zone::InPlay {
            card.enter_play();
        } else if from == Zone::InPlay && to != Zone::InPlay {
            card.leave_play();
        }
        from
    }

    /// Hand control of a card to another player. Ownership is fixed for
    /// the whole game; only the controller and the in-play list change.
    pub fn set_controller(&mut self, id: CardId, controller: PlayerId) {
        let (previous, zone) = {
            let card = self.card(id);
            (card.controller, card.zone)
        };
        if previous == controller {
            return;
        }
        self.card_mut(id).controller = controller;
        if zone == Zone::InPlay {
            self.players[previous].remove_card(id);
            self.players[controller].in_play.push(id);
        }
    }

    // === CC accounting ===

    /// Grant CC, clamped to the configured cap. Ledger and log record the
    /// amount actually gained, not the amount requested.
    pub fn grant_cc(&mut self, player: PlayerId, amount: u8) -> u8 {
        let cap = self.config.cc_cap;
        let gained = self.players[player].gain_cc(amount, cap);
        if gained > 0 {
            self.ledger_entry(player).gained += u32::from(gained);
            self.record(LogEvent::CcGained {
                player,
                amount: gained,
            });
        }
        gained
    }

    /// Spend CC. Refuses without mutating if the balance is short.
    pub fn spend_cc(&mut self, player: PlayerId, amount: u8) -> bool {
        if !self.players[player].spend_cc(amount) {
            return false;
        }
        if amount > 0 {
            self.ledger_entry(player).spent += u32::from(amount);
            self.record(LogEvent::CcSpent { player, amount });
        }
        true
    }

    fn ledger_entry(&mut self, player: PlayerId) -> &mut CcTurnTotals {
        self.cc_ledger
            .entry(self.turn_number)
            .or_insert_with(|| PlayerPair::with_value(CcTurnTotals::default()))
            .get_mut(player)
    }

    /// CC totals for one player on one turn.
    #[must_use]
    pub fn cc_totals(&self, turn: u32, player: PlayerId) -> CcTurnTotals {
        self.cc_ledger
            .get(&turn)
            .map(|pair| *pair.get(player))
            .unwrap_or_default()
    }

    // === Log ===

    pub fn record(&mut self, event: LogEvent) {
        self.log.push_back(LogEntry {
            turn: self.turn_number,
            event,
        });
    }

    #[must_use]
    pub fn log(&self) -> &Vector<LogEntry> {
        &self.log
    }

    // === Outcome ===

    #[must_use]
    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    /// Declare the winner. The first declaration sticks; later calls are
    /// ignored so repeated state-based checks cannot flip the result.
    pub fn set_winner(&mut self, player: PlayerId) {
        if self.winner.is_none() {
            self.winner = Some(player);
            self.record(LogEvent::GameWon { winner: player });
        }
    }

    // === Snapshots ===

    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            config: self.config,
            players: self.players.clone(),
            cards: self.cards.clone(),
            phase: self.phase,
            active_player: self.active_player,
            turn_number: self.turn_number,
            winner: self.winner,
            log: self.log.clone(),
            cc_ledger: self.cc_ledger.clone(),
            rng: self.rng.state(),
            next_card_id: self.next_card_id,
        }
    }

    /// Restore a snapshot, re-parsing every card's effect definitions.
    pub fn from_snapshot(snapshot: GameSnapshot) -> Result<Self, EffectParseError> {
        let mut state = GameState {
            config: snapshot.config,
            players: snapshot.players,
            cards: snapshot.cards,
            phase: snapshot.phase,
            active_player: snapshot.active_player,
            turn_number: snapshot.turn_number,
            winner: snapshot.winner,
            log: snapshot.log,
            cc_ledger: snapshot.cc_ledger,
            rng: GameRng::from_state(&snapshot.rng),
            next_card_id: snapshot.next_card_id,
        };
        for card in state.cards.values_mut() {
            card.rehydrate()?;
        }
        Ok(state)
    }
}

/// Serializable form of [`GameState`].
///
/// Cards serialize without their parsed effects; restoring goes through
/// [`GameState::from_snapshot`], which rebuilds them from the definition
/// strings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub config: GameConfig,
    pub players: PlayerPair<Player>,
    pub cards: FxHashMap<CardId, Card>,
    pub phase: TurnPhase,
    pub active_player: PlayerId,
    pub turn_number: u32,
    pub winner: Option<PlayerId>,
    pub log: Vector<LogEntry>,
    pub cc_ledger: FxHashMap<u32, PlayerPair<CcTurnTotals>>,
    pub rng: GameRngState,
    pub next_card_id: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CardTemplate, Stat};

    fn state_with_card(defs: &str) -> (GameState, CardId) {
        let mut state = GameState::new(GameConfig::default());
        let id = state.alloc_card_id();
        let card = CardTemplate::toy("Tin Soldier", 2, 2, 2, 3)
            .with_effects(defs)
            .instantiate(id, PlayerId::new(0))
            .unwrap();
        state.add_card(card);
        (state, id)
    }

    #[test]
    fn test_add_card_lands_in_owner_hand() {
        let (state, id) = state_with_card("");
        assert_eq!(state.players[PlayerId::new(0)].hand, vec![id]);
        assert_eq!(state.card(id).zone, Zone::Hand);
    }

    #[test]
    fn test_move_card_routes_in_play_by_controller() {
        let (mut state, id) = state_with_card("");
        state.move_card(id, Zone::InPlay);
        state.set_controller(id, PlayerId::new(1));

        assert!(state.players[PlayerId::new(0)].in_play.is_empty());
        assert_eq!(state.players[PlayerId::new(1)].in_play, vec![id]);
        assert_eq!(state.card(id).owner(), PlayerId::new(0));
    }

    #[test]
    fn test_stolen_card_sleeps_to_owner() {
        let (mut state, id) = state_with_card("");
        state.move_card(id, Zone::InPlay);
        state.set_controller(id, PlayerId::new(1));

        state.move_card(id, Zone::Sleep);
        assert_eq!(state.players[PlayerId::new(0)].sleep_zone, vec![id]);
        assert!(state.players[PlayerId::new(1)].sleep_zone.is_empty());
    }

    #[test]
    fn test_leaving_play_clears_combat_state() {
        let (mut state, id) = state_with_card("");
        state.move_card(id, Zone::InPlay);
        assert_eq!(state.card(id).current_stamina, Some(3));

        state.card_mut(id).add_turn_modifier(1, Stat::Speed, 2);
        state.move_card(id, Zone::Hand);

        let card = state.card(id);
        assert_eq!(card.current_stamina, None);
        assert_eq!(card.turn_modifier_total(Stat::Speed, 1), 0);
    }

    #[test]
    fn test_cc_ledger_tracks_actual_amounts() {
        let mut state = GameState::new(GameConfig::default());
        let p0 = PlayerId::new(0);

        assert_eq!(state.grant_cc(p0, 5), 5);
        assert_eq!(state.grant_cc(p0, 5), 2); // clamped at the cap
        assert!(state.spend_cc(p0, 3));
        assert!(!state.spend_cc(p0, 10));

        let totals = state.cc_totals(1, p0);
        assert_eq!(totals.gained, 7);
        assert_eq!(totals.spent, 3);
        assert_eq!(state.players[p0].cc(), 4);
    }

    #[test]
    fn test_grant_cc_clamps_to_configured_cap() {
        let mut state = GameState::new(GameConfig::default().with_cc_cap(4));
        let p0 = PlayerId::new(0);

        assert_eq!(state.grant_cc(p0, 7), 4);
        assert_eq!(state.players[p0].cc(), 4);
        assert_eq!(state.grant_cc(p0, 1), 0);
        assert_eq!(state.cc_totals(1, p0).gained, 4);
    }

    #[test]
    fn test_winner_is_set_once() {
        let mut state = GameState::new(GameConfig::default());
        state.set_winner(PlayerId::new(1));
        state.set_winner(PlayerId::new(0));
        assert_eq!(state.winner(), Some(PlayerId::new(1)));

        let wins: Vec<_> = state
            .log()
            .iter()
            .filter(|e| matches!(e.event, LogEvent::GameWon { .. }))
            .collect();
        assert_eq!(wins.len(), 1);
    }

    #[test]
    fn test_snapshot_round_trip_rehydrates_effects() {
        let (mut state, id) = state_with_card("stat_boost:speed:1:self");
        state.grant_cc(PlayerId::new(1), 3);
        state.move_card(id, Zone::InPlay);

        let json = serde_json::to_string(&state.snapshot()).unwrap();
        let snapshot: GameSnapshot = serde_json::from_str(&json).unwrap();
        let restored = GameState::from_snapshot(snapshot).unwrap();

        assert_eq!(restored.card(id).effects(), state.card(id).effects());
        assert!(!restored.card(id).effects().is_empty());
        assert_eq!(restored.players[PlayerId::new(1)].cc(), 3);
        assert_eq!(restored.card(id).zone, Zone::InPlay);
        assert_eq!(restored.log().len(), state.log().len());
    }

    #[test]
    #[should_panic(expected = "unknown card id")]
    fn test_unknown_card_id_panics() {
        let state = GameState::new(GameConfig::default());
        let _ = state.card(CardId(999));
    }
}

//! Plan input format and structured violations.
//!
//! A plan is an ordered list of actions produced by an external policy
//! (an AI planner or a UI). Each action names a card, optional targets,
//! and the CC cost the planner believes it will pay. The validator checks
//! the whole sequence and reports every problem it finds; it never
//! executes anything.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::CardId;

/// What an action intends to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    Play,
    Tussle,
    DirectAttack,
    Activate,
    EndTurn,
}

/// One step of a candidate plan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedAction {
    pub kind: ActionKind,
    pub card: Option<CardId>,
    /// For a tussle, the defender is the first target.
    pub targets: SmallVec<[CardId; 2]>,
    pub declared_cc_cost: u8,
}

impl PlannedAction {
    #[must_use]
    pub fn play(card: CardId, targets: &[CardId], declared_cc_cost: u8) -> Self {
        PlannedAction {
            kind: ActionKind::Play,
            card: Some(card),
            targets: SmallVec::from_slice(targets),
            declared_cc_cost,
        }
    }

    #[must_use]
    pub fn tussle(attacker: CardId, defender: CardId, declared_cc_cost: u8) -> Self {
        PlannedAction {
            kind: ActionKind::Tussle,
            card: Some(attacker),
            targets: SmallVec::from_slice(&[defender]),
            declared_cc_cost,
        }
    }

    #[must_use]
    pub fn direct_attack(attacker: CardId, declared_cc_cost: u8) -> Self {
        PlannedAction {
            kind: ActionKind::DirectAttack,
            card: Some(attacker),
            targets: SmallVec::new(),
            declared_cc_cost,
        }
    }

    #[must_use]
    pub fn activate(card: CardId, declared_cc_cost: u8) -> Self {
        PlannedAction {
            kind: ActionKind::Activate,
            card: Some(card),
            targets: SmallVec::new(),
            declared_cc_cost,
        }
    }

    #[must_use]
    pub fn end_turn() -> Self {
        PlannedAction {
            kind: ActionKind::EndTurn,
            card: None,
            targets: SmallVec::new(),
            declared_cc_cost: 0,
        }
    }

    /// The tussle's defender, if this is a tussle.
    #[must_use]
    pub fn defender(&self) -> Option<CardId> {
        match self.kind {
            ActionKind::Tussle => self.targets.first().copied(),
            _ => None,
        }
    }
}

/// Which checker found the problem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationKind {
    /// Running CC balance would go negative.
    Resource,
    /// Board projection contradicts the action's precondition.
    BoardState,
    /// Predicted tussle outcome wastes the action.
    Outcome,
    /// The card cannot be in the zone the action needs yet.
    Dependency,
}

/// One problem found in a plan, tied to the offending action's index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub index: usize,
    pub kind: ViolationKind,
    pub reason: String,
}

impl Violation {
    pub(crate) fn new(index: usize, kind: ViolationKind, reason: impl Into<String>) -> Self {
        Violation {
            index,
            kind,
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "action {}: {}", self.index, self.reason)
    }
}

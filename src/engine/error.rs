//! Expected illegal moves.
//!
//! Everything here is an ordinary branch for the caller, not a fault:
//! engine operations return these as `Err` and never panic for them.
//! The `Display` form is the human-readable reason handed to the UI or
//! planning loop.

use thiserror::Error;

use crate::core::{CardId, PlayerId, TurnPhase};

/// Why a requested move is not legal right now.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum IllegalMove {
    #[error("the game is over")]
    GameOver,

    #[error("it is not player {player:?}'s turn")]
    NotYourTurn { player: PlayerId },

    #[error("not allowed during the {phase} phase")]
    WrongPhase { phase: TurnPhase },

    #[error("card {card:?} is not in your hand")]
    CardNotInHand { card: CardId },

    #[error("card {card:?} is not in play")]
    CardNotInPlay { card: CardId },

    #[error("card {card:?} is not under your control")]
    NotController { card: CardId },

    #[error("card {card:?} is not a toy")]
    NotAToy { card: CardId },

    #[error("need {required} CC, have {available}")]
    InsufficientCc { required: u8, available: u8 },

    #[error("this card's cost is set by its target, but no target was given")]
    MissingCostTarget,

    #[error("expected between {min} and {max} targets, got {got}")]
    TargetCount { min: u8, max: u8, got: usize },

    #[error("invalid target: {reason}")]
    InvalidTarget { reason: String },

    #[error("card {card:?} has no activated ability at index {index}")]
    NoSuchAbility { card: CardId, index: usize },

    #[error("direct attack requires the opponent to have no toys in play")]
    OpponentBoardNotEmpty,

    #[error("direct attack requires the opponent to have cards in hand")]
    OpponentHandEmpty,

    #[error("already made {limit} direct attacks this turn")]
    DirectAttackLimit { limit: u8 },
}

impl IllegalMove {
    pub(crate) fn invalid_target(reason: impl Into<String>) -> Self {
        IllegalMove::InvalidTarget {
            reason: reason.into(),
        }
    }
}

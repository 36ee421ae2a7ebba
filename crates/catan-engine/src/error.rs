//! Error types.
//!
//! Two tiers:
//! - [`Refusal`]: returned by the `can_*` validation queries, describing why an
//!   action is not legal right now.
//! - [`GameError`]: returned by mutators and by the orchestrator. Every failure
//!   `process_action` reports is a `GameError`; its `Display` is the reason.

use crate::actions::ActionKind;
use crate::game::GamePhase;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a validation query rejected an action
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum Refusal {
    #[error("Cannot afford this")]
    InsufficientResources,

    #[error("Location already occupied")]
    Occupied,

    #[error("Too close to another building")]
    DistanceRule,

    #[error("Not connected to your road network")]
    NotConnected,

    #[error("Cities can only replace your own settlement")]
    NotOwnSettlement,

    #[error("No pieces remaining")]
    NoPiecesRemaining,

    #[error("Unknown intersection {0}")]
    UnknownIntersection(String),

    #[error("Unknown edge {0}")]
    UnknownEdge(String),

    #[error("Unknown hex {0}")]
    UnknownHex(String),

    #[error("Robber is already on that hex")]
    RobberAlreadyThere,

    #[error("Invalid trade: {0}")]
    InvalidTrade(String),

    #[error("Must discard exactly {expected} resources, offered {offered}")]
    InvalidDiscard { expected: u32, offered: u32 },

    #[error("Discard includes resources not in hand")]
    DiscardNotHeld,

    #[error("No development cards left in deck")]
    EmptyDeck,

    #[error("Don't have that card")]
    NoSuchCard,

    #[error("Cannot play another development card this turn")]
    CardLocked,

    #[error("Invalid card play: {0}")]
    InvalidCardPlay(String),

    #[error("Not your turn")]
    NotYourTurn,
}

/// Errors that can occur when applying actions
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("A game needs 2 to 4 players, got {0}")]
    InvalidPlayerCount(usize),

    #[error("Duplicate player id {0}")]
    DuplicatePlayer(String),

    #[error("Unknown player {0}")]
    UnknownPlayer(String),

    #[error("Not your turn")]
    NotYourTurn,

    #[error("{action:?} is not allowed during {phase:?}")]
    WrongPhase { phase: GamePhase, action: ActionKind },

    #[error("Game is over")]
    GameOver,

    #[error("Waiting for players to discard")]
    DiscardsOutstanding,

    #[error("The robber must be moved first")]
    RobberMoveRequired,

    #[error("No discard owed")]
    NoDiscardOwed,

    #[error("Invalid rules configuration: {0}")]
    InvalidConfig(String),

    #[error("Malformed board layout: {0}")]
    MalformedBoard(String),

    #[error("Cannot read game state: {0}")]
    Serialization(String),

    #[error(transparent)]
    Refused(#[from] Refusal),
}

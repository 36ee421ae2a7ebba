//! Rules engine for a hex-board settlement and trading game.
//!
//! This crate validates player actions against the current game state and
//! produces the next state, or rejects the action with a reason:
//! - Hex coordinate system and stable ids for tiles, intersections and edges
//! - Board generation with shuffled terrain, number discs and fixed ports
//! - Per-subsystem rules for building, resources, trading, cards and the robber
//! - Longest road, largest army and win detection
//! - A phase state machine tying it together
//!
//! # Architecture
//!
//! The engine is synchronous and does no I/O. [`process_action`] takes a
//! `&GameState` and returns a new one; board maps are persistent, so the copy
//! shares everything the action didn't touch. All randomness comes from the
//! `rand::Rng` the caller passes in, which makes every game replayable from a
//! seed.
//!
//! ```
//! use catan_engine::*;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let game = create_new_game(&["ana", "ben"], &mut rng).unwrap();
//! assert_eq!(get_valid_actions(&game, "ana"), vec![ActionKind::BuildSettlement]);
//! assert!(get_valid_actions(&game, "ben").is_empty());
//! ```
//!
//! # Modules
//!
//! - [`hex`]: Coordinate system and id derivation
//! - [`board`]: Board topology, tiles, buildings and ports
//! - [`player`]: Player state, hands and costs
//! - [`resources`], [`building`], [`trading`], [`dev_cards`], [`robber`]: rule subsystems
//! - [`victory`]: Points, bonuses and the win check
//! - [`game`]: Game state machine and entry points

pub mod actions;
pub mod board;
pub mod building;
pub mod config;
pub mod dev_cards;
pub mod error;
pub mod game;
pub mod hex;
pub mod player;
pub mod resources;
pub mod robber;
pub mod trading;
pub mod victory;

// Re-export commonly used types
pub use actions::{Action, ActionKind, DevCardPlay, GameAction, GameEvent, TradeOffer};
pub use board::{
    Board, Building, BuildingKind, Edge, Intersection, PlayerId, Port, PortKind, Resource,
    Terrain, Tile,
};
pub use config::RulesConfig;
pub use error::{GameError, Refusal};
pub use game::{
    create_new_game, create_new_game_with_config, get_game_summary, get_valid_actions,
    process_action, GamePhase, GameState, GameSummary, PlayerSummary, Transition,
};
pub use hex::{EdgeDirection, EdgeId, HexCoord, IntersectionId};
pub use player::{DevCardHand, DevCardKind, Player, PlayerColor, ResourceHand};

//! Core game state machine.
//!
//! This module contains the `GameState` struct and the entry points the
//! session layer calls: [`create_new_game`], [`process_action`],
//! [`get_valid_actions`] and [`get_game_summary`].
//!
//! Phases run `SetupRound1 -> SetupRound2 -> (Production <-> Action) -> GameOver`.
//! A seven keeps the game in `Production` until every owed discard is made and
//! the robber has moved.

use crate::actions::{Action, ActionKind, DevCardPlay, GameAction, GameEvent};
use crate::board::{Board, PlayerId, Resource};
use crate::building::{self, Cost};
use crate::config::RulesConfig;
use crate::dev_cards;
use crate::error::GameError;
use crate::hex::IntersectionId;
use crate::player::{DevCardKind, Player};
use crate::resources;
use crate::robber::{self, PendingRobber, RobberOutcome};
use crate::trading;
use crate::victory;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Supported player counts
const MIN_PLAYERS: usize = 2;
const MAX_PLAYERS: usize = 4;

/// Game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
    /// First settlement and road, in seat order
    SetupRound1,
    /// Second settlement and road, in reverse seat order
    SetupRound2,
    /// Start of a turn: roll (cards may be played first), then resolve a seven
    Production,
    /// Build, trade and play cards until the turn ends
    Action,
    /// Someone won
    GameOver,
}

impl GamePhase {
    pub fn is_setup(&self) -> bool {
        matches!(self, GamePhase::SetupRound1 | GamePhase::SetupRound2)
    }
}

/// The complete game state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub id: String,
    /// Current game phase
    pub phase: GamePhase,
    /// Seat index of the player whose turn it is
    pub current_player: usize,
    /// All players, in seat order
    pub players: Vec<Player>,
    /// The game board
    pub board: Board,
    /// Development card deck, drawn from the end
    pub dev_deck: Vec<DevCardKind>,
    /// This turn's dice roll, None until rolled
    pub dice_roll: Option<(u8, u8)>,
    /// Turn number (0 during setup, 1 for the first regular turn)
    pub turn_number: u32,
    pub winner: Option<PlayerId>,
    /// Unfinished seven resolution
    pub pending_robber: Option<PendingRobber>,
    /// Settlement placed this setup turn, awaiting its road
    pub setup_anchor: Option<IntersectionId>,
    pub config: RulesConfig,
}

impl GameState {
    /// Look up a player by id
    pub fn player(&self, id: &str) -> Result<&Player, GameError> {
        self.players
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| GameError::UnknownPlayer(id.to_string()))
    }

    pub fn player_mut(&mut self, id: &str) -> Result<&mut Player, GameError> {
        self.players
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| GameError::UnknownPlayer(id.to_string()))
    }

    /// Seat index of a player
    pub fn seat_of(&self, id: &str) -> Option<usize> {
        self.players.iter().position(|p| p.id == id)
    }

    pub fn current_player_id(&self) -> &str {
        self.players
            .get(self.current_player)
            .map_or("", |p| p.id.as_str())
    }

    pub fn is_current(&self, id: &str) -> bool {
        self.current_player_id() == id
    }

    /// Whether the game has finished
    pub fn is_finished(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, GameError> {
        serde_json::to_string(self).map_err(|e| GameError::Serialization(e.to_string()))
    }

    /// Restore a state previously produced by [`to_json`](Self::to_json)
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        serde_json::from_str(json).map_err(|e| GameError::Serialization(e.to_string()))
    }
}

/// Successor state plus what happened on the way there
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: GameState,
    pub events: Vec<GameEvent>,
}

/// Public overview of a game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    pub phase: GamePhase,
    pub current_player: PlayerId,
    pub turn_number: u32,
    pub winner: Option<PlayerId>,
    pub players: Vec<PlayerSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub id: PlayerId,
    pub victory_points: u32,
    pub resource_count: u32,
    pub development_card_count: u32,
}

// ==================== Entry points ====================

/// Start a standard game for 2-4 players, seated in the given order
pub fn create_new_game<S, R>(player_ids: &[S], rng: &mut R) -> Result<GameState, GameError>
where
    S: AsRef<str>,
    R: Rng + ?Sized,
{
    create_new_game_with_config(player_ids, RulesConfig::default(), rng)
}

pub fn create_new_game_with_config<S, R>(
    player_ids: &[S],
    config: RulesConfig,
    rng: &mut R,
) -> Result<GameState, GameError>
where
    S: AsRef<str>,
    R: Rng + ?Sized,
{
    if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&player_ids.len()) {
        return Err(GameError::InvalidPlayerCount(player_ids.len()));
    }
    config.validate()?;

    let mut players: Vec<Player> = Vec::with_capacity(player_ids.len());
    for (seat, id) in player_ids.iter().enumerate() {
        let id = id.as_ref();
        if players.iter().any(|p| p.id == id) {
            return Err(GameError::DuplicatePlayer(id.to_string()));
        }
        players.push(Player::new(id, seat));
    }

    let board = Board::standard(rng)?;
    let dev_deck = dev_cards::standard_deck(rng);
    let id = format!("{:016x}", rng.gen::<u64>());
    info!(game = %id, players = players.len(), "created game");

    Ok(GameState {
        id,
        phase: GamePhase::SetupRound1,
        current_player: 0,
        players,
        board,
        dev_deck,
        dice_roll: None,
        turn_number: 0,
        winner: None,
        pending_robber: None,
        setup_anchor: None,
        config,
    })
}

/// Apply one action to a copy of `state`.
///
/// The input is never modified; on failure the caller keeps using it.
#[instrument(skip_all, fields(game = %state.id, player = %action.player, kind = ?action.kind()))]
pub fn process_action<R: Rng + ?Sized>(
    state: &GameState,
    action: &Action,
    rng: &mut R,
) -> Result<Transition, GameError> {
    let mut next = state.clone();
    match apply_action(&mut next, action, rng) {
        Ok(events) => {
            debug!(events = events.len(), phase = ?next.phase, "action applied");
            Ok(Transition {
                state: next,
                events,
            })
        }
        Err(err) => {
            debug!(%err, "action refused");
            Err(err)
        }
    }
}

/// Action kinds `player` may take right now, in a fixed order
pub fn get_valid_actions(state: &GameState, player: &str) -> Vec<ActionKind> {
    if state.is_finished() || state.seat_of(player).is_none() {
        return Vec::new();
    }
    if let Some(pending) = &state.pending_robber {
        if pending.owed_by(player).is_some() {
            return vec![ActionKind::DiscardResources];
        }
    }
    if !state.is_current(player) {
        return Vec::new();
    }

    let mut valid = Vec::new();
    match state.phase {
        GamePhase::SetupRound1 | GamePhase::SetupRound2 => {
            if state.setup_anchor.is_none() {
                if !building::legal_settlement_sites(state, player).is_empty() {
                    valid.push(ActionKind::BuildSettlement);
                }
            } else if !building::legal_road_sites(state, player, Cost::Paid).is_empty() {
                valid.push(ActionKind::BuildRoad);
            }
        }
        GamePhase::Production => match &state.pending_robber {
            Some(pending) if pending.discards_outstanding() => {}
            Some(_) => valid.push(ActionKind::MoveRobber),
            None => {
                valid.push(ActionKind::RollDice);
                if !dev_cards::playable_cards(state, player).is_empty() {
                    valid.push(ActionKind::PlayDevelopmentCard);
                }
            }
        },
        GamePhase::Action => {
            if !building::legal_road_sites(state, player, Cost::Paid).is_empty() {
                valid.push(ActionKind::BuildRoad);
            }
            if !building::legal_settlement_sites(state, player).is_empty() {
                valid.push(ActionKind::BuildSettlement);
            }
            if !building::legal_city_sites(state, player).is_empty() {
                valid.push(ActionKind::BuildCity);
            }
            if dev_cards::can_buy_dev_card(state, player).is_ok() {
                valid.push(ActionKind::BuyDevelopmentCard);
            }
            if !dev_cards::playable_cards(state, player).is_empty() {
                valid.push(ActionKind::PlayDevelopmentCard);
            }
            if can_afford_bank_trade(state, player) {
                valid.push(ActionKind::TradeWithBank);
            }
            if can_offer_player_trade(state, player) {
                valid.push(ActionKind::TradeWithPlayer);
            }
            valid.push(ActionKind::EndTurn);
        }
        GamePhase::GameOver => {}
    }
    valid
}

/// Phase, turn, and per-player public counts
pub fn get_game_summary(state: &GameState) -> GameSummary {
    GameSummary {
        phase: state.phase,
        current_player: state.current_player_id().to_string(),
        turn_number: state.turn_number,
        winner: state.winner.clone(),
        players: state
            .players
            .iter()
            .map(|p| PlayerSummary {
                id: p.id.clone(),
                victory_points: victory::victory_points(p),
                resource_count: p.resource_count(),
                development_card_count: p.dev_card_count(),
            })
            .collect(),
    }
}

// ==================== Dispatch ====================

fn apply_action<R: Rng + ?Sized>(
    state: &mut GameState,
    action: &Action,
    rng: &mut R,
) -> Result<Vec<GameEvent>, GameError> {
    if state.is_finished() {
        return Err(GameError::GameOver);
    }
    let player = action.player.as_str();
    let seat = state
        .seat_of(player)
        .ok_or_else(|| GameError::UnknownPlayer(player.to_string()))?;

    check_turn_and_phase(state, player, &action.action)?;

    let mut events = match &action.action {
        GameAction::BuildSettlement { intersection } => {
            build_settlement(state, player, intersection)?
        }
        GameAction::BuildRoad { edge } => {
            building::build_road(state, player, edge, Cost::Paid)?;
            let events = vec![GameEvent::RoadBuilt {
                player: player.to_string(),
                location: edge.clone(),
            }];
            if state.phase.is_setup() {
                state.setup_anchor = None;
                advance_setup(state);
            }
            events
        }
        GameAction::BuildCity { intersection } => {
            building::build_city(state, player, intersection)?;
            vec![GameEvent::CityBuilt {
                player: player.to_string(),
                location: intersection.clone(),
            }]
        }
        GameAction::BuyDevelopmentCard => {
            dev_cards::buy_dev_card(state, player)?;
            vec![GameEvent::DevelopmentCardPurchased {
                player: player.to_string(),
            }]
        }
        GameAction::PlayDevelopmentCard { card } => play_card(state, player, card, rng)?,
        GameAction::TradeWithBank { offer } => {
            trading::can_trade_with_bank(state, player, offer)?;
            trading::execute_trade(state, player, offer)?;
            let gave = offer.offering.kinds();
            let received = offer.requesting.kinds();
            match (gave.first(), received.first()) {
                (Some(&gave), Some(&received)) => vec![GameEvent::BankTradeCompleted {
                    player: player.to_string(),
                    gave,
                    gave_count: offer.offering.get(gave),
                    received,
                    received_count: offer.requesting.get(received),
                }],
                _ => Vec::new(),
            }
        }
        GameAction::TradeWithPlayer { offer } => {
            trading::can_trade_with_player(state, player, offer)?;
            trading::execute_trade(state, player, offer)?;
            vec![GameEvent::TradeCompleted {
                player1: player.to_string(),
                player2: offer.counterpart.clone().unwrap_or_default(),
            }]
        }
        GameAction::MoveRobber { hex, target } => {
            let outcome = robber::move_robber(state, player, *hex, target.as_deref(), rng)?;
            state.pending_robber = None;
            state.phase = GamePhase::Action;
            robber_events(player, outcome)
        }
        GameAction::DiscardResources { resources } => {
            let count = robber::discard(state, player, resources)?;
            vec![GameEvent::CardsDiscarded {
                player: player.to_string(),
                count,
            }]
        }
        GameAction::RollDice => roll(state, player, rng),
        GameAction::EndTurn => end_turn(state, player),
    };

    events.extend(victory::refresh(state));
    let winner = victory::check_winner(state, seat)
        .map(|p| (p.id.clone(), victory::victory_points(p)));
    if let Some((winner, victory_points)) = winner {
        info!(%winner, victory_points, turn = state.turn_number, "game won");
        state.winner = Some(winner.clone());
        state.phase = GamePhase::GameOver;
        state.pending_robber = None;
        events.push(GameEvent::GameWon {
            player: winner,
            victory_points,
        });
    }
    Ok(events)
}

/// Reject actions from the wrong player or in the wrong phase
fn check_turn_and_phase(
    state: &GameState,
    player: &str,
    action: &GameAction,
) -> Result<(), GameError> {
    let kind = action.kind();
    let wrong_phase = || GameError::WrongPhase {
        phase: state.phase,
        action: kind,
    };

    // Discards come from whoever owes one; victory points may be revealed any time.
    if let GameAction::DiscardResources { .. } = action {
        return match &state.pending_robber {
            Some(pending) if pending.owed_by(player).is_some() => Ok(()),
            Some(_) => Err(GameError::NoDiscardOwed),
            None => Err(wrong_phase()),
        };
    }
    let reveal = matches!(
        action,
        GameAction::PlayDevelopmentCard {
            card: DevCardPlay::VictoryPoint
        }
    );
    if reveal && matches!(state.phase, GamePhase::Production | GamePhase::Action) {
        return Ok(());
    }

    if !state.is_current(player) {
        return Err(GameError::NotYourTurn);
    }

    match state.phase {
        GamePhase::SetupRound1 | GamePhase::SetupRound2 => {
            let expected = if state.setup_anchor.is_none() {
                ActionKind::BuildSettlement
            } else {
                ActionKind::BuildRoad
            };
            if kind == expected {
                Ok(())
            } else {
                Err(wrong_phase())
            }
        }
        GamePhase::Production => match &state.pending_robber {
            Some(pending) if pending.discards_outstanding() => Err(GameError::DiscardsOutstanding),
            Some(_) if kind == ActionKind::MoveRobber => Ok(()),
            Some(_) => Err(GameError::RobberMoveRequired),
            None => match kind {
                ActionKind::RollDice | ActionKind::PlayDevelopmentCard => Ok(()),
                _ => Err(wrong_phase()),
            },
        },
        GamePhase::Action => match kind {
            ActionKind::RollDice | ActionKind::MoveRobber => Err(wrong_phase()),
            _ => Ok(()),
        },
        GamePhase::GameOver => Err(GameError::GameOver),
    }
}

fn build_settlement(
    state: &mut GameState,
    player: &str,
    intersection: &IntersectionId,
) -> Result<Vec<GameEvent>, GameError> {
    building::build_settlement(state, player, intersection)?;
    let mut events = vec![GameEvent::SettlementBuilt {
        player: player.to_string(),
        location: intersection.clone(),
    }];

    if state.phase.is_setup() {
        state.setup_anchor = Some(intersection.clone());
    }
    if state.phase == GamePhase::SetupRound2 {
        let distributions = resources::credit_starting_resources(state, player, intersection)?;
        if !distributions.is_empty() {
            events.push(GameEvent::ResourcesDistributed { distributions });
        }
    }
    Ok(events)
}

/// Hand the setup turn on: forward through round 1, back through round 2
fn advance_setup(state: &mut GameState) {
    let last = state.players.len() - 1;
    match state.phase {
        GamePhase::SetupRound1 if state.current_player < last => state.current_player += 1,
        GamePhase::SetupRound1 => state.phase = GamePhase::SetupRound2,
        GamePhase::SetupRound2 if state.current_player > 0 => state.current_player -= 1,
        GamePhase::SetupRound2 => {
            state.phase = GamePhase::Production;
            state.current_player = 0;
            state.turn_number = 1;
            debug!("setup finished");
        }
        _ => {}
    }
}

fn roll<R: Rng + ?Sized>(state: &mut GameState, player: &str, rng: &mut R) -> Vec<GameEvent> {
    let (die1, die2) = resources::roll_dice(rng);
    let total = die1 + die2;
    state.dice_roll = Some((die1, die2));

    let mut events = vec![GameEvent::DiceRolled {
        player: player.to_string(),
        roll: (die1, die2),
        total,
    }];

    if total == 7 {
        let pending = robber::begin_seven(state);
        if pending.discards_outstanding() {
            events.push(GameEvent::DiscardsRequired {
                players: pending.discards.into_iter().collect(),
            });
        }
    } else {
        let distributions = resources::distribute_resources(state, total);
        if !distributions.is_empty() {
            events.push(GameEvent::ResourcesDistributed { distributions });
        }
        state.phase = GamePhase::Action;
    }
    events
}

fn end_turn(state: &mut GameState, player: &str) -> Vec<GameEvent> {
    for p in &mut state.players {
        p.dev_card_locked = false;
    }
    state.dice_roll = None;
    state.current_player = (state.current_player + 1) % state.players.len();
    if state.current_player == 0 {
        state.turn_number += 1;
    }
    state.phase = GamePhase::Production;

    vec![GameEvent::TurnEnded {
        player: player.to_string(),
        next_player: state.current_player_id().to_string(),
    }]
}

fn play_card<R: Rng + ?Sized>(
    state: &mut GameState,
    player: &str,
    card: &DevCardPlay,
    rng: &mut R,
) -> Result<Vec<GameEvent>, GameError> {
    let mut events = vec![GameEvent::DevelopmentCardPlayed {
        player: player.to_string(),
        card: card.card_kind(),
    }];

    match card {
        DevCardPlay::Knight { hex, target } => {
            let outcome = dev_cards::play_knight(state, player, *hex, target.as_deref(), rng)?;
            events.extend(robber_events(player, outcome));
        }
        DevCardPlay::RoadBuilding { edges } => {
            dev_cards::play_road_building(state, player, edges)?;
            events.extend(edges.iter().map(|edge| GameEvent::RoadBuilt {
                player: player.to_string(),
                location: edge.clone(),
            }));
        }
        DevCardPlay::Invention { resources } => {
            dev_cards::play_invention(state, player, *resources)?;
            events.push(GameEvent::InventionPlayed {
                player: player.to_string(),
                resources: *resources,
            });
        }
        DevCardPlay::Monopoly { resource } => {
            let total_stolen = dev_cards::play_monopoly(state, player, *resource)?;
            events.push(GameEvent::MonopolyPlayed {
                player: player.to_string(),
                resource: *resource,
                total_stolen,
            });
        }
        DevCardPlay::VictoryPoint => dev_cards::play_victory_point(state, player)?,
    }
    Ok(events)
}

fn robber_events(player: &str, outcome: RobberOutcome) -> Vec<GameEvent> {
    let mut events = vec![GameEvent::RobberMoved {
        player: player.to_string(),
        from: outcome.from,
        to: outcome.to,
    }];
    if let Some((victim, resource)) = outcome.stolen {
        events.push(GameEvent::ResourceStolen {
            thief: player.to_string(),
            victim,
            resource,
        });
    }
    events
}

fn can_afford_bank_trade(state: &GameState, player: &str) -> bool {
    state.player(player).is_ok_and(|p| {
        Resource::ALL
            .iter()
            .any(|&r| p.resources.get(r) >= trading::bank_ratio(state, player, r))
    })
}

fn can_offer_player_trade(state: &GameState, player: &str) -> bool {
    state.player(player).is_ok_and(|p| !p.resources.is_empty())
        && state
            .players
            .iter()
            .any(|other| other.id != player && !other.resources.is_empty())
}

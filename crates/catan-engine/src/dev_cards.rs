//! Development card deck, purchases and the five card effects.
//!
//! Buying or playing a card locks its owner out of further card plays until
//! the turn ends. Victory point cards ignore both the lock and whose turn it
//! is.

use crate::board::Resource;
use crate::building::{build_road, Cost};
use crate::error::{GameError, Refusal};
use crate::game::GameState;
use crate::hex::{EdgeId, HexCoord};
use crate::player::{costs, DevCardKind};
use crate::robber::{move_robber, RobberOutcome};
use rand::seq::SliceRandom;
use rand::Rng;

/// Create the standard development card deck (25 cards), shuffled.
///
/// Cards are drawn from the end of the vector.
pub fn standard_deck<R: Rng + ?Sized>(rng: &mut R) -> Vec<DevCardKind> {
    let mut deck = Vec::with_capacity(25);

    // 14 Knights
    deck.extend(std::iter::repeat(DevCardKind::Knight).take(14));

    // 5 Victory Points
    deck.extend(std::iter::repeat(DevCardKind::VictoryPoint).take(5));

    // 2 each of the progress cards
    deck.extend(std::iter::repeat(DevCardKind::RoadBuilding).take(2));
    deck.extend(std::iter::repeat(DevCardKind::Invention).take(2));
    deck.extend(std::iter::repeat(DevCardKind::Monopoly).take(2));

    deck.shuffle(rng);
    deck
}

pub fn can_buy_dev_card(state: &GameState, player: &str) -> Result<(), Refusal> {
    if state.dev_deck.is_empty() {
        return Err(Refusal::EmptyDeck);
    }
    let buyer = state.player(player).map_err(|_| Refusal::NotYourTurn)?;
    if !buyer.resources.has_resources(&costs::development_card()) {
        return Err(Refusal::InsufficientResources);
    }
    Ok(())
}

/// Pay for and draw the top card
pub fn buy_dev_card(state: &mut GameState, player: &str) -> Result<DevCardKind, GameError> {
    can_buy_dev_card(state, player)?;
    let card = state.dev_deck.pop().ok_or(Refusal::EmptyDeck)?;

    let buyer = state.player_mut(player)?;
    buyer.resources.subtract(&costs::development_card());
    buyer.dev_cards.add(card);
    buyer.dev_card_locked = true;
    Ok(card)
}

pub fn can_play_dev_card(state: &GameState, player: &str, kind: DevCardKind) -> Result<(), Refusal> {
    let holder = state.player(player).map_err(|_| Refusal::NotYourTurn)?;
    if holder.dev_cards.get(kind) == 0 {
        return Err(Refusal::NoSuchCard);
    }
    if kind == DevCardKind::VictoryPoint {
        return Ok(());
    }
    if !state.is_current(player) {
        return Err(Refusal::NotYourTurn);
    }
    if holder.dev_card_locked {
        return Err(Refusal::CardLocked);
    }
    Ok(())
}

/// Take the card out of the hand and lock further plays
fn spend_card(state: &mut GameState, player: &str, kind: DevCardKind) -> Result<(), GameError> {
    can_play_dev_card(state, player, kind)?;
    let holder = state.player_mut(player)?;
    if !holder.dev_cards.remove(kind) {
        return Err(Refusal::NoSuchCard.into());
    }
    if kind != DevCardKind::VictoryPoint {
        holder.dev_card_locked = true;
    }
    Ok(())
}

/// Knight: move the robber, maybe rob, and count toward the army
pub fn play_knight<R: Rng + ?Sized>(
    state: &mut GameState,
    player: &str,
    hex: HexCoord,
    target: Option<&str>,
    rng: &mut R,
) -> Result<RobberOutcome, GameError> {
    spend_card(state, player, DevCardKind::Knight)?;
    let outcome = move_robber(state, player, hex, target, rng)?;
    state.player_mut(player)?.knights_played += 1;
    Ok(outcome)
}

/// Road building: up to two free roads, each placed after the one before
pub fn play_road_building(
    state: &mut GameState,
    player: &str,
    edges: &[EdgeId],
) -> Result<(), GameError> {
    if edges.is_empty() || edges.len() > 2 {
        return Err(Refusal::InvalidCardPlay(format!(
            "road building places 1 or 2 roads, got {}",
            edges.len()
        ))
        .into());
    }
    spend_card(state, player, DevCardKind::RoadBuilding)?;
    for edge in edges {
        build_road(state, player, edge, Cost::Free)?;
    }
    Ok(())
}

/// Invention: two resources from the bank
pub fn play_invention(
    state: &mut GameState,
    player: &str,
    resources: [Resource; 2],
) -> Result<(), GameError> {
    spend_card(state, player, DevCardKind::Invention)?;
    let hand = &mut state.player_mut(player)?.resources;
    for resource in resources {
        hand.add(resource, 1);
    }
    Ok(())
}

/// Monopoly: every opponent hands over all of `resource`. Returns how many were taken.
pub fn play_monopoly(
    state: &mut GameState,
    player: &str,
    resource: Resource,
) -> Result<u32, GameError> {
    spend_card(state, player, DevCardKind::Monopoly)?;
    let mut taken = 0;
    for other in state.players.iter_mut().filter(|p| p.id != player) {
        taken += other.resources.get(resource);
        other.resources.set(resource, 0);
    }
    state.player_mut(player)?.resources.add(resource, taken);
    Ok(taken)
}

/// Victory point: reveal it for a permanent point
pub fn play_victory_point(state: &mut GameState, player: &str) -> Result<(), GameError> {
    spend_card(state, player, DevCardKind::VictoryPoint)?;
    state.player_mut(player)?.revealed_victory_points += 1;
    Ok(())
}

/// Cards a player could legally play right now
pub fn playable_cards(state: &GameState, player: &str) -> Vec<DevCardKind> {
    DevCardKind::ALL
        .into_iter()
        .filter(|&kind| can_play_dev_card(state, player, kind).is_ok())
        .collect()
}

//! Dice, production, discards and theft.

use crate::board::{PlayerId, Resource};
use crate::error::{GameError, Refusal};
use crate::game::GameState;
use crate::hex::IntersectionId;
use crate::player::ResourceHand;
use rand::seq::SliceRandom;
use rand::Rng;

/// Roll two dice
pub fn roll_dice<R: Rng + ?Sized>(rng: &mut R) -> (u8, u8) {
    (rng.gen_range(1..=6), rng.gen_range(1..=6))
}

/// Credit every building touching a tile numbered `roll`.
///
/// A seven produces nothing, as does the tile under the robber. Returns one
/// entry per (player, resource) pair credited, in board order.
pub fn distribute_resources(state: &mut GameState, roll: u8) -> Vec<(PlayerId, Resource, u32)> {
    if roll == 7 {
        return Vec::new();
    }

    let mut credits: Vec<(PlayerId, Resource, u32)> = Vec::new();
    for tile in state.board.tiles().filter(|t| t.produces_on(roll)) {
        let Some(resource) = tile.resource() else {
            continue;
        };
        for corner in tile.coord.corners() {
            let Some(building) = state
                .board
                .intersection(&corner)
                .and_then(|i| i.building.as_ref())
            else {
                continue;
            };
            let amount = building.resource_multiplier();
            match credits
                .iter_mut()
                .find(|(owner, r, _)| *owner == building.owner && *r == resource)
            {
                Some(entry) => entry.2 += amount,
                None => credits.push((building.owner.clone(), resource, amount)),
            }
        }
    }

    for (owner, resource, amount) in &credits {
        if let Some(player) = state.players.iter_mut().find(|p| &p.id == owner) {
            player.resources.add(*resource, *amount);
        }
    }
    credits
}

/// One unit of each resource produced around a newly placed settlement
pub fn credit_starting_resources(
    state: &mut GameState,
    player: &str,
    intersection: &IntersectionId,
) -> Result<Vec<(PlayerId, Resource, u32)>, GameError> {
    let produced: Vec<Resource> = state
        .board
        .tiles_at(intersection)
        .iter()
        .filter_map(|tile| tile.resource())
        .collect();

    let hand = &mut state.player_mut(player)?.resources;
    for resource in &produced {
        hand.add(*resource, 1);
    }
    Ok(produced
        .into_iter()
        .map(|resource| (player.to_string(), resource, 1))
        .collect())
}

/// How many cards a hand must shed after a seven, if any
pub fn discard_owed(hand: &ResourceHand, threshold: u32) -> Option<u32> {
    let total = hand.total();
    (total > threshold).then_some(total / 2)
}

/// A discard must come out of the hand and total exactly half of it, rounded down
pub fn validate_discard(hand: &ResourceHand, discard: &ResourceHand) -> Result<(), Refusal> {
    if !hand.has_resources(discard) {
        return Err(Refusal::DiscardNotHeld);
    }
    let expected = hand.total() / 2;
    let offered = discard.total();
    if offered != expected {
        return Err(Refusal::InvalidDiscard { expected, offered });
    }
    Ok(())
}

/// Move one unit, chosen uniformly among the victim's cards, to the thief
pub fn steal_random_resource<R: Rng + ?Sized>(
    state: &mut GameState,
    thief: &str,
    victim: &str,
    rng: &mut R,
) -> Result<Option<Resource>, GameError> {
    let cards = state.player(victim)?.resources.cards();
    let Some(&resource) = cards.choose(rng) else {
        return Ok(None);
    };
    state.player_mut(victim)?.resources.remove(resource, 1);
    state.player_mut(thief)?.resources.add(resource, 1);
    Ok(Some(resource))
}

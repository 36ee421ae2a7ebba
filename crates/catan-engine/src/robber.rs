//! The robber: moving it, robbing a neighbor, and the discards a seven forces.
//!
//! A seven is resolved in two steps. First every player holding more than the
//! discard threshold gives up half their hand; only when nobody owes a discard
//! may the roller move the robber and pick a victim.

use crate::board::{PlayerId, Resource};
use crate::error::{GameError, Refusal};
use crate::game::GameState;
use crate::hex::HexCoord;
use crate::player::ResourceHand;
use crate::resources::{discard_owed, steal_random_resource, validate_discard};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outstanding work after a seven
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRobber {
    /// Cards each player still has to discard
    pub discards: BTreeMap<PlayerId, u32>,
}

impl PendingRobber {
    pub fn discards_outstanding(&self) -> bool {
        !self.discards.is_empty()
    }

    pub fn owed_by(&self, player: &str) -> Option<u32> {
        self.discards.get(player).copied()
    }
}

/// Record who has to discard after a seven
pub fn begin_seven(state: &mut GameState) -> PendingRobber {
    let threshold = state.config.discard_threshold;
    let discards = state
        .players
        .iter()
        .filter_map(|p| discard_owed(&p.resources, threshold).map(|n| (p.id.clone(), n)))
        .collect();
    let pending = PendingRobber { discards };
    state.pending_robber = Some(pending.clone());
    pending
}

/// Take a discard from a player who owes one
pub fn discard(state: &mut GameState, player: &str, resources: &ResourceHand) -> Result<u32, GameError> {
    let owed = state
        .pending_robber
        .as_ref()
        .and_then(|pending| pending.owed_by(player))
        .ok_or(GameError::NoDiscardOwed)?;

    let hand = &state.player(player)?.resources;
    validate_discard(hand, resources)?;
    if resources.total() != owed {
        return Err(Refusal::InvalidDiscard {
            expected: owed,
            offered: resources.total(),
        }
        .into());
    }

    state.player_mut(player)?.resources.subtract(resources);
    if let Some(pending) = state.pending_robber.as_mut() {
        pending.discards.remove(player);
    }
    Ok(owed)
}

pub fn can_move_robber(state: &GameState, hex: &HexCoord) -> Result<(), Refusal> {
    if state.board.tile(hex).is_none() {
        return Err(Refusal::UnknownHex(hex.to_string()));
    }
    if state.board.robber_hex() == *hex {
        return Err(Refusal::RobberAlreadyThere);
    }
    Ok(())
}

/// A victim must be someone else, hold a card, and have a building on `hex`
pub fn can_steal_from(state: &GameState, thief: &str, victim: &str, hex: &HexCoord) -> bool {
    thief != victim
        && state
            .player(victim)
            .is_ok_and(|p| !p.resources.is_empty())
        && state.board.owners_around(hex).contains(victim)
}

/// Players `thief` could rob with the robber on `hex`, in seat order
pub fn steal_candidates(state: &GameState, thief: &str, hex: &HexCoord) -> Vec<PlayerId> {
    state
        .players
        .iter()
        .filter(|p| can_steal_from(state, thief, &p.id, hex))
        .map(|p| p.id.clone())
        .collect()
}

/// What happened when the robber moved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobberOutcome {
    pub from: HexCoord,
    pub to: HexCoord,
    pub stolen: Option<(PlayerId, Resource)>,
}

/// Move the robber and rob `target` if the rules allow it.
///
/// An ineligible target is ignored; the move itself still happens.
pub fn move_robber<R: Rng + ?Sized>(
    state: &mut GameState,
    player: &str,
    hex: HexCoord,
    target: Option<&str>,
    rng: &mut R,
) -> Result<RobberOutcome, GameError> {
    can_move_robber(state, &hex)?;
    let from = state.board.robber_hex();
    state.board.set_robber(hex);

    let mut stolen = None;
    if let Some(victim) = target.filter(|v| can_steal_from(state, player, v, &hex)) {
        if let Some(resource) = steal_random_resource(state, player, victim, rng)? {
            stolen = Some((victim.to_string(), resource));
        }
    }
    Ok(RobberOutcome {
        from,
        to: hex,
        stolen,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Building;
    use crate::game::create_new_game;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn game() -> (GameState, StdRng) {
        let mut rng = StdRng::seed_from_u64(31);
        let state = create_new_game(&["alice", "bob", "carol"], &mut rng).unwrap();
        (state, rng)
    }

    fn other_hex(state: &GameState) -> HexCoord {
        state
            .board
            .tiles()
            .map(|t| t.coord)
            .find(|c| *c != state.board.robber_hex())
            .unwrap()
    }

    #[test]
    fn test_robber_must_move() {
        let (state, _) = game();
        assert_eq!(
            can_move_robber(&state, &state.board.robber_hex()),
            Err(Refusal::RobberAlreadyThere)
        );
        assert!(matches!(
            can_move_robber(&state, &HexCoord::new(5, 5)),
            Err(Refusal::UnknownHex(_))
        ));
        assert!(can_move_robber(&state, &other_hex(&state)).is_ok());
    }

    #[test]
    fn test_move_and_steal() {
        let (mut state, mut rng) = game();
        let hex = other_hex(&state);
        state
            .board
            .set_building(&hex.corners()[0], Building::settlement("bob"));
        state.player_mut("bob").unwrap().resources = ResourceHand::single(Resource::Ore, 2);

        assert_eq!(steal_candidates(&state, "alice", &hex), vec!["bob".to_string()]);
        let outcome = move_robber(&mut state, "alice", hex, Some("bob"), &mut rng).unwrap();
        assert_eq!(outcome.to, hex);
        assert_eq!(outcome.stolen, Some(("bob".to_string(), Resource::Ore)));
        assert_eq!(state.player("alice").unwrap().resources.ore, 1);
        assert_eq!(state.board.robber_hex(), hex);
    }

    #[test]
    fn test_ineligible_target_still_moves() {
        let (mut state, mut rng) = game();
        let hex = other_hex(&state);
        state.player_mut("carol").unwrap().resources = ResourceHand::single(Resource::Wool, 1);

        let outcome = move_robber(&mut state, "alice", hex, Some("carol"), &mut rng).unwrap();
        assert_eq!(outcome.stolen, None);
        assert_eq!(state.board.robber_hex(), hex);
        assert_eq!(state.player("carol").unwrap().resources.wool, 1);
    }

    #[test]
    fn test_cannot_rob_self_or_empty_hand() {
        let (mut state, _) = game();
        let hex = other_hex(&state);
        state
            .board
            .set_building(&hex.corners()[0], Building::settlement("alice"));
        state
            .board
            .set_building(&hex.corners()[3], Building::settlement("bob"));
        state.player_mut("alice").unwrap().resources = ResourceHand::single(Resource::Ore, 1);

        assert!(!can_steal_from(&state, "alice", "alice", &hex));
        assert!(!can_steal_from(&state, "alice", "bob", &hex));
        assert!(steal_candidates(&state, "alice", &hex).is_empty());
    }

    #[test]
    fn test_seven_discards() {
        let (mut state, _) = game();
        state.player_mut("alice").unwrap().resources = ResourceHand::with_amounts(2, 2, 2, 2, 1);
        state.player_mut("bob").unwrap().resources = ResourceHand::with_amounts(7, 0, 0, 0, 0);

        let pending = begin_seven(&mut state);
        assert_eq!(pending.owed_by("alice"), Some(4));
        assert_eq!(pending.owed_by("bob"), None);

        assert_eq!(
            discard(&mut state, "bob", &ResourceHand::single(Resource::Wood, 3)),
            Err(GameError::NoDiscardOwed)
        );
        assert!(discard(&mut state, "alice", &ResourceHand::with_amounts(1, 1, 1, 0, 0)).is_err());
        assert_eq!(
            discard(&mut state, "alice", &ResourceHand::with_amounts(2, 2, 0, 0, 0)),
            Ok(4)
        );
        assert_eq!(state.player("alice").unwrap().resource_count(), 5);
        assert!(!state.pending_robber.as_ref().unwrap().discards_outstanding());
    }
}

//! Placement rules for roads, settlements and cities.
//!
//! Each `can_build_*` query answers with `Ok(())` or the first rule the
//! placement breaks. The `build_*` mutators re-run their query before touching
//! the state, so a caller that skips validation still cannot corrupt the board.
//!
//! During the two setup rounds building is free, settlements need no road,
//! and the setup road must touch the settlement placed just before it.

use crate::board::{Building, BuildingKind};
use crate::error::{GameError, Refusal};
use crate::game::GameState;
use crate::hex::{EdgeId, IntersectionId};
use crate::player::costs;

/// Whether the resource cost applies to a placement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cost {
    Paid,
    /// Road building card
    Free,
}

impl Cost {
    fn applies(self, state: &GameState) -> bool {
        self == Cost::Paid && !state.phase.is_setup()
    }
}

// ==================== Validation ====================

pub fn can_build_road(
    state: &GameState,
    player: &str,
    edge: &EdgeId,
    cost: Cost,
) -> Result<(), Refusal> {
    let site = state
        .board
        .edge(edge)
        .ok_or_else(|| Refusal::UnknownEdge(edge.to_string()))?;
    if site.road.is_some() {
        return Err(Refusal::Occupied);
    }

    let owner = state.player(player).map_err(|_| Refusal::NotYourTurn)?;
    if owner.buildings.roads.len() >= state.config.max_roads {
        return Err(Refusal::NoPiecesRemaining);
    }

    let connected = if state.phase.is_setup() {
        match &state.setup_anchor {
            Some(anchor) => site.endpoints.contains(anchor),
            None => false,
        }
    } else {
        site.endpoints.iter().any(|end| {
            state.board.building_owner(end) == Some(player)
                || touches_own_road(state, player, end, edge)
        })
    };
    if !connected {
        return Err(Refusal::NotConnected);
    }

    if cost.applies(state) && !owner.resources.has_resources(&costs::road()) {
        return Err(Refusal::InsufficientResources);
    }
    Ok(())
}

pub fn can_build_settlement(
    state: &GameState,
    player: &str,
    intersection: &IntersectionId,
) -> Result<(), Refusal> {
    let site = state
        .board
        .intersection(intersection)
        .ok_or_else(|| Refusal::UnknownIntersection(intersection.to_string()))?;
    if site.building.is_some() {
        return Err(Refusal::Occupied);
    }
    if state
        .board
        .neighbors_of(intersection)
        .into_iter()
        .any(|n| state.board.building_owner(n).is_some())
    {
        return Err(Refusal::DistanceRule);
    }

    if !state.phase.is_setup()
        && !site
            .edges
            .iter()
            .any(|edge| state.board.road_owner(edge) == Some(player))
    {
        return Err(Refusal::NotConnected);
    }

    let owner = state.player(player).map_err(|_| Refusal::NotYourTurn)?;
    if owner.buildings.settlements.len() >= state.config.max_settlements {
        return Err(Refusal::NoPiecesRemaining);
    }
    if Cost::Paid.applies(state) && !owner.resources.has_resources(&costs::settlement()) {
        return Err(Refusal::InsufficientResources);
    }
    Ok(())
}

pub fn can_build_city(
    state: &GameState,
    player: &str,
    intersection: &IntersectionId,
) -> Result<(), Refusal> {
    let site = state
        .board
        .intersection(intersection)
        .ok_or_else(|| Refusal::UnknownIntersection(intersection.to_string()))?;
    match &site.building {
        Some(b) if b.kind == BuildingKind::Settlement && b.owner == player => {}
        _ => return Err(Refusal::NotOwnSettlement),
    }

    let owner = state.player(player).map_err(|_| Refusal::NotYourTurn)?;
    if owner.buildings.cities.len() >= state.config.max_cities {
        return Err(Refusal::NoPiecesRemaining);
    }
    if !owner.resources.has_resources(&costs::city()) {
        return Err(Refusal::InsufficientResources);
    }
    Ok(())
}

fn touches_own_road(state: &GameState, player: &str, at: &IntersectionId, except: &EdgeId) -> bool {
    state.board.intersection(at).is_some_and(|i| {
        i.edges
            .iter()
            .any(|e| e != except && state.board.road_owner(e) == Some(player))
    })
}

// ==================== Mutation ====================

pub fn build_road(
    state: &mut GameState,
    player: &str,
    edge: &EdgeId,
    cost: Cost,
) -> Result<(), GameError> {
    can_build_road(state, player, edge, cost)?;
    let paid = cost.applies(state);

    state.board.set_road(edge, player);
    let owner = state.player_mut(player)?;
    if paid {
        owner.resources.subtract(&costs::road());
    }
    owner.buildings.roads.push(edge.clone());
    Ok(())
}

pub fn build_settlement(
    state: &mut GameState,
    player: &str,
    intersection: &IntersectionId,
) -> Result<(), GameError> {
    can_build_settlement(state, player, intersection)?;
    let paid = Cost::Paid.applies(state);

    state
        .board
        .set_building(intersection, Building::settlement(player));
    let owner = state.player_mut(player)?;
    if paid {
        owner.resources.subtract(&costs::settlement());
    }
    owner.buildings.settlements.push(intersection.clone());
    Ok(())
}

/// Replace a settlement with a city; the settlement piece goes back to the supply
pub fn build_city(
    state: &mut GameState,
    player: &str,
    intersection: &IntersectionId,
) -> Result<(), GameError> {
    can_build_city(state, player, intersection)?;

    state.board.set_building(intersection, Building::city(player));
    let owner = state.player_mut(player)?;
    owner.resources.subtract(&costs::city());
    owner.buildings.settlements.retain(|id| id != intersection);
    owner.buildings.cities.push(intersection.clone());
    Ok(())
}

// ==================== Legal sites ====================

/// Every edge where `player` could build a road right now
pub fn legal_road_sites(state: &GameState, player: &str, cost: Cost) -> Vec<EdgeId> {
    state
        .board
        .edges()
        .filter(|e| can_build_road(state, player, &e.id, cost).is_ok())
        .map(|e| e.id.clone())
        .collect()
}

/// Every intersection where `player` could build a settlement right now
pub fn legal_settlement_sites(state: &GameState, player: &str) -> Vec<IntersectionId> {
    state
        .board
        .intersections()
        .filter(|i| can_build_settlement(state, player, &i.id).is_ok())
        .map(|i| i.id.clone())
        .collect()
}

/// Every settlement `player` could upgrade right now
pub fn legal_city_sites(state: &GameState, player: &str) -> Vec<IntersectionId> {
    state.player(player).map_or_else(
        |_| Vec::new(),
        |p| {
            p.buildings
                .settlements
                .iter()
                .filter(|id| can_build_city(state, player, id).is_ok())
                .cloned()
                .collect()
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{create_new_game, GamePhase};
    use crate::player::ResourceHand;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn game_in_action_phase() -> GameState {
        let mut rng = StdRng::seed_from_u64(11);
        let mut state = create_new_game(&["alice", "bob"], &mut rng).unwrap();
        state.phase = GamePhase::Action;
        state.dice_roll = Some((3, 4));
        state
    }

    fn inland_site(state: &GameState) -> IntersectionId {
        state
            .board
            .intersections()
            .find(|i| i.hexes.len() == 3)
            .map(|i| i.id.clone())
            .unwrap()
    }

    fn rich() -> ResourceHand {
        ResourceHand::with_amounts(10, 10, 10, 10, 10)
    }

    #[test]
    fn test_setup_settlement_is_free() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut state = create_new_game(&["alice", "bob"], &mut rng).unwrap();
        let site = inland_site(&state);

        build_settlement(&mut state, "alice", &site).unwrap();
        let alice = state.player("alice").unwrap();
        assert_eq!(alice.buildings.settlements, vec![site.clone()]);
        assert_eq!(alice.resource_count(), 0);
        assert_eq!(state.board.building_owner(&site), Some("alice"));
    }

    #[test]
    fn test_distance_rule() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut state = create_new_game(&["alice", "bob"], &mut rng).unwrap();
        let site = inland_site(&state);
        build_settlement(&mut state, "alice", &site).unwrap();

        for neighbor in state.board.neighbors_of(&site) {
            assert_eq!(
                can_build_settlement(&state, "bob", neighbor),
                Err(Refusal::DistanceRule),
                "settlement next to {site} should be rejected"
            );
        }
        assert_eq!(
            can_build_settlement(&state, "bob", &site),
            Err(Refusal::Occupied)
        );
    }

    #[test]
    fn test_setup_road_must_touch_anchor() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut state = create_new_game(&["alice", "bob"], &mut rng).unwrap();
        let site = inland_site(&state);
        build_settlement(&mut state, "alice", &site).unwrap();
        state.setup_anchor = Some(site.clone());

        let touching = state.board.intersection(&site).unwrap().edges[0].clone();
        let far = state
            .board
            .edges()
            .find(|e| !e.endpoints.contains(&site))
            .map(|e| e.id.clone())
            .unwrap();

        assert_eq!(
            can_build_road(&state, "alice", &far, Cost::Paid),
            Err(Refusal::NotConnected)
        );
        assert!(can_build_road(&state, "alice", &touching, Cost::Paid).is_ok());
    }

    #[test]
    fn test_road_needs_connection_and_resources() {
        let mut state = game_in_action_phase();
        let site = inland_site(&state);
        state.board.set_building(&site, Building::settlement("alice"));
        let edge = state.board.intersection(&site).unwrap().edges[0].clone();

        assert_eq!(
            can_build_road(&state, "alice", &edge, Cost::Paid),
            Err(Refusal::InsufficientResources)
        );
        assert!(can_build_road(&state, "alice", &edge, Cost::Free).is_ok());
        assert_eq!(
            can_build_road(&state, "bob", &edge, Cost::Free),
            Err(Refusal::NotConnected)
        );

        state.player_mut("alice").unwrap().resources = rich();
        build_road(&mut state, "alice", &edge, Cost::Paid).unwrap();
        let alice = state.player("alice").unwrap();
        assert_eq!(alice.resources.wood, 9);
        assert_eq!(alice.resources.brick, 9);
        assert_eq!(
            can_build_road(&state, "alice", &edge, Cost::Paid),
            Err(Refusal::Occupied)
        );
    }

    #[test]
    fn test_road_extends_from_road() {
        let mut state = game_in_action_phase();
        let site = inland_site(&state);
        state.board.set_building(&site, Building::settlement("alice"));
        state.player_mut("alice").unwrap().resources = rich();
        let first = state.board.intersection(&site).unwrap().edges[0].clone();
        build_road(&mut state, "alice", &first, Cost::Paid).unwrap();

        let far_end = state.board.edge(&first).unwrap().other_end(&site).clone();
        let next = state
            .board
            .intersection(&far_end)
            .unwrap()
            .edges
            .iter()
            .find(|e| **e != first)
            .cloned()
            .unwrap();
        assert!(can_build_road(&state, "alice", &next, Cost::Paid).is_ok());
    }

    #[test]
    fn test_settlement_needs_own_road_after_setup() {
        let mut state = game_in_action_phase();
        state.player_mut("alice").unwrap().resources = rich();
        let site = inland_site(&state);
        assert_eq!(
            can_build_settlement(&state, "alice", &site),
            Err(Refusal::NotConnected)
        );

        let edge = state.board.intersection(&site).unwrap().edges[0].clone();
        state.board.set_road(&edge, "alice");
        assert!(can_build_settlement(&state, "alice", &site).is_ok());

        build_settlement(&mut state, "alice", &site).unwrap();
        assert_eq!(
            state.player("alice").unwrap().resources,
            ResourceHand::with_amounts(9, 9, 9, 9, 10)
        );
    }

    #[test]
    fn test_city_only_over_own_settlement() {
        let mut state = game_in_action_phase();
        let site = inland_site(&state);
        state.player_mut("alice").unwrap().resources = rich();
        state.player_mut("bob").unwrap().resources = rich();

        assert_eq!(
            can_build_city(&state, "alice", &site),
            Err(Refusal::NotOwnSettlement)
        );

        state.board.set_building(&site, Building::settlement("alice"));
        state
            .player_mut("alice")
            .unwrap()
            .buildings
            .settlements
            .push(site.clone());
        assert_eq!(
            can_build_city(&state, "bob", &site),
            Err(Refusal::NotOwnSettlement)
        );
        assert_eq!(legal_city_sites(&state, "alice"), vec![site.clone()]);

        build_city(&mut state, "alice", &site).unwrap();
        let alice = state.player("alice").unwrap();
        assert!(alice.buildings.settlements.is_empty());
        assert_eq!(alice.buildings.cities, vec![site.clone()]);
        assert_eq!(alice.resources.ore, 7);
        assert_eq!(alice.resources.wheat, 8);
        assert_eq!(
            can_build_city(&state, "alice", &site),
            Err(Refusal::NotOwnSettlement)
        );
    }

    #[test]
    fn test_piece_limit() {
        let mut state = game_in_action_phase();
        state.config.max_roads = 1;
        let site = inland_site(&state);
        state.board.set_building(&site, Building::settlement("alice"));
        state.player_mut("alice").unwrap().resources = rich();
        let edges = state.board.intersection(&site).unwrap().edges.clone();

        build_road(&mut state, "alice", &edges[0], Cost::Paid).unwrap();
        assert_eq!(
            can_build_road(&state, "alice", &edges[1], Cost::Paid),
            Err(Refusal::NoPiecesRemaining)
        );
    }

    #[test]
    fn test_unknown_sites() {
        let state = game_in_action_phase();
        assert!(matches!(
            can_build_settlement(&state, "alice", &IntersectionId::from("99,99")),
            Err(Refusal::UnknownIntersection(_))
        ));
        assert!(matches!(
            can_build_road(&state, "alice", &EdgeId::from("nope"), Cost::Free),
            Err(Refusal::UnknownEdge(_))
        ));
    }

    #[test]
    fn test_legal_settlement_sites_respect_distance() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut state = create_new_game(&["alice", "bob"], &mut rng).unwrap();
        let all = legal_settlement_sites(&state, "alice").len();
        assert_eq!(all, 54);

        let site = inland_site(&state);
        build_settlement(&mut state, "alice", &site).unwrap();
        assert_eq!(legal_settlement_sites(&state, "bob").len(), all - 4);
    }
}

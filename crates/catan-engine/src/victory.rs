//! Victory points, the two bonus cards, and the win check.
//!
//! Points are never accumulated: they are derived from the building ledger,
//! the bonus flags and revealed cards, then copied into `Player::victory_points`
//! after every action.

use crate::actions::GameEvent;
use crate::board::Board;
use crate::game::GameState;
use crate::hex::{EdgeId, IntersectionId};
use crate::player::Player;
use std::collections::HashSet;
use tracing::info;

/// Points for holding Longest Road or Largest Army
const BONUS_POINTS: u32 = 2;

/// Derived victory point total
pub fn victory_points(player: &Player) -> u32 {
    let mut vp = player.buildings.settlements.len() as u32;
    vp += 2 * player.buildings.cities.len() as u32;
    if player.has_longest_road {
        vp += BONUS_POINTS;
    }
    if player.has_largest_army {
        vp += BONUS_POINTS;
    }
    vp + player.revealed_victory_points
}

/// Length in edges of the longest simple path through `player`'s roads.
///
/// A path may pass through empty intersections and the player's own buildings;
/// an opponent's building ends it.
pub fn longest_road(board: &Board, player: &str) -> u32 {
    let mut on_path: HashSet<EdgeId> = HashSet::new();
    let mut best = 0;

    for road in board.roads_of(player) {
        for start in &road.endpoints {
            on_path.insert(road.id.clone());
            let length = 1 + extend_path(board, player, road.other_end(start), &mut on_path);
            on_path.remove(&road.id);
            best = best.max(length);
        }
    }
    best
}

fn extend_path(
    board: &Board,
    player: &str,
    at: &IntersectionId,
    on_path: &mut HashSet<EdgeId>,
) -> u32 {
    if board
        .building_owner(at)
        .is_some_and(|owner| owner != player)
    {
        return 0;
    }
    let Some(intersection) = board.intersection(at) else {
        return 0;
    };

    let mut best = 0;
    for edge_id in &intersection.edges {
        if on_path.contains(edge_id) {
            continue;
        }
        let Some(edge) = board.edge(edge_id).filter(|e| e.owner() == Some(player)) else {
            continue;
        };
        on_path.insert(edge_id.clone());
        best = best.max(1 + extend_path(board, player, edge.other_end(at), on_path));
        on_path.remove(edge_id);
    }
    best
}

/// Who holds a bonus after scores change.
///
/// Only the strict leader can take the bonus; a tie leaves it with the
/// incumbent if the incumbent is among the leaders, and with nobody otherwise.
pub fn award(incumbent: Option<usize>, scores: &[u32], minimum: u32) -> Option<usize> {
    let top = scores.iter().copied().max().filter(|&top| top >= minimum)?;
    let leaders: Vec<usize> = scores
        .iter()
        .enumerate()
        .filter(|&(_, &score)| score == top)
        .map(|(seat, _)| seat)
        .collect();

    match (incumbent, leaders.as_slice()) {
        (Some(holder), _) if leaders.contains(&holder) => Some(holder),
        (_, [only]) => Some(*only),
        _ => None,
    }
}

/// Recompute the Longest Road holder
pub fn update_longest_road(state: &mut GameState) -> Option<GameEvent> {
    let lengths: Vec<u32> = state
        .players
        .iter()
        .map(|p| longest_road(&state.board, &p.id))
        .collect();
    let incumbent = state.players.iter().position(|p| p.has_longest_road);
    let holder = award(incumbent, &lengths, state.config.longest_road_minimum);
    if holder == incumbent {
        return None;
    }

    for (seat, player) in state.players.iter_mut().enumerate() {
        player.has_longest_road = Some(seat) == holder;
    }
    let event = GameEvent::LongestRoadChanged {
        previous: incumbent.map(|seat| state.players[seat].id.clone()),
        current: holder.map(|seat| state.players[seat].id.clone()),
        length: holder.map_or(0, |seat| lengths[seat]),
    };
    info!(?event, "longest road changed hands");
    Some(event)
}

/// Recompute the Largest Army holder
pub fn update_largest_army(state: &mut GameState) -> Option<GameEvent> {
    let knights: Vec<u32> = state.players.iter().map(|p| p.knights_played).collect();
    let incumbent = state.players.iter().position(|p| p.has_largest_army);
    let holder = award(incumbent, &knights, state.config.largest_army_minimum);
    if holder == incumbent {
        return None;
    }

    for (seat, player) in state.players.iter_mut().enumerate() {
        player.has_largest_army = Some(seat) == holder;
    }
    let event = GameEvent::LargestArmyChanged {
        previous: incumbent.map(|seat| state.players[seat].id.clone()),
        current: holder.map(|seat| state.players[seat].id.clone()),
        knights: holder.map_or(0, |seat| knights[seat]),
    };
    info!(?event, "largest army changed hands");
    Some(event)
}

/// Copy the derived total into every player's stored points
pub fn sync_victory_points(state: &mut GameState) {
    for player in &mut state.players {
        player.victory_points = victory_points(player);
    }
}

/// Re-derive both bonuses and every player's points
pub fn refresh(state: &mut GameState) -> Vec<GameEvent> {
    let events = [update_longest_road(state), update_largest_army(state)]
        .into_iter()
        .flatten()
        .collect();
    sync_victory_points(state);
    events
}

/// First player at or over the target, checking the acting seat first
pub fn check_winner(state: &GameState, acting_seat: usize) -> Option<&Player> {
    let count = state.players.len();
    (0..count)
        .map(|offset| &state.players[(acting_seat + offset) % count])
        .find(|p| victory_points(p) >= state.config.victory_points_to_win)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Building;
    use crate::game::create_new_game;
    use crate::hex::{EdgeDirection, HexCoord};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn game() -> GameState {
        let mut rng = StdRng::seed_from_u64(51);
        create_new_game(&["alice", "bob"], &mut rng).unwrap()
    }

    /// The first `n` edges of the zigzag along the top of the middle row,
    /// with the `n + 1` intersections they pass through.
    fn ridge(n: usize) -> (Vec<EdgeId>, Vec<IntersectionId>) {
        let mut edges = Vec::new();
        let mut nodes = vec![HexCoord::new(-2, 0).corners()[2].clone()];
        for q in -2..=2 {
            let hex = HexCoord::new(q, 0);
            let corners = hex.corners();
            edges.push(hex.side(EdgeDirection::NorthWest));
            nodes.push(corners[1].clone());
            edges.push(hex.side(EdgeDirection::NorthEast));
            nodes.push(corners[0].clone());
        }
        edges.truncate(n);
        nodes.truncate(n + 1);
        (edges, nodes)
    }

    #[test]
    fn test_points_from_ledger_and_bonuses() {
        let mut player = Player::new("alice", 0);
        assert_eq!(victory_points(&player), 0);

        player.buildings.settlements.push(IntersectionId::from("2,-1"));
        player.buildings.cities.push(IntersectionId::from("1,1"));
        assert_eq!(victory_points(&player), 3);

        player.has_longest_road = true;
        player.has_largest_army = true;
        player.revealed_victory_points = 1;
        assert_eq!(victory_points(&player), 8);
    }

    #[test]
    fn test_longest_road_simple_path() {
        let mut state = game();
        let (edges, _) = ridge(5);
        for edge in &edges {
            state.board.set_road(edge, "alice");
        }
        assert_eq!(longest_road(&state.board, "alice"), 5);
        assert_eq!(longest_road(&state.board, "bob"), 0);
    }

    #[test]
    fn test_opponent_building_breaks_road() {
        let mut state = game();
        let (edges, nodes) = ridge(5);
        for edge in &edges {
            state.board.set_road(edge, "alice");
        }
        state.board.set_building(&nodes[2], Building::settlement("bob"));
        assert_eq!(longest_road(&state.board, "alice"), 3);

        state.board.set_building(&nodes[2], Building::settlement("alice"));
        assert_eq!(longest_road(&state.board, "alice"), 5);
    }

    #[test]
    fn test_branching_network_explores_every_branch() {
        let mut state = game();
        let (edges, nodes) = ridge(4);
        for edge in &edges {
            state.board.set_road(edge, "alice");
        }
        // A spur off an inner node; the longest path still runs end to end.
        let spur = state
            .board
            .intersection(&nodes[3])
            .unwrap()
            .edges
            .iter()
            .find(|e| !edges.contains(e))
            .cloned()
            .unwrap();
        state.board.set_road(&spur, "alice");
        assert_eq!(longest_road(&state.board, "alice"), 4);
    }

    #[test]
    fn test_cycle_counts_every_edge_once() {
        let mut state = game();
        for side in HexCoord::new(0, 0).sides() {
            state.board.set_road(&side, "alice");
        }
        assert_eq!(longest_road(&state.board, "alice"), 6);
    }

    #[test]
    fn test_award_rules() {
        // Nobody qualifies
        assert_eq!(award(None, &[4, 2], 5), None);
        // First to qualify claims
        assert_eq!(award(None, &[5, 2], 5), Some(0));
        // Strictly longer takes from incumbent
        assert_eq!(award(Some(0), &[5, 6], 5), Some(1));
        // Tie keeps incumbent
        assert_eq!(award(Some(0), &[6, 6], 5), Some(0));
        // Tie without a new strict leader never claims
        assert_eq!(award(None, &[5, 5], 5), None);
        // Incumbent dropped below a tie it isn't part of
        assert_eq!(award(Some(0), &[3, 6, 6], 5), None);
        // Incumbent dropped below the minimum
        assert_eq!(award(Some(0), &[4, 1], 5), None);
    }

    #[test]
    fn test_update_largest_army() {
        let mut state = game();
        state.players[0].knights_played = 3;
        let event = update_largest_army(&mut state);
        assert!(matches!(
            event,
            Some(GameEvent::LargestArmyChanged { knights: 3, .. })
        ));
        assert!(state.players[0].has_largest_army);

        state.players[1].knights_played = 3;
        assert_eq!(update_largest_army(&mut state), None);

        state.players[1].knights_played = 4;
        assert!(update_largest_army(&mut state).is_some());
        assert!(!state.players[0].has_largest_army);
        assert!(state.players[1].has_largest_army);
    }

    #[test]
    fn test_refresh_syncs_points() {
        let mut state = game();
        state.players[0]
            .buildings
            .settlements
            .push(IntersectionId::from("2,-1"));
        state.players[0].knights_played = 3;

        let events = refresh(&mut state);
        assert_eq!(events.len(), 1);
        assert_eq!(state.players[0].victory_points, 3);
        assert_eq!(state.players[1].victory_points, 0);
    }

    #[test]
    fn test_check_winner_prefers_acting_seat() {
        let mut state = game();
        state.players[0].revealed_victory_points = 10;
        state.players[1].revealed_victory_points = 10;
        assert_eq!(check_winner(&state, 1).map(|p| p.id.as_str()), Some("bob"));
        assert_eq!(check_winner(&state, 0).map(|p| p.id.as_str()), Some("alice"));

        state.players[0].revealed_victory_points = 9;
        state.players[1].revealed_victory_points = 0;
        assert!(check_winner(&state, 0).is_none());
    }
}

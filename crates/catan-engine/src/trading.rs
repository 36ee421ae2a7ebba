//! Bank, port and player-to-player trades.

use crate::actions::TradeOffer;
use crate::board::{PortKind, Resource};
use crate::error::{GameError, Refusal};
use crate::game::GameState;

/// Units of `offered` the bank wants per unit requested, given the player's ports
pub fn bank_ratio(state: &GameState, player: &str, offered: Resource) -> u32 {
    state
        .board
        .ports_of(player)
        .into_iter()
        .filter(|port| match port.kind {
            PortKind::Generic => true,
            PortKind::Specific(resource) => resource == offered,
        })
        .map(|port| port.ratio)
        .fold(4, u32::min)
}

/// Exactly one kind given and one kind received, in the port or bank ratio
pub fn can_trade_with_bank(
    state: &GameState,
    player: &str,
    offer: &TradeOffer,
) -> Result<(), Refusal> {
    if offer.counterpart.is_some() {
        return Err(Refusal::InvalidTrade("bank trades have no counterpart".into()));
    }
    let given_kinds = offer.offering.kinds();
    let received_kinds = offer.requesting.kinds();
    let (given, received) = match (given_kinds.as_slice(), received_kinds.as_slice()) {
        ([given], [received]) => (*given, *received),
        _ => {
            return Err(Refusal::InvalidTrade(
                "offer exactly one resource kind for exactly one other".into(),
            ))
        }
    };
    if given == received {
        return Err(Refusal::InvalidTrade("cannot trade a resource for itself".into()));
    }

    let trader = state.player(player).map_err(|_| Refusal::NotYourTurn)?;
    if !trader.resources.has_resources(&offer.offering) {
        return Err(Refusal::InsufficientResources);
    }

    let ratio = bank_ratio(state, player, given);
    let wanted = offer.requesting.get(received);
    let offered = offer.offering.get(given);
    if offered < ratio * wanted {
        return Err(Refusal::InvalidTrade(format!(
            "{ratio}:1 needs {} {given:?}, offered {offered}",
            ratio * wanted
        )));
    }
    Ok(())
}

/// Both sides non-empty and both players able to hand over their part
pub fn can_trade_with_player(
    state: &GameState,
    player: &str,
    offer: &TradeOffer,
) -> Result<(), Refusal> {
    let Some(counterpart) = offer.counterpart.as_deref() else {
        return Err(Refusal::InvalidTrade("no counterpart named".into()));
    };
    if counterpart == player {
        return Err(Refusal::InvalidTrade("cannot trade with yourself".into()));
    }
    if offer.offering.is_empty() || offer.requesting.is_empty() {
        return Err(Refusal::InvalidTrade("both sides must give something".into()));
    }

    let trader = state.player(player).map_err(|_| Refusal::NotYourTurn)?;
    if !trader.resources.has_resources(&offer.offering) {
        return Err(Refusal::InsufficientResources);
    }
    let other = state
        .player(counterpart)
        .map_err(|_| Refusal::InvalidTrade(format!("unknown player {counterpart}")))?;
    if !other.resources.has_resources(&offer.requesting) {
        return Err(Refusal::InvalidTrade(format!(
            "{counterpart} does not hold the requested resources"
        )));
    }
    Ok(())
}

/// Swap the two hands of a validated offer
pub fn execute_trade(state: &mut GameState, player: &str, offer: &TradeOffer) -> Result<(), GameError> {
    match offer.counterpart.as_deref() {
        None => can_trade_with_bank(state, player, offer)?,
        Some(_) => can_trade_with_player(state, player, offer)?,
    }

    let trader = state.player_mut(player)?;
    trader.resources.subtract(&offer.offering);
    trader.resources.add_hand(&offer.requesting);

    if let Some(counterpart) = offer.counterpart.as_deref() {
        let other = state.player_mut(counterpart)?;
        other.resources.subtract(&offer.requesting);
        other.resources.add_hand(&offer.offering);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Building;
    use crate::game::create_new_game;
    use crate::hex::IntersectionId;
    use crate::player::ResourceHand;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn game() -> GameState {
        let mut rng = StdRng::seed_from_u64(21);
        create_new_game(&["alice", "bob"], &mut rng).unwrap()
    }

    fn port_site(state: &GameState, kind: PortKind) -> IntersectionId {
        state
            .board
            .intersections()
            .find(|i| i.port.map(|p| p.kind) == Some(kind))
            .map(|i| i.id.clone())
            .unwrap()
    }

    fn wood_for_brick(wood: u32) -> TradeOffer {
        TradeOffer::with_bank(
            ResourceHand::single(Resource::Wood, wood),
            ResourceHand::single(Resource::Brick, 1),
        )
    }

    #[test]
    fn test_default_ratio_is_four() {
        let mut state = game();
        state.player_mut("alice").unwrap().resources = ResourceHand::single(Resource::Wood, 4);

        assert_eq!(bank_ratio(&state, "alice", Resource::Wood), 4);
        assert!(can_trade_with_bank(&state, "alice", &wood_for_brick(3)).is_err());
        assert!(can_trade_with_bank(&state, "alice", &wood_for_brick(4)).is_ok());
    }

    #[test]
    fn test_generic_port_ratio() {
        let mut state = game();
        let site = port_site(&state, PortKind::Generic);
        state.board.set_building(&site, Building::settlement("alice"));
        state.player_mut("alice").unwrap().resources = ResourceHand::single(Resource::Wood, 3);

        assert_eq!(bank_ratio(&state, "alice", Resource::Wood), 3);
        assert!(can_trade_with_bank(&state, "alice", &wood_for_brick(3)).is_ok());
        assert!(can_trade_with_bank(&state, "alice", &wood_for_brick(2)).is_err());
    }

    #[test]
    fn test_specific_port_ratio() {
        let mut state = game();
        let site = port_site(&state, PortKind::Specific(Resource::Wood));
        state.board.set_building(&site, Building::settlement("alice"));
        state.player_mut("alice").unwrap().resources = ResourceHand::single(Resource::Wood, 2);

        assert_eq!(bank_ratio(&state, "alice", Resource::Wood), 2);
        assert_eq!(bank_ratio(&state, "alice", Resource::Ore), 4);
        assert!(can_trade_with_bank(&state, "alice", &wood_for_brick(2)).is_ok());
        assert!(can_trade_with_bank(&state, "alice", &wood_for_brick(1)).is_err());
    }

    #[test]
    fn test_bank_trade_shape() {
        let mut state = game();
        state.player_mut("alice").unwrap().resources = ResourceHand::with_amounts(8, 4, 0, 0, 0);

        let two_kinds = TradeOffer::with_bank(
            ResourceHand::with_amounts(4, 4, 0, 0, 0),
            ResourceHand::single(Resource::Ore, 1),
        );
        assert!(matches!(
            can_trade_with_bank(&state, "alice", &two_kinds),
            Err(Refusal::InvalidTrade(_))
        ));

        let same_kind = TradeOffer::with_bank(
            ResourceHand::single(Resource::Wood, 4),
            ResourceHand::single(Resource::Wood, 1),
        );
        assert!(can_trade_with_bank(&state, "alice", &same_kind).is_err());

        let two_for_eight = TradeOffer::with_bank(
            ResourceHand::single(Resource::Wood, 8),
            ResourceHand::single(Resource::Ore, 2),
        );
        assert!(can_trade_with_bank(&state, "alice", &two_for_eight).is_ok());
    }

    #[test]
    fn test_bank_trade_needs_the_cards() {
        let state = game();
        assert_eq!(
            can_trade_with_bank(&state, "alice", &wood_for_brick(4)),
            Err(Refusal::InsufficientResources)
        );
    }

    #[test]
    fn test_execute_bank_trade() {
        let mut state = game();
        state.player_mut("alice").unwrap().resources = ResourceHand::single(Resource::Wood, 5);
        execute_trade(&mut state, "alice", &wood_for_brick(4)).unwrap();
        assert_eq!(
            state.player("alice").unwrap().resources,
            ResourceHand::with_amounts(1, 1, 0, 0, 0)
        );
    }

    #[test]
    fn test_execute_player_trade() {
        let mut state = game();
        state.player_mut("alice").unwrap().resources = ResourceHand::single(Resource::Ore, 2);
        state.player_mut("bob").unwrap().resources = ResourceHand::single(Resource::Wheat, 1);
        let offer = TradeOffer::with_player(
            "bob",
            ResourceHand::single(Resource::Ore, 2),
            ResourceHand::single(Resource::Wheat, 1),
        );

        execute_trade(&mut state, "alice", &offer).unwrap();
        assert_eq!(
            state.player("alice").unwrap().resources,
            ResourceHand::single(Resource::Wheat, 1)
        );
        assert_eq!(
            state.player("bob").unwrap().resources,
            ResourceHand::single(Resource::Ore, 2)
        );
    }

    #[test]
    fn test_player_trade_needs_counterpart_cards() {
        let mut state = game();
        state.player_mut("alice").unwrap().resources = ResourceHand::single(Resource::Ore, 1);
        let offer = TradeOffer::with_player(
            "bob",
            ResourceHand::single(Resource::Ore, 1),
            ResourceHand::single(Resource::Wheat, 1),
        );
        assert!(matches!(
            can_trade_with_player(&state, "alice", &offer),
            Err(Refusal::InvalidTrade(_))
        ));
        assert!(execute_trade(&mut state, "alice", &offer).is_err());
        assert_eq!(state.player("alice").unwrap().resources.ore, 1);
    }

    #[test]
    fn test_cannot_trade_with_self() {
        let mut state = game();
        state.player_mut("alice").unwrap().resources = ResourceHand::single(Resource::Ore, 1);
        let offer = TradeOffer::with_player(
            "alice",
            ResourceHand::single(Resource::Ore, 1),
            ResourceHand::single(Resource::Wheat, 1),
        );
        assert!(can_trade_with_player(&state, "alice", &offer).is_err());
    }
}

//! Game actions that players can take.
//!
//! This module defines all possible actions in the game and the events
//! that result from those actions. Every action kind is its own variant
//! carrying exactly the fields it needs.

use crate::board::{PlayerId, Resource};
use crate::hex::{EdgeId, HexCoord, IntersectionId};
use crate::player::{DevCardKind, ResourceHand};
use serde::{Deserialize, Serialize};

/// A requested transition: who is acting and what they want to do
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub player: PlayerId,
    pub action: GameAction,
}

impl Action {
    pub fn new(player: impl Into<PlayerId>, action: GameAction) -> Self {
        Self {
            player: player.into(),
            action,
        }
    }

    pub fn kind(&self) -> ActionKind {
        self.action.kind()
    }
}

/// All possible actions a player can take
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameAction {
    /// Build a road on an edge (free during setup)
    BuildRoad { edge: EdgeId },
    /// Build a settlement on an intersection (free during setup)
    BuildSettlement { intersection: IntersectionId },
    /// Upgrade own settlement to a city
    BuildCity { intersection: IntersectionId },
    /// Buy a development card from the deck
    BuyDevelopmentCard,
    /// Play a development card
    PlayDevelopmentCard { card: DevCardPlay },
    /// Trade with the bank (4:1) or through a port (3:1 or 2:1)
    TradeWithBank { offer: TradeOffer },
    /// Trade with another player who has agreed to it
    TradeWithPlayer { offer: TradeOffer },
    /// Move the robber after a seven, optionally robbing a neighbor
    MoveRobber {
        hex: HexCoord,
        target: Option<PlayerId>,
    },
    /// Discard half the hand after a seven
    DiscardResources { resources: ResourceHand },
    /// Roll the dice (must be done once per turn)
    RollDice,
    /// End your turn
    EndTurn,
}

impl GameAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            GameAction::BuildRoad { .. } => ActionKind::BuildRoad,
            GameAction::BuildSettlement { .. } => ActionKind::BuildSettlement,
            GameAction::BuildCity { .. } => ActionKind::BuildCity,
            GameAction::BuyDevelopmentCard => ActionKind::BuyDevelopmentCard,
            GameAction::PlayDevelopmentCard { .. } => ActionKind::PlayDevelopmentCard,
            GameAction::TradeWithBank { .. } => ActionKind::TradeWithBank,
            GameAction::TradeWithPlayer { .. } => ActionKind::TradeWithPlayer,
            GameAction::MoveRobber { .. } => ActionKind::MoveRobber,
            GameAction::DiscardResources { .. } => ActionKind::DiscardResources,
            GameAction::RollDice => ActionKind::RollDice,
            GameAction::EndTurn => ActionKind::EndTurn,
        }
    }
}

/// Payload-free action discriminant, as reported by `get_valid_actions`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    BuildRoad,
    BuildSettlement,
    BuildCity,
    BuyDevelopmentCard,
    PlayDevelopmentCard,
    TradeWithBank,
    TradeWithPlayer,
    MoveRobber,
    DiscardResources,
    RollDice,
    EndTurn,
}

/// A development card play with its card-specific choices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "card", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DevCardPlay {
    /// Move the robber, optionally robbing a neighbor of the new hex
    Knight {
        hex: HexCoord,
        target: Option<PlayerId>,
    },
    /// Up to two free roads, placed in order
    RoadBuilding { edges: Vec<EdgeId> },
    /// Two resources from the bank
    Invention { resources: [Resource; 2] },
    /// Every opponent hands over all of one resource
    Monopoly { resource: Resource },
    /// Reveal a victory point
    VictoryPoint,
}

impl DevCardPlay {
    pub fn card_kind(&self) -> DevCardKind {
        match self {
            DevCardPlay::Knight { .. } => DevCardKind::Knight,
            DevCardPlay::RoadBuilding { .. } => DevCardKind::RoadBuilding,
            DevCardPlay::Invention { .. } => DevCardKind::Invention,
            DevCardPlay::Monopoly { .. } => DevCardKind::Monopoly,
            DevCardPlay::VictoryPoint => DevCardKind::VictoryPoint,
        }
    }
}

/// A trade offer. The acting player is the initiator; no counterpart means the bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeOffer {
    /// Resources being offered
    pub offering: ResourceHand,
    /// Resources being requested
    pub requesting: ResourceHand,
    /// Player on the other side, None for the bank
    pub counterpart: Option<PlayerId>,
}

impl TradeOffer {
    /// Offer to the bank
    pub fn with_bank(offering: ResourceHand, requesting: ResourceHand) -> Self {
        Self {
            offering,
            requesting,
            counterpart: None,
        }
    }

    /// Offer to another player
    pub fn with_player(
        counterpart: impl Into<PlayerId>,
        offering: ResourceHand,
        requesting: ResourceHand,
    ) -> Self {
        Self {
            offering,
            requesting,
            counterpart: Some(counterpart.into()),
        }
    }
}

/// Events that occur as a result of actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Dice were rolled
    DiceRolled {
        player: PlayerId,
        roll: (u8, u8),
        total: u8,
    },

    /// Resources were distributed after a dice roll or a second setup settlement
    ResourcesDistributed {
        distributions: Vec<(PlayerId, Resource, u32)>,
    },

    /// A seven was rolled and these players owe a discard
    DiscardsRequired { players: Vec<(PlayerId, u32)> },

    /// A settlement was built
    SettlementBuilt {
        player: PlayerId,
        location: IntersectionId,
    },

    /// A settlement was upgraded to a city
    CityBuilt {
        player: PlayerId,
        location: IntersectionId,
    },

    /// A road was built
    RoadBuilt { player: PlayerId, location: EdgeId },

    /// A development card was purchased
    DevelopmentCardPurchased { player: PlayerId },

    /// A development card was played
    DevelopmentCardPlayed { player: PlayerId, card: DevCardKind },

    /// Invention card was played
    InventionPlayed {
        player: PlayerId,
        resources: [Resource; 2],
    },

    /// Monopoly card was played
    MonopolyPlayed {
        player: PlayerId,
        resource: Resource,
        total_stolen: u32,
    },

    /// The robber was moved
    RobberMoved {
        player: PlayerId,
        from: HexCoord,
        to: HexCoord,
    },

    /// A resource was stolen
    ResourceStolen {
        thief: PlayerId,
        victim: PlayerId,
        resource: Resource,
    },

    /// Player discarded cards after a seven
    CardsDiscarded { player: PlayerId, count: u32 },

    /// A trade between two players was completed
    TradeCompleted {
        player1: PlayerId,
        player2: PlayerId,
    },

    /// A bank or port trade was completed
    BankTradeCompleted {
        player: PlayerId,
        gave: Resource,
        gave_count: u32,
        received: Resource,
        received_count: u32,
    },

    /// Longest road changed hands
    LongestRoadChanged {
        previous: Option<PlayerId>,
        current: Option<PlayerId>,
        length: u32,
    },

    /// Largest army changed hands
    LargestArmyChanged {
        previous: Option<PlayerId>,
        current: Option<PlayerId>,
        knights: u32,
    },

    /// Turn ended
    TurnEnded {
        player: PlayerId,
        next_player: PlayerId,
    },

    /// A player won the game
    GameWon {
        player: PlayerId,
        victory_points: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_kind_matches_variant() {
        let action = Action::new(
            "alice",
            GameAction::BuildSettlement {
                intersection: IntersectionId::from("2,-1"),
            },
        );
        assert_eq!(action.kind(), ActionKind::BuildSettlement);
        assert_eq!(GameAction::EndTurn.kind(), ActionKind::EndTurn);
    }

    #[test]
    fn test_card_play_kind() {
        let play = DevCardPlay::Monopoly {
            resource: Resource::Wood,
        };
        assert_eq!(play.card_kind(), DevCardKind::Monopoly);
        assert_eq!(DevCardPlay::VictoryPoint.card_kind(), DevCardKind::VictoryPoint);
    }

    #[test]
    fn test_action_json_shape() {
        let action = GameAction::MoveRobber {
            hex: HexCoord::new(1, -1),
            target: Some("bob".into()),
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "MOVE_ROBBER");
        assert_eq!(json["target"], "bob");

        let back: GameAction = serde_json::from_value(json).unwrap();
        assert_eq!(back, action);
    }

    #[test]
    fn test_trade_offer_constructors() {
        let bank = TradeOffer::with_bank(
            ResourceHand::single(Resource::Wood, 4),
            ResourceHand::single(Resource::Brick, 1),
        );
        assert!(bank.counterpart.is_none());

        let trade = TradeOffer::with_player("bob", ResourceHand::new(), ResourceHand::new());
        assert_eq!(trade.counterpart.as_deref(), Some("bob"));
    }
}

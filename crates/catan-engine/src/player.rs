//! Player state and resource management.
//!
//! This module contains:
//! - Player struct with resources, development cards, and achievements
//! - ResourceHand for managing resource counts
//! - DevCardHand counters and the development card kinds
//! - BuildingLedger of placed pieces
//! - Building costs

use crate::board::{PlayerId, Resource};
use crate::hex::{EdgeId, IntersectionId};
use serde::{Deserialize, Serialize};

/// Player color for UI rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerColor {
    Red,
    Blue,
    Orange,
    White,
}

impl PlayerColor {
    /// Get color for a seat index
    pub fn for_seat(seat: usize) -> Self {
        match seat % 4 {
            0 => PlayerColor::Red,
            1 => PlayerColor::Blue,
            2 => PlayerColor::Orange,
            _ => PlayerColor::White,
        }
    }

    /// Get hex color code for rendering
    pub fn hex_code(&self) -> u32 {
        match self {
            PlayerColor::Red => 0xE74C3C,
            PlayerColor::Blue => 0x3498DB,
            PlayerColor::Orange => 0xE67E22,
            PlayerColor::White => 0xECF0F1,
        }
    }
}

/// Development card kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DevCardKind {
    /// Move robber and steal, counts toward Largest Army
    Knight,
    /// Build 2 roads for free
    RoadBuilding,
    /// Take any 2 resources from the bank
    Invention,
    /// All players must give you all of one resource type
    Monopoly,
    /// Worth 1 VP once revealed
    VictoryPoint,
}

impl DevCardKind {
    pub const ALL: [DevCardKind; 5] = [
        DevCardKind::Knight,
        DevCardKind::RoadBuilding,
        DevCardKind::Invention,
        DevCardKind::Monopoly,
        DevCardKind::VictoryPoint,
    ];
}

/// A hand of resources
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHand {
    pub wood: u32,
    pub brick: u32,
    pub wool: u32,
    pub wheat: u32,
    pub ore: u32,
}

impl ResourceHand {
    /// Create an empty hand
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hand with specific amounts
    pub fn with_amounts(wood: u32, brick: u32, wool: u32, wheat: u32, ore: u32) -> Self {
        Self {
            wood,
            brick,
            wool,
            wheat,
            ore,
        }
    }

    /// Create a hand with a single resource
    pub fn single(resource: Resource, amount: u32) -> Self {
        let mut hand = Self::new();
        hand.add(resource, amount);
        hand
    }

    /// Total number of resource cards
    pub fn total(&self) -> u32 {
        self.wood + self.brick + self.wool + self.wheat + self.ore
    }

    /// Check if hand is empty
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Get count of a specific resource
    pub fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Wood => self.wood,
            Resource::Brick => self.brick,
            Resource::Wool => self.wool,
            Resource::Wheat => self.wheat,
            Resource::Ore => self.ore,
        }
    }

    fn slot(&mut self, resource: Resource) -> &mut u32 {
        match resource {
            Resource::Wood => &mut self.wood,
            Resource::Brick => &mut self.brick,
            Resource::Wool => &mut self.wool,
            Resource::Wheat => &mut self.wheat,
            Resource::Ore => &mut self.ore,
        }
    }

    /// Set count of a specific resource
    pub fn set(&mut self, resource: Resource, count: u32) {
        *self.slot(resource) = count;
    }

    /// Add resources to hand
    pub fn add(&mut self, resource: Resource, amount: u32) {
        *self.slot(resource) += amount;
    }

    /// Remove up to `amount`, stopping at zero
    pub fn remove(&mut self, resource: Resource, amount: u32) {
        let slot = self.slot(resource);
        *slot = slot.saturating_sub(amount);
    }

    /// Add another hand to this one
    pub fn add_hand(&mut self, other: &ResourceHand) {
        for resource in Resource::ALL {
            self.add(resource, other.get(resource));
        }
    }

    /// Subtract another hand, clamping each counter at zero.
    ///
    /// Callers check [`has_resources`](Self::has_resources) first.
    pub fn subtract(&mut self, cost: &ResourceHand) {
        for resource in Resource::ALL {
            self.remove(resource, cost.get(resource));
        }
    }

    /// Check if this hand covers `cost`
    pub fn has_resources(&self, cost: &ResourceHand) -> bool {
        Resource::ALL
            .iter()
            .all(|&resource| self.get(resource) >= cost.get(resource))
    }

    /// Resource kinds with a nonzero count, in `Resource::ALL` order
    pub fn kinds(&self) -> Vec<Resource> {
        Resource::ALL
            .into_iter()
            .filter(|&resource| self.get(resource) > 0)
            .collect()
    }

    /// One entry per unit held, so a kind with count 3 appears 3 times
    pub fn cards(&self) -> Vec<Resource> {
        Resource::ALL
            .into_iter()
            .flat_map(|resource| std::iter::repeat(resource).take(self.get(resource) as usize))
            .collect()
    }
}

impl FromIterator<(Resource, u32)> for ResourceHand {
    fn from_iter<I: IntoIterator<Item = (Resource, u32)>>(iter: I) -> Self {
        let mut hand = Self::new();
        for (resource, amount) in iter {
            hand.add(resource, amount);
        }
        hand
    }
}

/// Unplayed development cards, one counter per kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevCardHand {
    pub knight: u32,
    pub road_building: u32,
    pub invention: u32,
    pub monopoly: u32,
    pub victory_point: u32,
}

impl DevCardHand {
    pub fn get(&self, kind: DevCardKind) -> u32 {
        match kind {
            DevCardKind::Knight => self.knight,
            DevCardKind::RoadBuilding => self.road_building,
            DevCardKind::Invention => self.invention,
            DevCardKind::Monopoly => self.monopoly,
            DevCardKind::VictoryPoint => self.victory_point,
        }
    }

    fn slot(&mut self, kind: DevCardKind) -> &mut u32 {
        match kind {
            DevCardKind::Knight => &mut self.knight,
            DevCardKind::RoadBuilding => &mut self.road_building,
            DevCardKind::Invention => &mut self.invention,
            DevCardKind::Monopoly => &mut self.monopoly,
            DevCardKind::VictoryPoint => &mut self.victory_point,
        }
    }

    pub fn add(&mut self, kind: DevCardKind) {
        *self.slot(kind) += 1;
    }

    /// Take one card of `kind` out of the hand; false if there was none
    pub fn remove(&mut self, kind: DevCardKind) -> bool {
        let slot = self.slot(kind);
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    pub fn total(&self) -> u32 {
        DevCardKind::ALL.iter().map(|&kind| self.get(kind)).sum()
    }
}

/// Pieces a player has on the board
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingLedger {
    pub roads: Vec<EdgeId>,
    pub settlements: Vec<IntersectionId>,
    pub cities: Vec<IntersectionId>,
}

/// Building costs
pub mod costs {
    use super::ResourceHand;

    /// Cost to build a road: 1 wood, 1 brick
    pub fn road() -> ResourceHand {
        ResourceHand::with_amounts(1, 1, 0, 0, 0)
    }

    /// Cost to build a settlement: 1 wood, 1 brick, 1 wool, 1 wheat
    pub fn settlement() -> ResourceHand {
        ResourceHand::with_amounts(1, 1, 1, 1, 0)
    }

    /// Cost to upgrade to city: 2 wheat, 3 ore
    pub fn city() -> ResourceHand {
        ResourceHand::with_amounts(0, 0, 0, 2, 3)
    }

    /// Cost to buy a development card: 1 wool, 1 wheat, 1 ore
    pub fn development_card() -> ResourceHand {
        ResourceHand::with_amounts(0, 0, 1, 1, 1)
    }
}

/// A single player's state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    /// Player color
    pub color: PlayerColor,
    /// Current resources
    pub resources: ResourceHand,
    /// Development cards in hand (unplayed)
    pub dev_cards: DevCardHand,
    /// Placed roads, settlements and cities
    pub buildings: BuildingLedger,
    /// Number of knights played (for Largest Army)
    pub knights_played: u32,
    /// Victory point cards played face up
    pub revealed_victory_points: u32,
    /// Whether this player has the Longest Road card
    pub has_longest_road: bool,
    /// Whether this player has the Largest Army card
    pub has_largest_army: bool,
    /// Set by buying or playing a card; cleared when any turn ends
    pub dev_card_locked: bool,
    /// Derived total, refreshed after every action
    pub victory_points: u32,
}

impl Player {
    /// Create a new player for a seat
    pub fn new(id: impl Into<PlayerId>, seat: usize) -> Self {
        Self {
            id: id.into(),
            color: PlayerColor::for_seat(seat),
            resources: ResourceHand::new(),
            dev_cards: DevCardHand::default(),
            buildings: BuildingLedger::default(),
            knights_played: 0,
            revealed_victory_points: 0,
            has_longest_road: false,
            has_largest_army: false,
            dev_card_locked: false,
            victory_points: 0,
        }
    }

    /// Total resource cards held
    pub fn resource_count(&self) -> u32 {
        self.resources.total()
    }

    /// Total unplayed development cards held
    pub fn dev_card_count(&self) -> u32 {
        self.dev_cards.total()
    }
}
